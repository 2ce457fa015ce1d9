//! Recognized property keys.

pub const SADB_TYPE: &str = "cryptolib.sadb.type";
pub const CRYPTO_TYPE: &str = "cryptolib.crypto.type";
pub const IGNORE_ANTIREPLAY: &str = "cryptolib.process_tc.ignore_antireplay";
pub const IGNORE_SA_STATE: &str = "cryptolib.process_tc.ignore_sa_state";
pub const PROCESS_PDUS: &str = "cryptolib.process_tc.process_pdus";
pub const CHECK_FECF: &str = "cryptolib.process_tc.check_fecf";
pub const CREATE_ECF: &str = "cryptolib.apply_tc.create_ecf";
pub const HAS_PUS_HEADER: &str = "cryptolib.tc.has_pus_header";
pub const UNIQUE_SA_PER_MAPID: &str = "cryptolib.tc.unique_sa_per_mapid";
pub const VCID_BITMASK: &str = "cryptolib.tc.vcid_bitmask";
pub const INCREMENT_ON_ROLLOVER: &str = "cryptolib.tc.on_rollover_increment_nontransmitted_counter";

pub const DB_HOST: &str = "cryptolib.sadb.mariadb.fqdn";
pub const DB_PORT: &str = "cryptolib.sadb.mariadb.port";
pub const DB_NAME: &str = "cryptolib.sadb.mariadb.database_name";
pub const DB_USERNAME: &str = "cryptolib.sadb.mariadb.username";
pub const DB_PASSWORD: &str = "cryptolib.sadb.mariadb.password";
pub const DB_CA_CERT: &str = "cryptolib.sadb.mariadb.tls.cacert";
pub const DB_CA_PATH: &str = "cryptolib.sadb.mariadb.tls.capath";
pub const DB_VERIFY_SERVER: &str = "cryptolib.sadb.mariadb.tls.verifyserver";
pub const DB_CLIENT_CERT: &str = "cryptolib.sadb.mariadb.mtls.clientcert";
pub const DB_CLIENT_KEY: &str = "cryptolib.sadb.mariadb.mtls.clientkey";
pub const DB_CLIENT_KEY_PASSWORD: &str = "cryptolib.sadb.mariadb.mtls.clientkeypassword";
pub const DB_REQUIRE_SECURE_TRANSPORT: &str = "cryptolib.sadb.mariadb.require_secure_transport";

pub const KMC_PROTOCOL: &str = "cryptolib.crypto.kmccryptoservice.protocol";
pub const KMC_HOST: &str = "cryptolib.crypto.kmccryptoservice.fqdn";
pub const KMC_PORT: &str = "cryptolib.crypto.kmccryptoservice.port";
pub const KMC_APP: &str = "cryptolib.crypto.kmccryptoservice.app";
pub const KMC_CLIENT_CERT: &str = "cryptolib.crypto.kmccryptoservice.mtls.clientcert";
pub const KMC_CLIENT_CERT_FORMAT: &str = "cryptolib.crypto.kmccryptoservice.mtls.clientcertformat";
pub const KMC_CLIENT_KEY: &str = "cryptolib.crypto.kmccryptoservice.mtls.clientkey";
pub const KMC_CLIENT_KEY_PASSWORD: &str = "cryptolib.crypto.kmccryptoservice.mtls.clientkeypassword";
pub const KMC_CA_BUNDLE: &str = "cryptolib.crypto.kmccryptoservice.cacert";
pub const KMC_CA_PATH: &str = "cryptolib.crypto.kmccryptoservice.cacertpath";
pub const KMC_ISSUER_CERT: &str = "cryptolib.crypto.kmccryptoservice.issuercert";
pub const KMC_VERIFY_SERVER: &str = "cryptolib.crypto.kmccryptoservice.verifyserver";

pub const CAM_ENABLED: &str = "cryptolib.cam.enabled";
pub const CAM_COOKIE_FILE: &str = "cryptolib.cam.cookie_file";
pub const CAM_KEYTAB_FILE: &str = "cryptolib.cam.keytab_file";
pub const CAM_HOME: &str = "cryptolib.cam.cam_home";
pub const CAM_LOGIN_METHOD: &str = "cryptolib.cam.login_method";
pub const CAM_ACCESS_MANAGER_URI: &str = "cryptolib.cam.access_manager_uri";
pub const CAM_USERNAME: &str = "cryptolib.cam.username";

/// Substring that marks a key as a managed-parameter declaration.
pub const HAS_ECF_MARKER: &str = "has_ecf";
pub const MANAGED_PARAMETER_PREFIX: &str = "cryptolib.tc.";
pub const HAS_ECF_SUFFIX: &str = ".has_ecf";
pub const HAS_SEGMENTATION_HEADER_SUFFIX: &str = ".has_segmentation_header";
pub const MAX_FRAME_LENGTH_SUFFIX: &str = ".max_frame_length";
