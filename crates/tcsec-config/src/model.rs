use std::fmt;
use std::path::PathBuf;

use serde::{Serialize, Serializer};

use crate::error::{ConfigError, Result};
use crate::managed::ManagedParameterSet;

/// CA bundle used when mutual TLS is in play and no CA certificate is given.
pub const DEFAULT_CA_BUNDLE: &str = "/etc/pki/tls/certs/ammos-ca-bundle.crt";

macro_rules! property_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($variant:ident => ($tag:expr, $text:literal),)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant,)+
        }

        impl $name {
            /// Numeric tag the engine expects for this value.
            pub fn tag(self) -> u8 {
                match self {
                    $(Self::$variant => $tag,)+
                }
            }

            /// Property-file spelling.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }

            /// Resolve a property value, ignoring ASCII case.
            pub fn from_property(key: &str, value: &str) -> Result<Self> {
                let lowered = value.trim().to_ascii_lowercase();
                match lowered.as_str() {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(ConfigError::invalid_value(
                        key,
                        value,
                        concat!("one of:", $(" ", $text,)+),
                    )),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }
    };
}

property_enum! {
    /// Security association database backend.
    pub enum SadbBackend {
        Uninitialized => (0, "uninitialized"),
        Custom => (1, "custom"),
        InMemory => (2, "inmemory"),
        RelationalDb => (3, "mariadb"),
    }
}

property_enum! {
    /// Cryptographic backend.
    pub enum CryptoBackend {
        Uninitialized => (0, "uninitialized"),
        LocalCryptoLibrary => (1, "libgcrypt"),
        RemoteCryptoService => (2, "kmccryptoservice"),
        AlternateCryptoProvider => (3, "wolfssl"),
    }
}

property_enum! {
    /// Access-manager login method.
    pub enum LoginMethod {
        None => (0, "none"),
        Kerberos => (1, "kerberos"),
        KeytabFile => (2, "keytab_file"),
    }
}

/// Core processing flags handed to the engine first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CoreConfig {
    pub sadb_backend: SadbBackend,
    pub crypto_backend: CryptoBackend,
    pub create_ecf: bool,
    pub process_pdus: bool,
    pub has_pus_header: bool,
    pub ignore_sa_state: bool,
    pub ignore_antireplay: bool,
    pub unique_sa_per_mapid: bool,
    pub check_fecf: bool,
    pub vcid_bitmask: u8,
    pub increment_nontransmitted_counter_on_rollover: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            sadb_backend: SadbBackend::RelationalDb,
            crypto_backend: CryptoBackend::RemoteCryptoService,
            create_ecf: false,
            process_pdus: false,
            has_pus_header: false,
            ignore_sa_state: true,
            ignore_antireplay: true,
            unique_sa_per_mapid: false,
            check_fecf: false,
            vcid_bitmask: 0x3F,
            increment_nontransmitted_counter_on_rollover: true,
        }
    }
}

/// Relational security association database connection.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct RelationalDbConfig {
    pub host: String,
    pub port: u16,
    pub database_name: String,
    pub username: String,
    #[serde(skip)]
    pub password: Option<String>,
    pub ca_cert: Option<PathBuf>,
    pub ca_path: Option<PathBuf>,
    pub client_cert: Option<PathBuf>,
    pub client_key: Option<PathBuf>,
    #[serde(skip)]
    pub client_key_password: Option<String>,
    pub verify_server: bool,
    pub require_secure_transport: bool,
}

impl Default for RelationalDbConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 3306,
            database_name: "sadb".to_string(),
            username: "sadb_user".to_string(),
            password: None,
            ca_cert: None,
            ca_path: None,
            client_cert: None,
            client_key: None,
            client_key_password: None,
            verify_server: false,
            require_secure_transport: false,
        }
    }
}

impl RelationalDbConfig {
    /// Whether mutual TLS was requested (a client cert or key is present).
    pub fn uses_mutual_tls(&self) -> bool {
        self.client_cert.is_some() || self.client_key.is_some()
    }
}

/// Remote crypto service endpoint.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct RemoteCryptoServiceConfig {
    pub protocol: String,
    pub hostname: String,
    pub port: u16,
    pub app_uri: String,
    pub client_cert: Option<PathBuf>,
    pub client_cert_format: String,
    pub client_key: Option<PathBuf>,
    #[serde(skip)]
    pub client_key_password: Option<String>,
    pub ca_bundle: PathBuf,
    pub ca_path: Option<PathBuf>,
    pub issuer_cert: Option<PathBuf>,
    /// Forwarded verbatim from `verifyserver`.
    pub ignore_hostname_validation: bool,
}

impl Default for RemoteCryptoServiceConfig {
    fn default() -> Self {
        Self {
            protocol: "https".to_string(),
            hostname: "localhost".to_string(),
            port: 8443,
            app_uri: "crypto-service".to_string(),
            client_cert: None,
            client_cert_format: "PEM".to_string(),
            client_key: None,
            client_key_password: None,
            ca_bundle: PathBuf::from(DEFAULT_CA_BUNDLE),
            ca_path: None,
            issuer_cert: None,
            ignore_hostname_validation: true,
        }
    }
}

/// Access-manager settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessManagerConfig {
    pub enabled: bool,
    pub cookie_file: PathBuf,
    pub keytab_file: Option<PathBuf>,
    pub login_method: LoginMethod,
    pub access_manager_uri: Option<String>,
    pub username: Option<String>,
    pub home: PathBuf,
}

impl Default for AccessManagerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            cookie_file: PathBuf::from(".cam_cookie_file"),
            keytab_file: None,
            login_method: LoginMethod::None,
            access_manager_uri: None,
            username: None,
            home: PathBuf::from("/ammos/css"),
        }
    }
}

/// Fully resolved, immutable engine configuration.
///
/// The database section exists only for the relational SADB backend and the
/// crypto-service section only for the remote crypto backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineConfiguration {
    pub(crate) core: CoreConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) database: Option<RelationalDbConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) crypto_service: Option<RemoteCryptoServiceConfig>,
    pub(crate) access_manager: AccessManagerConfig,
    pub(crate) managed_parameters: ManagedParameterSet,
}

impl EngineConfiguration {
    pub fn core(&self) -> &CoreConfig {
        &self.core
    }

    pub fn database(&self) -> Option<&RelationalDbConfig> {
        self.database.as_ref()
    }

    pub fn crypto_service(&self) -> Option<&RemoteCryptoServiceConfig> {
        self.crypto_service.as_ref()
    }

    pub fn access_manager(&self) -> &AccessManagerConfig {
        &self.access_manager
    }

    pub fn managed_parameters(&self) -> &ManagedParameterSet {
        &self.managed_parameters
    }
}

struct Redacted<'a>(&'a Option<String>);

impl fmt::Debug for Redacted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(secret) => write!(f, "<redacted:{} bytes>", secret.len()),
            None => f.write_str("None"),
        }
    }
}

impl fmt::Debug for RelationalDbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelationalDbConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database_name", &self.database_name)
            .field("username", &self.username)
            .field("password", &Redacted(&self.password))
            .field("ca_cert", &self.ca_cert)
            .field("ca_path", &self.ca_path)
            .field("client_cert", &self.client_cert)
            .field("client_key", &self.client_key)
            .field("client_key_password", &Redacted(&self.client_key_password))
            .field("verify_server", &self.verify_server)
            .field("require_secure_transport", &self.require_secure_transport)
            .finish()
    }
}

impl fmt::Debug for RemoteCryptoServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteCryptoServiceConfig")
            .field("protocol", &self.protocol)
            .field("hostname", &self.hostname)
            .field("port", &self.port)
            .field("app_uri", &self.app_uri)
            .field("client_cert", &self.client_cert)
            .field("client_cert_format", &self.client_cert_format)
            .field("client_key", &self.client_key)
            .field("client_key_password", &Redacted(&self.client_key_password))
            .field("ca_bundle", &self.ca_bundle)
            .field("ca_path", &self.ca_path)
            .field("issuer_cert", &self.issuer_cert)
            .field("ignore_hostname_validation", &self.ignore_hostname_validation)
            .finish()
    }
}
