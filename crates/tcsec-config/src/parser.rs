use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};
use crate::keys;
use crate::managed::{ManagedParameter, ManagedParameterKey, ManagedParameterSet, DEFAULT_MAX_FRAME_LENGTH};
use crate::model::{
    AccessManagerConfig, CoreConfig, CryptoBackend, EngineConfiguration, LoginMethod,
    RelationalDbConfig, RemoteCryptoServiceConfig, SadbBackend, DEFAULT_CA_BUNDLE,
};
use crate::properties::PropertyList;
use crate::values::{parse_bool, parse_hex_u8, parse_u16};

const SADB_MTLS_CONTEXT: &str = "SADB mTLS connection";
const CRYPTO_SERVICE_MTLS_CONTEXT: &str = "KMC Crypto Service mTLS connection";
const COOKIE_FILE_NAME: &str = ".cam_cookie_file";

/// Builds an [`EngineConfiguration`] from a [`PropertyList`].
///
/// The parser owns the home directory used for the access-manager cookie
/// file default so that the default is deterministic under test.
#[derive(Debug, Clone)]
pub struct ConfigParser {
    home: PathBuf,
}

impl Default for ConfigParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigParser {
    /// Parser using `$HOME` as the home directory.
    pub fn new() -> Self {
        let home = std::env::var_os("HOME")
            .map(PathBuf::from)
            .unwrap_or_default();
        Self { home }
    }

    pub fn with_home(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Parse raw `key=value` entries.
    pub fn parse_entries<I, S>(&self, entries: I) -> Result<EngineConfiguration>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let properties = PropertyList::parse(entries)?;
        self.parse(&properties)
    }

    /// Resolve every section, then check mutual-TLS files (database first,
    /// then crypto service). The first violation found is returned.
    pub fn parse(&self, properties: &PropertyList) -> Result<EngineConfiguration> {
        let core = parse_core(properties)?;
        let database = match core.sadb_backend {
            SadbBackend::RelationalDb => Some(parse_database(properties)?),
            _ => None,
        };
        let crypto_service = match core.crypto_backend {
            CryptoBackend::RemoteCryptoService => Some(parse_crypto_service(properties)?),
            _ => None,
        };
        let access_manager = self.parse_access_manager(properties)?;
        let managed_parameters = parse_managed_parameters(properties)?;

        if let Some(database) = &database {
            validate_database_tls(database)?;
        }
        if let Some(crypto_service) = &crypto_service {
            validate_crypto_service_tls(crypto_service)?;
        }

        tracing::debug!(
            sadb = %core.sadb_backend,
            crypto = %core.crypto_backend,
            access_manager = access_manager.enabled,
            managed_parameters = managed_parameters.len(),
            "parsed engine configuration"
        );

        Ok(EngineConfiguration {
            core,
            database,
            crypto_service,
            access_manager,
            managed_parameters,
        })
    }

    fn parse_access_manager(&self, properties: &PropertyList) -> Result<AccessManagerConfig> {
        let defaults = AccessManagerConfig::default();
        let login_method = match properties.optional_string(keys::CAM_LOGIN_METHOD) {
            Some(value) => LoginMethod::from_property(keys::CAM_LOGIN_METHOD, &value)?,
            None => defaults.login_method,
        };
        Ok(AccessManagerConfig {
            enabled: properties.bool_or(keys::CAM_ENABLED, defaults.enabled)?,
            cookie_file: properties
                .optional_path(keys::CAM_COOKIE_FILE)
                .unwrap_or_else(|| self.home.join(COOKIE_FILE_NAME)),
            keytab_file: properties.optional_path(keys::CAM_KEYTAB_FILE),
            login_method,
            access_manager_uri: properties.optional_string(keys::CAM_ACCESS_MANAGER_URI),
            username: properties.optional_string(keys::CAM_USERNAME),
            home: properties.optional_path(keys::CAM_HOME).unwrap_or(defaults.home),
        })
    }
}

impl EngineConfiguration {
    /// Parse with a default [`ConfigParser`].
    pub fn from_entries<I, S>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        ConfigParser::new().parse_entries(entries)
    }
}

fn parse_core(properties: &PropertyList) -> Result<CoreConfig> {
    let defaults = CoreConfig::default();
    let sadb_backend = match properties.optional_string(keys::SADB_TYPE) {
        Some(value) => SadbBackend::from_property(keys::SADB_TYPE, &value)?,
        None => defaults.sadb_backend,
    };
    let crypto_backend = match properties.optional_string(keys::CRYPTO_TYPE) {
        Some(value) => CryptoBackend::from_property(keys::CRYPTO_TYPE, &value)?,
        None => defaults.crypto_backend,
    };
    let vcid_bitmask = match properties.get(keys::VCID_BITMASK) {
        Some(value) => parse_hex_u8(keys::VCID_BITMASK, value)?,
        None => defaults.vcid_bitmask,
    };

    Ok(CoreConfig {
        sadb_backend,
        crypto_backend,
        create_ecf: properties.bool_or(keys::CREATE_ECF, defaults.create_ecf)?,
        process_pdus: properties.bool_or(keys::PROCESS_PDUS, defaults.process_pdus)?,
        has_pus_header: properties.bool_or(keys::HAS_PUS_HEADER, defaults.has_pus_header)?,
        ignore_sa_state: properties.bool_or(keys::IGNORE_SA_STATE, defaults.ignore_sa_state)?,
        ignore_antireplay: properties.bool_or(keys::IGNORE_ANTIREPLAY, defaults.ignore_antireplay)?,
        unique_sa_per_mapid: properties
            .bool_or(keys::UNIQUE_SA_PER_MAPID, defaults.unique_sa_per_mapid)?,
        check_fecf: properties.bool_or(keys::CHECK_FECF, defaults.check_fecf)?,
        vcid_bitmask,
        increment_nontransmitted_counter_on_rollover: properties.bool_or(
            keys::INCREMENT_ON_ROLLOVER,
            defaults.increment_nontransmitted_counter_on_rollover,
        )?,
    })
}

fn parse_database(properties: &PropertyList) -> Result<RelationalDbConfig> {
    let defaults = RelationalDbConfig::default();
    let client_cert = properties.optional_path(keys::DB_CLIENT_CERT);
    let client_key = properties.optional_path(keys::DB_CLIENT_KEY);
    let mutual_tls = client_cert.is_some() || client_key.is_some();

    let ca_cert = match properties.optional_path(keys::DB_CA_CERT) {
        Some(path) => Some(path),
        None if mutual_tls => Some(PathBuf::from(DEFAULT_CA_BUNDLE)),
        None => None,
    };

    Ok(RelationalDbConfig {
        host: properties.string_or(keys::DB_HOST, &defaults.host),
        port: properties.u16_or(keys::DB_PORT, defaults.port)?,
        database_name: properties.string_or(keys::DB_NAME, &defaults.database_name),
        username: properties.string_or(keys::DB_USERNAME, &defaults.username),
        password: properties.optional_string(keys::DB_PASSWORD),
        ca_cert,
        ca_path: properties.optional_path(keys::DB_CA_PATH),
        client_cert,
        client_key,
        client_key_password: properties.optional_string(keys::DB_CLIENT_KEY_PASSWORD),
        verify_server: properties.bool_or(keys::DB_VERIFY_SERVER, mutual_tls)?,
        require_secure_transport: properties.bool_or(keys::DB_REQUIRE_SECURE_TRANSPORT, mutual_tls)?,
    })
}

fn parse_crypto_service(properties: &PropertyList) -> Result<RemoteCryptoServiceConfig> {
    let defaults = RemoteCryptoServiceConfig::default();
    Ok(RemoteCryptoServiceConfig {
        protocol: properties.string_or(keys::KMC_PROTOCOL, &defaults.protocol),
        hostname: properties.string_or(keys::KMC_HOST, &defaults.hostname),
        port: properties.u16_or(keys::KMC_PORT, defaults.port)?,
        app_uri: properties.string_or(keys::KMC_APP, &defaults.app_uri),
        client_cert: properties.optional_path(keys::KMC_CLIENT_CERT),
        client_cert_format: properties
            .optional_string(keys::KMC_CLIENT_CERT_FORMAT)
            .unwrap_or(defaults.client_cert_format),
        client_key: properties.optional_path(keys::KMC_CLIENT_KEY),
        client_key_password: properties.optional_string(keys::KMC_CLIENT_KEY_PASSWORD),
        ca_bundle: properties
            .optional_path(keys::KMC_CA_BUNDLE)
            .unwrap_or(defaults.ca_bundle),
        ca_path: properties.optional_path(keys::KMC_CA_PATH),
        issuer_cert: properties.optional_path(keys::KMC_ISSUER_CERT),
        ignore_hostname_validation: properties
            .bool_or(keys::KMC_VERIFY_SERVER, defaults.ignore_hostname_validation)?,
    })
}

/// Collect managed parameters in the order their `has_ecf` keys first appear.
fn parse_managed_parameters(properties: &PropertyList) -> Result<ManagedParameterSet> {
    let mut set = ManagedParameterSet::default();
    for key in properties.keys() {
        if !key.contains(keys::HAS_ECF_MARKER) {
            continue;
        }
        let segments = managed_key_segments(key)?;
        let managed_key = managed_key_from_segments(key, &segments)?;

        let has_ecf = parse_bool(key, properties.get(key).unwrap_or_default())?;
        let stem = format!(
            "{}{}.{}.{}",
            keys::MANAGED_PARAMETER_PREFIX,
            segments[0],
            segments[1],
            segments[2]
        );
        let segmentation_key = format!("{stem}{}", keys::HAS_SEGMENTATION_HEADER_SUFFIX);
        let max_length_key = format!("{stem}{}", keys::MAX_FRAME_LENGTH_SUFFIX);

        let parameter = ManagedParameter {
            has_ecf,
            has_segmentation_header: match properties.get(&segmentation_key) {
                Some(value) => parse_bool(&segmentation_key, value)?,
                None => false,
            },
            max_frame_length: match properties.get(&max_length_key) {
                Some(value) => parse_u16(&max_length_key, value)?,
                None => DEFAULT_MAX_FRAME_LENGTH,
            },
        };

        if !set.insert(managed_key, parameter) {
            return Err(ConfigError::managed_format(
                key,
                format!(
                    "duplicate managed parameter for scid {} vcid {} tfvn {}",
                    managed_key.scid, managed_key.vcid, managed_key.tfvn
                ),
            ));
        }
    }
    Ok(set)
}

/// Split `cryptolib.tc.<scid>.<vcid>.<tfvn>.has_ecf` into its three numeric
/// segments. Anything else is rejected.
fn managed_key_segments(key: &str) -> Result<[&str; 3]> {
    let body = key
        .strip_prefix(keys::MANAGED_PARAMETER_PREFIX)
        .and_then(|rest| rest.strip_suffix(keys::HAS_ECF_SUFFIX))
        .ok_or_else(|| ConfigError::managed_format(key, "unexpected key layout"))?;

    let parts: Vec<&str> = body.split('.').collect();
    let &[scid, vcid, tfvn] = parts.as_slice() else {
        return Err(ConfigError::managed_format(
            key,
            format!("expected 3 numeric segments, found {}", parts.len()),
        ));
    };
    for segment in [scid, vcid, tfvn] {
        if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ConfigError::managed_format(
                key,
                format!("segment '{segment}' is not a decimal number"),
            ));
        }
    }
    Ok([scid, vcid, tfvn])
}

fn managed_key_from_segments(key: &str, segments: &[&str; 3]) -> Result<ManagedParameterKey> {
    let scid = segments[0]
        .parse::<u16>()
        .map_err(|_| ConfigError::managed_format(key, "scid does not fit 16 bits"))?;
    let vcid = segments[1]
        .parse::<u8>()
        .map_err(|_| ConfigError::managed_format(key, "vcid does not fit 8 bits"))?;
    let tfvn = segments[2]
        .parse::<u8>()
        .map_err(|_| ConfigError::managed_format(key, "tfvn does not fit 8 bits"))?;
    Ok(ManagedParameterKey::new(scid, vcid, tfvn))
}

fn validate_database_tls(database: &RelationalDbConfig) -> Result<()> {
    if !database.uses_mutual_tls() {
        return Ok(());
    }
    let client_cert = database.client_cert.as_deref().ok_or(ConfigError::MissingParameter {
        key: keys::DB_CLIENT_CERT,
        context: SADB_MTLS_CONTEXT,
    })?;
    let client_key = database.client_key.as_deref().ok_or(ConfigError::MissingParameter {
        key: keys::DB_CLIENT_KEY,
        context: SADB_MTLS_CONTEXT,
    })?;
    require_file(client_cert, keys::DB_CLIENT_CERT)?;
    require_file(client_key, keys::DB_CLIENT_KEY)?;
    if let Some(ca_cert) = database.ca_cert.as_deref() {
        require_file(ca_cert, keys::DB_CA_CERT)?;
    }
    Ok(())
}

fn validate_crypto_service_tls(service: &RemoteCryptoServiceConfig) -> Result<()> {
    let client_cert = service.client_cert.as_deref().ok_or(ConfigError::MissingParameter {
        key: keys::KMC_CLIENT_CERT,
        context: CRYPTO_SERVICE_MTLS_CONTEXT,
    })?;
    let client_key = service.client_key.as_deref().ok_or(ConfigError::MissingParameter {
        key: keys::KMC_CLIENT_KEY,
        context: CRYPTO_SERVICE_MTLS_CONTEXT,
    })?;
    require_file(client_cert, keys::KMC_CLIENT_CERT)?;
    require_file(client_key, keys::KMC_CLIENT_KEY)?;
    require_file(&service.ca_bundle, keys::KMC_CA_BUNDLE)?;
    Ok(())
}

fn require_file(path: &Path, key: &'static str) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(ConfigError::FileNotFound {
            path: path.to_path_buf(),
            key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> ConfigParser {
        ConfigParser::with_home("/home/operator")
    }

    fn local_entries() -> Vec<&'static str> {
        vec!["cryptolib.sadb.type=inmemory", "cryptolib.crypto.type=libgcrypt"]
    }

    #[test]
    fn local_backends_need_no_tls_files() {
        let config = parser().parse_entries(local_entries()).unwrap();
        assert_eq!(config.core().sadb_backend, SadbBackend::InMemory);
        assert_eq!(config.core().crypto_backend, CryptoBackend::LocalCryptoLibrary);
        assert!(config.database().is_none());
        assert!(config.crypto_service().is_none());
        assert!(config.managed_parameters().is_empty());
    }

    #[test]
    fn cookie_file_defaults_under_home() {
        let config = parser().parse_entries(local_entries()).unwrap();
        let cam = config.access_manager();
        assert!(!cam.enabled);
        assert_eq!(cam.cookie_file, PathBuf::from("/home/operator/.cam_cookie_file"));
        assert_eq!(cam.home, PathBuf::from("/ammos/css"));
        assert_eq!(cam.login_method, LoginMethod::None);
    }

    #[test]
    fn managed_parameters_pick_up_siblings() {
        let mut entries = local_entries();
        entries.extend([
            "cryptolib.tc.44.1.0.has_ecf=true",
            "cryptolib.tc.44.1.0.has_segmentation_header=yes",
            "cryptolib.tc.44.1.0.max_frame_length=512",
            "cryptolib.tc.44.0.0.has_ecf=false",
        ]);
        let config = parser().parse_entries(entries).unwrap();
        let set = config.managed_parameters();

        let first = set.get(&ManagedParameterKey::new(44, 1, 0)).unwrap();
        assert!(first.has_ecf);
        assert!(first.has_segmentation_header);
        assert_eq!(first.max_frame_length, 512);

        let second = set.get(&ManagedParameterKey::new(44, 0, 0)).unwrap();
        assert_eq!(*second, ManagedParameter::with_ecf(false));

        let order: Vec<_> = set.iter().map(|(key, _)| key.vcid).collect();
        assert_eq!(order, vec![1, 0]);
    }

    #[test]
    fn siblings_without_has_ecf_declare_nothing() {
        let mut entries = local_entries();
        entries.push("cryptolib.tc.44.1.0.max_frame_length=512");
        let config = parser().parse_entries(entries).unwrap();
        assert!(config.managed_parameters().is_empty());
    }

    #[test]
    fn managed_key_shapes_are_strict() {
        for bad in [
            "cryptolib.tc.3.0.has_ecf=true",
            "cryptolib.tc.44.1.0.0.has_ecf=true",
            "cryptolib.tc.a.1.0.has_ecf=true",
            "cryptolib.tc.44.1.0.has_ecf_flag=true",
            "prefix.cryptolib.tc.44.1.0.has_ecf=true",
            "cryptolib.tc.70000.1.0.has_ecf=true",
            "cryptolib.tc.44.256.0.has_ecf=true",
        ] {
            let mut entries = local_entries();
            entries.push(bad);
            let err = parser().parse_entries(entries).unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidManagedParameterFormat { .. }),
                "{bad}: {err}"
            );
        }
    }

    #[test]
    fn same_numeric_triple_twice_is_rejected() {
        let mut entries = local_entries();
        entries.extend(["cryptolib.tc.44.1.0.has_ecf=true", "cryptolib.tc.044.1.0.has_ecf=true"]);
        let err = parser().parse_entries(entries).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidManagedParameterFormat { .. }));
    }

    #[test]
    fn bad_has_ecf_value_is_invalid_value() {
        let mut entries = local_entries();
        entries.push("cryptolib.tc.44.1.0.has_ecf=sometimes");
        let err = parser().parse_entries(entries).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn crypto_service_requires_client_cert() {
        let err = parser()
            .parse_entries(["cryptolib.sadb.type=inmemory"])
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingParameter {
                key: keys::KMC_CLIENT_CERT,
                ..
            }
        ));
    }

    #[test]
    fn unknown_login_method_is_rejected() {
        let mut entries = local_entries();
        entries.push("cryptolib.cam.login_method=password");
        let err = parser().parse_entries(entries).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn port_must_fit_sixteen_bits() {
        let err = parser()
            .parse_entries([
                "cryptolib.crypto.type=libgcrypt",
                "cryptolib.sadb.mariadb.port=70000",
            ])
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn plain_database_keeps_tls_off() {
        let config = parser()
            .parse_entries(["cryptolib.crypto.type=libgcrypt"])
            .unwrap();
        let db = config.database().unwrap();
        assert_eq!(db.host, "localhost");
        assert_eq!(db.port, 3306);
        assert_eq!(db.database_name, "sadb");
        assert_eq!(db.username, "sadb_user");
        assert!(db.ca_cert.is_none());
        assert!(!db.verify_server);
        assert!(!db.require_secure_transport);
    }
}
