//! Typed SDLS engine configuration.
//!
//! Turns a flat list of `key=value` cryptolib properties into an immutable
//! [`EngineConfiguration`]: defaults applied, enumerations resolved, managed
//! parameters keyed by `(scid, vcid, tfvn)`, and mutual-TLS file references
//! checked before anything reaches the engine.

pub mod error;
pub mod keys;
pub mod managed;
pub mod model;
pub mod parser;
pub mod properties;
pub mod values;

pub use error::{ConfigError, Result};
pub use managed::{ManagedParameter, ManagedParameterKey, ManagedParameterSet};
pub use model::{
    AccessManagerConfig, CoreConfig, CryptoBackend, EngineConfiguration, LoginMethod,
    RelationalDbConfig, RemoteCryptoServiceConfig, SadbBackend, DEFAULT_CA_BUNDLE,
};
pub use parser::ConfigParser;
pub use properties::PropertyList;
