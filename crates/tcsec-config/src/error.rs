use std::path::PathBuf;

/// Errors raised while building an [`crate::EngineConfiguration`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A property entry is not of the form `key=value`.
    #[error("malformed configuration property (expected key=value): {entry}")]
    MalformedProperty { entry: String },

    /// A value could not be converted to the type its key requires.
    #[error("Unable to parse configuration value '{value}' for {key}: expected {expected}")]
    InvalidValue {
        key: String,
        value: String,
        expected: &'static str,
    },

    /// A conditionally required key is absent.
    #[error("Configuration Parameter is necessary for {context}: {key}")]
    MissingParameter {
        key: &'static str,
        context: &'static str,
    },

    /// A path-valued property names a file that does not exist.
    #[error("Necessary file doesn't exist '{}' from configuration parameter: {key}", path.display())]
    FileNotFound { path: PathBuf, key: &'static str },

    /// A key containing `has_ecf` is not a valid managed-parameter key.
    #[error("Invalid Managed Parameter Format ({key}): {reason}. Format must be 'cryptolib.tc.<scid>.<vcid>.<tfvn>.has_ecf=<bool>'")]
    InvalidManagedParameterFormat { key: String, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid_value(key: &str, value: &str, expected: &'static str) -> Self {
        Self::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            expected,
        }
    }

    pub(crate) fn managed_format(key: &str, reason: impl Into<String>) -> Self {
        Self::InvalidManagedParameterFormat {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
