use std::fmt;

use tcsec_config::ConfigError;
use tcsec_engine::{EngineError, EngineStatus};
use tcsec_frame::FrameError;

use crate::state::ClientState;

/// Closed classification of client errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NoFrameData,
    BadDataFormat,
    InvalidConfigurationValue,
    MissingConfigurationParameter,
    FileNotFound,
    InvalidManagedParameterFormat,
    SdlsInitializationError,
    ApplySecurityFailed,
    ProcessSecurityFailed,
    InvalidState,
    EngineBusy,
    FrameDecode,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoFrameData => "NO_FRAME_DATA",
            Self::BadDataFormat => "BAD_DATA_FORMAT",
            Self::InvalidConfigurationValue => "INVALID_CONFIGURATION_VALUE",
            Self::MissingConfigurationParameter => "MISSING_CONFIGURATION_PARAMETER",
            Self::FileNotFound => "FILE_DOESNT_EXIST",
            Self::InvalidManagedParameterFormat => "INVALID_MANAGED_PARAMETER_FORMAT",
            Self::SdlsInitializationError => "SDLS_INITIALIZATION_ERROR",
            Self::ApplySecurityFailed => "APPLY_SECURITY_EXCEPTION",
            Self::ProcessSecurityFailed => "PROCESS_SECURITY_EXCEPTION",
            Self::InvalidState => "INVALID_STATE",
            Self::EngineBusy => "ENGINE_BUSY",
            Self::FrameDecode => "FRAME_DECODE_ERROR",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An engine-reported failure with its translated name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineFailure {
    pub status: EngineStatus,
    pub name: String,
}

impl fmt::Display for EngineFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error code: {}, {}", self.status, self.name)
    }
}

/// Errors raised by [`crate::SecurityClient`].
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Input Transfer Frame Byte Array is Empty")]
    NoFrameData,

    #[error("Input Transfer Frame is not usable: {0}")]
    BadDataFormat(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A configuration value could not be handed to the engine.
    #[error("Unable to pass configuration to the engine: {0}")]
    EngineArgument(#[source] EngineError),

    #[error("SDLS Initialization Error. {0}")]
    Initialization(EngineFailure),

    #[error("Apply Security Failed. {0}")]
    ApplySecurity(EngineFailure),

    #[error("Process Security Failed. {0}")]
    ProcessSecurity(EngineFailure),

    #[error("{operation} is not valid while the client is {state}")]
    InvalidState {
        operation: &'static str,
        state: ClientState,
    },

    #[error("another security client already holds the process-wide engine")]
    EngineBusy,

    #[error("failed to decode processed frame: {0}")]
    FrameDecode(#[from] FrameError),
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoFrameData => ErrorKind::NoFrameData,
            Self::BadDataFormat(_) => ErrorKind::BadDataFormat,
            Self::Config(err) => match err {
                ConfigError::MalformedProperty { .. } | ConfigError::InvalidValue { .. } => {
                    ErrorKind::InvalidConfigurationValue
                }
                ConfigError::MissingParameter { .. } => ErrorKind::MissingConfigurationParameter,
                ConfigError::FileNotFound { .. } => ErrorKind::FileNotFound,
                ConfigError::InvalidManagedParameterFormat { .. } => {
                    ErrorKind::InvalidManagedParameterFormat
                }
            },
            Self::EngineArgument(_) => ErrorKind::InvalidConfigurationValue,
            Self::Initialization(_) => ErrorKind::SdlsInitializationError,
            Self::ApplySecurity(_) => ErrorKind::ApplySecurityFailed,
            Self::ProcessSecurity(_) => ErrorKind::ProcessSecurityFailed,
            Self::InvalidState { .. } => ErrorKind::InvalidState,
            Self::EngineBusy => ErrorKind::EngineBusy,
            Self::FrameDecode(_) => ErrorKind::FrameDecode,
        }
    }

    /// Engine status for engine-reported failures.
    pub fn engine_status(&self) -> Option<EngineStatus> {
        match self {
            Self::Initialization(failure)
            | Self::ApplySecurity(failure)
            | Self::ProcessSecurity(failure) => Some(failure.status),
            Self::EngineArgument(EngineError::Status(status)) => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_failure_message_carries_code_and_name() {
        let err = ClientError::ApplySecurity(EngineFailure {
            status: EngineStatus(-13),
            name: "SIM_ERR_FRAME_TOO_LONG".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "Apply Security Failed. Error code: -13, SIM_ERR_FRAME_TOO_LONG"
        );
        assert_eq!(err.kind(), ErrorKind::ApplySecurityFailed);
        assert_eq!(err.engine_status(), Some(EngineStatus(-13)));
    }

    #[test]
    fn config_errors_map_to_kinds() {
        let missing: ClientError = ConfigError::MissingParameter {
            key: "cryptolib.sadb.mariadb.mtls.clientkey",
            context: "SADB mTLS connection",
        }
        .into();
        assert_eq!(missing.kind(), ErrorKind::MissingConfigurationParameter);
        assert_eq!(missing.engine_status(), None);

        let malformed: ClientError = ConfigError::MalformedProperty {
            entry: "nokey".to_string(),
        }
        .into();
        assert_eq!(malformed.kind(), ErrorKind::InvalidConfigurationValue);
    }
}
