use std::fmt;
use std::io;
use std::path::Path;

use tcsec_client::{ClientError, ErrorKind};
use tcsec_config::ConfigError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const ENGINE_FAILURE: i32 = 70;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(path: &Path, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => USAGE,
        io::ErrorKind::InvalidData => DATA_INVALID,
        _ => INTERNAL,
    };
    CliError::new(code, format!("failed reading {}: {err}", path.display()))
}

pub fn config_error(context: &str, err: ConfigError) -> CliError {
    CliError::new(DATA_INVALID, format!("{context}: {err}"))
}

pub fn client_error(context: &str, err: ClientError) -> CliError {
    let code = match err.kind() {
        ErrorKind::NoFrameData
        | ErrorKind::BadDataFormat
        | ErrorKind::InvalidConfigurationValue
        | ErrorKind::MissingConfigurationParameter
        | ErrorKind::FileNotFound
        | ErrorKind::InvalidManagedParameterFormat => DATA_INVALID,
        ErrorKind::SdlsInitializationError
        | ErrorKind::ApplySecurityFailed
        | ErrorKind::ProcessSecurityFailed
        | ErrorKind::FrameDecode => ENGINE_FAILURE,
        ErrorKind::InvalidState | ErrorKind::EngineBusy => FAILURE,
    };
    CliError::new(code, format!("{context} [{}]: {err}", err.kind()))
}
