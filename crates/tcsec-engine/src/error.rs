use tcsec_frame::FrameError;

use crate::status::EngineStatus;

/// Errors crossing the engine call boundary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The engine ran and reported a non-success status.
    #[error("engine returned status {0}")]
    Status(EngineStatus),

    /// The frame does not fit the engine's length argument.
    #[error("frame of {len} bytes exceeds engine limit of {max} bytes")]
    FrameTooLong { len: usize, max: usize },

    /// A configuration string cannot be passed as a C string.
    #[error("{field} contains an interior NUL byte")]
    InteriorNul { field: &'static str },

    /// A security association does not fit the engine's field storage.
    #[error("security association {spi}: {field} length {len} exceeds capacity {capacity}")]
    FieldCapacity {
        spi: u16,
        field: &'static str,
        len: usize,
        capacity: usize,
    },

    #[error("frame error: {0}")]
    Frame(#[from] FrameError),
}

pub type Result<T> = std::result::Result<T, EngineError>;
