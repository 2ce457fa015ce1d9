/// Errors that can occur while encoding or decoding TC frame fields.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The buffer is shorter than the structure being decoded.
    #[error("frame truncated ({len} bytes, need at least {needed})")]
    Truncated { len: usize, needed: usize },

    /// The engine declared a field length larger than the storage it handed back.
    #[error("{field} declares {declared} bytes but only {available} are available")]
    FieldOverrun {
        field: &'static str,
        declared: usize,
        available: usize,
    },

    /// A header field value does not fit its bit width.
    #[error("{field} value {value} exceeds {bits}-bit field")]
    FieldOutOfRange {
        field: &'static str,
        value: u32,
        bits: u8,
    },

    /// An empty frame was handed to the codec.
    #[error("frame is empty")]
    Empty,
}

pub type Result<T> = std::result::Result<T, FrameError>;
