use bytes::Bytes;

use crate::header::TcFramePrimaryHeader;

/// SDLS security header as reported by the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TcFrameSecurityHeader {
    pub segment_header: u8,
    /// Security Parameter Index.
    pub security_parameter_index: u16,
    pub initialization_vector: Bytes,
    pub sequence_number: Bytes,
    pub pad: Bytes,
}

/// SDLS security trailer as reported by the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TcFrameSecurityTrailer {
    pub message_authentication_code: Bytes,
    pub frame_error_control_field: u16,
}

/// A TC frame with its security layer removed.
///
/// Owns copies of every variable-length field; nothing aliases engine memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TcFrame {
    pub primary_header: TcFramePrimaryHeader,
    pub security_header: TcFrameSecurityHeader,
    pub pdu: Bytes,
    pub security_trailer: TcFrameSecurityTrailer,
}

impl TcFrame {
    /// Security Parameter Index the frame was processed under.
    pub fn spi(&self) -> u16 {
        self.security_header.security_parameter_index
    }
}
