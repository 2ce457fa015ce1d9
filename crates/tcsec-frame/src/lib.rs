//! CCSDS Telecommand transfer frame model and SDLS field codec.
//!
//! A secured TC frame is laid out as:
//! - A 5-byte primary header (version, flags, spacecraft ID, virtual channel, length, sequence)
//! - An optional 1-byte segment header
//! - The SDLS security header: SPI, IV, sequence number and pad
//! - The PDU
//! - The SDLS security trailer: MAC and an optional 2-byte FECF
//!
//! The security engine is the sole authority on where the variable-length
//! fields start and how long they are. This crate maps the engine's output
//! record into owned values without ever reading past a declared length.

pub mod codec;
pub mod error;
pub mod fecf;
pub mod frame;
pub mod header;

pub use codec::{decode_tc_frame, encode_for_apply, FrameRecord, RecordField};
pub use error::{FrameError, Result};
pub use fecf::{crc16_ccitt, FECF_SIZE};
pub use frame::{TcFrame, TcFrameSecurityHeader, TcFrameSecurityTrailer};
pub use header::{TcFramePrimaryHeader, PRIMARY_HEADER_SIZE};
