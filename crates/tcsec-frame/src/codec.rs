use bytes::{Bytes, BytesMut};

use crate::error::{FrameError, Result};
use crate::frame::{TcFrame, TcFrameSecurityHeader, TcFrameSecurityTrailer};
use crate::header::TcFramePrimaryHeader;

/// A fixed-capacity engine buffer together with the number of meaningful bytes.
///
/// Engines hand back fields as storage sized for the largest supported value
/// plus a per-call length. Only the first `declared_len` bytes are meaningful.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordField {
    storage: Box<[u8]>,
    declared_len: usize,
}

impl RecordField {
    /// Wrap engine storage with the length the engine reported for this call.
    pub fn new(storage: impl Into<Box<[u8]>>, declared_len: usize) -> Self {
        Self {
            storage: storage.into(),
            declared_len,
        }
    }

    /// A field whose storage is exactly its contents.
    pub fn exact(contents: &[u8]) -> Self {
        Self::new(contents.to_vec(), contents.len())
    }

    /// Length reported by the engine.
    pub fn declared_len(&self) -> usize {
        self.declared_len
    }

    /// Capacity of the backing storage.
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    fn copy_out(&self, field: &'static str) -> Result<Bytes> {
        let meaningful =
            self.storage
                .get(..self.declared_len)
                .ok_or(FrameError::FieldOverrun {
                    field,
                    declared: self.declared_len,
                    available: self.storage.len(),
                })?;
        Ok(Bytes::copy_from_slice(meaningful))
    }
}

/// The engine's view of a processed TC frame.
///
/// Mirrors the structure filled in by the engine's process-security call:
/// fixed-width scalars plus length-carrying variable fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameRecord {
    pub primary_header: TcFramePrimaryHeader,
    pub segment_header: u8,
    pub spi: u16,
    pub iv: RecordField,
    pub sn: RecordField,
    pub pad: RecordField,
    pub pdu: RecordField,
    pub mac: RecordField,
    pub fecf: u16,
}

/// Map an engine record into an owned [`TcFrame`].
///
/// Each variable-length field is copied using the length the engine declared
/// for that field on this call. A declared length larger than the backing
/// storage is an error, never a partial read.
pub fn decode_tc_frame(record: &FrameRecord) -> Result<TcFrame> {
    let frame = TcFrame {
        primary_header: record.primary_header,
        security_header: TcFrameSecurityHeader {
            segment_header: record.segment_header,
            security_parameter_index: record.spi,
            initialization_vector: record.iv.copy_out("initialization vector")?,
            sequence_number: record.sn.copy_out("sequence number")?,
            pad: record.pad.copy_out("pad")?,
        },
        pdu: record.pdu.copy_out("pdu")?,
        security_trailer: TcFrameSecurityTrailer {
            message_authentication_code: record.mac.copy_out("message authentication code")?,
            frame_error_control_field: record.fecf,
        },
    };

    tracing::debug!(
        spi = frame.security_header.security_parameter_index,
        iv_len = frame.security_header.initialization_vector.len(),
        sn_len = frame.security_header.sequence_number.len(),
        pad_len = frame.security_header.pad.len(),
        pdu_len = frame.pdu.len(),
        mac_len = frame.security_trailer.message_authentication_code.len(),
        "decoded TC frame"
    );

    Ok(frame)
}

/// Prepare a raw frame for the engine's apply-security call.
///
/// The input is passed through unchanged; the engine alone interprets its
/// layout. The returned buffer is owned and writable so the engine may work on
/// it in place for the duration of one call.
pub fn encode_for_apply(frame: &[u8]) -> Result<BytesMut> {
    if frame.is_empty() {
        return Err(FrameError::Empty);
    }
    Ok(BytesMut::from(frame))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_with(iv: RecordField, mac: RecordField) -> FrameRecord {
        FrameRecord {
            primary_header: TcFramePrimaryHeader::decode(&[0x20, 0x2c, 0x04, 0x0a, 0x00]).unwrap(),
            segment_header: 0,
            spi: 1,
            iv,
            sn: RecordField::new(vec![0u8; 16], 0),
            pad: RecordField::new(vec![0u8; 16], 0),
            pdu: RecordField::new(vec![0x00, 0x01, 0xEE, 0xEE], 2),
            mac,
            fecf: 0xB584,
        }
    }

    #[test]
    fn copies_only_declared_bytes() {
        let mut iv_storage = vec![0xAAu8; 16];
        iv_storage[..12].copy_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]);
        let record = record_with(
            RecordField::new(iv_storage, 12),
            RecordField::new(vec![0x55u8; 64], 16),
        );

        let frame = decode_tc_frame(&record).unwrap();

        assert_eq!(
            frame.security_header.initialization_vector.as_ref(),
            &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]
        );
        assert!(frame.security_header.sequence_number.is_empty());
        assert_eq!(frame.pdu.as_ref(), &[0x00, 0x01]);
        assert_eq!(frame.security_trailer.message_authentication_code.len(), 16);
        assert_eq!(frame.security_trailer.frame_error_control_field, 0xB584);
        assert_eq!(frame.spi(), 1);
        assert_eq!(frame.primary_header.spacecraft_id, 44);
    }

    #[test]
    fn rejects_declared_length_past_storage() {
        let record = record_with(
            RecordField::new(vec![0u8; 16], 17),
            RecordField::new(vec![0u8; 64], 16),
        );
        let result = decode_tc_frame(&record);
        assert!(matches!(
            result,
            Err(FrameError::FieldOverrun {
                field: "initialization vector",
                declared: 17,
                available: 16,
            })
        ));
    }

    #[test]
    fn mac_length_follows_engine() {
        let short = record_with(RecordField::default(), RecordField::new(vec![7u8; 64], 8));
        let long = record_with(RecordField::default(), RecordField::new(vec![7u8; 64], 32));

        let short = decode_tc_frame(&short).unwrap();
        let long = decode_tc_frame(&long).unwrap();

        assert_eq!(short.security_trailer.message_authentication_code.len(), 8);
        assert_eq!(long.security_trailer.message_authentication_code.len(), 32);
    }

    #[test]
    fn encode_for_apply_is_identity() {
        let raw = [0x20, 0x2c, 0x04, 0x08, 0x00, 0x00, 0x01, 0xbd, 0x37];
        let buf = encode_for_apply(&raw).unwrap();
        assert_eq!(buf.as_ref(), &raw);
    }

    #[test]
    fn encode_for_apply_rejects_empty() {
        assert!(matches!(encode_for_apply(&[]), Err(FrameError::Empty)));
    }

    #[test]
    fn exact_field_reports_its_length() {
        let field = RecordField::exact(&[1, 2, 3]);
        assert_eq!(field.declared_len(), 3);
        assert_eq!(field.capacity(), 3);
    }
}
