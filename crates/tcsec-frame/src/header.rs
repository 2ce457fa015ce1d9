use bytes::{Buf, BufMut, BytesMut};

use crate::error::{FrameError, Result};

/// Primary header size in bytes.
pub const PRIMARY_HEADER_SIZE: usize = 5;

const TFVN_BITS: u8 = 2;
const SPARE_BITS: u8 = 2;
const SCID_BITS: u8 = 10;
const VCID_BITS: u8 = 6;
const FRAME_LENGTH_BITS: u8 = 10;

/// TC transfer frame primary header (CCSDS 232.0-B).
///
/// Wire format, big-endian, most significant bit first:
/// ```text
/// ┌──────┬────────┬────┬───────┬──────────┬──────────┬──────────────┬───────────┐
/// │ TFVN │ Bypass │ CC │ Spare │ SCID     │ VCID     │ Frame Length │ Frame Seq │
/// │ (2b) │ (1b)   │(1b)│ (2b)  │ (10b)    │ (6b)     │ (10b)        │ (8b)      │
/// └──────┴────────┴────┴───────┴──────────┴──────────┴──────────────┴───────────┘
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TcFramePrimaryHeader {
    pub transfer_frame_version_number: u8,
    pub bypass_flag: u8,
    pub command_control_flag: u8,
    pub spare_bits: u8,
    pub spacecraft_id: u16,
    pub virtual_channel_id: u8,
    /// Total frame length in octets minus one.
    pub frame_length: u16,
    pub frame_sequence_number: u8,
}

impl TcFramePrimaryHeader {
    /// Decode the primary header from the start of `src`.
    pub fn decode(src: &[u8]) -> Result<Self> {
        if src.len() < PRIMARY_HEADER_SIZE {
            return Err(FrameError::Truncated {
                len: src.len(),
                needed: PRIMARY_HEADER_SIZE,
            });
        }

        let mut buf = &src[..PRIMARY_HEADER_SIZE];
        let word = buf.get_u16();
        let vcid_length = buf.get_u16();
        let frame_sequence_number = buf.get_u8();

        Ok(Self {
            transfer_frame_version_number: (word >> 14) as u8 & 0b11,
            bypass_flag: (word >> 13) as u8 & 0b1,
            command_control_flag: (word >> 12) as u8 & 0b1,
            spare_bits: (word >> 10) as u8 & 0b11,
            spacecraft_id: word & 0x03FF,
            virtual_channel_id: (vcid_length >> 10) as u8 & 0x3F,
            frame_length: vcid_length & 0x03FF,
            frame_sequence_number,
        })
    }

    /// Encode the primary header into `dst`.
    ///
    /// Fails if any field does not fit its bit width.
    pub fn encode(&self, dst: &mut BytesMut) -> Result<()> {
        check_width(
            "transfer frame version number",
            self.transfer_frame_version_number.into(),
            TFVN_BITS,
        )?;
        check_width("bypass flag", self.bypass_flag.into(), 1)?;
        check_width("command control flag", self.command_control_flag.into(), 1)?;
        check_width("spare bits", self.spare_bits.into(), SPARE_BITS)?;
        check_width("spacecraft id", self.spacecraft_id.into(), SCID_BITS)?;
        check_width("virtual channel id", self.virtual_channel_id.into(), VCID_BITS)?;
        check_width("frame length", self.frame_length.into(), FRAME_LENGTH_BITS)?;

        let word = (u16::from(self.transfer_frame_version_number) << 14)
            | (u16::from(self.bypass_flag) << 13)
            | (u16::from(self.command_control_flag) << 12)
            | (u16::from(self.spare_bits) << 10)
            | self.spacecraft_id;
        let vcid_length = (u16::from(self.virtual_channel_id) << 10) | self.frame_length;

        dst.reserve(PRIMARY_HEADER_SIZE);
        dst.put_u16(word);
        dst.put_u16(vcid_length);
        dst.put_u8(self.frame_sequence_number);
        Ok(())
    }

    /// Total frame length in octets as declared by the header.
    pub fn total_length(&self) -> usize {
        usize::from(self.frame_length) + 1
    }

    /// Set the frame length field from a total octet count.
    pub fn set_total_length(&mut self, total: usize) -> Result<()> {
        let value = total.saturating_sub(1);
        let max = (1usize << FRAME_LENGTH_BITS) - 1;
        if total == 0 || value > max {
            return Err(FrameError::FieldOutOfRange {
                field: "frame length",
                value: u32::try_from(value).unwrap_or(u32::MAX),
                bits: FRAME_LENGTH_BITS,
            });
        }
        self.frame_length = value as u16;
        Ok(())
    }
}

fn check_width(field: &'static str, value: u32, bits: u8) -> Result<()> {
    if value >> bits != 0 {
        return Err(FrameError::FieldOutOfRange { field, value, bits });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    const SAMPLE_HEADER: [u8; 5] = [0x20, 0x2c, 0x04, 0x08, 0x00];

    #[test]
    fn decodes_reference_header() {
        let header = TcFramePrimaryHeader::decode(&SAMPLE_HEADER).unwrap();

        assert_eq!(header.transfer_frame_version_number, 0);
        assert_eq!(header.bypass_flag, 1);
        assert_eq!(header.command_control_flag, 0);
        assert_eq!(header.spare_bits, 0);
        assert_eq!(header.spacecraft_id, 44);
        assert_eq!(header.virtual_channel_id, 1);
        assert_eq!(header.frame_length, 8);
        assert_eq!(header.frame_sequence_number, 0);
        assert_eq!(header.total_length(), 9);
    }

    #[test]
    fn encodes_reference_header() {
        let header = TcFramePrimaryHeader::decode(&SAMPLE_HEADER).unwrap();
        let mut buf = BytesMut::new();
        header.encode(&mut buf).unwrap();
        assert_eq!(buf.as_ref(), &SAMPLE_HEADER);
    }

    #[test]
    fn decode_rejects_short_buffer() {
        let result = TcFramePrimaryHeader::decode(&SAMPLE_HEADER[..4]);
        assert!(matches!(
            result,
            Err(FrameError::Truncated { len: 4, needed: 5 })
        ));
    }

    #[test]
    fn encode_rejects_wide_spacecraft_id() {
        let header = TcFramePrimaryHeader {
            spacecraft_id: 1024,
            ..TcFramePrimaryHeader::default()
        };
        let mut buf = BytesMut::new();
        let result = header.encode(&mut buf);
        assert!(matches!(
            result,
            Err(FrameError::FieldOutOfRange {
                field: "spacecraft id",
                ..
            })
        ));
        assert!(buf.is_empty());
    }

    #[test]
    fn set_total_length_bounds() {
        let mut header = TcFramePrimaryHeader::default();
        header.set_total_length(1024).unwrap();
        assert_eq!(header.frame_length, 1023);
        assert!(header.set_total_length(1025).is_err());
        assert!(header.set_total_length(0).is_err());
    }

    proptest! {
        #[test]
        fn header_fields_survive_wire_format(
            tfvn in 0u8..4,
            bypass in 0u8..2,
            cc in 0u8..2,
            spare in 0u8..4,
            scid in 0u16..1024,
            vcid in 0u8..64,
            fl in 0u16..1024,
            fsn in any::<u8>(),
        ) {
            let header = TcFramePrimaryHeader {
                transfer_frame_version_number: tfvn,
                bypass_flag: bypass,
                command_control_flag: cc,
                spare_bits: spare,
                spacecraft_id: scid,
                virtual_channel_id: vcid,
                frame_length: fl,
                frame_sequence_number: fsn,
            };
            let mut buf = BytesMut::new();
            header.encode(&mut buf).unwrap();
            prop_assert_eq!(buf.len(), PRIMARY_HEADER_SIZE);
            prop_assert_eq!(TcFramePrimaryHeader::decode(&buf).unwrap(), header);
        }
    }
}
