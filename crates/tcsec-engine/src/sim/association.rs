use crate::error::{EngineError, Result};
use crate::limits::{IV_CAPACITY, MAC_CAPACITY, PAD_CAPACITY, SN_CAPACITY};

/// A security association known to [`super::SimEngine`].
///
/// Field lengths decide how many octets of IV, sequence number, pad and
/// integrity tag are laid out around the PDU. A clear-mode association has
/// all lengths at zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityAssociation {
    pub spi: u16,
    /// `(scid, vcid)` this association serves; `None` serves any channel.
    /// The vcid is compared after masking.
    pub channel: Option<(u16, u8)>,
    pub iv_len: usize,
    pub sn_len: usize,
    pub pad_len: usize,
    pub mac_len: usize,
    pub operational: bool,
}

impl SecurityAssociation {
    /// Clear-mode association for any channel.
    pub fn clear(spi: u16) -> Self {
        Self {
            spi,
            channel: None,
            iv_len: 0,
            sn_len: 0,
            pad_len: 0,
            mac_len: 0,
            operational: true,
        }
    }

    /// Authenticated association with the given field lengths.
    pub fn authenticated(spi: u16, iv_len: usize, sn_len: usize, pad_len: usize, mac_len: usize) -> Self {
        Self {
            iv_len,
            sn_len,
            pad_len,
            mac_len,
            ..Self::clear(spi)
        }
    }

    pub fn for_channel(mut self, scid: u16, vcid: u8) -> Self {
        self.channel = Some((scid, vcid));
        self
    }

    pub fn inactive(mut self) -> Self {
        self.operational = false;
        self
    }

    pub(crate) fn serves(&self, scid: u16, masked_vcid: u8, mask: u8) -> bool {
        match self.channel {
            None => true,
            Some((sa_scid, sa_vcid)) => sa_scid == scid && sa_vcid & mask == masked_vcid,
        }
    }

    /// Octets between the SPI and the PDU.
    pub(crate) fn header_fields_len(&self) -> usize {
        self.iv_len + self.sn_len + self.pad_len
    }

    pub(crate) fn validate(&self) -> Result<()> {
        for (field, len, capacity) in [
            ("initialization vector", self.iv_len, IV_CAPACITY),
            ("sequence number", self.sn_len, SN_CAPACITY),
            ("pad", self.pad_len, PAD_CAPACITY),
            ("message authentication code", self.mac_len, MAC_CAPACITY),
        ] {
            if len > capacity {
                return Err(EngineError::FieldCapacity {
                    spi: self.spi,
                    field,
                    len,
                    capacity,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_is_enforced() {
        assert!(SecurityAssociation::authenticated(2, 12, 4, 0, 16).validate().is_ok());
        let err = SecurityAssociation::authenticated(3, 17, 0, 0, 16)
            .validate()
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::FieldCapacity {
                spi: 3,
                field: "initialization vector",
                ..
            }
        ));
    }

    #[test]
    fn channel_match_uses_mask() {
        let sa = SecurityAssociation::clear(1).for_channel(44, 0x41);
        assert!(sa.serves(44, 0x01, 0x3F));
        assert!(!sa.serves(45, 0x01, 0x3F));
        assert!(SecurityAssociation::clear(1).serves(7, 7, 0x3F));
    }
}
