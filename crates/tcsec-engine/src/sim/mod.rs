//! In-process SDLS engine without cryptography.
//!
//! Frames are laid out the way an SDLS engine lays them out (security header
//! between the primary header and the PDU, trailer before the FECF), but the
//! integrity tag is CRC-derived and nothing is encrypted. Useful for driving
//! the client end to end where CryptoLib is not installed.

mod association;
pub mod codes;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use bytes::{BufMut, BytesMut};
use tcsec_config::{
    AccessManagerConfig, CoreConfig, CryptoBackend, ManagedParameter, ManagedParameterKey,
    RelationalDbConfig, RemoteCryptoServiceConfig, SadbBackend,
};
use tcsec_frame::{crc16_ccitt, FrameRecord, RecordField, TcFramePrimaryHeader, FECF_SIZE, PRIMARY_HEADER_SIZE};

pub use association::SecurityAssociation;
use codes::{
    SIM_ERR_ALREADY_INITIALIZED, SIM_ERR_ANTIREPLAY, SIM_ERR_CRYPTO_NOT_CONFIGURED,
    SIM_ERR_DUPLICATE_MANAGED_PARAMETER, SIM_ERR_FRAME_LENGTH_MISMATCH, SIM_ERR_FRAME_TOO_LONG,
    SIM_ERR_FRAME_TOO_SHORT, SIM_ERR_INVALID_FECF, SIM_ERR_MAC_VERIFICATION_FAILED,
    SIM_ERR_NOT_CONFIGURED, SIM_ERR_NOT_INITIALIZED, SIM_ERR_NO_MANAGED_PARAMETERS,
    SIM_ERR_NO_MANAGED_PARAMETER_FOR_CHANNEL, SIM_ERR_NO_SECURITY_ASSOCIATION,
    SIM_ERR_SADB_NOT_CONFIGURED, SIM_ERR_SA_NOT_OPERATIONAL, SIM_SUCCESS,
};

use crate::error::{EngineError, Result};
use crate::limits::{IV_CAPACITY, MAC_CAPACITY, PAD_CAPACITY, PDU_CAPACITY, SN_CAPACITY};
use crate::status::EngineStatus;
use crate::traits::SdlsEngine;

const SPI_SIZE: usize = 2;
const SEGMENT_HEADER_SIZE: usize = 1;
/// Largest total length the 10-bit frame length field can express.
const MAX_TC_FRAME: usize = 1024;

/// Simulated SDLS engine.
///
/// Starts with one clear-mode association (SPI 1) serving every channel.
#[derive(Debug)]
pub struct SimEngine {
    core: Option<CoreConfig>,
    database_configured: bool,
    crypto_service_configured: bool,
    access_manager: Option<AccessManagerConfig>,
    managed: Vec<(ManagedParameterKey, ManagedParameter)>,
    associations: Vec<SecurityAssociation>,
    initialized: bool,
    counter: AtomicU64,
    last_sequence: Mutex<HashMap<u16, u64>>,
}

impl Default for SimEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SimEngine {
    pub fn new() -> Self {
        Self {
            core: None,
            database_configured: false,
            crypto_service_configured: false,
            access_manager: None,
            managed: Vec::new(),
            associations: vec![SecurityAssociation::clear(1)],
            initialized: false,
            counter: AtomicU64::new(0),
            last_sequence: Mutex::new(HashMap::new()),
        }
    }

    /// Engine with the given associations in place of the default one.
    /// Apply uses the first association serving the frame's channel.
    pub fn with_associations(associations: impl IntoIterator<Item = SecurityAssociation>) -> Result<Self> {
        let associations: Vec<_> = associations.into_iter().collect();
        for association in &associations {
            association.validate()?;
        }
        Ok(Self {
            associations,
            ..Self::new()
        })
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn access_manager(&self) -> Option<&AccessManagerConfig> {
        self.access_manager.as_ref()
    }

    pub fn managed_parameters(&self) -> &[(ManagedParameterKey, ManagedParameter)] {
        &self.managed
    }

    fn ready_core(&self) -> Result<&CoreConfig> {
        match (&self.core, self.initialized) {
            (Some(core), true) => Ok(core),
            _ => Err(EngineError::Status(SIM_ERR_NOT_INITIALIZED)),
        }
    }

    fn configure_status(&self) -> EngineStatus {
        if self.initialized {
            SIM_ERR_ALREADY_INITIALIZED
        } else {
            SIM_SUCCESS
        }
    }

    fn managed_for(&self, header: &TcFramePrimaryHeader, mask: u8) -> Result<&ManagedParameter> {
        let vcid = header.virtual_channel_id & mask;
        self.managed
            .iter()
            .find(|(key, _)| {
                key.tfvn == header.transfer_frame_version_number
                    && key.scid == header.spacecraft_id
                    && key.vcid & mask == vcid
            })
            .map(|(_, parameter)| parameter)
            .ok_or(EngineError::Status(SIM_ERR_NO_MANAGED_PARAMETER_FOR_CHANNEL))
    }

    fn check_operational(&self, core: &CoreConfig, association: &SecurityAssociation) -> Result<()> {
        if !core.ignore_sa_state && !association.operational {
            return Err(EngineError::Status(SIM_ERR_SA_NOT_OPERATIONAL));
        }
        Ok(())
    }

    fn check_replay(&self, spi: u16, sequence: u64) -> Result<()> {
        let mut seen = self
            .last_sequence
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match seen.get(&spi) {
            Some(&last) if sequence <= last => Err(EngineError::Status(SIM_ERR_ANTIREPLAY)),
            _ => {
                seen.insert(spi, sequence);
                Ok(())
            }
        }
    }
}

/// `value` as big-endian octets right-aligned in `len` bytes.
fn counter_field(value: u64, len: usize) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let mut field = vec![0u8; len];
    let take = len.min(bytes.len());
    field[len - take..].copy_from_slice(&bytes[bytes.len() - take..]);
    field
}

fn counter_value(field: &[u8]) -> u64 {
    let tail = &field[field.len().saturating_sub(8)..];
    tail.iter().fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte))
}

/// CRC-derived integrity tag over `data`. Not a cryptographic MAC.
fn integrity_tag(data: &[u8], len: usize) -> Vec<u8> {
    let crc = crc16_ccitt(data).to_be_bytes();
    (0..len).map(|i| crc[i % 2] ^ (i as u8)).collect()
}

fn padded(field: &[u8], capacity: usize) -> RecordField {
    let mut storage = vec![0u8; capacity];
    storage[..field.len()].copy_from_slice(field);
    RecordField::new(storage, field.len())
}

fn status(code: EngineStatus) -> EngineError {
    EngineError::Status(code)
}

impl SdlsEngine for SimEngine {
    const PROCESS_GLOBAL: bool = false;

    fn configure_core(&mut self, core: &CoreConfig) -> Result<EngineStatus> {
        let result = self.configure_status();
        if result.is_success() {
            self.core = Some(*core);
        }
        Ok(result)
    }

    fn configure_database(&mut self, _database: &RelationalDbConfig) -> Result<EngineStatus> {
        let result = self.configure_status();
        if result.is_success() {
            self.database_configured = true;
        }
        Ok(result)
    }

    fn configure_remote_crypto_service(
        &mut self,
        _service: &RemoteCryptoServiceConfig,
    ) -> Result<EngineStatus> {
        let result = self.configure_status();
        if result.is_success() {
            self.crypto_service_configured = true;
        }
        Ok(result)
    }

    fn configure_access_manager(&mut self, access_manager: &AccessManagerConfig) -> Result<EngineStatus> {
        let result = self.configure_status();
        if result.is_success() {
            self.access_manager = Some(access_manager.clone());
        }
        Ok(result)
    }

    fn add_managed_parameter(
        &mut self,
        key: ManagedParameterKey,
        parameter: &ManagedParameter,
    ) -> Result<EngineStatus> {
        let result = self.configure_status();
        if !result.is_success() {
            return Ok(result);
        }
        if self.managed.iter().any(|(existing, _)| *existing == key) {
            return Ok(SIM_ERR_DUPLICATE_MANAGED_PARAMETER);
        }
        self.managed.push((key, *parameter));
        Ok(SIM_SUCCESS)
    }

    fn init(&mut self) -> EngineStatus {
        if self.initialized {
            return SIM_ERR_ALREADY_INITIALIZED;
        }
        let Some(core) = &self.core else {
            return SIM_ERR_NOT_CONFIGURED;
        };
        if core.sadb_backend == SadbBackend::RelationalDb && !self.database_configured {
            return SIM_ERR_SADB_NOT_CONFIGURED;
        }
        if core.crypto_backend == CryptoBackend::RemoteCryptoService && !self.crypto_service_configured {
            return SIM_ERR_CRYPTO_NOT_CONFIGURED;
        }
        if self.managed.is_empty() {
            return SIM_ERR_NO_MANAGED_PARAMETERS;
        }
        self.initialized = true;
        tracing::debug!(
            managed_parameters = self.managed.len(),
            associations = self.associations.len(),
            "simulated engine initialized"
        );
        SIM_SUCCESS
    }

    fn apply_security(&self, frame: &mut [u8]) -> Result<Vec<u8>> {
        let core = self.ready_core()?;
        let header =
            TcFramePrimaryHeader::decode(frame).map_err(|_| status(SIM_ERR_FRAME_TOO_SHORT))?;
        let total = header.total_length();
        if frame.len() < total {
            return Err(status(SIM_ERR_FRAME_TOO_SHORT));
        }
        let parameter = self.managed_for(&header, core.vcid_bitmask)?;

        let segment_len = if parameter.has_segmentation_header {
            SEGMENT_HEADER_SIZE
        } else {
            0
        };
        let ecf_len = if parameter.has_ecf { FECF_SIZE } else { 0 };
        let body_start = PRIMARY_HEADER_SIZE + segment_len;
        let body_end = total
            .checked_sub(ecf_len)
            .filter(|end| *end >= body_start)
            .ok_or(status(SIM_ERR_FRAME_TOO_SHORT))?;
        let pdu = &frame[body_start..body_end];

        let masked_vcid = header.virtual_channel_id & core.vcid_bitmask;
        let association = self
            .associations
            .iter()
            .find(|sa| sa.serves(header.spacecraft_id, masked_vcid, core.vcid_bitmask))
            .ok_or(status(SIM_ERR_NO_SECURITY_ASSOCIATION))?;
        self.check_operational(core, association)?;

        let out_len = body_start
            + SPI_SIZE
            + association.header_fields_len()
            + pdu.len()
            + association.mac_len
            + ecf_len;
        if out_len > usize::from(parameter.max_frame_length) || out_len > MAX_TC_FRAME {
            return Err(status(SIM_ERR_FRAME_TOO_LONG));
        }

        let count = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        let mut out_header = header;
        out_header
            .set_total_length(out_len)
            .map_err(|_| status(SIM_ERR_FRAME_TOO_LONG))?;

        let mut out = BytesMut::with_capacity(out_len);
        out_header
            .encode(&mut out)
            .map_err(|_| status(SIM_ERR_FRAME_TOO_LONG))?;
        if parameter.has_segmentation_header {
            out.put_u8(frame[PRIMARY_HEADER_SIZE]);
        }
        out.put_u16(association.spi);
        out.put_slice(&counter_field(count, association.iv_len));
        out.put_slice(&counter_field(count, association.sn_len));
        out.put_bytes(0, association.pad_len);
        out.put_slice(pdu);
        let tag = integrity_tag(&out, association.mac_len);
        out.put_slice(&tag);
        if parameter.has_ecf {
            let fecf = if core.create_ecf { crc16_ccitt(&out) } else { 0 };
            out.put_u16(fecf);
        }

        tracing::debug!(
            spi = association.spi,
            in_len = total,
            out_len = out.len(),
            "applied security"
        );
        Ok(out.to_vec())
    }

    fn process_security(&self, frame: &mut [u8]) -> Result<FrameRecord> {
        let core = self.ready_core()?;
        let header =
            TcFramePrimaryHeader::decode(frame).map_err(|_| status(SIM_ERR_FRAME_TOO_SHORT))?;
        if frame.len() != header.total_length() {
            return Err(status(SIM_ERR_FRAME_LENGTH_MISMATCH));
        }
        let parameter = self.managed_for(&header, core.vcid_bitmask)?;

        let mut cursor = PRIMARY_HEADER_SIZE;
        let segment_header = if parameter.has_segmentation_header {
            let value = *frame.get(cursor).ok_or(status(SIM_ERR_FRAME_TOO_SHORT))?;
            cursor += SEGMENT_HEADER_SIZE;
            value
        } else {
            0
        };

        let (end, fecf) = if parameter.has_ecf {
            let end = frame
                .len()
                .checked_sub(FECF_SIZE)
                .filter(|end| *end >= cursor)
                .ok_or(status(SIM_ERR_FRAME_TOO_SHORT))?;
            let received = u16::from_be_bytes([frame[end], frame[end + 1]]);
            if core.check_fecf && crc16_ccitt(&frame[..end]) != received {
                return Err(status(SIM_ERR_INVALID_FECF));
            }
            (end, received)
        } else {
            (frame.len(), 0)
        };

        let spi_bytes = frame
            .get(cursor..cursor + SPI_SIZE)
            .filter(|_| cursor + SPI_SIZE <= end)
            .ok_or(status(SIM_ERR_FRAME_TOO_SHORT))?;
        let spi = u16::from_be_bytes([spi_bytes[0], spi_bytes[1]]);
        cursor += SPI_SIZE;

        let masked_vcid = header.virtual_channel_id & core.vcid_bitmask;
        let association = self
            .associations
            .iter()
            .find(|sa| sa.spi == spi && sa.serves(header.spacecraft_id, masked_vcid, core.vcid_bitmask))
            .ok_or(status(SIM_ERR_NO_SECURITY_ASSOCIATION))?;
        self.check_operational(core, association)?;

        let pdu_start = cursor + association.header_fields_len();
        let pdu_end = end
            .checked_sub(association.mac_len)
            .filter(|pdu_end| *pdu_end >= pdu_start)
            .ok_or(status(SIM_ERR_FRAME_TOO_SHORT))?;
        if pdu_end - pdu_start > PDU_CAPACITY {
            return Err(status(SIM_ERR_FRAME_TOO_LONG));
        }

        let iv = &frame[cursor..cursor + association.iv_len];
        cursor += association.iv_len;
        let sn = &frame[cursor..cursor + association.sn_len];
        cursor += association.sn_len;
        let pad = &frame[cursor..cursor + association.pad_len];
        let pdu = &frame[pdu_start..pdu_end];
        let mac = &frame[pdu_end..end];

        if integrity_tag(&frame[..pdu_end], association.mac_len) != mac {
            return Err(status(SIM_ERR_MAC_VERIFICATION_FAILED));
        }
        if !core.ignore_antireplay && !sn.is_empty() {
            self.check_replay(spi, counter_value(sn))?;
        }

        tracing::debug!(spi, pdu_len = pdu.len(), "processed security");
        Ok(FrameRecord {
            primary_header: header,
            segment_header,
            spi,
            iv: padded(iv, IV_CAPACITY),
            sn: padded(sn, SN_CAPACITY),
            pad: padded(pad, PAD_CAPACITY),
            pdu: padded(pdu, PDU_CAPACITY),
            mac: padded(mac, MAC_CAPACITY),
            fecf,
        })
    }

    fn shutdown(&mut self) -> EngineStatus {
        if !self.initialized {
            return SIM_ERR_NOT_INITIALIZED;
        }
        self.initialized = false;
        self.core = None;
        self.database_configured = false;
        self.crypto_service_configured = false;
        self.access_manager = None;
        self.managed.clear();
        self.last_sequence
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        SIM_SUCCESS
    }

    fn error_code_to_string(&self, status: EngineStatus) -> String {
        codes::name(status)
    }
}
