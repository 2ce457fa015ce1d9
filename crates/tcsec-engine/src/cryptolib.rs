use std::cell::Cell;
use std::ffi::{CStr, CString};
use std::marker::PhantomData;
use std::os::raw::{c_char, c_int};
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use tcsec_config::{
    AccessManagerConfig, CoreConfig, ManagedParameter, ManagedParameterKey, RelationalDbConfig,
    RemoteCryptoServiceConfig,
};
use tcsec_frame::{FrameRecord, RecordField, TcFramePrimaryHeader, PRIMARY_HEADER_SIZE};

use crate::error::{EngineError, Result};
use crate::limits::MAX_FRAME_ARGUMENT;
use crate::status::EngineStatus;
use crate::sys;
use crate::traits::SdlsEngine;

/// Adapter over the CryptoLib `kmc_sdls` C API.
///
/// Every string handed to a configuration call is copied into a `CString`
/// owned by the adapter and kept until the adapter is dropped, because the
/// engine keeps the raw pointers after the call returns.
///
/// CryptoLib holds process-wide state and is not safe to call from several
/// threads at once, so the adapter is `Send` but not `Sync`.
pub struct CryptoLibEngine {
    retained: Vec<CString>,
    _not_sync: PhantomData<Cell<()>>,
}

impl Default for CryptoLibEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl CryptoLibEngine {
    pub fn new() -> Self {
        Self {
            retained: Vec::new(),
            _not_sync: PhantomData,
        }
    }

    fn retain(&mut self, field: &'static str, bytes: &[u8]) -> Result<*mut c_char> {
        let owned = CString::new(bytes).map_err(|_| EngineError::InteriorNul { field })?;
        let ptr = owned.as_ptr().cast_mut();
        self.retained.push(owned);
        Ok(ptr)
    }

    fn c_str(&mut self, field: &'static str, value: &str) -> Result<*mut c_char> {
        if value.is_empty() {
            return Ok(std::ptr::null_mut());
        }
        self.retain(field, value.as_bytes())
    }

    fn c_opt_str(&mut self, field: &'static str, value: Option<&str>) -> Result<*mut c_char> {
        match value {
            Some(value) => self.c_str(field, value),
            None => Ok(std::ptr::null_mut()),
        }
    }

    fn c_path(&mut self, field: &'static str, value: Option<&Path>) -> Result<*mut c_char> {
        match value {
            Some(path) if !path.as_os_str().is_empty() => {
                self.retain(field, path.as_os_str().as_bytes())
            }
            _ => Ok(std::ptr::null_mut()),
        }
    }
}

fn frame_length_argument(frame: &[u8]) -> Result<u16> {
    u16::try_from(frame.len()).map_err(|_| EngineError::FrameTooLong {
        len: frame.len(),
        max: MAX_FRAME_ARGUMENT,
    })
}

impl SdlsEngine for CryptoLibEngine {
    const PROCESS_GLOBAL: bool = true;

    fn configure_core(&mut self, core: &CoreConfig) -> Result<EngineStatus> {
        // SAFETY: all arguments are plain integers.
        let status = unsafe {
            sys::sdls_config_cryptolib(
                core.sadb_backend.tag(),
                core.crypto_backend.tag(),
                core.create_ecf.into(),
                core.process_pdus.into(),
                core.has_pus_header.into(),
                core.ignore_sa_state.into(),
                core.ignore_antireplay.into(),
                core.unique_sa_per_mapid.into(),
                core.check_fecf.into(),
                core.vcid_bitmask,
                core.increment_nontransmitted_counter_on_rollover.into(),
            )
        };
        Ok(EngineStatus(status))
    }

    fn configure_database(&mut self, database: &RelationalDbConfig) -> Result<EngineStatus> {
        let host = self.c_str("database host", &database.host)?;
        let name = self.c_str("database name", &database.database_name)?;
        let ca_cert = self.c_path("database CA certificate", database.ca_cert.as_deref())?;
        let ca_path = self.c_path("database CA path", database.ca_path.as_deref())?;
        let client_cert = self.c_path("database client certificate", database.client_cert.as_deref())?;
        let client_key = self.c_path("database client key", database.client_key.as_deref())?;
        let key_password = self.c_opt_str(
            "database client key password",
            database.client_key_password.as_deref(),
        )?;
        let username = self.c_str("database username", &database.username)?;
        let password = self.c_opt_str("database password", database.password.as_deref())?;

        // SAFETY: every pointer is null or points into a CString owned by
        // `self.retained`, which outlives the engine's use of it.
        let status = unsafe {
            sys::sdls_config_mariadb(
                host,
                name,
                database.port,
                database.require_secure_transport.into(),
                database.verify_server.into(),
                ca_cert,
                ca_path,
                client_cert,
                client_key,
                key_password,
                username,
                password,
            )
        };
        Ok(EngineStatus(status))
    }

    fn configure_remote_crypto_service(
        &mut self,
        service: &RemoteCryptoServiceConfig,
    ) -> Result<EngineStatus> {
        let protocol = self.c_str("crypto service protocol", &service.protocol)?;
        let hostname = self.c_str("crypto service host", &service.hostname)?;
        let app = self.c_str("crypto service app", &service.app_uri)?;
        let ca_bundle = self.c_path("crypto service CA bundle", Some(&service.ca_bundle))?;
        let ca_path = self.c_path("crypto service CA path", service.ca_path.as_deref())?;
        let client_cert =
            self.c_path("crypto service client certificate", service.client_cert.as_deref())?;
        let cert_format = self.c_str("crypto service certificate format", &service.client_cert_format)?;
        let client_key = self.c_path("crypto service client key", service.client_key.as_deref())?;
        let key_password = self.c_opt_str(
            "crypto service client key password",
            service.client_key_password.as_deref(),
        )?;
        let issuer_cert =
            self.c_path("crypto service issuer certificate", service.issuer_cert.as_deref())?;

        // SAFETY: every pointer is null or points into a CString owned by
        // `self.retained`, which outlives the engine's use of it.
        let status = unsafe {
            sys::sdls_config_kmc_crypto_service(
                protocol,
                hostname,
                service.port,
                app,
                ca_bundle,
                ca_path,
                service.ignore_hostname_validation.into(),
                client_cert,
                cert_format,
                client_key,
                key_password,
                issuer_cert,
            )
        };
        Ok(EngineStatus(status))
    }

    fn configure_access_manager(&mut self, access_manager: &AccessManagerConfig) -> Result<EngineStatus> {
        let cookie_file = self.c_path("access manager cookie file", Some(&access_manager.cookie_file))?;
        let keytab_file =
            self.c_path("access manager keytab file", access_manager.keytab_file.as_deref())?;
        let uri = self.c_opt_str("access manager URI", access_manager.access_manager_uri.as_deref())?;
        let username = self.c_opt_str("access manager username", access_manager.username.as_deref())?;
        let home = self.c_path("access manager home", Some(&access_manager.home))?;

        // SAFETY: every pointer is null or points into a CString owned by
        // `self.retained`, which outlives the engine's use of it.
        let status = unsafe {
            sys::sdls_config_cam(
                access_manager.enabled.into(),
                cookie_file,
                keytab_file,
                access_manager.login_method.tag(),
                uri,
                username,
                home,
            )
        };
        Ok(EngineStatus(status))
    }

    fn add_managed_parameter(
        &mut self,
        key: ManagedParameterKey,
        parameter: &ManagedParameter,
    ) -> Result<EngineStatus> {
        // SAFETY: all arguments are plain integers.
        let status = unsafe {
            sys::sdls_config_add_gvcid_managed_parameter(
                key.tfvn,
                key.scid,
                key.vcid,
                parameter.has_ecf.into(),
                parameter.has_segmentation_header.into(),
                parameter.max_frame_length,
            )
        };
        Ok(EngineStatus(status))
    }

    fn init(&mut self) -> EngineStatus {
        // SAFETY: takes no arguments; engine state was set up by the
        // configuration calls.
        EngineStatus(unsafe { sys::sdls_init() })
    }

    fn apply_security(&self, frame: &mut [u8]) -> Result<Vec<u8>> {
        let in_len = frame_length_argument(frame)?;
        let mut out_ptr: *mut u8 = std::ptr::null_mut();
        let mut out_len: u16 = 0;

        // SAFETY: `frame` is valid for `in_len` bytes for the whole call, and
        // `out_ptr`/`out_len` are valid writable locations.
        let status = unsafe { sys::apply_security_tc(frame.as_ptr(), in_len, &mut out_ptr, &mut out_len) };

        let output = if status == 0 && !out_ptr.is_null() {
            // SAFETY: on success the engine returns a heap buffer of `out_len` bytes.
            Some(unsafe { std::slice::from_raw_parts(out_ptr, usize::from(out_len)) }.to_vec())
        } else {
            None
        };
        if !out_ptr.is_null() {
            // SAFETY: the engine allocates the output buffer with malloc and
            // hands ownership to the caller.
            unsafe { libc::free(out_ptr.cast::<libc::c_void>()) };
        }

        match output {
            Some(bytes) => Ok(bytes),
            None if status == 0 => Ok(Vec::new()),
            None => Err(EngineError::Status(EngineStatus(status))),
        }
    }

    fn process_security(&self, frame: &mut [u8]) -> Result<FrameRecord> {
        frame_length_argument(frame)?;
        let mut length = c_int::try_from(frame.len()).map_err(|_| EngineError::FrameTooLong {
            len: frame.len(),
            max: MAX_FRAME_ARGUMENT,
        })?;
        // The engine may rewrite the frame in place; keep the header as sent.
        let header_bytes = frame[..frame.len().min(PRIMARY_HEADER_SIZE)].to_vec();
        let mut raw = sys::TcRaw::zeroed();

        // SAFETY: `frame` is valid and writable for `length` bytes for the
        // whole call, and `raw` is a valid, zeroed record the engine fills in.
        let status = unsafe {
            sys::process_security_tc(frame.as_mut_ptr().cast::<c_char>(), &mut length, &mut *raw)
        };
        if status != 0 {
            return Err(EngineError::Status(EngineStatus(status)));
        }

        record_from_raw(&header_bytes, &raw)
    }

    fn shutdown(&mut self) -> EngineStatus {
        // SAFETY: takes no arguments.
        EngineStatus(unsafe { sys::sdls_shutdown() })
    }

    fn error_code_to_string(&self, status: EngineStatus) -> String {
        // SAFETY: the engine returns null or a pointer to a static,
        // NUL-terminated string.
        let ptr = unsafe { sys::sdls_get_error_code_enum_string(status.code()) };
        if ptr.is_null() {
            return format!("UNKNOWN_STATUS_{}", status.code());
        }
        // SAFETY: checked non-null above; the string is static.
        unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
    }
}

/// Copy an engine-filled record into a [`FrameRecord`].
///
/// Scalars are read by value; the record is packed and they may be unaligned.
fn record_from_raw(header_bytes: &[u8], raw: &sys::TcRaw) -> Result<FrameRecord> {
    let primary_header = TcFramePrimaryHeader::decode(header_bytes)?;
    let sec = raw.tc_sec_header;
    let trailer = raw.tc_sec_trailer;
    let pdu_len = raw.tc_pdu_len;
    Ok(FrameRecord {
        primary_header,
        segment_header: sec.sh,
        spi: sec.spi,
        iv: RecordField::new(sec.iv.to_vec(), usize::from(sec.iv_field_len)),
        sn: RecordField::new(sec.sn.to_vec(), usize::from(sec.sn_field_len)),
        pad: RecordField::new(sec.pad.to_vec(), usize::from(sec.pad_field_len)),
        pdu: RecordField::new(raw.tc_pdu.to_vec(), usize::from(pdu_len)),
        mac: RecordField::new(trailer.mac.to_vec(), usize::from(trailer.mac_field_len)),
        fecf: trailer.fecf,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_length_must_fit_u16() {
        assert_eq!(frame_length_argument(&[0u8; 9]).unwrap(), 9);
        let oversized = vec![0u8; MAX_FRAME_ARGUMENT + 1];
        assert!(matches!(
            frame_length_argument(&oversized),
            Err(EngineError::FrameTooLong { .. })
        ));
    }

    #[test]
    fn strings_are_retained_and_empty_is_null() {
        let mut engine = CryptoLibEngine::new();
        assert!(engine.c_str("field", "").unwrap().is_null());
        assert!(engine.c_opt_str("field", None).unwrap().is_null());
        assert!(engine.c_path("field", None).unwrap().is_null());

        let ptr = engine.c_str("field", "localhost").unwrap();
        assert!(!ptr.is_null());
        assert_eq!(engine.retained.len(), 1);
        // SAFETY: pointer into a CString retained by `engine`.
        let text = unsafe { CStr::from_ptr(ptr) };
        assert_eq!(text.to_str().unwrap(), "localhost");
    }

    #[test]
    fn interior_nul_is_rejected() {
        let mut engine = CryptoLibEngine::new();
        assert!(matches!(
            engine.c_str("database host", "local\0host"),
            Err(EngineError::InteriorNul {
                field: "database host"
            })
        ));
    }

    /// Lay out a record byte by byte at the packed engine offsets.
    fn packed_record() -> Box<sys::TcRaw> {
        let mut bytes = vec![0u8; std::mem::size_of::<sys::TcRaw>()];
        bytes[5] = 0x3c; // segment header
        bytes[6..8].copy_from_slice(&9u16.to_ne_bytes());
        bytes[8..20].copy_from_slice(&[0xA1; 12]);
        bytes[24] = 12;
        bytes[25..29].copy_from_slice(&[0, 0, 0, 7]);
        bytes[41] = 4;
        bytes[58] = 0;
        bytes[59..61].copy_from_slice(&[0x00, 0x01]);
        bytes[1078..1080].copy_from_slice(&2u16.to_ne_bytes());
        bytes[1080..1096].copy_from_slice(&[0x5A; 16]);
        bytes[1144] = 16;
        bytes[1145..1147].copy_from_slice(&0xB584u16.to_ne_bytes());

        let mut raw = sys::TcRaw::zeroed();
        // SAFETY: `TcRaw` is plain old data with alignment 1 and `bytes`
        // holds exactly `size_of::<TcRaw>()` bytes.
        unsafe {
            std::ptr::copy_nonoverlapping(
                bytes.as_ptr(),
                (&mut *raw as *mut sys::TcRaw).cast::<u8>(),
                bytes.len(),
            );
        }
        raw
    }

    #[test]
    fn record_fields_come_from_packed_offsets() {
        let raw = packed_record();
        let record = record_from_raw(&[0x20, 0x2c, 0x04, 0x1e, 0x00], &raw).unwrap();

        assert_eq!(record.primary_header.spacecraft_id, 44);
        assert_eq!(record.segment_header, 0x3c);
        assert_eq!(record.spi, 9);
        assert_eq!(record.iv.declared_len(), 12);
        assert_eq!(record.sn.declared_len(), 4);
        assert_eq!(record.pad.declared_len(), 0);
        assert_eq!(record.pdu.declared_len(), 2);
        assert_eq!(record.mac.declared_len(), 16);
        assert_eq!(record.fecf, 0xB584);

        let frame = tcsec_frame::decode_tc_frame(&record).unwrap();
        assert_eq!(frame.security_header.initialization_vector.as_ref(), &[0xA1; 12]);
        assert_eq!(frame.security_header.sequence_number.as_ref(), &[0, 0, 0, 7]);
        assert_eq!(frame.pdu.as_ref(), &[0x00, 0x01]);
        assert_eq!(frame.security_trailer.message_authentication_code.as_ref(), &[0x5A; 16]);
    }

    #[test]
    fn short_header_is_only_decoded_after_the_engine_accepts() {
        // A short frame reaches the engine; decoding the header is the last step.
        let raw = sys::TcRaw::zeroed();
        assert!(matches!(
            record_from_raw(&[0x20, 0x2c], &raw),
            Err(EngineError::Frame(_))
        ));
    }
}
