//! Raw declarations for the `kmc_sdls` C library.

use std::os::raw::{c_char, c_int};

use crate::limits::{IV_CAPACITY, MAC_CAPACITY, PAD_CAPACITY, PDU_CAPACITY, SN_CAPACITY};

/// Packed size of the primary header in the engine record.
pub(crate) const TC_HEADER_RAW_SIZE: usize = 5;

/// Primary header as the engine lays it out with C bit-fields.
///
/// Bit-field order is compiler-defined, so the header is decoded from the
/// frame bytes instead and this is kept only for size.
#[repr(C, packed)]
#[derive(Clone, Copy)]
pub(crate) struct TcPrimaryHeaderRaw {
    _bits: [u8; TC_HEADER_RAW_SIZE],
}

// `TC_t` is compiled packed; every struct below has alignment 1.
#[repr(C, packed)]
#[derive(Clone, Copy)]
pub(crate) struct TcSecurityHeaderRaw {
    pub sh: u8,
    pub spi: u16,
    pub iv: [u8; IV_CAPACITY],
    pub iv_field_len: u8,
    pub sn: [u8; SN_CAPACITY],
    pub sn_field_len: u8,
    pub pad: [u8; PAD_CAPACITY],
    pub pad_field_len: u8,
}

#[repr(C, packed)]
#[derive(Clone, Copy)]
pub(crate) struct TcSecurityTrailerRaw {
    pub mac: [u8; MAC_CAPACITY],
    pub mac_field_len: u8,
    pub fecf: u16,
}

#[repr(C, packed)]
#[derive(Clone, Copy)]
pub(crate) struct TcRaw {
    pub tc_header: TcPrimaryHeaderRaw,
    pub tc_sec_header: TcSecurityHeaderRaw,
    pub tc_pdu: [u8; PDU_CAPACITY],
    pub tc_pdu_len: u16,
    pub tc_sec_trailer: TcSecurityTrailerRaw,
}

impl TcRaw {
    pub(crate) fn zeroed() -> Box<Self> {
        Box::new(Self {
            tc_header: TcPrimaryHeaderRaw {
                _bits: [0; TC_HEADER_RAW_SIZE],
            },
            tc_sec_header: TcSecurityHeaderRaw {
                sh: 0,
                spi: 0,
                iv: [0; IV_CAPACITY],
                iv_field_len: 0,
                sn: [0; SN_CAPACITY],
                sn_field_len: 0,
                pad: [0; PAD_CAPACITY],
                pad_field_len: 0,
            },
            tc_pdu: [0; PDU_CAPACITY],
            tc_pdu_len: 0,
            tc_sec_trailer: TcSecurityTrailerRaw {
                mac: [0; MAC_CAPACITY],
                mac_field_len: 0,
                fecf: 0,
            },
        })
    }
}

#[link(name = "kmc_sdls")]
extern "C" {
    pub(crate) fn sdls_config_cryptolib(
        sadb_type: u8,
        cryptography_type: u8,
        crypto_create_fecf: u8,
        process_sdls_pdus: u8,
        has_pus_hdr: u8,
        ignore_sa_state: u8,
        ignore_anti_replay: u8,
        unique_sa_per_mapid: u8,
        crypto_check_fecf: u8,
        vcid_bitmask: u8,
        crypto_increment_nontransmitted_iv: u8,
    ) -> i32;

    pub(crate) fn sdls_config_mariadb(
        mysql_hostname: *mut c_char,
        mysql_database: *mut c_char,
        mysql_port: u16,
        mysql_require_secure_transport: u8,
        mysql_tls_verify_server: u8,
        mysql_tls_ca: *mut c_char,
        mysql_tls_capath: *mut c_char,
        mysql_mtls_cert: *mut c_char,
        mysql_mtls_key: *mut c_char,
        mysql_mtls_client_key_password: *mut c_char,
        mysql_username: *mut c_char,
        mysql_password: *mut c_char,
    ) -> i32;

    pub(crate) fn sdls_config_add_gvcid_managed_parameter(
        tfvn: u8,
        scid: u16,
        vcid: u8,
        has_fecf: u8,
        has_segmentation_hdr: u8,
        max_tc_frame_size: u16,
    ) -> i32;

    pub(crate) fn sdls_config_kmc_crypto_service(
        protocol: *mut c_char,
        kmc_crypto_hostname: *mut c_char,
        kmc_crypto_port: u16,
        kmc_crypto_app: *mut c_char,
        kmc_tls_ca_bundle: *mut c_char,
        kmc_tls_ca_path: *mut c_char,
        kmc_ignore_ssl_hostname_validation: u8,
        mtls_client_cert_path: *mut c_char,
        mtls_client_cert_type: *mut c_char,
        mtls_client_key_path: *mut c_char,
        mtls_client_key_pass: *mut c_char,
        mtls_issuer_cert: *mut c_char,
    ) -> i32;

    pub(crate) fn sdls_config_cam(
        cam_enabled: u8,
        cookie_file_path: *mut c_char,
        keytab_file_path: *mut c_char,
        login_method: u8,
        access_manager_uri: *mut c_char,
        username: *mut c_char,
        cam_home: *mut c_char,
    ) -> i32;

    pub(crate) fn sdls_init() -> i32;

    pub(crate) fn sdls_shutdown() -> i32;

    pub(crate) fn apply_security_tc(
        p_in_frame: *const u8,
        in_frame_length: u16,
        pp_enc_frame: *mut *mut u8,
        p_enc_frame_len: *mut u16,
    ) -> i32;

    pub(crate) fn process_security_tc(
        sdls_transfer_frame: *mut c_char,
        length: *mut c_int,
        tc_sdls_processed_frame: *mut TcRaw,
    ) -> i32;

    pub(crate) fn sdls_get_error_code_enum_string(crypto_error_code: i32) -> *mut c_char;
}

#[cfg(test)]
mod tests {
    use std::mem::{align_of, offset_of, size_of};

    use super::*;

    #[test]
    fn record_layout_matches_packed_engine_struct() {
        assert_eq!(size_of::<TcPrimaryHeaderRaw>(), 5);
        assert_eq!(size_of::<TcSecurityHeaderRaw>(), 54);
        assert_eq!(offset_of!(TcSecurityHeaderRaw, spi), 1);
        assert_eq!(offset_of!(TcSecurityHeaderRaw, iv_field_len), 19);
        assert_eq!(offset_of!(TcSecurityHeaderRaw, pad_field_len), 53);
        assert_eq!(size_of::<TcSecurityTrailerRaw>(), 67);
        assert_eq!(offset_of!(TcSecurityTrailerRaw, fecf), 65);

        assert_eq!(offset_of!(TcRaw, tc_sec_header), 5);
        assert_eq!(offset_of!(TcRaw, tc_pdu), 59);
        assert_eq!(offset_of!(TcRaw, tc_pdu_len), 1078);
        assert_eq!(offset_of!(TcRaw, tc_sec_trailer), 1080);
        assert_eq!(size_of::<TcRaw>(), 1147);
        assert_eq!(align_of::<TcRaw>(), 1);
    }
}
