use tcsec_client::{ClientState, ErrorKind, SecurityClient};
use tcsec_engine::{SecurityAssociation, SimEngine};

const RAW_FRAME: &str = "202c0408000001bd37";
const CLEAR_MODE_FRAME: &str = "202c040a0000010001b584";

fn local_properties() -> Vec<&'static str> {
    vec![
        "cryptolib.sadb.type=inmemory",
        "cryptolib.crypto.type=libgcrypt",
        "cryptolib.process_tc.ignore_antireplay=true",
        "cryptolib.process_tc.ignore_sa_state=true",
        "cryptolib.process_tc.process_pdus=false",
        "cryptolib.tc.vcid_bitmask=0x3F",
        "cryptolib.tc.44.1.0.has_ecf=true",
        "cryptolib.apply_tc.create_ecf=true",
    ]
}

#[test]
fn clear_mode_apply_matches_reference_frame() {
    let mut client = SecurityClient::new(SimEngine::new());
    client.initialize(local_properties()).unwrap();

    let wrapped = client.apply_security_hex(RAW_FRAME).unwrap();
    assert_eq!(wrapped, hex::decode(CLEAR_MODE_FRAME).unwrap());

    let frame = client.process_security(&wrapped).unwrap();
    assert_eq!(frame.pdu.as_ref(), &[0x00, 0x01]);
    assert_eq!(frame.spi(), 1);
    assert_eq!(frame.primary_header.spacecraft_id, 44);
    assert_eq!(frame.primary_header.virtual_channel_id, 1);
    assert_eq!(frame.primary_header.total_length(), 11);
    assert!(frame.security_header.initialization_vector.is_empty());
    assert!(frame.security_trailer.message_authentication_code.is_empty());
    assert_eq!(frame.security_trailer.frame_error_control_field, 0xB584);

    client.shutdown().unwrap();
    assert_eq!(client.state(), ClientState::Shutdown);
}

#[test]
fn authenticated_association_round_trip() {
    let engine = SimEngine::with_associations([SecurityAssociation::authenticated(7, 12, 4, 0, 16)
        .for_channel(44, 1)])
    .unwrap();
    let mut client = SecurityClient::new(engine);
    client.initialize(local_properties()).unwrap();

    let wrapped = client.apply_security_hex(RAW_FRAME).unwrap();
    let frame = client.process_security(&wrapped).unwrap();

    assert_eq!(frame.spi(), 7);
    assert_eq!(frame.security_header.initialization_vector.len(), 12);
    assert_eq!(frame.security_header.sequence_number.len(), 4);
    assert!(frame.security_header.pad.is_empty());
    assert_eq!(frame.security_trailer.message_authentication_code.len(), 16);
    assert_eq!(frame.pdu.as_ref(), &[0x00, 0x01]);
}

#[test]
fn field_lengths_follow_the_association_of_each_frame() {
    let engine = SimEngine::with_associations([
        SecurityAssociation::authenticated(7, 12, 4, 0, 16).for_channel(44, 1),
        SecurityAssociation::authenticated(9, 16, 8, 2, 8).for_channel(44, 2),
    ])
    .unwrap();
    let mut properties = local_properties();
    properties.push("cryptolib.tc.44.2.0.has_ecf=true");
    let mut client = SecurityClient::new(engine);
    client.initialize(properties).unwrap();

    // (raw frame, spi, iv, sn, pad, mac)
    let channels = [
        ("202c0408000001bd37", 7, 12, 4, 0, 16),
        ("202c0808000001bd37", 9, 16, 8, 2, 8),
    ];
    for _ in 0..2 {
        for (raw, spi, iv, sn, pad, mac) in channels {
            let wrapped = client.apply_security_hex(raw).unwrap();
            let frame = client.process_security(&wrapped).unwrap();

            assert_eq!(frame.spi(), spi);
            assert_eq!(frame.security_header.initialization_vector.len(), iv);
            assert_eq!(frame.security_header.sequence_number.len(), sn);
            assert_eq!(frame.security_header.pad.len(), pad);
            assert_eq!(frame.security_trailer.message_authentication_code.len(), mac);
            assert_eq!(frame.pdu.as_ref(), &[0x00, 0x01]);
        }
    }
}

#[test]
fn engine_rejection_names_the_status() {
    let mut client = SecurityClient::new(SimEngine::new());
    client.initialize(local_properties()).unwrap();

    // Channel 44/2 has no managed parameter.
    let err = client.apply_security_hex("202c0808000001bd37").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ApplySecurityFailed);
    assert!(err
        .to_string()
        .contains("SIM_ERR_NO_MANAGED_PARAMETER_FOR_CHANNEL"));
    assert_eq!(client.state(), ClientState::Ready);
}

#[test]
fn missing_managed_parameters_fail_initialization() {
    let mut client = SecurityClient::new(SimEngine::new());
    let err = client
        .initialize(["cryptolib.sadb.type=inmemory", "cryptolib.crypto.type=libgcrypt"])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SdlsInitializationError);
    assert!(err.to_string().starts_with("SDLS Initialization Error. Error code: "));
    assert_eq!(client.state(), ClientState::Failed);
}

#[test]
fn missing_mtls_key_is_reported_before_engine_calls() {
    let tls = tempfile::tempdir().unwrap();
    let cert = tls.path().join("client.pem");
    std::fs::write(&cert, b"cert").unwrap();

    let mut properties: Vec<String> = local_properties().into_iter().map(String::from).collect();
    properties[0] = "cryptolib.sadb.type=mariadb".to_string();
    properties.push(format!("cryptolib.sadb.mariadb.mtls.clientcert={}", cert.display()));

    let mut client = SecurityClient::new(SimEngine::new());
    let err = client.initialize(&properties).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingConfigurationParameter);
    assert!(err.to_string().contains("cryptolib.sadb.mariadb.mtls.clientkey"));
    assert_eq!(client.state(), ClientState::Uninitialized);
    assert!(!client.engine().is_initialized());
}
