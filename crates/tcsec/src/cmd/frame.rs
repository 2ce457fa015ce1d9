use tcsec_client::SecurityClient;
use tcsec_engine::{SdlsEngine, SimEngine};
use tcsec_frame::{TcFramePrimaryHeader, PRIMARY_HEADER_SIZE};

use crate::cmd::{load_properties, EngineKind, FrameArgs};
use crate::exit::{client_error, CliError, CliResult, DATA_INVALID, INTERNAL, SUCCESS};
use crate::output::{print_frame_report, FrameReport, OutputFormat, ProcessedFrame};

/// Reference frame: SCID 44, VCID 1, bypass, PDU `0001` followed by its FECF.
pub const DEFAULT_FRAME_HEX: &str = "202c0408000001bd37";

/// Which halves of the round trip to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Plan {
    apply: bool,
    process: bool,
}

impl Plan {
    /// Both flags together mean a full round trip.
    fn from_flags(apply_only: bool, process_only: bool) -> Self {
        Self {
            apply: !process_only || apply_only,
            process: !apply_only || process_only,
        }
    }
}

pub fn run(args: FrameArgs, format: OutputFormat, engine: EngineKind) -> CliResult<i32> {
    let properties = load_properties(&args.properties)?;
    let frame = resolve_frame(&args)?;
    let plan = Plan::from_flags(args.apply_only, args.process_only);

    let report = match engine {
        EngineKind::Sim => execute(SecurityClient::new(SimEngine::new()), &properties, frame, plan)?,
        EngineKind::Cryptolib => run_cryptolib(&properties, frame, plan)?,
    };
    print_frame_report(&report, format);
    Ok(SUCCESS)
}

#[cfg(all(unix, feature = "cryptolib"))]
fn run_cryptolib(properties: &[String], frame: Vec<u8>, plan: Plan) -> CliResult<FrameReport> {
    execute(
        SecurityClient::new(tcsec_engine::CryptoLibEngine::new()),
        properties,
        frame,
        plan,
    )
}

#[cfg(not(all(unix, feature = "cryptolib")))]
fn run_cryptolib(_properties: &[String], _frame: Vec<u8>, _plan: Plan) -> CliResult<FrameReport> {
    Err(CliError::new(
        crate::exit::USAGE,
        "this build does not include the cryptolib engine (enable the `cryptolib` feature)",
    ))
}

fn execute<E: SdlsEngine>(
    mut client: SecurityClient<E>,
    properties: &[String],
    frame: Vec<u8>,
    plan: Plan,
) -> CliResult<FrameReport> {
    client
        .initialize(properties)
        .map_err(|err| client_error("initialization failed", err))?;

    let mut report = FrameReport {
        input: hex::encode(&frame),
        ..FrameReport::default()
    };
    let mut current = frame;

    if plan.apply {
        current = client
            .apply_security(&current)
            .map_err(|err| client_error("apply security failed", err))?;
        report.applied = Some(hex::encode(&current));
    }

    if plan.process {
        let processed = client
            .process_security(&current)
            .map_err(|err| client_error("process security failed", err))?;
        report.processed = Some(ProcessedFrame::from(&processed));
    }

    let status = client
        .shutdown()
        .map_err(|err| client_error("shutdown failed", err))?;
    if !status.is_success() {
        tracing::warn!(status = status.code(), "engine shutdown reported failure");
    }
    Ok(report)
}

fn resolve_frame(args: &FrameArgs) -> CliResult<Vec<u8>> {
    if let Some(frame) = &args.frame {
        return hex::decode(frame.trim())
            .map_err(|err| CliError::new(DATA_INVALID, format!("--frame is not valid hex: {err}")));
    }
    let default = hex::decode(DEFAULT_FRAME_HEX)
        .map_err(|err| CliError::new(INTERNAL, format!("reference frame: {err}")))?;
    if args.scid.is_none() && args.vcid.is_none() {
        return Ok(default);
    }
    rebuild_header(&default, args.scid, args.vcid)
}

/// Rewrite the reference frame's channel fields, keeping its body as is.
fn rebuild_header(frame: &[u8], scid: Option<u16>, vcid: Option<u8>) -> CliResult<Vec<u8>> {
    let internal = |err: tcsec_frame::FrameError| CliError::new(INTERNAL, err.to_string());
    let mut header = TcFramePrimaryHeader::decode(frame).map_err(internal)?;
    if let Some(scid) = scid {
        header.spacecraft_id = scid;
    }
    if let Some(vcid) = vcid {
        header.virtual_channel_id = vcid;
    }

    let mut out = bytes::BytesMut::with_capacity(frame.len());
    header.encode(&mut out).map_err(internal)?;
    out.extend_from_slice(&frame[PRIMARY_HEADER_SIZE..]);
    Ok(out.to_vec())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn args() -> FrameArgs {
        FrameArgs {
            properties: PathBuf::from("unused.properties"),
            frame: None,
            scid: None,
            vcid: None,
            apply_only: false,
            process_only: false,
        }
    }

    #[test]
    fn plan_follows_flag_combinations() {
        assert_eq!(Plan::from_flags(false, false), Plan { apply: true, process: true });
        assert_eq!(Plan::from_flags(true, false), Plan { apply: true, process: false });
        assert_eq!(Plan::from_flags(false, true), Plan { apply: false, process: true });
        assert_eq!(Plan::from_flags(true, true), Plan { apply: true, process: true });
    }

    #[test]
    fn default_frame_is_reference_frame() {
        let frame = resolve_frame(&args()).unwrap();
        assert_eq!(hex::encode(frame), DEFAULT_FRAME_HEX);
    }

    #[test]
    fn scid_and_vcid_rewrite_the_header() {
        let frame = resolve_frame(&FrameArgs {
            scid: Some(3),
            vcid: Some(63),
            ..args()
        })
        .unwrap();
        let header = TcFramePrimaryHeader::decode(&frame).unwrap();
        assert_eq!(header.spacecraft_id, 3);
        assert_eq!(header.virtual_channel_id, 63);
        assert_eq!(header.bypass_flag, 1);
        assert_eq!(header.frame_length, 8);
        assert_eq!(&frame[PRIMARY_HEADER_SIZE..], &[0x00, 0x01, 0xbd, 0x37]);
    }

    #[test]
    fn explicit_frame_must_be_hex() {
        let err = resolve_frame(&FrameArgs {
            frame: Some("20zz".to_string()),
            ..args()
        })
        .unwrap_err();
        assert_eq!(err.code, DATA_INVALID);
    }
}
