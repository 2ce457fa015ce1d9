mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::{Command, EngineKind};
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "tcsec", version, about = "TC frame security CLI")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    /// Log level for security engine events; defaults to --log-level.
    /// `TCSEC_LOG` overrides both.
    #[arg(long, value_name = "LEVEL", global = true)]
    engine_log_level: Option<LogLevel>,

    /// Security engine.
    #[arg(long, value_name = "ENGINE", default_value = "sim", global = true)]
    engine: EngineKind,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level, cli.engine_log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format, cli.engine);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_frame_subcommand() {
        let cli = Cli::try_parse_from([
            "tcsec",
            "frame",
            "--properties",
            "/tmp/tcsec.properties",
            "--scid",
            "44",
            "--vcid",
            "2",
            "--apply-only",
        ])
        .expect("frame args should parse");

        assert_eq!(cli.engine, EngineKind::Sim);
        match cli.command {
            Command::Frame(args) => {
                assert_eq!(args.scid, Some(44));
                assert_eq!(args.vcid, Some(2));
                assert!(args.apply_only);
                assert!(!args.process_only);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_frame_with_channel_override() {
        let err = Cli::try_parse_from([
            "tcsec",
            "frame",
            "-p",
            "/tmp/tcsec.properties",
            "--frame",
            "202c0408000001bd37",
            "--scid",
            "3",
        ])
        .expect_err("conflicting args should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn rejects_out_of_range_channel_ids() {
        let err = Cli::try_parse_from(["tcsec", "frame", "-p", "x", "--scid", "1024"])
            .expect_err("scid above 1023 should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);

        let err = Cli::try_parse_from(["tcsec", "frame", "-p", "x", "--vcid", "64"])
            .expect_err("vcid above 63 should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn parses_global_engine_flag() {
        let cli = Cli::try_parse_from([
            "tcsec",
            "config",
            "--properties",
            "/tmp/tcsec.properties",
            "--engine",
            "cryptolib",
        ])
        .expect("config args should parse");
        assert_eq!(cli.engine, EngineKind::Cryptolib);
        assert!(matches!(cli.command, Command::Config(_)));
    }

    #[test]
    fn engine_log_level_is_optional_and_global() {
        let cli = Cli::try_parse_from(["tcsec", "config", "-p", "x"]).expect("config args should parse");
        assert_eq!(cli.engine_log_level, None);

        let cli = Cli::try_parse_from(["tcsec", "config", "-p", "x", "--engine-log-level", "trace"])
            .expect("engine log level should parse after the subcommand");
        assert_eq!(cli.log_level, LogLevel::Info);
        assert_eq!(cli.engine_log_level, Some(LogLevel::Trace));
    }
}
