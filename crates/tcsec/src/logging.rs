use clap::ValueEnum;
use tracing_subscriber::EnvFilter;

/// Overrides the flag-derived directives when set, e.g. `tcsec_engine=trace`.
pub const LOG_ENV: &str = "TCSEC_LOG";

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Filter directives for the CLI crate, the security client and the engine.
/// Other crates stay at `warn`.
pub fn default_directives(level: LogLevel, engine_level: Option<LogLevel>) -> String {
    let level = level.as_str();
    let engine = engine_level.map_or(level, LogLevel::as_str);
    format!("warn,tcsec={level},tcsec_client={level},tcsec_config={level},tcsec_engine={engine}")
}

fn build_filter(level: LogLevel, engine_level: Option<LogLevel>) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level, engine_level)))
}

/// Install the stderr subscriber. Engine and client events share it.
pub fn init_logging(format: LogFormat, level: LogLevel, engine_level: Option<LogLevel>) {
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(build_filter(level, engine_level))
        .with_ansi(false)
        .with_target(true);

    match format {
        LogFormat::Text => {
            let _ = builder.try_init();
        }
        LogFormat::Json => {
            let _ = builder.json().try_init();
        }
    }
}
