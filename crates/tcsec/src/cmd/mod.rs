use std::path::{Path, PathBuf};

use clap::{Args, Subcommand, ValueEnum};

use crate::exit::{io_error, CliResult};
use crate::output::OutputFormat;

pub mod config;
pub mod frame;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Apply and process security on a TC frame.
    Frame(FrameArgs),
    /// Print the effective engine configuration.
    Config(ConfigArgs),
    /// Show version information.
    Version(VersionArgs),
}

/// Engine backing the security client.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum EngineKind {
    /// In-process simulated engine.
    Sim,
    /// CryptoLib via the kmc_sdls C API (requires the `cryptolib` feature).
    Cryptolib,
}

pub fn run(command: Command, format: OutputFormat, engine: EngineKind) -> CliResult<i32> {
    match command {
        Command::Frame(args) => frame::run(args, format, engine),
        Command::Config(args) => config::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct FrameArgs {
    /// Properties file with cryptolib configuration.
    #[arg(long, short = 'p', value_name = "FILE")]
    pub properties: PathBuf,
    /// Hex-encoded TC frame. Defaults to the reference frame.
    #[arg(long, short = 'f', value_name = "HEX", conflicts_with_all = ["scid", "vcid"])]
    pub frame: Option<String>,
    /// Override the default frame's spacecraft ID.
    #[arg(long, short = 's', value_parser = clap::value_parser!(u16).range(0..=1023))]
    pub scid: Option<u16>,
    /// Override the default frame's virtual channel ID.
    #[arg(long, short = 'V', value_parser = clap::value_parser!(u8).range(0..=63))]
    pub vcid: Option<u8>,
    /// Only apply security.
    #[arg(long, short = 'A')]
    pub apply_only: bool,
    /// Only process security; the input frame must already be secured.
    #[arg(long, short = 'P')]
    pub process_only: bool,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Properties file with cryptolib configuration.
    #[arg(long, short = 'p', value_name = "FILE")]
    pub properties: PathBuf,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Read a properties file into `key=value` entries.
///
/// Lines starting with `#` and blank lines are skipped; trailing whitespace
/// is removed.
pub fn load_properties(path: &Path) -> CliResult<Vec<String>> {
    let text = std::fs::read_to_string(path).map_err(|err| io_error(path, err))?;
    Ok(property_lines(&text))
}

fn property_lines(text: &str) -> Vec<String> {
    text.lines()
        .filter(|line| !line.starts_with('#'))
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_lines_skip_comments_and_blanks() {
        let text = "# header\n\ncryptolib.sadb.type=inmemory   \n  \ncryptolib.tc.44.1.0.has_ecf=true\n#cryptolib.crypto.type=wolfssl\n";
        assert_eq!(
            property_lines(text),
            vec![
                "cryptolib.sadb.type=inmemory",
                "cryptolib.tc.44.1.0.has_ecf=true",
            ]
        );
    }
}
