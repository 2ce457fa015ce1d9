use tcsec_config::ConfigParser;

use crate::cmd::{load_properties, ConfigArgs};
use crate::exit::{config_error, CliResult, SUCCESS};
use crate::output::{print_configuration, OutputFormat};

pub fn run(args: ConfigArgs, format: OutputFormat) -> CliResult<i32> {
    let properties = load_properties(&args.properties)?;
    let configuration = ConfigParser::new()
        .parse_entries(&properties)
        .map_err(|err| config_error("invalid configuration", err))?;
    tracing::debug!(
        entries = properties.len(),
        managed_parameters = configuration.managed_parameters().len(),
        "parsed configuration"
    );
    print_configuration(&configuration, format);
    Ok(SUCCESS)
}
