use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use serde_json::Value;
use tcsec_config::EngineConfiguration;
use tcsec_frame::TcFrame;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// Result of one `frame` run.
#[derive(Debug, Default, Serialize)]
pub struct FrameReport {
    pub input: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed: Option<ProcessedFrame>,
}

#[derive(Debug, Serialize)]
pub struct ProcessedFrame {
    pub scid: u16,
    pub vcid: u8,
    pub frame_length: usize,
    pub spi: u16,
    pub iv: String,
    pub sn: String,
    pub pad: String,
    pub pdu: String,
    pub mac: String,
    pub fecf: String,
}

impl From<&TcFrame> for ProcessedFrame {
    fn from(frame: &TcFrame) -> Self {
        Self {
            scid: frame.primary_header.spacecraft_id,
            vcid: frame.primary_header.virtual_channel_id,
            frame_length: frame.primary_header.total_length(),
            spi: frame.spi(),
            iv: hex::encode(&frame.security_header.initialization_vector),
            sn: hex::encode(&frame.security_header.sequence_number),
            pad: hex::encode(&frame.security_header.pad),
            pdu: hex::encode(&frame.pdu),
            mac: hex::encode(&frame.security_trailer.message_authentication_code),
            fecf: format!("0x{:04x}", frame.security_trailer.frame_error_control_field),
        }
    }
}

impl FrameReport {
    fn rows(&self) -> Vec<(String, String)> {
        let mut rows = vec![("input".to_string(), self.input.clone())];
        if let Some(applied) = &self.applied {
            rows.push(("applied".to_string(), applied.clone()));
        }
        if let Some(processed) = &self.processed {
            rows.push(("scid".to_string(), processed.scid.to_string()));
            rows.push(("vcid".to_string(), processed.vcid.to_string()));
            rows.push(("frame_length".to_string(), processed.frame_length.to_string()));
            rows.push(("spi".to_string(), processed.spi.to_string()));
            // Empty header fields are omitted like the engine omits them.
            for (name, value) in [
                ("iv", &processed.iv),
                ("sn", &processed.sn),
                ("pad", &processed.pad),
            ] {
                if !value.is_empty() {
                    rows.push((name.to_string(), value.clone()));
                }
            }
            rows.push(("pdu".to_string(), processed.pdu.clone()));
            rows.push(("mac".to_string(), processed.mac.clone()));
            rows.push(("fecf".to_string(), processed.fecf.clone()));
        }
        rows
    }
}

pub fn print_frame_report(report: &FrameReport, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(report),
        OutputFormat::Table => print_table(&["FIELD", "VALUE"], report.rows()),
        OutputFormat::Pretty => {
            for (name, value) in report.rows() {
                println!("{name}: {value}");
            }
        }
    }
}

pub fn print_configuration(configuration: &EngineConfiguration, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(configuration),
        OutputFormat::Table | OutputFormat::Pretty => {
            let value = serde_json::to_value(configuration).unwrap_or(Value::Null);
            let mut rows = Vec::new();
            flatten("", &value, &mut rows);
            if matches!(format, OutputFormat::Table) {
                print_table(&["PROPERTY", "VALUE"], rows);
            } else {
                for (name, value) in rows {
                    println!("{name} = {value}");
                }
            }
        }
    }
}

fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

fn print_table(header: &[&str], rows: Vec<(String, String)>) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.to_vec());
    for (name, value) in rows {
        table.add_row(vec![name, value]);
    }
    println!("{table}");
}

/// Flatten nested JSON into dotted `(path, value)` rows.
fn flatten(prefix: &str, value: &Value, rows: &mut Vec<(String, String)>) {
    let join = |key: &str| {
        if prefix.is_empty() {
            key.to_string()
        } else {
            format!("{prefix}.{key}")
        }
    };
    match value {
        Value::Object(map) => {
            for (key, nested) in map {
                flatten(&join(key), nested, rows);
            }
        }
        Value::Array(items) => {
            for (index, nested) in items.iter().enumerate() {
                flatten(&join(&index.to_string()), nested, rows);
            }
        }
        Value::Null => rows.push((prefix.to_string(), "-".to_string())),
        Value::String(text) => rows.push((prefix.to_string(), text.clone())),
        other => rows.push((prefix.to_string(), other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn flatten_produces_dotted_paths() {
        let value = json!({
            "core": { "create_ecf": true, "vcid_bitmask": 63 },
            "managed_parameters": [{ "scid": 44 }],
            "access_manager": { "username": null },
        });
        let mut rows = Vec::new();
        flatten("", &value, &mut rows);

        assert!(rows.contains(&("core.create_ecf".to_string(), "true".to_string())));
        assert!(rows.contains(&("core.vcid_bitmask".to_string(), "63".to_string())));
        assert!(rows.contains(&("managed_parameters.0.scid".to_string(), "44".to_string())));
        assert!(rows.contains(&("access_manager.username".to_string(), "-".to_string())));
    }

    #[test]
    fn report_rows_skip_empty_header_fields() {
        let report = FrameReport {
            input: "202c0408000001bd37".to_string(),
            applied: Some("202c040a0000010001b584".to_string()),
            processed: Some(ProcessedFrame {
                scid: 44,
                vcid: 1,
                frame_length: 11,
                spi: 1,
                iv: String::new(),
                sn: String::new(),
                pad: String::new(),
                pdu: "0001".to_string(),
                mac: String::new(),
                fecf: "0xb584".to_string(),
            }),
        };
        let names: Vec<_> = report.rows().into_iter().map(|(name, _)| name).collect();
        assert_eq!(
            names,
            vec!["input", "applied", "scid", "vcid", "frame_length", "spi", "pdu", "mac", "fecf"]
        );
    }
}
