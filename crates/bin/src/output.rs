//! Output formatting helpers for human-readable and JSON output.

use clap::ValueEnum;

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Print either the human line or the JSON value, depending on `format`.
pub fn emit(format: OutputFormat, human: &str, json: &serde_json::Value) {
    match format {
        OutputFormat::Human => println!("{human}"),
        OutputFormat::Json => println!("{json}"),
    }
}
