//! Output formatting for configuration values.

use anyhow::Result;
use clap::ValueEnum;
use serde_json::Value;

/// Output format for printed values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

/// Render a value for display.
///
/// Strings print bare so they can be used directly in shell pipelines; every
/// other value is rendered in the requested format.
pub fn render(value: &Value, format: OutputFormat) -> Result<String> {
    if let Value::String(s) = value {
        return Ok(s.clone());
    }
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)?,
        OutputFormat::Yaml => serde_yaml::to_string(value)?.trim_end().to_string(),
    };
    Ok(rendered)
}

/// Interpret command-line text as a value: valid JSON is taken as JSON,
/// anything else becomes a string.
pub fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
