pub mod query;
pub mod records;

pub use query::{run_query, QueryArgs};
pub use records::{run_create, run_delete, run_get, run_save, run_schema, run_update};

use anyhow::{bail, Context, Result};
use esgrid::{Config, Record, ResponseFormat};
use serde_json::Value;

/// Split a `Name: value` header argument
pub fn parse_header(raw: &str) -> Result<(String, String)> {
    let (name, value) = raw
        .split_once(':')
        .with_context(|| format!("Invalid header '{}', expected 'Name: value'", raw))?;
    let name = name.trim();
    if name.is_empty() {
        bail!("Invalid header '{}': empty name", raw);
    }
    Ok((name.to_string(), value.trim().to_string()))
}

/// Merge command-line overrides onto the loaded config
pub fn apply_overrides(
    config: &mut Config,
    url: Option<String>,
    headers: &[String],
    format: Option<ResponseFormat>,
) -> Result<()> {
    if let Some(url) = url {
        config.endpoint.url = Some(url);
    }
    for header in headers {
        let (name, value) = parse_header(header)?;
        config.endpoint.options.headers.insert(name, value);
    }
    if let Some(format) = format {
        config.endpoint.options.response_format = format;
    }
    Ok(())
}

/// Parse a JSON argument that must be an object
pub fn parse_record(raw: &str) -> Result<Record> {
    match serde_json::from_str(raw).with_context(|| format!("Invalid JSON: {}", raw))? {
        Value::Object(record) => Ok(record),
        other => bail!("Expected a JSON object, got {}", other),
    }
}

/// Print a result on stdout; text bodies are printed as-is
pub fn print_value(value: &Value) -> Result<()> {
    match value {
        Value::String(body) => println!("{}", body),
        other => println!("{}", serde_json::to_string_pretty(other)?),
    }
    Ok(())
}
