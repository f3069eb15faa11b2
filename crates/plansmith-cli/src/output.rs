//! Rendering and writing command output.

use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;
use serde_json::Value;

/// Output format for plan documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Toml,
}

/// Serialize `value` in the requested format.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(value).context("failed to serialize output as JSON")
        }
        OutputFormat::Toml => {
            // TOML has no null; free-form provider JSON may contain them.
            let mut value = serde_json::to_value(value).context("failed to serialize output")?;
            strip_nulls(&mut value);
            toml::to_string_pretty(&value).context("failed to serialize output as TOML")
        }
    }
}

/// Remove null object members and null array elements, recursively.
fn strip_nulls(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|_, v| !v.is_null());
            map.values_mut().for_each(strip_nulls);
        }
        Value::Array(items) => {
            items.retain(|v| !v.is_null());
            items.iter_mut().for_each(strip_nulls);
        }
        _ => {}
    }
}

/// Write `contents` to `path`, or to stdout when no path is given.
pub fn emit(contents: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, contents)
            .with_context(|| format!("failed to write output file: {}", path.display())),
        None => {
            println!("{contents}");
            Ok(())
        }
    }
}

/// Read and deserialize a JSON file.
pub fn read_json<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {what} file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse {what} file: {}", path.display()))
}
