//! Forgiving field deserializers for provider output.
//!
//! Generated documents routinely carry numbers as strings, or junk where a
//! number belongs. These helpers turn anything unusable into `None` instead
//! of rejecting the whole document.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Read a number or numeric string. Anything else, or a non-finite value,
/// becomes `None`.
pub fn number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(as_number))
}

/// Read a string. Non-string values become `None`; blank strings too.
pub fn string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        _ => None,
    })
}

fn as_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}
