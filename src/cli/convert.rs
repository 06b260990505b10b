//! JSON <-> MoLang value conversion utilities

use super::CliError;
use crate::{Context, Value, output};

/// Convert serde_json::Value to a MoLang Value
pub fn json_to_molang(v: &serde_json::Value) -> Value {
    Value::from_json(v)
}

/// Convert a MoLang Value to serde_json::Value
pub fn molang_to_json(v: &Value) -> serde_json::Value {
    output::value_to_json(v)
}

/// Parse the `--context` argument. It must be a JSON object.
pub fn parse_context(text: &str) -> Result<Context, CliError> {
    let json: serde_json::Value = serde_json::from_str(text)?;
    if !json.is_object() {
        return Err(CliError::InvalidContext(json.to_string()));
    }
    Ok(Context::from_json(&json))
}
