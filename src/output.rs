//! JSON output for evaluation results.
//!
//! MoLang values map onto JSON like this:
//!
//! ```text
//! Number       whole numbers print without a fraction, NaN/inf print as null
//! String       string
//! Struct       object for keyed stores, array for lists, null otherwise
//! Environment  null
//! ```
//!
//! Nested structs are expanded up to [`MAX_NESTING`] levels; anything deeper
//! (including a store that contains itself) prints as `null`.
//!
//! # Examples
//!
//! ```
//! use molang::Value;
//! use molang::output::{to_json, to_json_pretty};
//!
//! assert_eq!(to_json(&Value::from(42.0)), "42");
//! assert_eq!(to_json(&Value::from(vec![1.5, 2.0])), "[1.5,2]");
//! assert_eq!(to_json_pretty(&Value::from("hi")), "\"hi\"");
//! ```

use serde_json::{Map, Number};

use crate::{structs, value::Value};

pub const MAX_NESTING: usize = 32;

const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

pub struct JsonPrinter {
    pretty: bool,
}

impl JsonPrinter {
    pub fn new(pretty: bool) -> Self {
        JsonPrinter { pretty }
    }

    pub fn print(&self, value: &Value) -> String {
        let json = value_to_json(value);
        let printed = if self.pretty {
            serde_json::to_string_pretty(&json)
        } else {
            serde_json::to_string(&json)
        };
        printed.unwrap_or_else(|_| "null".to_string())
    }
}

/// Converts a value into a `serde_json::Value`.
pub fn value_to_json(value: &Value) -> serde_json::Value {
    convert(value, 0)
}

fn convert(value: &Value, depth: usize) -> serde_json::Value {
    match value {
        Value::Number(n) => number(*n),
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Struct(inner) if depth < MAX_NESTING => {
            if let Ok(Some(entries)) = structs::entries(inner) {
                let map: Map<String, serde_json::Value> = entries
                    .iter()
                    .map(|(key, item)| (key.clone(), convert(item, depth + 1)))
                    .collect();
                return serde_json::Value::Object(map);
            }
            match structs::values(inner) {
                Ok(Some(items)) => serde_json::Value::Array(items.iter().map(|item| convert(item, depth + 1)).collect()),
                _ => serde_json::Value::Null,
            }
        }
        Value::Struct(_) | Value::Environment(_) => serde_json::Value::Null,
    }
}

fn number(n: f64) -> serde_json::Value {
    if n.fract() == 0.0 && n.abs() < MAX_EXACT_INTEGER {
        return serde_json::Value::Number(Number::from(n as i64));
    }
    Number::from_f64(n).map_or(serde_json::Value::Null, serde_json::Value::Number)
}

/// Compact JSON with no extra whitespace.
pub fn to_json(value: &Value) -> String {
    JsonPrinter::new(false).print(value)
}

/// JSON with 2-space indentation, one member per line.
pub fn to_json_pretty(value: &Value) -> String {
    JsonPrinter::new(true).print(value)
}
