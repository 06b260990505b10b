use std::{fmt, rc::Rc};

use crate::{
    environment::Environment,
    evaluator::EvalError,
    structs::{ArrayStruct, StructRef, VariableStruct, new_struct},
};

/// A runtime value.
///
/// MoLang has no boolean or null at runtime: `true` is `1`, `false` is `0`,
/// and reading something that does not exist usually yields `0`.
///
/// # Coercion
///
/// The `as_*` conversions never fail:
/// - [`Value::as_number`] is the number itself, `0` for anything else
/// - [`Value::as_bool`] is true for numbers greater than zero
/// - [`Value::as_string`] is the display form of the value
///
/// Strict conversions used for host function arguments go through
/// [`FromValue`].
///
/// # Examples
///
/// ```
/// use molang::Value;
///
/// let speed = Value::from(2.5);
/// assert_eq!(speed.as_number(), 2.5);
/// assert!(speed.as_bool());
///
/// let name = Value::from("pig");
/// assert_eq!(name.as_number(), 0.0);
/// assert_eq!(name.as_string(), "pig");
/// ```
#[derive(Debug, Clone)]
pub enum Value {
    /// Double precision number
    Number(f64),

    /// UTF-8 string
    String(String),

    /// Reference to a struct (store, array, host object, ...)
    Struct(StructRef),

    /// Another environment, entered with the `->` operator
    Environment(Rc<Environment>),
}

impl Value {
    pub const ZERO: Value = Value::Number(0.0);
    pub const ONE: Value = Value::Number(1.0);

    pub fn as_number(&self) -> f64 {
        match self {
            Value::Number(n) => *n,
            _ => 0.0,
        }
    }

    pub fn as_bool(&self) -> bool {
        self.as_number() > 0.0
    }

    pub fn as_string(&self) -> String {
        self.to_string()
    }

    pub fn as_struct(&self) -> Option<&StructRef> {
        match self {
            Value::Struct(s) => Some(s),
            _ => None,
        }
    }

    /// Human readable kind name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Struct(_) => "struct",
            Value::Environment(_) => "environment",
        }
    }

    /// Converts a JSON document into a value.
    ///
    /// Booleans become `1`/`0`, null becomes `0`, arrays become array structs
    /// and objects become variable structs with lowercased keys.
    pub fn from_json(json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::ZERO,
            serde_json::Value::Bool(b) => Value::from(*b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(0.0)),
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(items) => {
                Value::Struct(new_struct(ArrayStruct::new(items.iter().map(Value::from_json).collect())))
            }
            serde_json::Value::Object(map) => {
                let mut store = VariableStruct::new();
                for (key, item) in map {
                    store.insert(key, Value::from_json(item));
                }
                Value::Struct(new_struct(store))
            }
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::ZERO
    }
}

/// Numbers compare by value and strings by content. Structs and environments
/// are equal only to themselves. Values of different kinds are never equal.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Struct(a), Value::Struct(b)) => std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b)),
            (Value::Environment(a), Value::Environment(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => f.write_str(s),
            Value::Struct(_) => f.write_str("[struct]"),
            Value::Environment(_) => f.write_str("[environment]"),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<f32> for Value {
    fn from(n: f32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        if b { Value::ONE } else { Value::ZERO }
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::ZERO
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<StructRef> for Value {
    fn from(s: StructRef) -> Self {
        Value::Struct(s)
    }
}

impl From<Rc<Environment>> for Value {
    fn from(env: Rc<Environment>) -> Self {
        Value::Environment(env)
    }
}

/// Host collections become array structs.
impl<V: Into<Value>> From<Vec<V>> for Value {
    fn from(items: Vec<V>) -> Self {
        let values = items.into_iter().map(Into::into).collect();
        Value::Struct(new_struct(ArrayStruct::new(values)))
    }
}

/// Conversion from a [`Value`] into a host type.
///
/// `from_value` is strict and is used for function arguments: a string passed
/// where a number is expected is a [`EvalError::TypeMismatch`]. `coerce` is
/// used for property writes and falls back to the lenient `as_*` rules where
/// the type allows it.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self, EvalError>;

    fn coerce(value: &Value) -> Result<Self, EvalError> {
        Self::from_value(value)
    }
}

fn mismatch(expected: &'static str, value: &Value) -> EvalError {
    EvalError::TypeMismatch {
        expected,
        found: value.type_name(),
    }
}

macro_rules! numeric_from_value {
    ($($ty:ty),*) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: &Value) -> Result<Self, EvalError> {
                    match value {
                        Value::Number(n) => Ok(*n as $ty),
                        other => Err(mismatch("number", other)),
                    }
                }

                fn coerce(value: &Value) -> Result<Self, EvalError> {
                    Ok(value.as_number() as $ty)
                }
            }
        )*
    };
}

numeric_from_value!(f64, f32, i32, i64, u32, usize);

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self, EvalError> {
        match value {
            Value::Number(n) => Ok(*n > 0.0),
            other => Err(mismatch("number", other)),
        }
    }

    fn coerce(value: &Value) -> Result<Self, EvalError> {
        Ok(value.as_bool())
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self, EvalError> {
        match value {
            Value::String(s) => Ok(s.clone()),
            other => Err(mismatch("string", other)),
        }
    }

    fn coerce(value: &Value) -> Result<Self, EvalError> {
        Ok(value.as_string())
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self, EvalError> {
        Ok(value.clone())
    }
}

impl FromValue for StructRef {
    fn from_value(value: &Value) -> Result<Self, EvalError> {
        match value {
            Value::Struct(s) => Ok(Rc::clone(s)),
            other => Err(mismatch("struct", other)),
        }
    }
}

impl FromValue for Rc<Environment> {
    fn from_value(value: &Value) -> Result<Self, EvalError> {
        match value {
            Value::Environment(env) => Ok(Rc::clone(env)),
            other => Err(mismatch("environment", other)),
        }
    }
}
