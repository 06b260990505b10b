use std::{fmt, rc::Rc};

use crate::{
    environment::Environment,
    evaluator::EvalError,
    structs::StructRef,
    value::{FromValue, Value},
};

/// Arguments of a function call.
///
/// The typed getters are strict: asking for a number where a string was
/// passed is a [`EvalError::TypeMismatch`], and asking past the end is a
/// [`EvalError::MissingArgument`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MoParams {
    values: Vec<Value>,
}

impl MoParams {
    pub fn new(values: Vec<Value>) -> Self {
        MoParams { values }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn contains(&self, index: usize) -> bool {
        index < self.values.len()
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn get_value(&self, index: usize) -> Result<&Value, EvalError> {
        self.values
            .get(index)
            .ok_or(EvalError::MissingArgument { index })
    }

    pub fn get<T: FromValue>(&self, index: usize) -> Result<T, EvalError> {
        T::from_value(self.get_value(index)?)
    }

    pub fn get_number(&self, index: usize) -> Result<f64, EvalError> {
        self.get(index)
    }

    /// The argument as a number truncated toward zero.
    pub fn get_int(&self, index: usize) -> Result<i32, EvalError> {
        self.get(index)
    }

    pub fn get_string(&self, index: usize) -> Result<String, EvalError> {
        self.get(index)
    }

    pub fn get_struct(&self, index: usize) -> Result<StructRef, EvalError> {
        self.get(index)
    }

    pub fn get_environment(&self, index: usize) -> Result<Rc<Environment>, EvalError> {
        self.get(index)
    }
}

impl From<Vec<Value>> for MoParams {
    fn from(values: Vec<Value>) -> Self {
        MoParams::new(values)
    }
}

impl fmt::Display for MoParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.values.iter().map(Value::as_string).collect();
        f.write_str(&parts.join(","))
    }
}
