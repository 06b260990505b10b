//! The struct protocol and its built-in implementations.
//!
//! Every root in an [`Environment`](crate::Environment) is a struct: something
//! that can be read from and written to by [`Path`]. The path handed to a
//! struct starts at the segment after the one that selected it, so for
//! `variable.pos.x` the variable store sees `pos.x`.
//!
//! - [`VariableStruct`] - mutable store behind `variable` and `temp`
//! - [`ArrayStruct`] - indexable list, wraps on read
//! - [`ContextStruct`] - read-only view of caller supplied values
//! - [`MathLibrary`] - the `math` function table
//! - [`InteropStruct`] - exposes a host object through [`HostBindings`]
use std::{cell::RefCell, fmt, rc::Rc};

use crate::{ast::Path, evaluator::EvalError, value::Value};

pub mod array;
pub mod context;
pub mod interop;
pub mod math;
pub mod params;
pub mod variable;

pub use array::ArrayStruct;
pub use context::ContextStruct;
pub use interop::{HostBindings, InteropStruct, register_host_type};
pub use math::MathLibrary;
pub use params::MoParams;
pub use variable::VariableStruct;

/// Uniform get/set/clear contract shared by every store.
pub trait MoStruct: fmt::Debug {
    /// Reads the member at `path`. `params` carries call arguments when the
    /// read is a function call.
    fn get(&self, path: &Path, params: &MoParams) -> Result<Value, EvalError>;

    fn set(&mut self, path: &Path, value: Value) -> Result<(), EvalError>;

    fn clear(&mut self) -> Result<(), EvalError>;

    /// Element values in iteration order, for `for_each`. Structs that cannot
    /// be iterated return `None`.
    fn values(&self) -> Option<Vec<Value>> {
        None
    }

    /// Keyed members, for stores that have names.
    fn entries(&self) -> Option<Vec<(String, Value)>> {
        None
    }
}

/// Shared handle to a struct.
pub type StructRef = Rc<RefCell<dyn MoStruct>>;

pub fn new_struct<S: MoStruct + 'static>(value: S) -> StructRef {
    Rc::new(RefCell::new(value))
}

/// Reads through a shared struct. A struct that is already mutably borrowed
/// further up the call stack reports [`EvalError::StructBusy`].
pub fn read(target: &StructRef, path: &Path, params: &MoParams) -> Result<Value, EvalError> {
    target.try_borrow().map_err(|_| EvalError::StructBusy)?.get(path, params)
}

pub fn write(target: &StructRef, path: &Path, value: Value) -> Result<(), EvalError> {
    target
        .try_borrow_mut()
        .map_err(|_| EvalError::StructBusy)?
        .set(path, value)
}

pub fn clear(target: &StructRef) -> Result<(), EvalError> {
    target.try_borrow_mut().map_err(|_| EvalError::StructBusy)?.clear()
}

pub fn values(target: &StructRef) -> Result<Option<Vec<Value>>, EvalError> {
    Ok(target.try_borrow().map_err(|_| EvalError::StructBusy)?.values())
}

pub fn entries(target: &StructRef) -> Result<Option<Vec<(String, Value)>>, EvalError> {
    Ok(target.try_borrow().map_err(|_| EvalError::StructBusy)?.entries())
}

/// Continues a read into a nested value: structs receive the rest of the path,
/// environments resolve it as a fresh root path, anything else is returned as is.
pub(crate) fn descend(value: Value, rest: Option<Path>, params: &MoParams) -> Result<Value, EvalError> {
    match (rest, value) {
        (Some(rest), Value::Struct(inner)) => read(&inner, &rest, params),
        (Some(rest), Value::Environment(env)) => env.get(&rest, params),
        (_, value) => Ok(value),
    }
}

/// Continues a write into the value stored under `key`, failing when it
/// cannot hold members.
pub(crate) fn descend_mut(container: Value, key: &str, rest: &Path, value: Value) -> Result<(), EvalError> {
    match container {
        Value::Struct(inner) => write(&inner, rest, value),
        Value::Environment(env) => env.set(rest, value),
        _ => Err(EvalError::NotAStruct(key.to_string())),
    }
}
