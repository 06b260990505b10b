use crate::{
    ast::Path,
    environment::Context,
    evaluator::EvalError,
    structs::{MoParams, MoStruct, descend},
    value::Value,
};

/// Read-only view of the values a caller passes to an evaluation.
///
/// The bound [`Context`] is shared with the caller, so values inserted into it
/// after binding are visible to later reads.
#[derive(Debug, Default)]
pub struct ContextStruct {
    context: Context,
}

impl ContextStruct {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, context: Context) {
        self.context = context;
    }

    pub fn context(&self) -> &Context {
        &self.context
    }
}

impl MoStruct for ContextStruct {
    fn get(&self, path: &Path, params: &MoParams) -> Result<Value, EvalError> {
        let value = self.context.get(path.value()).unwrap_or(Value::ZERO);
        descend(value, path.next(), params)
    }

    fn set(&mut self, path: &Path, _value: Value) -> Result<(), EvalError> {
        Err(EvalError::ReadOnly(format!("context.{}", path.remaining())))
    }

    /// Drops the binding without touching the caller's values.
    fn clear(&mut self) -> Result<(), EvalError> {
        self.context = Context::new();
        Ok(())
    }

    fn values(&self) -> Option<Vec<Value>> {
        Some(self.context.values())
    }
}
