use std::collections::BTreeMap;

use crate::{
    ast::Path,
    evaluator::EvalError,
    structs::{ArrayStruct, MoParams, MoStruct, StructRef, descend, descend_mut, new_struct},
    value::Value,
};

/// What a multi-segment write creates when an intermediate key is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Nested {
    #[default]
    Store,
    Array,
}

/// Mutable named-value store behind `variable` and `temp`.
///
/// Keys are case-insensitive. Reading a missing key yields `0`. Writing
/// `a.b.c` creates the intermediate stores `a` and `a.b` when they do not
/// exist yet.
///
/// # Examples
///
/// ```
/// use molang::{Path, Value};
/// use molang::structs::{MoParams, MoStruct, VariableStruct};
///
/// let mut store = VariableStruct::new();
/// store.set(&Path::new("pos.x"), Value::from(3.0)).unwrap();
/// let x = store.get(&Path::new("POS.X"), &MoParams::empty()).unwrap();
/// assert_eq!(x, Value::from(3.0));
/// ```
#[derive(Debug, Default)]
pub struct VariableStruct {
    map: BTreeMap<String, Value>,
    nested: Nested,
}

impl VariableStruct {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose auto-created containers are arrays, used for the
    /// `array` root.
    pub fn arrays() -> Self {
        VariableStruct {
            map: BTreeMap::new(),
            nested: Nested::Array,
        }
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.map.insert(key.to_lowercase(), value.into());
    }

    pub fn get_key(&self, key: &str) -> Option<&Value> {
        self.map.get(&key.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    fn create_container(&self) -> StructRef {
        match self.nested {
            Nested::Store => new_struct(VariableStruct::new()),
            Nested::Array => new_struct(ArrayStruct::default()),
        }
    }
}

impl MoStruct for VariableStruct {
    fn get(&self, path: &Path, params: &MoParams) -> Result<Value, EvalError> {
        let value = self.get_key(path.value()).cloned().unwrap_or(Value::ZERO);
        descend(value, path.next(), params)
    }

    fn set(&mut self, path: &Path, value: Value) -> Result<(), EvalError> {
        let key = path.value().to_lowercase();
        let Some(rest) = path.next() else {
            self.map.insert(key, value);
            return Ok(());
        };

        let container = match self.map.get(&key) {
            Some(existing) => existing.clone(),
            None => {
                let created = Value::Struct(self.create_container());
                self.map.insert(key.clone(), created.clone());
                created
            }
        };
        descend_mut(container, &key, &rest, value)
    }

    fn clear(&mut self) -> Result<(), EvalError> {
        self.map.clear();
        Ok(())
    }

    fn values(&self) -> Option<Vec<Value>> {
        Some(self.map.values().cloned().collect())
    }

    fn entries(&self) -> Option<Vec<(String, Value)>> {
        Some(self.map.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }
}
