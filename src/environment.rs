use std::{
    cell::RefCell,
    collections::{BTreeMap, HashMap},
    fmt,
    rc::Rc,
};

use crate::{
    ast::Path,
    evaluator::EvalError,
    structs::{
        self, ContextStruct, HostBindings, InteropStruct, MathLibrary, MoParams, StructRef, VariableStruct,
        new_struct,
    },
    value::Value,
};

/// Caller-supplied values exposed under the read-only `context` root.
///
/// Cloning a `Context` shares the underlying map, so a caller can keep a
/// handle and update values between evaluations. Keys are case-insensitive.
///
/// # Examples
///
/// ```
/// use molang::{Context, Value};
///
/// let context = Context::new();
/// context.insert("Speed", 2.0);
/// assert_eq!(context.get("speed"), Some(Value::from(2.0)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Context {
    values: Rc<RefCell<BTreeMap<String, Value>>>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a context from the members of a JSON object. Anything other
    /// than an object yields an empty context.
    pub fn from_json(json: &serde_json::Value) -> Self {
        let context = Context::new();
        if let serde_json::Value::Object(map) = json {
            for (key, item) in map {
                context.insert(key, Value::from_json(item));
            }
        }
        context
    }

    pub fn insert(&self, key: &str, value: impl Into<Value>) {
        self.values.borrow_mut().insert(key.to_lowercase(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.values.borrow().get(&key.to_lowercase()).cloned()
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        self.values.borrow_mut().remove(&key.to_lowercase())
    }

    pub fn values(&self) -> Vec<Value> {
        self.values.borrow().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.values.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.borrow().is_empty()
    }
}

/// The named roots every path resolves through, plus the `this` value.
///
/// A fresh environment carries five roots:
///
/// | Root | Struct | Lifetime |
/// |---|---|---|
/// | `math` | [`MathLibrary`] | read-only |
/// | `variable` | [`VariableStruct`] | persists across evaluations |
/// | `temp` | [`VariableStruct`] | cleared after each evaluation |
/// | `array` | [`VariableStruct::arrays`] | persists across evaluations |
/// | `context` | [`ContextStruct`] | rebound per evaluation |
///
/// Hosts add their own roots with [`Environment::register_struct`] or
/// [`Environment::bind_host`]. Root names are case-insensitive.
///
/// An environment is single-owner: evaluations sharing one must run one at a
/// time.
pub struct Environment {
    roots: RefCell<HashMap<String, StructRef>>,
    context: Rc<RefCell<ContextStruct>>,
    this: RefCell<Value>,
}

impl Environment {
    /// An environment whose random functions are seeded from the OS.
    pub fn new() -> Self {
        Self::with_math(MathLibrary::new())
    }

    /// An environment with a reproducible random generator.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_math(MathLibrary::with_seed(seed))
    }

    fn with_math(math: MathLibrary) -> Self {
        let context = Rc::new(RefCell::new(ContextStruct::new()));
        let context_root: StructRef = context.clone();

        let mut roots: HashMap<String, StructRef> = HashMap::new();
        roots.insert("math".to_string(), new_struct(math));
        roots.insert("temp".to_string(), new_struct(VariableStruct::new()));
        roots.insert("variable".to_string(), new_struct(VariableStruct::new()));
        roots.insert("array".to_string(), new_struct(VariableStruct::arrays()));
        roots.insert("context".to_string(), context_root);

        Environment {
            roots: RefCell::new(roots),
            context,
            this: RefCell::new(Value::ZERO),
        }
    }

    pub fn bind_this(&self, value: impl Into<Value>) {
        *self.this.borrow_mut() = value.into();
    }

    pub fn this(&self) -> Value {
        self.this.borrow().clone()
    }

    /// Adds or replaces a root.
    pub fn register_struct(&self, name: &str, value: StructRef) {
        self.roots.borrow_mut().insert(name.to_lowercase(), value);
    }

    /// Exposes `host` under `name` using the bindings registered for `T`.
    pub fn bind_host<T: 'static>(&self, name: &str, host: Rc<RefCell<T>>) -> Result<(), EvalError> {
        let interop = InteropStruct::new(host)?;
        self.register_struct(name, new_struct(interop));
        Ok(())
    }

    /// Like [`Environment::bind_host`] with an explicit binding table.
    pub fn bind_host_with<T: 'static>(
        &self,
        name: &str,
        host: Rc<RefCell<T>>,
        bindings: std::sync::Arc<HostBindings<T>>,
    ) {
        self.register_struct(name, new_struct(InteropStruct::with_bindings(host, bindings)));
    }

    pub fn root(&self, name: &str) -> Option<StructRef> {
        self.roots.borrow().get(&name.to_lowercase()).cloned()
    }

    fn resolve(&self, path: &Path) -> Result<StructRef, EvalError> {
        self.root(path.value())
            .ok_or_else(|| EvalError::UnknownRoot(path.value().to_string()))
    }

    /// Reads `path`. A bare root name yields the root struct itself.
    pub fn get(&self, path: &Path, params: &MoParams) -> Result<Value, EvalError> {
        let root = self.resolve(path)?;
        match path.next() {
            Some(rest) => structs::read(&root, &rest, params),
            None => Ok(Value::Struct(root)),
        }
    }

    pub fn set(&self, path: &Path, value: Value) -> Result<(), EvalError> {
        let root = self.resolve(path)?;
        match path.next() {
            Some(rest) => structs::write(&root, &rest, value),
            None => Err(EvalError::InvalidPath(path.full().to_string())),
        }
    }

    /// Makes `context` the data behind the `context` root.
    pub fn bind_context(&self, context: &Context) -> Result<(), EvalError> {
        self.context
            .try_borrow_mut()
            .map_err(|_| EvalError::StructBusy)?
            .bind(context.clone());
        Ok(())
    }

    pub fn clear_temp(&self) -> Result<(), EvalError> {
        match self.root("temp") {
            Some(temp) => structs::clear(&temp),
            None => Ok(()),
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut roots: Vec<String> = self.roots.borrow().keys().cloned().collect();
        roots.sort();
        f.debug_struct("Environment")
            .field("roots", &roots)
            .field("this", &self.this.borrow())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(text: &str) -> Path {
        Path::new(text)
    }

    #[test]
    fn test_builtin_roots() {
        let env = Environment::with_seed(1);
        for root in ["math", "temp", "variable", "array", "context"] {
            assert!(env.root(root).is_some(), "missing root {}", root);
        }
    }

    #[test]
    fn test_unknown_root_is_error() {
        let env = Environment::with_seed(1);
        assert_eq!(
            env.get(&path("query.x"), &MoParams::empty()),
            Err(EvalError::UnknownRoot("query".to_string()))
        );
        assert!(env.set(&path("nope.x"), Value::ONE).is_err());
    }

    #[test]
    fn test_set_then_get() {
        let env = Environment::with_seed(1);
        env.set(&path("variable.x"), Value::from(2.0)).unwrap();
        assert_eq!(env.get(&path("VARIABLE.X"), &MoParams::empty()).unwrap(), Value::from(2.0));
    }

    #[test]
    fn test_bare_root_set_is_error() {
        let env = Environment::with_seed(1);
        assert!(matches!(env.set(&path("variable"), Value::ONE), Err(EvalError::InvalidPath(_))));
        assert!(matches!(env.get(&path("variable"), &MoParams::empty()), Ok(Value::Struct(_))));
    }

    #[test]
    fn test_clear_temp_keeps_variables() {
        let env = Environment::with_seed(1);
        env.set(&path("temp.a"), Value::ONE).unwrap();
        env.set(&path("variable.a"), Value::ONE).unwrap();
        env.clear_temp().unwrap();
        assert_eq!(env.get(&path("temp.a"), &MoParams::empty()).unwrap(), Value::ZERO);
        assert_eq!(env.get(&path("variable.a"), &MoParams::empty()).unwrap(), Value::ONE);
    }

    #[test]
    fn test_context_binding_is_shared() {
        let env = Environment::with_seed(1);
        let context = Context::new();
        env.bind_context(&context).unwrap();
        context.insert("speed", 3.0);
        assert_eq!(env.get(&path("context.speed"), &MoParams::empty()).unwrap(), Value::from(3.0));
        assert!(matches!(env.set(&path("context.speed"), Value::ONE), Err(EvalError::ReadOnly(_))));
    }

    #[test]
    fn test_context_from_json() {
        let json = serde_json::json!({ "Count": 2, "flag": true, "items": [1, 2, 3] });
        let context = Context::from_json(&json);
        assert_eq!(context.get("count"), Some(Value::from(2.0)));
        assert_eq!(context.get("flag"), Some(Value::ONE));
        assert!(matches!(context.get("items"), Some(Value::Struct(_))));
    }
}
