use std::{
    any::{Any, TypeId},
    cell::RefCell,
    collections::HashMap,
    fmt,
    rc::Rc,
    sync::Arc,
};

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use tracing::debug;

use crate::{
    ast::Path,
    evaluator::EvalError,
    structs::{MoParams, MoStruct, descend, descend_mut},
    value::{FromValue, Value},
};

type Getter<T> = Arc<dyn Fn(&T) -> Value + Send + Sync>;
type Setter<T> = Arc<dyn Fn(&mut T, &Value) -> Result<(), EvalError> + Send + Sync>;
type Invoker<T> = Arc<dyn Fn(&mut T, &MoParams) -> Result<Value, EvalError> + Send + Sync>;

struct Property<T> {
    get: Getter<T>,
    set: Option<Setter<T>>,
}

/// Declarative description of the members a host type exposes.
///
/// Each member is registered under one or more names. Names are matched
/// case-insensitively, and when two members claim the same name the first
/// registration wins.
///
/// # Examples
///
/// ```
/// use molang::structs::HostBindings;
///
/// struct Entity {
///     health: f64,
///     name: String,
/// }
///
/// let bindings = HostBindings::<Entity>::new()
///     .property(&["health", "hp"], |e| e.health, |e, v: f64| e.health = v)
///     .readonly(&["name"], |e| e.name.clone())
///     .function(&["damage"], |e, params| {
///         e.health -= params.get_number(0)?;
///         Ok(e.health)
///     });
/// assert!(bindings.has_member("HP"));
/// ```
pub struct HostBindings<T> {
    properties: HashMap<String, Property<T>>,
    functions: HashMap<String, Invoker<T>>,
}

impl<T: 'static> HostBindings<T> {
    pub fn new() -> Self {
        HostBindings {
            properties: HashMap::new(),
            functions: HashMap::new(),
        }
    }

    fn add_property(&mut self, names: &[&str], get: Getter<T>, set: Option<Setter<T>>) {
        for name in names {
            let key = name.to_lowercase();
            if self.properties.contains_key(&key) {
                debug!(name = %key, host = std::any::type_name::<T>(), "duplicate host property ignored");
                continue;
            }
            self.properties.insert(
                key,
                Property {
                    get: Arc::clone(&get),
                    set: set.clone(),
                },
            );
        }
    }

    /// A member that can be read but not assigned.
    pub fn readonly<R, G>(mut self, names: &[&str], get: G) -> Self
    where
        R: Into<Value>,
        G: Fn(&T) -> R + Send + Sync + 'static,
    {
        self.add_property(names, Arc::new(move |host| get(host).into()), None);
        self
    }

    /// A readable and writable member. Written values are coerced leniently
    /// into `R`, so assigning a string to a numeric member stores `0`.
    pub fn property<R, G, S>(mut self, names: &[&str], get: G, set: S) -> Self
    where
        R: Into<Value> + FromValue,
        G: Fn(&T) -> R + Send + Sync + 'static,
        S: Fn(&mut T, R) + Send + Sync + 'static,
    {
        let setter: Setter<T> = Arc::new(move |host, value| {
            set(host, R::coerce(value)?);
            Ok(())
        });
        self.add_property(names, Arc::new(move |host| get(host).into()), Some(setter));
        self
    }

    /// A callable member. Arguments are read through the typed [`MoParams`]
    /// getters.
    pub fn function<R, F>(mut self, names: &[&str], f: F) -> Self
    where
        R: Into<Value>,
        F: Fn(&mut T, &MoParams) -> Result<R, EvalError> + Send + Sync + 'static,
    {
        let invoker: Invoker<T> = Arc::new(move |host, params| f(host, params).map(Into::into));
        for name in names {
            let key = name.to_lowercase();
            if self.functions.contains_key(&key) {
                debug!(name = %key, host = std::any::type_name::<T>(), "duplicate host function ignored");
                continue;
            }
            self.functions.insert(key, Arc::clone(&invoker));
        }
        self
    }

    pub fn has_member(&self, name: &str) -> bool {
        let key = name.to_lowercase();
        self.properties.contains_key(&key) || self.functions.contains_key(&key)
    }
}

impl<T: 'static> Default for HostBindings<T> {
    fn default() -> Self {
        Self::new()
    }
}

static REGISTRY: Lazy<RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Registers the bindings used by every [`InteropStruct`] wrapping a `T`.
///
/// The table is built once and shared by all instances. Registering the same
/// type again replaces the table for structs created afterwards.
pub fn register_host_type<T: 'static>(bindings: HostBindings<T>) {
    let table: Arc<dyn Any + Send + Sync> = Arc::new(bindings);
    REGISTRY.write().insert(TypeId::of::<T>(), table);
}

/// The registered bindings for `T`, if any.
pub fn host_bindings<T: 'static>() -> Option<Arc<HostBindings<T>>> {
    let table = REGISTRY.read().get(&TypeId::of::<T>()).cloned()?;
    table.downcast::<HostBindings<T>>().ok()
}

/// Exposes a host object as a struct through its [`HostBindings`].
///
/// Reading an unknown member yields `0`. Writing an unknown member or a
/// read-only one fails. Members holding structs or environments can be
/// addressed further, as in `query.target.health`.
pub struct InteropStruct<T: 'static> {
    host: Rc<RefCell<T>>,
    bindings: Arc<HostBindings<T>>,
}

impl<T: 'static> InteropStruct<T> {
    /// Wraps `host` using the bindings registered for `T`.
    pub fn new(host: Rc<RefCell<T>>) -> Result<Self, EvalError> {
        let bindings = host_bindings::<T>()
            .ok_or(EvalError::UnregisteredHostType(std::any::type_name::<T>()))?;
        Ok(Self::with_bindings(host, bindings))
    }

    pub fn with_bindings(host: Rc<RefCell<T>>, bindings: Arc<HostBindings<T>>) -> Self {
        InteropStruct { host, bindings }
    }

    pub fn host(&self) -> &Rc<RefCell<T>> {
        &self.host
    }

    fn read_member(&self, key: &str, params: &MoParams) -> Result<Option<Value>, EvalError> {
        if let Some(property) = self.bindings.properties.get(key) {
            let host = self.host.try_borrow().map_err(|_| EvalError::StructBusy)?;
            return Ok(Some((property.get)(&host)));
        }
        if let Some(function) = self.bindings.functions.get(key) {
            let mut host = self.host.try_borrow_mut().map_err(|_| EvalError::StructBusy)?;
            return function(&mut host, params).map(Some);
        }
        Ok(None)
    }
}

impl<T: 'static> fmt::Debug for InteropStruct<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InteropStruct")
            .field("host", &std::any::type_name::<T>())
            .field("properties", &self.bindings.properties.len())
            .field("functions", &self.bindings.functions.len())
            .finish()
    }
}

impl<T: 'static> MoStruct for InteropStruct<T> {
    fn get(&self, path: &Path, params: &MoParams) -> Result<Value, EvalError> {
        let key = path.value().to_lowercase();
        match self.read_member(&key, params)? {
            Some(value) => descend(value, path.next(), params),
            None => {
                debug!(host = std::any::type_name::<T>(), query = %path.remaining(), "unknown host member");
                Ok(Value::ZERO)
            }
        }
    }

    fn set(&mut self, path: &Path, value: Value) -> Result<(), EvalError> {
        let key = path.value().to_lowercase();
        let Some(property) = self.bindings.properties.get(&key) else {
            return Err(EvalError::InvalidPath(path.remaining()));
        };

        match path.next() {
            None => {
                let setter = property
                    .set
                    .as_ref()
                    .ok_or_else(|| EvalError::ReadOnly(path.value().to_string()))?;
                let mut host = self.host.try_borrow_mut().map_err(|_| EvalError::StructBusy)?;
                setter(&mut host, &value)
            }
            Some(rest) => {
                let container = {
                    let host = self.host.try_borrow().map_err(|_| EvalError::StructBusy)?;
                    (property.get)(&host)
                };
                descend_mut(container, path.value(), &rest, value)
            }
        }
    }

    fn clear(&mut self) -> Result<(), EvalError> {
        Err(EvalError::UnsupportedOperation(format!(
            "cannot clear host object {}",
            std::any::type_name::<T>()
        )))
    }
}
