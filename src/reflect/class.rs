//! Class descriptors: typed factories, setters, getters and methods
//! registered per class name.

use super::instance::{Instance, Role};
use crate::configuration::EntityKind;
use crate::error::Error;
use crate::level::Level;
use crate::runtime::{ErrorManager, Filter, Formatter, Handler};
use crate::value::{Value, ValueType};
use indexmap::IndexMap;
use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

type Factory = Arc<dyn Fn(&[Value]) -> Result<Instance, Error> + Send + Sync>;
type Setter = Arc<dyn Fn(&Instance, &Value) -> Result<(), Error> + Send + Sync>;
type Getter = Arc<dyn Fn(&Instance) -> Option<Value> + Send + Sync>;
type Method = Arc<dyn Fn(&Instance) -> Result<(), Error> + Send + Sync>;

/// A constructor with an exact parameter signature.
#[derive(Clone)]
pub struct Constructor {
    params: Vec<ValueType>,
    factory: Factory,
}

impl Constructor {
    #[must_use]
    pub fn params(&self) -> &[ValueType] {
        &self.params
    }

    /// # Errors
    /// Whatever the factory returns, typically `Error::Instantiation`.
    pub fn instantiate(&self, args: &[Value]) -> Result<Instance, Error> {
        (self.factory)(args)
    }
}

impl fmt::Debug for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Constructor({})", signature(&self.params))
    }
}

/// Declared type plus the accessors a class offers for one property.
#[derive(Clone)]
pub struct PropertyDescriptor {
    ty: ValueType,
    setter: Option<Setter>,
    getter: Option<Getter>,
}

impl PropertyDescriptor {
    #[must_use]
    pub const fn ty(&self) -> ValueType {
        self.ty
    }

    #[must_use]
    pub const fn is_writable(&self) -> bool {
        self.setter.is_some()
    }

    #[must_use]
    pub const fn is_readable(&self) -> bool {
        self.getter.is_some()
    }

    /// # Errors
    /// `Error::Unsupported` for constructor-only properties, or the setter's own error.
    pub fn set(&self, instance: &Instance, value: &Value) -> Result<(), Error> {
        match &self.setter {
            Some(setter) => setter(instance, value),
            None => Err(Error::Unsupported("property has no setter".to_string())),
        }
    }

    #[must_use]
    pub fn get(&self, instance: &Instance) -> Option<Value> {
        self.getter.as_ref().and_then(|getter| getter(instance))
    }
}

impl fmt::Debug for PropertyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyDescriptor")
            .field("ty", &self.ty)
            .field("writable", &self.is_writable())
            .field("readable", &self.is_readable())
            .finish()
    }
}

pub struct ClassDescriptor {
    name: String,
    kind: EntityKind,
    constructors: Vec<Constructor>,
    properties: IndexMap<String, PropertyDescriptor>,
    methods: IndexMap<String, Method>,
}

impl ClassDescriptor {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The category instances of this class can serve as.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Every class can be configured as a POJO.
    #[must_use]
    pub fn is_assignable_to(&self, kind: EntityKind) -> bool {
        kind == EntityKind::Pojo || self.kind == kind
    }

    #[must_use]
    pub fn constructor(&self, params: &[ValueType]) -> Option<&Constructor> {
        self.constructors.iter().find(|c| c.params == params)
    }

    #[must_use]
    pub fn constructors(&self) -> &[Constructor] {
        &self.constructors
    }

    #[must_use]
    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.get(name)
    }

    #[must_use]
    pub fn property_names(&self) -> Vec<&str> {
        self.properties.keys().map(String::as_str).collect()
    }

    #[must_use]
    pub fn has_method(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// # Errors
    /// `Error::NoSuchMethod`, or the method's own error.
    pub fn invoke(&self, instance: &Instance, method: &str) -> Result<(), Error> {
        let call = self.methods.get(method).ok_or_else(|| Error::NoSuchMethod {
            class: self.name.clone(),
            method: method.to_string(),
        })?;
        call(instance)
    }
}

impl fmt::Debug for ClassDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("constructors", &self.constructors)
            .field("properties", &self.properties)
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Comma separated type names, as shown in constructor errors.
pub(crate) fn signature(params: &[ValueType]) -> String {
    params
        .iter()
        .map(|ty| ty.name())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Typed builder for a [`ClassDescriptor`].
///
/// Closures take the concrete type; the builder erases them against
/// [`Instance`] so the engine can call them by name.
///
/// ```
/// use logweave::reflect::ClassBuilder;
/// use logweave::value::ValueType;
///
/// #[derive(Default)]
/// struct Pool { size: std::sync::atomic::AtomicUsize }
///
/// let class = ClassBuilder::<Pool>::pojo("app.Pool")
///     .default_constructor()
///     .property("size", ValueType::Int, |pool, value| {
///         let size = usize::try_from(value.as_i64()?).unwrap_or_default();
///         pool.size.store(size, std::sync::atomic::Ordering::Relaxed);
///         Ok(())
///     })
///     .build();
/// assert!(class.property("size").is_some());
/// ```
pub struct ClassBuilder<T> {
    name: String,
    kind: EntityKind,
    wrap: fn(Arc<T>) -> Role,
    constructors: Vec<Constructor>,
    properties: IndexMap<String, PropertyDescriptor>,
    methods: IndexMap<String, Method>,
    _marker: PhantomData<fn() -> T>,
}

fn handler_role<T: Handler + 'static>(object: Arc<T>) -> Role {
    Role::Handler(object)
}

fn formatter_role<T: Formatter + 'static>(object: Arc<T>) -> Role {
    Role::Formatter(object)
}

fn filter_role<T: Filter + 'static>(object: Arc<T>) -> Role {
    Role::Filter(object)
}

fn error_manager_role<T: ErrorManager + 'static>(object: Arc<T>) -> Role {
    Role::ErrorManager(object)
}

fn pojo_role<T>(_object: Arc<T>) -> Role {
    Role::Pojo
}

fn downcast<'a, T: Any>(instance: &'a Instance, class: &str) -> Result<&'a T, Error> {
    instance.downcast_ref::<T>().ok_or_else(|| Error::TypeMismatch {
        expected: class.to_string(),
        found: format!("{:?}", instance.role()),
    })
}

impl<T: Handler + 'static> ClassBuilder<T> {
    /// A handler class, with the `level`, `formatter`, `filter`,
    /// `error_manager` and `encoding` properties every handler shares.
    #[must_use]
    pub fn handler(name: &str) -> Self {
        Self::with_role(name, EntityKind::Handler, handler_role::<T>)
            .property("level", ValueType::Level, |h, v| {
                h.core().set_level(v.as_level()?.unwrap_or(Level::All));
                Ok(())
            })
            .getter("level", ValueType::Level, |h| Value::Level(h.core().level()))
            .property("formatter", ValueType::Formatter, |h, v| {
                h.core().set_formatter(v.as_formatter()?);
                Ok(())
            })
            .property("filter", ValueType::Filter, |h, v| {
                h.core().set_filter(v.as_filter()?);
                Ok(())
            })
            .property("error_manager", ValueType::ErrorManager, |h, v| {
                h.core().set_error_manager(v.as_error_manager()?);
                Ok(())
            })
            .property("encoding", ValueType::Charset, |h, v| {
                h.core().set_encoding(v.as_charset()?);
                Ok(())
            })
            .getter("encoding", ValueType::Charset, |h| {
                h.core().encoding().map_or(Value::Null, Value::Charset)
            })
            .method("flush", |h| h.flush())
    }
}

impl<T: Formatter + 'static> ClassBuilder<T> {
    #[must_use]
    pub fn formatter(name: &str) -> Self {
        Self::with_role(name, EntityKind::Formatter, formatter_role::<T>)
    }
}

impl<T: Filter + 'static> ClassBuilder<T> {
    #[must_use]
    pub fn filter(name: &str) -> Self {
        Self::with_role(name, EntityKind::Filter, filter_role::<T>)
    }
}

impl<T: ErrorManager + 'static> ClassBuilder<T> {
    #[must_use]
    pub fn error_manager(name: &str) -> Self {
        Self::with_role(name, EntityKind::ErrorManager, error_manager_role::<T>)
    }
}

impl<T: Any + Send + Sync> ClassBuilder<T> {
    /// A class with no logging role, usable only as a POJO.
    #[must_use]
    pub fn pojo(name: &str) -> Self {
        Self::with_role(name, EntityKind::Pojo, pojo_role::<T>)
    }

    fn with_role(name: &str, kind: EntityKind, wrap: fn(Arc<T>) -> Role) -> Self {
        Self {
            name: name.to_string(),
            kind,
            wrap,
            constructors: Vec::new(),
            properties: IndexMap::new(),
            methods: IndexMap::new(),
            _marker: PhantomData,
        }
    }

    /// Registers a constructor for exactly these parameter types. `factory`
    /// receives one value per parameter, in order.
    #[must_use]
    pub fn constructor<F>(mut self, params: &[ValueType], factory: F) -> Self
    where
        F: Fn(&[Value]) -> Result<T, Error> + Send + Sync + 'static,
    {
        let wrap = self.wrap;
        let class = self.name.clone();
        let factory: Factory = Arc::new(move |args: &[Value]| {
            let object = Arc::new(factory(args).map_err(|e| Error::Instantiation {
                class: class.clone(),
                reason: e.to_string(),
            })?);
            let role = wrap(Arc::clone(&object));
            Ok(Instance::new(object, role))
        });
        self.constructors.push(Constructor {
            params: params.to_vec(),
            factory,
        });
        self
    }

    #[must_use]
    pub fn default_constructor(self) -> Self
    where
        T: Default,
    {
        self.constructor(&[], |_| Ok(T::default()))
    }

    /// A writable property.
    #[must_use]
    pub fn property<F>(mut self, name: &str, ty: ValueType, setter: F) -> Self
    where
        F: Fn(&T, &Value) -> Result<(), Error> + Send + Sync + 'static,
    {
        let class = self.name.clone();
        let setter: Setter = Arc::new(move |instance: &Instance, value: &Value| {
            setter(downcast::<T>(instance, &class)?, value)
        });
        self.descriptor(name, ty).setter = Some(setter);
        self
    }

    /// A readable property. Combined with [`property`](Self::property) for
    /// read/write ones.
    #[must_use]
    pub fn getter<F>(mut self, name: &str, ty: ValueType, getter: F) -> Self
    where
        F: Fn(&T) -> Value + Send + Sync + 'static,
    {
        let getter: Getter = Arc::new(move |instance: &Instance| {
            instance.downcast_ref::<T>().map(&getter)
        });
        self.descriptor(name, ty).getter = Some(getter);
        self
    }

    /// Declares the type of a property that is only passed to a constructor.
    #[must_use]
    pub fn constructor_property(mut self, name: &str, ty: ValueType) -> Self {
        self.descriptor(name, ty);
        self
    }

    /// A no-argument method callable as a post-configuration method.
    #[must_use]
    pub fn method<F>(mut self, name: &str, method: F) -> Self
    where
        F: Fn(&T) -> Result<(), Error> + Send + Sync + 'static,
    {
        let class = self.name.clone();
        let method: Method =
            Arc::new(move |instance: &Instance| method(downcast::<T>(instance, &class)?));
        self.methods.insert(name.to_string(), method);
        self
    }

    fn descriptor(&mut self, name: &str, ty: ValueType) -> &mut PropertyDescriptor {
        let entry = self
            .properties
            .entry(name.to_string())
            .or_insert(PropertyDescriptor {
                ty,
                setter: None,
                getter: None,
            });
        entry.ty = ty;
        entry
    }

    #[must_use]
    pub fn build(self) -> Arc<ClassDescriptor> {
        Arc::new(ClassDescriptor {
            name: self.name,
            kind: self.kind,
            constructors: self.constructors,
            properties: self.properties,
            methods: self.methods,
        })
    }
}
