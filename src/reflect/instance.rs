use crate::configuration::EntityKind;
use crate::runtime::{ErrorManager, Filter, Formatter, Handler};
use crate::value::Value;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// The capability a constructed object exposes to the runtime.
#[derive(Debug, Clone)]
pub enum Role {
    Handler(Arc<dyn Handler>),
    Formatter(Arc<dyn Formatter>),
    Filter(Arc<dyn Filter>),
    ErrorManager(Arc<dyn ErrorManager>),
    /// Plain object, only reachable through downcasting.
    Pojo,
}

/// A live object built from a class descriptor.
///
/// `object` and the `Arc` inside `role` point at the same allocation.
#[derive(Clone)]
pub struct Instance {
    object: Arc<dyn Any + Send + Sync>,
    role: Role,
}

impl Instance {
    #[must_use]
    pub fn new(object: Arc<dyn Any + Send + Sync>, role: Role) -> Self {
        Self { object, role }
    }

    #[must_use]
    pub const fn role(&self) -> &Role {
        &self.role
    }

    #[must_use]
    pub fn handler(&self) -> Option<Arc<dyn Handler>> {
        match &self.role {
            Role::Handler(h) => Some(Arc::clone(h)),
            _ => None,
        }
    }

    #[must_use]
    pub fn formatter(&self) -> Option<Arc<dyn Formatter>> {
        match &self.role {
            Role::Formatter(f) => Some(Arc::clone(f)),
            _ => None,
        }
    }

    #[must_use]
    pub fn filter(&self) -> Option<Arc<dyn Filter>> {
        match &self.role {
            Role::Filter(f) => Some(Arc::clone(f)),
            _ => None,
        }
    }

    #[must_use]
    pub fn error_manager(&self) -> Option<Arc<dyn ErrorManager>> {
        match &self.role {
            Role::ErrorManager(m) => Some(Arc::clone(m)),
            _ => None,
        }
    }

    #[must_use]
    pub fn object(&self) -> Arc<dyn Any + Send + Sync> {
        Arc::clone(&self.object)
    }

    #[must_use]
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.object).downcast::<T>().ok()
    }

    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.object.downcast_ref::<T>()
    }

    /// The value a reference of `kind` resolves to.
    #[must_use]
    pub fn value_for(&self, kind: EntityKind) -> Value {
        let value = match kind {
            EntityKind::Handler => self.handler().map(Value::Handler),
            EntityKind::Formatter => self.formatter().map(Value::Formatter),
            EntityKind::Filter => self.filter().map(Value::Filter),
            EntityKind::ErrorManager => self.error_manager().map(Value::ErrorManager),
            EntityKind::Pojo | EntityKind::Logger => None,
        };
        value.unwrap_or_else(|| Value::Object(self.object()))
    }

    /// Handlers may hold open resources; everything else is dropped as is.
    pub fn close(&self) {
        if let Role::Handler(handler) = &self.role {
            handler.close();
        }
    }

    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.object, &other.object)
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance").field("role", &self.role).finish()
    }
}
