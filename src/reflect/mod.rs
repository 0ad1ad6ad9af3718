//! Runtime class lookup for configured objects.
//!
//! Configurations name a class (and optionally a module); the engine finds
//! its [`ClassDescriptor`] here and builds, configures and calls it through
//! the closures the descriptor registered.

pub mod builtin;
mod class;
mod instance;

pub use class::{ClassBuilder, ClassDescriptor, Constructor, PropertyDescriptor};
pub use instance::{Instance, Role};

pub(crate) use class::signature;

use indexmap::IndexMap;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Classes available under one module (or the framework itself).
#[derive(Debug, Default)]
pub struct ClassRegistry {
    classes: IndexMap<String, Arc<ClassDescriptor>>,
}

static BUILTIN: OnceLock<Arc<ClassRegistry>> = OnceLock::new();

impl ClassRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The framework's own classes: built-in handlers, formatters, filters
    /// and error managers.
    #[must_use]
    pub fn builtin() -> Arc<Self> {
        Arc::clone(BUILTIN.get_or_init(|| Arc::new(builtin::registry())))
    }

    /// Adds or replaces a class under its own name.
    #[must_use]
    pub fn with(mut self, class: Arc<ClassDescriptor>) -> Self {
        self.register(class);
        self
    }

    pub fn register(&mut self, class: Arc<ClassDescriptor>) {
        self.classes.insert(class.name().to_string(), class);
    }

    #[must_use]
    pub fn class(&self, name: &str) -> Option<Arc<ClassDescriptor>> {
        self.classes.get(name).cloned()
    }

    #[must_use]
    pub fn class_names(&self) -> Vec<&str> {
        self.classes.keys().map(String::as_str).collect()
    }
}

/// Resolves module names to class registries.
pub trait ModuleLoader: Send + Sync + fmt::Debug {
    fn module(&self, name: &str) -> Option<Arc<ClassRegistry>>;
}

/// Map-backed [`ModuleLoader`].
#[derive(Debug, Default)]
pub struct Modules {
    modules: HashMap<String, Arc<ClassRegistry>>,
}

impl Modules {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, name: &str, registry: ClassRegistry) -> Self {
        self.insert(name, Arc::new(registry));
        self
    }

    pub fn insert(&mut self, name: &str, registry: Arc<ClassRegistry>) {
        self.modules.insert(name.to_string(), registry);
    }
}

impl ModuleLoader for Modules {
    fn module(&self, name: &str) -> Option<Arc<ClassRegistry>> {
        self.modules.get(name).cloned()
    }
}
