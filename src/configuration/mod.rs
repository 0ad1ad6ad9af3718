//! Transactional configuration of a live [`LogContext`].
//!
//! A [`LogContextConfiguration`] holds a model of loggers, handlers,
//! formatters, filters, error managers and plain objects. Every edit updates
//! the model immediately and queues an [`Action`]. Nothing touches the live
//! context until [`LogContextConfiguration::commit`], which validates the
//! whole queue before applying any of it. [`LogContextConfiguration::forget`]
//! reverts the model instead.
//!
//! ```
//! use logweave::configuration::LogContextConfiguration;
//! use logweave::reflect::builtin::CONSOLE_HANDLER;
//! use logweave::runtime::LogContext;
//!
//! let mut config = LogContextConfiguration::new(LogContext::new());
//! config
//!     .add_handler_configuration(None, CONSOLE_HANDLER, "console", &[])
//!     .unwrap()
//!     .set_level("INFO")
//!     .unwrap();
//! config
//!     .add_logger_configuration("app")
//!     .unwrap()
//!     .add_handler_name("console");
//! config.commit().unwrap();
//!
//! assert!(config.handler("console").is_some());
//! assert_eq!(config.logger("app").unwrap().handlers().len(), 1);
//! ```

mod action;
mod action_log;
mod entity;
mod handler;
mod logger;
mod object;
mod state;

pub use action::{Action, HandlerOwner, LoggerAttribute, Prepared};
pub use action_log::{ActionLog, ConfigAction};
pub use entity::{Entity, EntityKind};
pub use handler::{HandlerConfigMut, HandlerConfiguration};
pub use logger::{LoggerConfigMut, LoggerConfiguration};
pub use object::{ObjectConfigMut, ObjectConfiguration};
pub use state::ConfigState;

use crate::error::Error;
use crate::internal;
use crate::reflect::{ClassDescriptor, ClassRegistry, Instance, ModuleLoader, Modules};
use crate::runtime::{ErrorManager, Filter, Formatter, Handler, LogContext, Logger};
use crate::value::resolver::resolve;
use crate::value::{ValueExpression, ValueProducer, ValueType};
use entity::Registry;
use std::sync::Arc;

/// Configuration session for one live [`LogContext`].
#[derive(Debug)]
pub struct LogContextConfiguration {
    state: ConfigState,
    log: ActionLog<Action>,
    prepared: bool,
}

impl LogContextConfiguration {
    /// Session with no external modules; only built-in classes resolve.
    #[must_use]
    pub fn new(context: Arc<LogContext>) -> Self {
        Self::with_loader(context, Arc::new(Modules::new()))
    }

    #[must_use]
    pub fn with_loader(context: Arc<LogContext>, loader: Arc<dyn ModuleLoader>) -> Self {
        Self {
            state: ConfigState::new(context, loader),
            log: ActionLog::new(),
            prepared: false,
        }
    }

    #[must_use]
    pub const fn context(&self) -> &Arc<LogContext> {
        &self.state.context
    }

    // ---- loggers ----

    /// # Errors
    /// `Error::DuplicateName` if the name is configured or pending removal.
    pub fn add_logger_configuration(&mut self, name: &str) -> Result<LoggerConfigMut<'_>, Error> {
        if self.state.loggers.contains(name) {
            return Err(Error::DuplicateName {
                kind: EntityKind::Logger,
                name: name.to_string(),
            });
        }
        self.log.push(Action::AddLogger {
            name: name.to_string(),
        });
        let config = self.state.loggers.insert(LoggerConfiguration::new(name));
        Ok(LoggerConfigMut::new(config, &mut self.log))
    }

    /// Returns `false` when no such logger is configured.
    pub fn remove_logger_configuration(&mut self, name: &str) -> bool {
        if self.state.loggers.get(name).is_none() {
            return false;
        }
        self.state.loggers.set_removed(name, true);
        self.log.push(Action::RemoveLogger {
            name: name.to_string(),
        });
        true
    }

    #[must_use]
    pub fn logger_configuration(&self, name: &str) -> Option<&LoggerConfiguration> {
        self.state.loggers.get(name)
    }

    pub fn logger_configuration_mut(&mut self, name: &str) -> Option<LoggerConfigMut<'_>> {
        let log = &mut self.log;
        self.state
            .loggers
            .get_mut(name)
            .map(|config| LoggerConfigMut::new(config, log))
    }

    #[must_use]
    pub fn logger_names(&self) -> Vec<String> {
        self.state.loggers.names()
    }

    // ---- handlers ----

    /// Configures a handler built from `class`, found in `module` or among the
    /// built-in classes when `module` is `None`.
    ///
    /// # Errors
    /// `Error::DuplicateName`, `Error::ModuleNotFound`, `Error::ClassNotFound`
    /// or `Error::NotAssignable`.
    pub fn add_handler_configuration(
        &mut self,
        module: Option<&str>,
        class: &str,
        name: &str,
        constructor_properties: &[&str],
    ) -> Result<HandlerConfigMut<'_>, Error> {
        self.ensure_free(EntityKind::Handler, name)?;
        let class = self.resolve_class(EntityKind::Handler, module, class)?;
        let object =
            ObjectConfiguration::new(EntityKind::Handler, name, module, class, constructor_properties);
        self.log.push(Action::ConstructObject {
            kind: EntityKind::Handler,
            name: name.to_string(),
        });
        let config = self.state.handlers.insert(HandlerConfiguration::new(object));
        Ok(HandlerConfigMut::new(config, &mut self.log))
    }

    pub fn remove_handler_configuration(&mut self, name: &str) -> bool {
        self.remove_object(EntityKind::Handler, name)
    }

    #[must_use]
    pub fn handler_configuration(&self, name: &str) -> Option<&HandlerConfiguration> {
        self.state.handlers.get(name)
    }

    pub fn handler_configuration_mut(&mut self, name: &str) -> Option<HandlerConfigMut<'_>> {
        let log = &mut self.log;
        self.state
            .handlers
            .get_mut(name)
            .map(|config| HandlerConfigMut::new(config, log))
    }

    #[must_use]
    pub fn handler_names(&self) -> Vec<String> {
        self.state.handlers.names()
    }

    // ---- formatters ----

    /// # Errors
    /// See [`add_handler_configuration`](Self::add_handler_configuration).
    pub fn add_formatter_configuration(
        &mut self,
        module: Option<&str>,
        class: &str,
        name: &str,
        constructor_properties: &[&str],
    ) -> Result<ObjectConfigMut<'_>, Error> {
        self.add_object(EntityKind::Formatter, module, class, name, constructor_properties)
    }

    pub fn remove_formatter_configuration(&mut self, name: &str) -> bool {
        self.remove_object(EntityKind::Formatter, name)
    }

    #[must_use]
    pub fn formatter_configuration(&self, name: &str) -> Option<&ObjectConfiguration> {
        self.state.formatters.get(name)
    }

    pub fn formatter_configuration_mut(&mut self, name: &str) -> Option<ObjectConfigMut<'_>> {
        self.object_configuration_mut(EntityKind::Formatter, name)
    }

    #[must_use]
    pub fn formatter_names(&self) -> Vec<String> {
        self.state.formatters.names()
    }

    // ---- filters ----

    /// # Errors
    /// See [`add_handler_configuration`](Self::add_handler_configuration).
    pub fn add_filter_configuration(
        &mut self,
        module: Option<&str>,
        class: &str,
        name: &str,
        constructor_properties: &[&str],
    ) -> Result<ObjectConfigMut<'_>, Error> {
        self.add_object(EntityKind::Filter, module, class, name, constructor_properties)
    }

    pub fn remove_filter_configuration(&mut self, name: &str) -> bool {
        self.remove_object(EntityKind::Filter, name)
    }

    #[must_use]
    pub fn filter_configuration(&self, name: &str) -> Option<&ObjectConfiguration> {
        self.state.filters.get(name)
    }

    pub fn filter_configuration_mut(&mut self, name: &str) -> Option<ObjectConfigMut<'_>> {
        self.object_configuration_mut(EntityKind::Filter, name)
    }

    #[must_use]
    pub fn filter_names(&self) -> Vec<String> {
        self.state.filters.names()
    }

    // ---- error managers ----

    /// # Errors
    /// See [`add_handler_configuration`](Self::add_handler_configuration).
    pub fn add_error_manager_configuration(
        &mut self,
        module: Option<&str>,
        class: &str,
        name: &str,
        constructor_properties: &[&str],
    ) -> Result<ObjectConfigMut<'_>, Error> {
        self.add_object(EntityKind::ErrorManager, module, class, name, constructor_properties)
    }

    pub fn remove_error_manager_configuration(&mut self, name: &str) -> bool {
        self.remove_object(EntityKind::ErrorManager, name)
    }

    #[must_use]
    pub fn error_manager_configuration(&self, name: &str) -> Option<&ObjectConfiguration> {
        self.state.error_managers.get(name)
    }

    pub fn error_manager_configuration_mut(&mut self, name: &str) -> Option<ObjectConfigMut<'_>> {
        self.object_configuration_mut(EntityKind::ErrorManager, name)
    }

    #[must_use]
    pub fn error_manager_names(&self) -> Vec<String> {
        self.state.error_managers.names()
    }

    // ---- plain objects ----

    /// Plain objects can be referenced from `Object`-typed properties. Any
    /// class is accepted.
    ///
    /// # Errors
    /// See [`add_handler_configuration`](Self::add_handler_configuration).
    pub fn add_pojo_configuration(
        &mut self,
        module: Option<&str>,
        class: &str,
        name: &str,
        constructor_properties: &[&str],
    ) -> Result<ObjectConfigMut<'_>, Error> {
        self.add_object(EntityKind::Pojo, module, class, name, constructor_properties)
    }

    pub fn remove_pojo_configuration(&mut self, name: &str) -> bool {
        self.remove_object(EntityKind::Pojo, name)
    }

    #[must_use]
    pub fn pojo_configuration(&self, name: &str) -> Option<&ObjectConfiguration> {
        self.state.pojos.get(name)
    }

    pub fn pojo_configuration_mut(&mut self, name: &str) -> Option<ObjectConfigMut<'_>> {
        self.object_configuration_mut(EntityKind::Pojo, name)
    }

    #[must_use]
    pub fn pojo_names(&self) -> Vec<String> {
        self.state.pojos.names()
    }

    // ---- any object kind ----

    /// Object view of any class-built configuration, handlers included.
    /// Always `None` for loggers.
    #[must_use]
    pub fn object_configuration(&self, kind: EntityKind, name: &str) -> Option<&ObjectConfiguration> {
        self.state.objects(kind)?.object(name)
    }

    pub fn object_configuration_mut(
        &mut self,
        kind: EntityKind,
        name: &str,
    ) -> Option<ObjectConfigMut<'_>> {
        let log = &mut self.log;
        self.state
            .objects_mut(kind)?
            .object_mut(name)
            .map(|config| ObjectConfigMut::new(config, log))
    }

    /// Names configured under `kind`.
    #[must_use]
    pub fn names(&self, kind: EntityKind) -> Vec<String> {
        match kind {
            EntityKind::Logger => self.state.loggers.names(),
            _ => self
                .state
                .objects(kind)
                .map(|r| r.object_names())
                .unwrap_or_default(),
        }
    }

    /// Resolves `expr` against the current model, the way a property of
    /// type `ty` would be.
    ///
    /// # Errors
    /// Whatever the conversion to `ty` fails with.
    pub fn value(
        &self,
        property: &str,
        ty: ValueType,
        expr: Option<&ValueExpression>,
        immediate: bool,
    ) -> Result<ValueProducer, Error> {
        resolve(&self.state, property, ty, expr, immediate)
    }

    // ---- transaction ----

    /// Applies the queued actions to the live context, then any
    /// post-configuration methods they scheduled. The queue is kept until
    /// [`commit`](Self::commit) or [`forget`](Self::forget).
    ///
    /// # Errors
    /// The first validation failure. The live context is untouched then.
    pub fn prepare(&mut self) -> Result<(), Error> {
        if self.prepared {
            return Ok(());
        }
        internal::debug(
            "CONFIG",
            &format!("Preparing {} queued actions", self.log.len()),
        );
        self.log.apply(&mut self.state)?;

        let batches = std::mem::take(&mut self.state.post_configuration);
        for ((kind, name), batch) in batches {
            if batch.is_empty() {
                continue;
            }
            internal::debug(
                "CONFIG",
                &format!("Running {} post-configuration methods on {kind} \"{name}\"", batch.len()),
            );
            if let Err(e) = batch.apply(&mut self.state) {
                internal::error(
                    "COMMIT",
                    &format!("Post-configuration of {kind} \"{name}\" failed: {e}"),
                );
            }
        }
        self.prepared = true;
        Ok(())
    }

    /// Prepares if needed, then clears the queue.
    ///
    /// # Errors
    /// See [`prepare`](Self::prepare). The queue is kept on failure.
    pub fn commit(&mut self) -> Result<(), Error> {
        self.prepare()?;
        internal::debug(
            "CONFIG",
            &format!("Committed {} actions", self.log.len()),
        );
        self.log.clear();
        self.prepared = false;
        Ok(())
    }

    /// Reverts the model to the last commit. Changes a `prepare` already
    /// pushed to the live context are not undone.
    pub fn forget(&mut self) {
        if !self.log.is_empty() {
            internal::debug(
                "CONFIG",
                &format!("Rolling back {} actions", self.log.len()),
            );
        }
        self.log.rollback(&mut self.state);
        self.state.post_configuration.clear();
        self.prepared = false;
    }

    #[must_use]
    pub const fn is_prepared(&self) -> bool {
        self.prepared
    }

    /// Number of queued actions.
    #[must_use]
    pub fn pending_actions(&self) -> usize {
        self.log.len()
    }

    #[must_use]
    pub fn actions(&self) -> &[Action] {
        self.log.actions()
    }

    // ---- live objects ----

    #[must_use]
    pub fn logger(&self, name: &str) -> Option<Arc<Logger>> {
        self.state.loggers.live(name).cloned()
    }

    #[must_use]
    pub fn handler(&self, name: &str) -> Option<Arc<dyn Handler>> {
        self.state.live_handler(name)
    }

    #[must_use]
    pub fn formatter(&self, name: &str) -> Option<Arc<dyn Formatter>> {
        self.state.formatters.live(name).and_then(Instance::formatter)
    }

    #[must_use]
    pub fn filter(&self, name: &str) -> Option<Arc<dyn Filter>> {
        self.state.filters.live(name).and_then(Instance::filter)
    }

    #[must_use]
    pub fn error_manager(&self, name: &str) -> Option<Arc<dyn ErrorManager>> {
        self.state
            .error_managers
            .live(name)
            .and_then(Instance::error_manager)
    }

    /// The live plain object, if it is a `T`.
    #[must_use]
    pub fn pojo<T: std::any::Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        self.state.pojos.live(name).and_then(Instance::downcast)
    }

    #[must_use]
    pub fn instance(&self, kind: EntityKind, name: &str) -> Option<&Instance> {
        self.state.live_instance(kind, name)
    }

    // ---- helpers ----

    fn ensure_free(&self, kind: EntityKind, name: &str) -> Result<(), Error> {
        let taken = match kind {
            EntityKind::Logger => self.state.loggers.contains(name),
            _ => self
                .state
                .objects(kind)
                .is_some_and(|r| r.contains_name(name)),
        };
        if taken {
            return Err(Error::DuplicateName {
                kind,
                name: name.to_string(),
            });
        }
        Ok(())
    }

    fn resolve_class(
        &self,
        kind: EntityKind,
        module: Option<&str>,
        class: &str,
    ) -> Result<Arc<ClassDescriptor>, Error> {
        let registry = match module {
            Some(module) => self
                .state
                .loader
                .module(module)
                .ok_or_else(|| Error::ModuleNotFound(module.to_string()))?,
            None => ClassRegistry::builtin(),
        };
        let descriptor = registry.class(class).ok_or_else(|| Error::ClassNotFound {
            module: module.map(str::to_string),
            class: class.to_string(),
        })?;
        if !descriptor.is_assignable_to(kind) {
            return Err(Error::NotAssignable {
                class: class.to_string(),
                expected: kind,
            });
        }
        Ok(descriptor)
    }

    fn add_object(
        &mut self,
        kind: EntityKind,
        module: Option<&str>,
        class: &str,
        name: &str,
        constructor_properties: &[&str],
    ) -> Result<ObjectConfigMut<'_>, Error> {
        self.ensure_free(kind, name)?;
        let class = self.resolve_class(kind, module, class)?;
        let registry = plain_objects(&mut self.state, kind)?;
        self.log.push(Action::ConstructObject {
            kind,
            name: name.to_string(),
        });
        let config = registry.insert(ObjectConfiguration::new(
            kind,
            name,
            module,
            class,
            constructor_properties,
        ));
        Ok(ObjectConfigMut::new(config, &mut self.log))
    }

    fn remove_object(&mut self, kind: EntityKind, name: &str) -> bool {
        let Some(registry) = self.state.objects_mut(kind) else {
            return false;
        };
        if registry.object(name).is_none() {
            return false;
        }
        registry.mark_removed(name, true);
        self.log.push(Action::RemoveObject {
            kind,
            name: name.to_string(),
        });
        true
    }
}

fn plain_objects(
    state: &mut ConfigState,
    kind: EntityKind,
) -> Result<&mut Registry<ObjectConfiguration, Instance>, Error> {
    match kind {
        EntityKind::Formatter => Ok(&mut state.formatters),
        EntityKind::Filter => Ok(&mut state.filters),
        EntityKind::ErrorManager => Ok(&mut state.error_managers),
        EntityKind::Pojo => Ok(&mut state.pojos),
        EntityKind::Logger | EntityKind::Handler => {
            Err(Error::Unsupported(format!("{kind} as a plain object")))
        }
    }
}
