//! Everything an action reads or mutates: the registries, the live context,
//! the class loader and the pending post-configuration batches.

use super::action::Action;
use super::action_log::ActionLog;
use super::entity::{Entity, EntityKind, Registry};
use super::handler::HandlerConfiguration;
use super::logger::LoggerConfiguration;
use super::object::ObjectConfiguration;
use crate::error::Error;
use crate::level::Level;
use crate::reflect::{Instance, ModuleLoader};
use crate::runtime::{Handler, LogContext, Logger};
use crate::value::resolver::Registries;
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// Gives handler and plain object registries one face, keyed by kind.
pub(crate) trait ObjectRegistry {
    fn object(&self, name: &str) -> Option<&ObjectConfiguration>;
    fn object_mut(&mut self, name: &str) -> Option<&mut ObjectConfiguration>;
    /// Tombstoned entries included.
    fn object_entry(&self, name: &str) -> Option<&ObjectConfiguration>;
    fn object_entry_mut(&mut self, name: &str) -> Option<&mut ObjectConfiguration>;
    fn contains_name(&self, name: &str) -> bool;
    fn object_names(&self) -> Vec<String>;
    fn mark_removed(&mut self, name: &str, removed: bool) -> bool;
    fn drop_entry(&mut self, name: &str) -> bool;
    fn instance(&self, name: &str) -> Option<&Instance>;
    fn set_instance(&mut self, name: &str, instance: Instance) -> Option<Instance>;
    fn take_instance(&mut self, name: &str) -> Option<Instance>;
}

pub(crate) trait ObjectEntry: Entity {
    fn object(&self) -> &ObjectConfiguration;
    fn object_mut(&mut self) -> &mut ObjectConfiguration;
}

impl ObjectEntry for ObjectConfiguration {
    fn object(&self) -> &ObjectConfiguration {
        self
    }

    fn object_mut(&mut self) -> &mut ObjectConfiguration {
        self
    }
}

impl ObjectEntry for HandlerConfiguration {
    fn object(&self) -> &ObjectConfiguration {
        &self.object
    }

    fn object_mut(&mut self) -> &mut ObjectConfiguration {
        &mut self.object
    }
}

impl<C: ObjectEntry> ObjectRegistry for Registry<C, Instance> {
    fn object(&self, name: &str) -> Option<&ObjectConfiguration> {
        self.get(name).map(ObjectEntry::object)
    }

    fn object_mut(&mut self, name: &str) -> Option<&mut ObjectConfiguration> {
        self.get_mut(name).map(ObjectEntry::object_mut)
    }

    fn object_entry(&self, name: &str) -> Option<&ObjectConfiguration> {
        self.entry(name).map(ObjectEntry::object)
    }

    fn object_entry_mut(&mut self, name: &str) -> Option<&mut ObjectConfiguration> {
        self.entry_mut(name).map(ObjectEntry::object_mut)
    }

    fn contains_name(&self, name: &str) -> bool {
        self.contains(name)
    }

    fn object_names(&self) -> Vec<String> {
        self.names()
    }

    fn mark_removed(&mut self, name: &str, removed: bool) -> bool {
        self.set_removed(name, removed)
    }

    fn drop_entry(&mut self, name: &str) -> bool {
        self.remove_entry(name).is_some()
    }

    fn instance(&self, name: &str) -> Option<&Instance> {
        self.live(name)
    }

    fn set_instance(&mut self, name: &str, instance: Instance) -> Option<Instance> {
        self.set_live(name, instance)
    }

    fn take_instance(&mut self, name: &str) -> Option<Instance> {
        self.take_live(name)
    }
}

/// State shared by every action of one [`LogContextConfiguration`](super::LogContextConfiguration).
pub struct ConfigState {
    pub(crate) context: Arc<LogContext>,
    pub(crate) loader: Arc<dyn ModuleLoader>,
    pub(crate) loggers: Registry<LoggerConfiguration, Arc<Logger>>,
    pub(crate) handlers: Registry<HandlerConfiguration, Instance>,
    pub(crate) formatters: Registry<ObjectConfiguration, Instance>,
    pub(crate) filters: Registry<ObjectConfiguration, Instance>,
    pub(crate) error_managers: Registry<ObjectConfiguration, Instance>,
    pub(crate) pojos: Registry<ObjectConfiguration, Instance>,
    /// Post-configuration method calls per object, run after the main queue.
    pub(crate) post_configuration: IndexMap<(EntityKind, String), ActionLog<Action>>,
}

impl ConfigState {
    pub(crate) fn new(context: Arc<LogContext>, loader: Arc<dyn ModuleLoader>) -> Self {
        Self {
            context,
            loader,
            loggers: Registry::default(),
            handlers: Registry::default(),
            formatters: Registry::default(),
            filters: Registry::default(),
            error_managers: Registry::default(),
            pojos: Registry::default(),
            post_configuration: IndexMap::new(),
        }
    }

    /// `None` for loggers, which are not built from classes.
    pub(crate) fn objects(&self, kind: EntityKind) -> Option<&dyn ObjectRegistry> {
        match kind {
            EntityKind::Logger => None,
            EntityKind::Handler => Some(&self.handlers),
            EntityKind::Formatter => Some(&self.formatters),
            EntityKind::Filter => Some(&self.filters),
            EntityKind::ErrorManager => Some(&self.error_managers),
            EntityKind::Pojo => Some(&self.pojos),
        }
    }

    pub(crate) fn objects_mut(&mut self, kind: EntityKind) -> Option<&mut dyn ObjectRegistry> {
        match kind {
            EntityKind::Logger => None,
            EntityKind::Handler => Some(&mut self.handlers),
            EntityKind::Formatter => Some(&mut self.formatters),
            EntityKind::Filter => Some(&mut self.filters),
            EntityKind::ErrorManager => Some(&mut self.error_managers),
            EntityKind::Pojo => Some(&mut self.pojos),
        }
    }

    /// Config entry for an action, tombstoned or not.
    pub(crate) fn object_entry(
        &self,
        kind: EntityKind,
        name: &str,
    ) -> Result<&ObjectConfiguration, Error> {
        self.objects(kind)
            .and_then(|r| r.object_entry(name))
            .ok_or_else(|| unknown(kind, name))
    }

    pub(crate) fn object_entry_mut(
        &mut self,
        kind: EntityKind,
        name: &str,
    ) -> Result<&mut ObjectConfiguration, Error> {
        self.objects_mut(kind)
            .and_then(|r| r.object_entry_mut(name))
            .ok_or_else(|| unknown(kind, name))
    }

    pub(crate) fn live_instance(&self, kind: EntityKind, name: &str) -> Option<&Instance> {
        self.objects(kind).and_then(|r| r.instance(name))
    }

    pub(crate) fn live_handler(&self, name: &str) -> Option<Arc<dyn Handler>> {
        self.handlers.live(name).and_then(Instance::handler)
    }

    /// Creates the batch from the configured methods unless one is pending.
    pub(crate) fn ensure_post_configuration(&mut self, kind: EntityKind, name: &str) {
        if self
            .post_configuration
            .contains_key(&(kind, name.to_string()))
        {
            return;
        }
        let methods = self
            .object_entry(kind, name)
            .map(|c| c.post_configuration_methods().to_vec())
            .unwrap_or_default();
        self.replace_post_configuration(kind, name, &methods);
    }

    pub(crate) fn replace_post_configuration(
        &mut self,
        kind: EntityKind,
        name: &str,
        methods: &[String],
    ) {
        let mut batch = ActionLog::new();
        for method in methods {
            batch.push(Action::InvokeMethod {
                kind,
                name: name.to_string(),
                method: method.clone(),
            });
        }
        self.post_configuration
            .insert((kind, name.to_string()), batch);
    }
}

pub(crate) fn unknown(kind: EntityKind, name: &str) -> Error {
    Error::UnknownName {
        kind,
        name: name.to_string(),
    }
}

impl Registries for ConfigState {
    fn is_defined(&self, kind: EntityKind, name: &str) -> bool {
        match kind {
            EntityKind::Logger => self.loggers.get(name).is_some(),
            _ => self
                .objects(kind)
                .is_some_and(|r| r.object(name).is_some()),
        }
    }

    fn instance(&self, kind: EntityKind, name: &str) -> Option<Instance> {
        self.live_instance(kind, name).cloned()
    }

    fn level_for_name(&self, name: &str) -> Result<Level, Error> {
        self.context.level_for_name(name)
    }
}

impl fmt::Debug for ConfigState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigState")
            .field("loggers", &self.loggers.names())
            .field("handlers", &self.handlers.names())
            .field("formatters", &self.formatters.names())
            .field("filters", &self.filters.names())
            .field("error_managers", &self.error_managers.names())
            .field("pojos", &self.pojos.names())
            .finish_non_exhaustive()
    }
}
