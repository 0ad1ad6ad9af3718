//! Named, removable configuration entries and the per-category registries
//! holding them next to their live instances.

use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Configuration category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Logger,
    Handler,
    Formatter,
    Filter,
    ErrorManager,
    Pojo,
}

impl EntityKind {
    /// Categories built from a class descriptor.
    pub const OBJECTS: [Self; 5] = [
        Self::Handler,
        Self::Formatter,
        Self::Filter,
        Self::ErrorManager,
        Self::Pojo,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Logger => "logger",
            Self::Handler => "handler",
            Self::Formatter => "formatter",
            Self::Filter => "filter",
            Self::ErrorManager => "error manager",
            Self::Pojo => "POJO",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A configuration addressed by name within its category.
///
/// `removed` marks a removal that has not been committed yet. Such an entry
/// is hidden from every lookup but keeps its name reserved.
pub trait Entity {
    fn name(&self) -> &str;
    fn is_removed(&self) -> bool;
    fn set_removed(&mut self, removed: bool);
}

/// Configs in insertion order, plus the live instances built from them.
#[derive(Debug)]
pub(crate) struct Registry<C, R> {
    configs: IndexMap<String, C>,
    refs: HashMap<String, R>,
}

impl<C, R> Default for Registry<C, R> {
    fn default() -> Self {
        Self {
            configs: IndexMap::new(),
            refs: HashMap::new(),
        }
    }
}

impl<C: Entity, R> Registry<C, R> {
    /// Visible entry.
    pub fn get(&self, name: &str) -> Option<&C> {
        self.configs.get(name).filter(|c| !c.is_removed())
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut C> {
        self.configs.get_mut(name).filter(|c| !c.is_removed())
    }

    /// Entry regardless of tombstone, for actions finishing a transaction.
    pub fn entry(&self, name: &str) -> Option<&C> {
        self.configs.get(name)
    }

    pub fn entry_mut(&mut self, name: &str) -> Option<&mut C> {
        self.configs.get_mut(name)
    }

    /// Whether the name is taken, tombstoned entries included.
    pub fn contains(&self, name: &str) -> bool {
        self.configs.contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.configs
            .values()
            .filter(|c| !c.is_removed())
            .map(|c| c.name().to_string())
            .collect()
    }

    pub fn insert(&mut self, config: C) -> &mut C {
        let (index, _) = self.configs.insert_full(config.name().to_string(), config);
        &mut self.configs[index]
    }

    /// Drops the entry, keeping the order of the rest.
    pub fn remove_entry(&mut self, name: &str) -> Option<C> {
        self.configs.shift_remove(name)
    }

    /// Flags or unflags removal. Returns whether the entry exists.
    pub fn set_removed(&mut self, name: &str, removed: bool) -> bool {
        self.configs
            .get_mut(name)
            .map(|c| c.set_removed(removed))
            .is_some()
    }

    pub fn live(&self, name: &str) -> Option<&R> {
        self.refs.get(name)
    }

    pub fn set_live(&mut self, name: &str, instance: R) -> Option<R> {
        self.refs.insert(name.to_string(), instance)
    }

    pub fn take_live(&mut self, name: &str) -> Option<R> {
        self.refs.remove(name)
    }
}
