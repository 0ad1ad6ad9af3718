//! Handler configurations: an object configuration plus the names of the
//! handlers it delegates to, with shortcuts for the shared handler properties.

use super::action::{Action, HandlerOwner};
use super::action_log::ActionLog;
use super::entity::Entity;
use super::object::{ObjectConfigMut, ObjectConfiguration};
use crate::error::Error;
use crate::value::ValueExpression;
use std::ops::Deref;

#[derive(Debug, Clone)]
pub struct HandlerConfiguration {
    pub(crate) object: ObjectConfiguration,
    pub(crate) handler_names: Vec<String>,
}

impl HandlerConfiguration {
    pub(crate) const fn new(object: ObjectConfiguration) -> Self {
        Self {
            object,
            handler_names: Vec::new(),
        }
    }

    #[must_use]
    pub fn level(&self) -> Option<&str> {
        self.object.property_value_string("level")
    }

    #[must_use]
    pub fn formatter_name(&self) -> Option<&str> {
        self.object.property_value_string("formatter")
    }

    /// The filter expression.
    #[must_use]
    pub fn filter(&self) -> Option<&str> {
        self.object.property_value_string("filter")
    }

    #[must_use]
    pub fn error_manager_name(&self) -> Option<&str> {
        self.object.property_value_string("error_manager")
    }

    #[must_use]
    pub fn encoding(&self) -> Option<&str> {
        self.object.property_value_string("encoding")
    }

    /// Nested handlers, for handlers that delegate.
    #[must_use]
    pub fn handler_names(&self) -> &[String] {
        &self.handler_names
    }
}

impl Deref for HandlerConfiguration {
    type Target = ObjectConfiguration;

    fn deref(&self) -> &Self::Target {
        &self.object
    }
}

impl Entity for HandlerConfiguration {
    fn name(&self) -> &str {
        self.object.name()
    }

    fn is_removed(&self) -> bool {
        self.object.is_removed()
    }

    fn set_removed(&mut self, removed: bool) {
        self.object.set_removed(removed);
    }
}

/// Transactional editor for a [`HandlerConfiguration`].
///
/// The shared handler settings are ordinary properties of every handler
/// class, so the shortcuts below queue the same actions as
/// [`ObjectConfigMut::set_property_value_string`].
#[derive(Debug)]
pub struct HandlerConfigMut<'a> {
    config: &'a mut HandlerConfiguration,
    log: &'a mut ActionLog<Action>,
}

impl<'a> HandlerConfigMut<'a> {
    pub(crate) const fn new(
        config: &'a mut HandlerConfiguration,
        log: &'a mut ActionLog<Action>,
    ) -> Self {
        Self { config, log }
    }

    /// Generic property editing.
    pub fn object(&mut self) -> ObjectConfigMut<'_> {
        ObjectConfigMut::new(&mut self.config.object, self.log)
    }

    /// # Errors
    /// See [`ObjectConfigMut::set_property_value_expression`].
    pub fn set_property_value_expression(
        &mut self,
        property: &str,
        value: ValueExpression,
    ) -> Result<(), Error> {
        self.object().set_property_value_expression(property, value)
    }

    /// # Errors
    /// See [`ObjectConfigMut::set_property_value_expression`].
    pub fn set_property_value_string(&mut self, property: &str, value: &str) -> Result<(), Error> {
        self.object().set_property_value_string(property, value)
    }

    /// # Errors
    /// `Error::PendingRemoval`.
    pub fn remove_property(&mut self, property: &str) -> Result<bool, Error> {
        self.object().remove_property(property)
    }

    /// # Errors
    /// `Error::PendingRemoval`.
    pub fn add_post_configuration_method(&mut self, method: &str) -> Result<bool, Error> {
        self.object().add_post_configuration_method(method)
    }

    /// # Errors
    /// `Error::PendingRemoval`.
    pub fn remove_post_configuration_method(&mut self, method: &str) -> Result<bool, Error> {
        self.object().remove_post_configuration_method(method)
    }

    /// # Errors
    /// `Error::PendingRemoval`.
    pub fn set_post_configuration_methods<I, S>(&mut self, methods: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.object().set_post_configuration_methods(methods)
    }

    /// # Errors
    /// See [`ObjectConfigMut::set_property_value_expression`].
    pub fn set_level(&mut self, level: &str) -> Result<(), Error> {
        self.set_property_value_string("level", level)
    }

    /// # Errors
    /// See [`ObjectConfigMut::set_property_value_expression`].
    pub fn set_formatter_name(&mut self, name: Option<&str>) -> Result<(), Error> {
        self.set_or_remove("formatter", name)
    }

    /// Takes a filter expression.
    ///
    /// # Errors
    /// See [`ObjectConfigMut::set_property_value_expression`].
    pub fn set_filter(&mut self, filter: Option<&str>) -> Result<(), Error> {
        self.set_or_remove("filter", filter)
    }

    /// # Errors
    /// See [`ObjectConfigMut::set_property_value_expression`].
    pub fn set_error_manager_name(&mut self, name: Option<&str>) -> Result<(), Error> {
        self.set_or_remove("error_manager", name)
    }

    /// # Errors
    /// See [`ObjectConfigMut::set_property_value_expression`].
    pub fn set_encoding(&mut self, encoding: Option<&str>) -> Result<(), Error> {
        self.set_or_remove("encoding", encoding)
    }

    fn set_or_remove(&mut self, property: &str, value: Option<&str>) -> Result<(), Error> {
        match value {
            Some(value) => self.set_property_value_string(property, value),
            None => self.remove_property(property).map(drop),
        }
    }

    pub fn set_handler_names<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let owner = self.owner();
        set_handler_names(&mut self.config.handler_names, self.log, owner, names);
    }

    /// Returns `false` if the name was already listed.
    pub fn add_handler_name(&mut self, name: &str) -> bool {
        let owner = self.owner();
        add_handler_name(&mut self.config.handler_names, self.log, owner, name)
    }

    pub fn remove_handler_name(&mut self, name: &str) -> bool {
        let owner = self.owner();
        remove_handler_name(&mut self.config.handler_names, self.log, owner, name)
    }

    fn owner(&self) -> HandlerOwner {
        HandlerOwner::Handler(self.config.object.name().to_string())
    }
}

impl Deref for HandlerConfigMut<'_> {
    type Target = HandlerConfiguration;

    fn deref(&self) -> &Self::Target {
        self.config
    }
}

pub(super) fn set_handler_names<I, S>(
    current: &mut Vec<String>,
    log: &mut ActionLog<Action>,
    owner: HandlerOwner,
    names: I,
) where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut unique: Vec<String> = Vec::new();
    for name in names {
        let name = name.into();
        if !unique.contains(&name) {
            unique.push(name);
        }
    }
    let previous = std::mem::replace(current, unique.clone());
    log.push(Action::SetHandlerNames {
        owner,
        names: unique,
        previous,
    });
}

pub(super) fn add_handler_name(
    current: &mut Vec<String>,
    log: &mut ActionLog<Action>,
    owner: HandlerOwner,
    name: &str,
) -> bool {
    if current.iter().any(|n| n == name) {
        return false;
    }
    current.push(name.to_string());
    log.push(Action::AddHandlerName {
        owner,
        handler: name.to_string(),
    });
    true
}

pub(super) fn remove_handler_name(
    current: &mut Vec<String>,
    log: &mut ActionLog<Action>,
    owner: HandlerOwner,
    name: &str,
) -> bool {
    let Some(index) = current.iter().position(|n| n == name) else {
        return false;
    };
    current.remove(index);
    log.push(Action::RemoveHandlerName {
        owner,
        handler: name.to_string(),
        index,
    });
    true
}
