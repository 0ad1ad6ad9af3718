//! Configurations for objects built from a class descriptor.

use super::action::Action;
use super::action_log::ActionLog;
use super::entity::{Entity, EntityKind};
use crate::error::Error;
use crate::reflect::{ClassDescriptor, PropertyDescriptor};
use crate::value::ValueExpression;
use indexmap::IndexMap;
use std::sync::Arc;

/// Class, constructor arguments, properties and post-configuration methods
/// for one named object.
#[derive(Debug, Clone)]
pub struct ObjectConfiguration {
    kind: EntityKind,
    name: String,
    removed: bool,
    module_name: Option<String>,
    class: Arc<ClassDescriptor>,
    constructor_properties: Vec<String>,
    pub(crate) properties: IndexMap<String, ValueExpression>,
    pub(crate) post_configuration_methods: Vec<String>,
}

impl ObjectConfiguration {
    pub(crate) fn new(
        kind: EntityKind,
        name: &str,
        module_name: Option<&str>,
        class: Arc<ClassDescriptor>,
        constructor_properties: &[&str],
    ) -> Self {
        Self {
            kind,
            name: name.to_string(),
            removed: false,
            module_name: module_name.map(str::to_string),
            class,
            constructor_properties: constructor_properties
                .iter()
                .map(|p| (*p).to_string())
                .collect(),
            properties: IndexMap::new(),
            post_configuration_methods: Vec::new(),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        self.kind
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn module_name(&self) -> Option<&str> {
        self.module_name.as_deref()
    }

    #[must_use]
    pub fn class_name(&self) -> &str {
        self.class.name()
    }

    #[must_use]
    pub const fn class(&self) -> &Arc<ClassDescriptor> {
        &self.class
    }

    /// Property names passed positionally to the constructor.
    #[must_use]
    pub fn constructor_properties(&self) -> &[String] {
        &self.constructor_properties
    }

    /// Configured property names, in the order they were first set.
    #[must_use]
    pub fn property_names(&self) -> Vec<&str> {
        self.properties.keys().map(String::as_str).collect()
    }

    #[must_use]
    pub fn has_property(&self, property: &str) -> bool {
        self.properties.contains_key(property)
    }

    #[must_use]
    pub fn property_value_expression(&self, property: &str) -> Option<&ValueExpression> {
        self.properties.get(property)
    }

    /// The resolved text of a property.
    #[must_use]
    pub fn property_value_string(&self, property: &str) -> Option<&str> {
        self.properties.get(property).map(|v| v.resolved().as_str())
    }

    #[must_use]
    pub fn post_configuration_methods(&self) -> &[String] {
        &self.post_configuration_methods
    }
}

impl Entity for ObjectConfiguration {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_removed(&self) -> bool {
        self.removed
    }

    fn set_removed(&mut self, removed: bool) {
        self.removed = removed;
    }
}

/// Transactional editor for an [`ObjectConfiguration`].
///
/// Each mutation updates the model right away and queues the action that
/// applies it to the live object on commit, or reverts it on forget.
#[derive(Debug)]
pub struct ObjectConfigMut<'a> {
    config: &'a mut ObjectConfiguration,
    log: &'a mut ActionLog<Action>,
}

impl<'a> ObjectConfigMut<'a> {
    pub(crate) const fn new(
        config: &'a mut ObjectConfiguration,
        log: &'a mut ActionLog<Action>,
    ) -> Self {
        Self { config, log }
    }

    fn ensure_active(&self) -> Result<(), Error> {
        if self.config.removed {
            return Err(Error::PendingRemoval {
                kind: self.config.kind,
                name: self.config.name.clone(),
            });
        }
        Ok(())
    }

    /// # Errors
    /// `Error::PendingRemoval`, or `Error::NoSuchProperty` when the class has
    /// no setter for `property` and it is not a constructor property.
    pub fn set_property_value_expression(
        &mut self,
        property: &str,
        value: ValueExpression,
    ) -> Result<(), Error> {
        self.ensure_active()?;
        let settable = self
            .config
            .class
            .property(property)
            .is_some_and(PropertyDescriptor::is_writable);
        let constructor = self.config.constructor_properties.iter().any(|p| p == property);
        if !settable && !constructor {
            return Err(Error::NoSuchProperty {
                class: self.config.class.name().to_string(),
                property: property.to_string(),
            });
        }
        let previous = self
            .config
            .properties
            .insert(property.to_string(), value.clone());
        self.log.push(Action::SetProperty {
            kind: self.config.kind,
            name: self.config.name.clone(),
            property: property.to_string(),
            value,
            previous,
        });
        Ok(())
    }

    /// Sets a literal value.
    ///
    /// # Errors
    /// See [`set_property_value_expression`](Self::set_property_value_expression).
    pub fn set_property_value_string(&mut self, property: &str, value: &str) -> Result<(), Error> {
        self.set_property_value_expression(property, ValueExpression::literal(value))
    }

    /// Unsets a property. The live object gets null for reference and
    /// string properties; primitives keep their current value.
    ///
    /// # Errors
    /// `Error::PendingRemoval`.
    pub fn remove_property(&mut self, property: &str) -> Result<bool, Error> {
        self.ensure_active()?;
        let Some((index, _, previous)) = self.config.properties.shift_remove_full(property) else {
            return Ok(false);
        };
        self.log.push(Action::RemoveProperty {
            kind: self.config.kind,
            name: self.config.name.clone(),
            property: property.to_string(),
            previous,
            index,
        });
        Ok(true)
    }

    /// Returns `false` if the method was already listed.
    ///
    /// # Errors
    /// `Error::PendingRemoval`.
    pub fn add_post_configuration_method(&mut self, method: &str) -> Result<bool, Error> {
        if self.config.post_configuration_methods.iter().any(|m| m == method) {
            return Ok(false);
        }
        let mut methods = self.config.post_configuration_methods.clone();
        methods.push(method.to_string());
        self.replace_methods(methods)?;
        Ok(true)
    }

    /// # Errors
    /// `Error::PendingRemoval`.
    pub fn remove_post_configuration_method(&mut self, method: &str) -> Result<bool, Error> {
        if !self.config.post_configuration_methods.iter().any(|m| m == method) {
            return Ok(false);
        }
        let methods = self
            .config
            .post_configuration_methods
            .iter()
            .filter(|m| *m != method)
            .cloned()
            .collect();
        self.replace_methods(methods)?;
        Ok(true)
    }

    /// Replaces the whole list. Duplicates are dropped, first occurrence wins.
    ///
    /// # Errors
    /// `Error::PendingRemoval`.
    pub fn set_post_configuration_methods<I, S>(&mut self, methods: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for method in methods {
            let method = method.into();
            if !unique.contains(&method) {
                unique.push(method);
            }
        }
        self.replace_methods(unique)
    }

    fn replace_methods(&mut self, methods: Vec<String>) -> Result<(), Error> {
        self.ensure_active()?;
        let previous = std::mem::replace(
            &mut self.config.post_configuration_methods,
            methods.clone(),
        );
        self.log.push(Action::SetPostConfigurationMethods {
            kind: self.config.kind,
            name: self.config.name.clone(),
            methods,
            previous,
        });
        Ok(())
    }
}

impl std::ops::Deref for ObjectConfigMut<'_> {
    type Target = ObjectConfiguration;

    fn deref(&self) -> &Self::Target {
        self.config
    }
}
