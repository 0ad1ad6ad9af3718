use super::action::{Action, HandlerOwner, LoggerAttribute};
use super::action_log::ActionLog;
use super::entity::Entity;
use super::handler::{add_handler_name, remove_handler_name, set_handler_names};
use crate::value::ValueExpression;
use std::ops::Deref;

/// Level, filter, parent delegation and handlers for one named logger.
///
/// Unset attributes leave the live logger's own value alone.
#[derive(Debug, Clone)]
pub struct LoggerConfiguration {
    name: String,
    removed: bool,
    pub(crate) level: Option<ValueExpression>,
    pub(crate) filter: Option<ValueExpression>,
    pub(crate) use_parent_handlers: Option<ValueExpression>,
    pub(crate) handler_names: Vec<String>,
}

impl LoggerConfiguration {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            removed: false,
            level: None,
            filter: None,
            use_parent_handlers: None,
            handler_names: Vec::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn level(&self) -> Option<&ValueExpression> {
        self.level.as_ref()
    }

    #[must_use]
    pub const fn filter(&self) -> Option<&ValueExpression> {
        self.filter.as_ref()
    }

    #[must_use]
    pub const fn use_parent_handlers(&self) -> Option<&ValueExpression> {
        self.use_parent_handlers.as_ref()
    }

    #[must_use]
    pub fn handler_names(&self) -> &[String] {
        &self.handler_names
    }

    pub(crate) const fn attribute_mut(
        &mut self,
        attribute: LoggerAttribute,
    ) -> &mut Option<ValueExpression> {
        match attribute {
            LoggerAttribute::Level => &mut self.level,
            LoggerAttribute::Filter => &mut self.filter,
            LoggerAttribute::UseParentHandlers => &mut self.use_parent_handlers,
        }
    }
}

impl Entity for LoggerConfiguration {
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

/// Transactional editor for a [`LoggerConfiguration`].
#[derive(Debug)]
pub struct LoggerConfigMut<'a> {
    config: &'a mut LoggerConfiguration,
    log: &'a mut ActionLog<Action>,
}

impl<'a> LoggerConfigMut<'a> {
    pub(crate) const fn new(
        config: &'a mut LoggerConfiguration,
        log: &'a mut ActionLog<Action>,
    ) -> Self {
        Self { config, log }
    }

    pub fn set_level(&mut self, level: Option<&str>) {
        self.set_level_expression(level.map(ValueExpression::literal));
    }

    pub fn set_level_expression(&mut self, level: Option<ValueExpression>) {
        self.set_attribute(LoggerAttribute::Level, level);
    }

    /// Takes a filter expression.
    pub fn set_filter(&mut self, filter: Option<&str>) {
        self.set_filter_expression(filter.map(ValueExpression::literal));
    }

    pub fn set_filter_expression(&mut self, filter: Option<ValueExpression>) {
        self.set_attribute(LoggerAttribute::Filter, filter);
    }

    /// `None` restores the default of delegating to the parent.
    pub fn set_use_parent_handlers(&mut self, enabled: Option<bool>) {
        self.set_use_parent_handlers_expression(
            enabled.map(|e| ValueExpression::literal(e.to_string())),
        );
    }

    pub fn set_use_parent_handlers_expression(&mut self, enabled: Option<ValueExpression>) {
        self.set_attribute(LoggerAttribute::UseParentHandlers, enabled);
    }

    fn set_attribute(&mut self, attribute: LoggerAttribute, value: Option<ValueExpression>) {
        let previous = std::mem::replace(self.config.attribute_mut(attribute), value.clone());
        self.log.push(Action::SetLoggerAttribute {
            logger: self.config.name.clone(),
            attribute,
            value,
            previous,
        });
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
        HandlerOwner::Logger(self.config.name.clone())
    }
}

impl Deref for LoggerConfigMut<'_> {
    type Target = LoggerConfiguration;

    fn deref(&self) -> &Self::Target {
        self.config
    }
}
