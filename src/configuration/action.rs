//! Journal entries. Each variant carries what it needs to apply itself and
//! to undo its change to the configuration model.

use super::action_log::ConfigAction;
use super::entity::EntityKind;
use super::state::{ConfigState, unknown};
use crate::error::Error;
use crate::reflect::{Instance, signature};
use crate::runtime::{Handler, Logger};
use crate::value::resolver::{Registries, resolve};
use crate::value::{ValueExpression, ValueProducer, ValueType};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

/// Logger attributes that are not handler lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoggerAttribute {
    Level,
    Filter,
    UseParentHandlers,
}

impl LoggerAttribute {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Level => "level",
            Self::Filter => "filter",
            Self::UseParentHandlers => "use_parent_handlers",
        }
    }

    const fn value_type(self) -> ValueType {
        match self {
            Self::Level => ValueType::Level,
            Self::Filter => ValueType::Filter,
            Self::UseParentHandlers => ValueType::Bool,
        }
    }
}

/// Whose handler list an action edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HandlerOwner {
    Logger(String),
    Handler(String),
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    AddLogger {
        name: String,
    },
    RemoveLogger {
        name: String,
    },
    ConstructObject {
        kind: EntityKind,
        name: String,
    },
    RemoveObject {
        kind: EntityKind,
        name: String,
    },
    SetProperty {
        kind: EntityKind,
        name: String,
        property: String,
        value: ValueExpression,
        previous: Option<ValueExpression>,
    },
    RemoveProperty {
        kind: EntityKind,
        name: String,
        property: String,
        previous: ValueExpression,
        /// Position in the property map, restored on rollback.
        index: usize,
    },
    SetPostConfigurationMethods {
        kind: EntityKind,
        name: String,
        methods: Vec<String>,
        previous: Vec<String>,
    },
    /// Entry of a post-configuration batch.
    InvokeMethod {
        kind: EntityKind,
        name: String,
        method: String,
    },
    SetLoggerAttribute {
        logger: String,
        attribute: LoggerAttribute,
        value: Option<ValueExpression>,
        previous: Option<ValueExpression>,
    },
    SetHandlerNames {
        owner: HandlerOwner,
        names: Vec<String>,
        previous: Vec<String>,
    },
    AddHandlerName {
        owner: HandlerOwner,
        handler: String,
    },
    RemoveHandlerName {
        owner: HandlerOwner,
        handler: String,
        index: usize,
    },
}

/// Validation output handed to the apply passes.
#[derive(Debug)]
pub enum Prepared {
    Nothing,
    Value(ValueProducer),
    Instance(Instance),
}

impl ConfigAction for Action {
    type State = ConfigState;
    type Prepared = Prepared;

    fn validate(&self, state: &ConfigState) -> Result<Prepared, Error> {
        match self {
            Self::AddLogger { .. } | Self::RemoveLogger { .. } | Self::RemoveObject { .. } => {
                Ok(Prepared::Nothing)
            }
            Self::ConstructObject { kind, name } => {
                construct(state, *kind, name).map(Prepared::Instance)
            }
            Self::SetProperty {
                kind,
                name,
                property,
                value,
                ..
            } => prepare_property(state, *kind, name, property, Some(value)),
            Self::RemoveProperty {
                kind,
                name,
                property,
                ..
            } => prepare_property(state, *kind, name, property, None),
            Self::SetPostConfigurationMethods {
                kind,
                name,
                methods,
                ..
            } => {
                let config = state.object_entry(*kind, name)?;
                for method in methods {
                    if !config.class().has_method(method) {
                        return Err(Error::NoSuchMethod {
                            class: config.class_name().to_string(),
                            method: method.clone(),
                        });
                    }
                }
                Ok(Prepared::Nothing)
            }
            Self::InvokeMethod { kind, name, method } => {
                let config = state.object_entry(*kind, name)?;
                if !config.class().has_method(method) {
                    return Err(Error::NoSuchMethod {
                        class: config.class_name().to_string(),
                        method: method.clone(),
                    });
                }
                Ok(Prepared::Nothing)
            }
            Self::SetLoggerAttribute {
                attribute, value, ..
            } => {
                if *attribute == LoggerAttribute::UseParentHandlers && value.is_none() {
                    return Ok(Prepared::Value(ValueProducer::Null));
                }
                resolve(
                    state,
                    attribute.as_str(),
                    attribute.value_type(),
                    value.as_ref(),
                    false,
                )
                .map(Prepared::Value)
            }
            Self::SetHandlerNames { owner, names, .. } => {
                for handler in names {
                    require_handler(state, handler)?;
                }
                reject_cycle(state, owner, names)?;
                Ok(Prepared::Nothing)
            }
            Self::AddHandlerName { owner, handler } => {
                require_handler(state, handler)?;
                reject_cycle(state, owner, std::slice::from_ref(handler))?;
                Ok(Prepared::Nothing)
            }
            Self::RemoveHandlerName { .. } => Ok(Prepared::Nothing),
        }
    }

    fn apply_pre_create(&self, state: &mut ConfigState, prepared: &Prepared) -> Result<(), Error> {
        match (self, prepared) {
            (Self::AddLogger { name }, _) => {
                let logger = state.context.logger(name);
                state.loggers.set_live(name, logger);
            }
            (Self::RemoveLogger { name }, _) => {
                state.loggers.take_live(name);
                state.loggers.remove_entry(name);
            }
            (Self::ConstructObject { kind, name }, Prepared::Instance(instance)) => {
                let registry = state.objects_mut(*kind).ok_or_else(|| unknown(*kind, name))?;
                if let Some(replaced) = registry.set_instance(name, instance.clone()) {
                    replaced.close();
                }
            }
            (Self::RemoveObject { kind, name }, _) => {
                let registry = state.objects_mut(*kind).ok_or_else(|| unknown(*kind, name))?;
                if let Some(instance) = registry.take_instance(name) {
                    instance.close();
                }
                registry.drop_entry(name);
                state.post_configuration.shift_remove(&(*kind, name.clone()));
            }
            _ => {}
        }
        Ok(())
    }

    fn apply_post_create(&self, state: &mut ConfigState, prepared: &Prepared) -> Result<(), Error> {
        match (self, prepared) {
            (Self::RemoveLogger { name }, _) => {
                if let Some(logger) = state.context.find_logger(name) {
                    logger.set_level(None);
                    logger.set_filter(None);
                    logger.clear_handlers();
                    logger.set_use_parent_handlers(true);
                }
                Ok(())
            }
            (Self::ConstructObject { kind, name }, _) => {
                state.ensure_post_configuration(*kind, name);
                Ok(())
            }
            (
                Self::SetProperty {
                    kind,
                    name,
                    property,
                    ..
                }
                | Self::RemoveProperty {
                    kind,
                    name,
                    property,
                    ..
                },
                prepared,
            ) => {
                state.ensure_post_configuration(*kind, name);
                match prepared {
                    Prepared::Value(producer) => {
                        apply_property(state, *kind, name, property, producer)
                    }
                    _ => Ok(()),
                }
            }
            (Self::SetPostConfigurationMethods { kind, name, methods, .. }, _) => {
                state.replace_post_configuration(*kind, name, methods);
                Ok(())
            }
            (Self::InvokeMethod { kind, name, method }, _) => {
                let config = state.object_entry(*kind, name)?;
                let instance = state
                    .live_instance(*kind, name)
                    .ok_or_else(|| not_live(*kind, name))?;
                config.class().invoke(instance, method).map_err(|e| {
                    Error::invocation(format!("{method}() on {kind} \"{name}\""), e)
                })
            }
            (
                Self::SetLoggerAttribute {
                    logger, attribute, ..
                },
                Prepared::Value(producer),
            ) => {
                let live = live_logger(state, logger)?;
                let value = producer.produce(state)?;
                match attribute {
                    LoggerAttribute::Level => live.set_level(value.as_level()?),
                    LoggerAttribute::Filter => live.set_filter(value.as_filter()?),
                    LoggerAttribute::UseParentHandlers => {
                        live.set_use_parent_handlers(value.is_null() || value.as_bool()?);
                    }
                }
                Ok(())
            }
            (Self::SetHandlerNames { owner, names, .. }, _) => {
                let mut handlers = Vec::with_capacity(names.len());
                for name in names {
                    handlers.push(
                        state
                            .live_handler(name)
                            .ok_or_else(|| not_live(EntityKind::Handler, name))?,
                    );
                }
                live_owner(state, owner)?.set_handlers(handlers)
            }
            (Self::AddHandlerName { owner, handler }, _) => {
                let live = state
                    .live_handler(handler)
                    .ok_or_else(|| not_live(EntityKind::Handler, handler))?;
                live_owner(state, owner)?.add_handler(live)
            }
            (Self::RemoveHandlerName { owner, handler, .. }, _) => {
                // Already removed from the registry when the handler itself went away.
                let Some(live) = state.live_handler(handler) else {
                    return Ok(());
                };
                live_owner(state, owner)?.remove_handler(&live)
            }
            _ => Ok(()),
        }
    }

    fn rollback(&self, state: &mut ConfigState) -> Result<(), Error> {
        match self {
            Self::AddLogger { name } => {
                state.loggers.remove_entry(name);
                state.loggers.take_live(name);
            }
            Self::RemoveLogger { name } => {
                state.loggers.set_removed(name, false);
            }
            Self::ConstructObject { kind, name } => {
                let registry = state.objects_mut(*kind).ok_or_else(|| unknown(*kind, name))?;
                registry.drop_entry(name);
                if let Some(instance) = registry.take_instance(name) {
                    instance.close();
                }
            }
            Self::RemoveObject { kind, name } => {
                let registry = state.objects_mut(*kind).ok_or_else(|| unknown(*kind, name))?;
                registry.mark_removed(name, false);
            }
            Self::SetProperty {
                kind,
                name,
                property,
                previous,
                ..
            } => {
                let config = state.object_entry_mut(*kind, name)?;
                match previous {
                    Some(previous) => {
                        config.properties.insert(property.clone(), previous.clone());
                    }
                    None => {
                        config.properties.shift_remove(property);
                    }
                }
                if let Some(previous) = previous {
                    reapply(state, *kind, name, property, previous)?;
                }
            }
            Self::RemoveProperty {
                kind,
                name,
                property,
                previous,
                index,
            } => {
                let config = state.object_entry_mut(*kind, name)?;
                let index = (*index).min(config.properties.len());
                config
                    .properties
                    .shift_insert(index, property.clone(), previous.clone());
                reapply(state, *kind, name, property, previous)?;
            }
            Self::SetPostConfigurationMethods {
                kind,
                name,
                previous,
                ..
            } => {
                state.object_entry_mut(*kind, name)?.post_configuration_methods = previous.clone();
            }
            Self::InvokeMethod { .. } => {}
            Self::SetLoggerAttribute {
                logger,
                attribute,
                previous,
                ..
            } => {
                let config = state
                    .loggers
                    .entry_mut(logger)
                    .ok_or_else(|| unknown(EntityKind::Logger, logger))?;
                *config.attribute_mut(*attribute) = previous.clone();
            }
            Self::SetHandlerNames {
                owner, previous, ..
            } => {
                *handler_names_mut(state, owner)? = previous.clone();
            }
            Self::AddHandlerName { owner, handler } => {
                let names = handler_names_mut(state, owner)?;
                if let Some(index) = names.iter().rposition(|n| n == handler) {
                    names.remove(index);
                }
            }
            Self::RemoveHandlerName {
                owner,
                handler,
                index,
            } => {
                let names = handler_names_mut(state, owner)?;
                let index = (*index).min(names.len());
                names.insert(index, handler.clone());
            }
        }
        Ok(())
    }
}

fn not_live(kind: EntityKind, name: &str) -> Error {
    Error::invocation(format!("{kind} \"{name}\""), "no live instance")
}

fn require_handler(state: &ConfigState, name: &str) -> Result<(), Error> {
    if state.is_defined(EntityKind::Handler, name) {
        Ok(())
    } else {
        Err(unknown(EntityKind::Handler, name))
    }
}

/// Resolves constructor arguments in declared order and builds the object.
fn construct(state: &ConfigState, kind: EntityKind, name: &str) -> Result<Instance, Error> {
    let config = state.object_entry(kind, name)?;
    let class = config.class();

    let mut params = Vec::with_capacity(config.constructor_properties().len());
    for property in config.constructor_properties() {
        let descriptor = class.property(property).ok_or_else(|| Error::NoSuchProperty {
            class: class.name().to_string(),
            property: property.clone(),
        })?;
        params.push(descriptor.ty());
    }
    let constructor = class
        .constructor(&params)
        .ok_or_else(|| Error::NoConstructor {
            class: class.name().to_string(),
            signature: signature(&params),
        })?;

    let mut args = Vec::with_capacity(params.len());
    for (property, ty) in config.constructor_properties().iter().zip(&params) {
        let expr = config.property_value_expression(property).ok_or_else(|| {
            Error::MissingConstructorProperty {
                kind,
                name: name.to_string(),
                property: property.clone(),
            }
        })?;
        args.push(resolve(state, property, *ty, Some(expr), true)?.produce(state)?);
    }
    constructor.instantiate(&args)
}

/// Constructor-only properties resolve to nothing: there is no setter to call.
/// A removal resolves to null, except for primitives which keep their value.
fn prepare_property(
    state: &ConfigState,
    kind: EntityKind,
    name: &str,
    property: &str,
    value: Option<&ValueExpression>,
) -> Result<Prepared, Error> {
    let config = state.object_entry(kind, name)?;
    let Some(descriptor) = config.class().property(property) else {
        if config.constructor_properties().iter().any(|p| p == property) {
            return Ok(Prepared::Nothing);
        }
        return Err(Error::NoSuchProperty {
            class: config.class_name().to_string(),
            property: property.to_string(),
        });
    };
    if !descriptor.is_writable() || (value.is_none() && descriptor.ty().is_primitive()) {
        return Ok(Prepared::Nothing);
    }
    resolve(state, property, descriptor.ty(), value, false).map(Prepared::Value)
}

fn apply_property(
    state: &ConfigState,
    kind: EntityKind,
    name: &str,
    property: &str,
    producer: &ValueProducer,
) -> Result<(), Error> {
    let Some(instance) = state.live_instance(kind, name) else {
        return Ok(());
    };
    let config = state.object_entry(kind, name)?;
    let Some(descriptor) = config.class().property(property) else {
        return Ok(());
    };
    let value = producer.produce(state)?;
    descriptor
        .set(instance, &value)
        .map_err(|e| Error::invocation(format!("setting {property} on {kind} \"{name}\""), e))
}

/// Pushes a restored value back into the live object, if there is one.
fn reapply(
    state: &ConfigState,
    kind: EntityKind,
    name: &str,
    property: &str,
    previous: &ValueExpression,
) -> Result<(), Error> {
    if state.live_instance(kind, name).is_none() {
        return Ok(());
    }
    if let Prepared::Value(producer) = prepare_property(state, kind, name, property, Some(previous))? {
        apply_property(state, kind, name, property, &producer)?;
    }
    Ok(())
}

fn live_logger(state: &ConfigState, name: &str) -> Result<Arc<Logger>, Error> {
    state
        .loggers
        .live(name)
        .cloned()
        .ok_or_else(|| not_live(EntityKind::Logger, name))
}

fn handler_names_mut<'a>(
    state: &'a mut ConfigState,
    owner: &HandlerOwner,
) -> Result<&'a mut Vec<String>, Error> {
    match owner {
        HandlerOwner::Logger(name) => state
            .loggers
            .entry_mut(name)
            .map(|c| &mut c.handler_names)
            .ok_or_else(|| unknown(EntityKind::Logger, name)),
        HandlerOwner::Handler(name) => state
            .handlers
            .entry_mut(name)
            .map(|c| &mut c.handler_names)
            .ok_or_else(|| unknown(EntityKind::Handler, name)),
    }
}

/// Walks the configured nesting from `names` and fails if it leads back to
/// a handler owner.
fn reject_cycle(state: &ConfigState, owner: &HandlerOwner, names: &[String]) -> Result<(), Error> {
    let HandlerOwner::Handler(owner) = owner else {
        return Ok(());
    };
    let mut seen = HashSet::new();
    let mut pending: Vec<&str> = names.iter().map(String::as_str).collect();
    while let Some(name) = pending.pop() {
        if name == owner.as_str() {
            return Err(Error::invalid_value(
                "handlers",
                name,
                format!("handler \"{owner}\" would contain itself"),
            ));
        }
        if !seen.insert(name) {
            continue;
        }
        if let Some(config) = state.handlers.get(name) {
            pending.extend(config.handler_names.iter().map(String::as_str));
        }
    }
    Ok(())
}

/// Live side of a [`HandlerOwner`].
enum LiveOwner {
    Logger(Arc<Logger>),
    Handler(Arc<dyn Handler>),
}

fn live_owner(state: &ConfigState, owner: &HandlerOwner) -> Result<LiveOwner, Error> {
    match owner {
        HandlerOwner::Logger(name) => live_logger(state, name).map(LiveOwner::Logger),
        HandlerOwner::Handler(name) => state
            .live_handler(name)
            .map(LiveOwner::Handler)
            .ok_or_else(|| not_live(EntityKind::Handler, name)),
    }
}

impl LiveOwner {
    fn set_handlers(&self, handlers: Vec<Arc<dyn Handler>>) -> Result<(), Error> {
        match self {
            Self::Logger(logger) => {
                logger.set_handlers(handlers);
                Ok(())
            }
            Self::Handler(handler) => handler.set_handlers(handlers),
        }
    }

    fn add_handler(&self, handler: Arc<dyn Handler>) -> Result<(), Error> {
        let mut handlers = self.handlers();
        if handlers.iter().any(|h| Arc::ptr_eq(h, &handler)) {
            return Ok(());
        }
        match self {
            Self::Logger(logger) => {
                logger.add_handler(handler);
                Ok(())
            }
            Self::Handler(owner) => {
                handlers.push(handler);
                owner.set_handlers(handlers)
            }
        }
    }

    fn remove_handler(&self, handler: &Arc<dyn Handler>) -> Result<(), Error> {
        match self {
            Self::Logger(logger) => {
                logger.remove_handler(handler);
                Ok(())
            }
            Self::Handler(owner) => {
                let mut handlers = owner.handlers();
                handlers.retain(|h| !Arc::ptr_eq(h, handler));
                owner.set_handlers(handlers)
            }
        }
    }

    fn handlers(&self) -> Vec<Arc<dyn Handler>> {
        match self {
            Self::Logger(logger) => logger.handlers(),
            Self::Handler(handler) => handler.handlers(),
        }
    }
}
