//! TOML configuration files: loading with `source = "..."` includes, applying
//! a file to a [`LogContextConfiguration`], and writing the model back out.
//!
//! Loading is kept apart from the schema so the file handling (includes,
//! cycle detection, merge order) does not leak into the serde structs.

mod structs;

pub use structs::{LoggerSection, ObjectSection, PropertyValue};

use crate::configuration::{EntityKind, LogContextConfiguration, ObjectConfigMut, ObjectConfiguration};
use crate::error::Error;
use crate::internal;
use crate::value::ValueExpression;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Everything a configuration file can declare.
///
/// ```toml
/// [handlers.console]
/// class = "logweave.handlers.ConsoleHandler"
/// constructor_properties = ["target"]
/// properties = { target = "stderr", level = "${APP_LEVEL:-INFO}" }
///
/// [loggers."app.db"]
/// level = "DEBUG"
/// handlers = ["console"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub pojos: IndexMap<String, ObjectSection>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub error_managers: IndexMap<String, ObjectSection>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub filters: IndexMap<String, ObjectSection>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub formatters: IndexMap<String, ObjectSection>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub handlers: IndexMap<String, ObjectSection>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub loggers: IndexMap<String, LoggerSection>,
}

/// Scans raw TOML for `source = "..."` directives before deserialization,
/// since serde cannot handle them. Returns the extracted paths and the
/// remaining TOML content stripped of those lines.
#[doc(hidden)]
#[must_use]
pub fn extract_sources(content: &str) -> (Vec<String>, String) {
    let mut sources = Vec::new();
    let mut remaining = String::new();

    for line in content.lines() {
        let trimmed = line.trim();
        let directive = trimmed
            .strip_prefix("source")
            .map(str::trim_start)
            .and_then(|rest| rest.strip_prefix('='));
        if let Some(value) = directive {
            let path = value.trim().trim_matches('"').trim_matches('\'');
            if !path.is_empty() {
                sources.push(path.to_string());
            }
        } else {
            remaining.push_str(line);
            remaining.push('\n');
        }
    }

    (sources, remaining)
}

impl LoggingConfig {
    /// Loads the user's file from the platform config directory, with
    /// includes resolved.
    ///
    /// # Errors
    /// Fails if the config directory can't be determined, a file can't be
    /// read or parsed, or includes form a cycle.
    pub fn load() -> Result<Self, Error> {
        internal::debug("CONFIG", "Loading config from default location");
        let path = Self::config_path()?;
        let config = Self::load_with_sources(&path, &mut HashSet::new())?;
        internal::info("CONFIG", &format!("Config loaded from {}", path.display()));
        Ok(config)
    }

    /// # Errors
    /// Returns error if the file cannot be read, parsed, or contains cyclic includes.
    pub fn load_from(path: &Path) -> Result<Self, Error> {
        Self::load_with_sources(path, &mut HashSet::new())
    }

    /// Parses a single document. `source` lines are ignored here since there
    /// is no file to resolve them against.
    ///
    /// # Errors
    /// `Error::ConfigParse` on malformed TOML.
    pub fn from_toml_str(content: &str) -> Result<Self, Error> {
        let (sources, toml_content) = extract_sources(content);
        if !sources.is_empty() {
            internal::warn(
                "CONFIG",
                &format!("Ignoring {} source lines in inline config", sources.len()),
            );
        }
        Ok(toml::from_str(&toml_content)?)
    }

    /// `logging.toml` under the platform config directory.
    ///
    /// # Errors
    /// `Error::ConfigDirNotFound` when the platform has no config directory.
    pub fn config_path() -> Result<PathBuf, Error> {
        directories::BaseDirs::new()
            .map(|dirs| dirs.config_dir().join("logweave").join("logging.toml"))
            .ok_or(Error::ConfigDirNotFound)
    }

    fn load_with_sources(path: &Path, seen: &mut HashSet<PathBuf>) -> Result<Self, Error> {
        if !path.exists() {
            internal::debug("CONFIG", "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        if !seen.insert(canonical.clone()) {
            internal::warn(
                "CONFIG",
                &format!("Cyclic include detected: {}", canonical.display()),
            );
            return Err(Error::CyclicInclude(canonical));
        }

        let content = fs::read_to_string(path)?;
        let (sources, toml_content) = extract_sources(&content);
        let mut config: Self = toml::from_str(&toml_content)?;

        for source in sources {
            internal::debug("CONFIG", &format!("Processing source: {source}"));
            let expanded = shellexpand::tilde(&source);
            let mut source_file = PathBuf::from(expanded.as_ref());
            if source_file.is_relative()
                && let Some(dir) = path.parent()
            {
                source_file = dir.join(source_file);
            }
            if source_file.exists() {
                let included = Self::load_with_sources(&source_file, seen)?;
                config.merge(included);
            } else {
                internal::warn("CONFIG", &format!("Source file not found: {source}"));
            }
        }

        Ok(config)
    }

    /// Adds sections from an included file. Names already present keep
    /// their own definition.
    pub fn merge(&mut self, other: Self) {
        merge_sections(&mut self.pojos, other.pojos);
        merge_sections(&mut self.error_managers, other.error_managers);
        merge_sections(&mut self.filters, other.filters);
        merge_sections(&mut self.formatters, other.formatters);
        merge_sections(&mut self.handlers, other.handlers);
        merge_sections(&mut self.loggers, other.loggers);
    }

    /// # Errors
    /// `Error::ConfigSerialize` if the model holds something TOML cannot express.
    pub fn to_toml_string(&self) -> Result<String, Error> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Captures the configuration model, keeping `${...}` expressions as written.
    #[must_use]
    pub fn snapshot(config: &LogContextConfiguration) -> Self {
        let mut snapshot = Self::default();
        for kind in EntityKind::OBJECTS {
            let sections = snapshot.objects_mut(kind);
            for name in config.names(kind) {
                let Some(object) = config.object_configuration(kind, &name) else {
                    continue;
                };
                let mut section = object_section(object);
                if kind == EntityKind::Handler
                    && let Some(handler) = config.handler_configuration(&name)
                {
                    section.handlers = handler.handler_names().to_vec();
                }
                sections.insert(name, section);
            }
        }
        for name in config.logger_names() {
            let Some(logger) = config.logger_configuration(&name) else {
                continue;
            };
            let text = |e: Option<&ValueExpression>| e.map(|e| e.source_text().to_string());
            snapshot.loggers.insert(
                name,
                LoggerSection {
                    level: text(logger.level()),
                    filter: text(logger.filter()),
                    use_parent_handlers: text(logger.use_parent_handlers()).map(PropertyValue::Text),
                    handlers: logger.handler_names().to_vec(),
                },
            );
        }
        snapshot
    }

    /// Queues the changes that bring `config` in line with this file:
    /// entries missing from the file are removed, matching ones updated, new
    /// ones added. Nothing reaches the live context until the caller commits.
    ///
    /// # Errors
    /// `Error::DuplicateName` when a configured name would change class,
    /// module or constructor properties; anything adding or editing an entry
    /// can fail with. Changes queued before the failure stay queued so the
    /// caller can `forget` them.
    pub fn apply(&self, config: &mut LogContextConfiguration) -> Result<(), Error> {
        internal::debug("CONFIG", "Applying config file to configuration");

        for name in config.logger_names() {
            if !self.loggers.contains_key(&name) {
                config.remove_logger_configuration(&name);
            }
        }
        for kind in EntityKind::OBJECTS.iter().rev() {
            let sections = self.objects(*kind);
            for name in config.names(*kind) {
                if !sections.contains_key(&name) {
                    remove_object(config, *kind, &name);
                }
            }
        }

        for kind in EntityKind::OBJECTS.iter().rev() {
            for (name, section) in self.objects(*kind) {
                apply_object(config, *kind, name, section)?;
            }
        }
        for (name, section) in &self.loggers {
            apply_logger(config, name, section)?;
        }
        Ok(())
    }

    fn objects(&self, kind: EntityKind) -> &IndexMap<String, ObjectSection> {
        match kind {
            EntityKind::Handler => &self.handlers,
            EntityKind::Formatter => &self.formatters,
            EntityKind::Filter => &self.filters,
            EntityKind::ErrorManager => &self.error_managers,
            EntityKind::Pojo | EntityKind::Logger => &self.pojos,
        }
    }

    fn objects_mut(&mut self, kind: EntityKind) -> &mut IndexMap<String, ObjectSection> {
        match kind {
            EntityKind::Handler => &mut self.handlers,
            EntityKind::Formatter => &mut self.formatters,
            EntityKind::Filter => &mut self.filters,
            EntityKind::ErrorManager => &mut self.error_managers,
            EntityKind::Pojo | EntityKind::Logger => &mut self.pojos,
        }
    }
}

fn merge_sections<S>(into: &mut IndexMap<String, S>, from: IndexMap<String, S>) {
    for (name, section) in from {
        into.entry(name).or_insert(section);
    }
}

fn object_section(object: &ObjectConfiguration) -> ObjectSection {
    ObjectSection {
        module: object.module_name().map(str::to_string),
        class: object.class_name().to_string(),
        constructor_properties: object.constructor_properties().to_vec(),
        post_configuration: object.post_configuration_methods().to_vec(),
        handlers: Vec::new(),
        properties: object
            .property_names()
            .into_iter()
            .filter_map(|p| {
                object
                    .property_value_expression(p)
                    .map(|e| (p.to_string(), PropertyValue::Text(e.source_text().to_string())))
            })
            .collect(),
    }
}

fn remove_object(config: &mut LogContextConfiguration, kind: EntityKind, name: &str) -> bool {
    match kind {
        EntityKind::Handler => config.remove_handler_configuration(name),
        EntityKind::Formatter => config.remove_formatter_configuration(name),
        EntityKind::Filter => config.remove_filter_configuration(name),
        EntityKind::ErrorManager => config.remove_error_manager_configuration(name),
        EntityKind::Pojo => config.remove_pojo_configuration(name),
        EntityKind::Logger => config.remove_logger_configuration(name),
    }
}

fn apply_object(
    config: &mut LogContextConfiguration,
    kind: EntityKind,
    name: &str,
    section: &ObjectSection,
) -> Result<(), Error> {
    let constructor: Vec<&str> = section
        .constructor_properties
        .iter()
        .map(String::as_str)
        .collect();

    if let Some(existing) = config.object_configuration(kind, name) {
        let same_shape = existing.class_name() == section.class
            && existing.module_name() == section.module.as_deref()
            && existing.constructor_properties() == section.constructor_properties.as_slice();
        if !same_shape {
            return Err(Error::DuplicateName {
                kind,
                name: name.to_string(),
            });
        }
    } else {
        let module = section.module.as_deref();
        let class = section.class.as_str();
        match kind {
            EntityKind::Handler => {
                config.add_handler_configuration(module, class, name, &constructor)?;
            }
            EntityKind::Formatter => {
                config.add_formatter_configuration(module, class, name, &constructor)?;
            }
            EntityKind::Filter => {
                config.add_filter_configuration(module, class, name, &constructor)?;
            }
            EntityKind::ErrorManager => {
                config.add_error_manager_configuration(module, class, name, &constructor)?;
            }
            EntityKind::Pojo | EntityKind::Logger => {
                config.add_pojo_configuration(module, class, name, &constructor)?;
            }
        }
    }

    let Some(mut object) = config.object_configuration_mut(kind, name) else {
        return Err(Error::UnknownName {
            kind,
            name: name.to_string(),
        });
    };
    sync_properties(&mut object, section)?;
    if object.post_configuration_methods() != section.post_configuration.as_slice() {
        object.set_post_configuration_methods(section.post_configuration.iter().cloned())?;
    }

    if kind == EntityKind::Handler {
        if let Some(mut handler) = config.handler_configuration_mut(name)
            && handler.handler_names() != section.handlers.as_slice()
        {
            handler.set_handler_names(section.handlers.iter().cloned());
        }
    } else if !section.handlers.is_empty() {
        internal::warn(
            "CONFIG",
            &format!("Ignoring handlers listed on {kind} \"{name}\""),
        );
    }
    Ok(())
}

fn sync_properties(object: &mut ObjectConfigMut<'_>, section: &ObjectSection) -> Result<(), Error> {
    let stale: Vec<String> = object
        .property_names()
        .into_iter()
        .filter(|p| !section.properties.contains_key(*p))
        .map(str::to_string)
        .collect();
    for property in stale {
        object.remove_property(&property)?;
    }
    for (property, value) in &section.properties {
        let text = value.to_text();
        let unchanged = object
            .property_value_expression(property)
            .is_some_and(|e| e.source_text() == text);
        if !unchanged {
            object.set_property_value_expression(property, ValueExpression::parse(&text))?;
        }
    }
    Ok(())
}

fn apply_logger(
    config: &mut LogContextConfiguration,
    name: &str,
    section: &LoggerSection,
) -> Result<(), Error> {
    if config.logger_configuration(name).is_none() {
        config.add_logger_configuration(name)?;
    }
    let Some(mut logger) = config.logger_configuration_mut(name) else {
        return Err(Error::UnknownName {
            kind: EntityKind::Logger,
            name: name.to_string(),
        });
    };

    let differs = |current: Option<&ValueExpression>, wanted: Option<&str>| {
        current.map(|e| e.source_text()) != wanted
    };
    if differs(logger.level(), section.level.as_deref()) {
        logger.set_level_expression(section.level.as_deref().map(ValueExpression::parse));
    }
    if differs(logger.filter(), section.filter.as_deref()) {
        logger.set_filter_expression(section.filter.as_deref().map(ValueExpression::parse));
    }
    let use_parent = section.use_parent_handlers.as_ref().map(PropertyValue::to_text);
    if differs(logger.use_parent_handlers(), use_parent.as_deref()) {
        logger.set_use_parent_handlers_expression(use_parent.as_deref().map(ValueExpression::parse));
    }
    if logger.handler_names() != section.handlers.as_slice() {
        logger.set_handler_names(section.handlers.iter().cloned());
    }
    Ok(())
}
