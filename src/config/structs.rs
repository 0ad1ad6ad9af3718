//! Configuration file schema.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A property value as written in TOML.
///
/// Everything becomes text before it reaches the configuration model, so
/// `append = true` and `append = "true"` mean the same thing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl PropertyValue {
    #[must_use]
    pub fn to_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// `[loggers."name"]`. Unset keys leave the live logger alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    /// Filter expression.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_parent_handlers: Option<PropertyValue>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub handlers: Vec<String>,
}

/// `[handlers.name]`, `[formatters.name]` and the other class-built sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectSection {
    /// Omit for built-in classes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    pub class: String,
    /// Properties passed to the constructor, in order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub constructor_properties: Vec<String>,
    /// Methods called once configuration is applied.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub post_configuration: Vec<String>,
    /// Nested handlers; handlers only.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub handlers: Vec<String>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, PropertyValue>,
}

impl ObjectSection {
    #[must_use]
    pub fn new(class: &str) -> Self {
        Self {
            class: class.to_string(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn property(mut self, name: &str, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(name.to_string(), value.into());
        self
    }
}
