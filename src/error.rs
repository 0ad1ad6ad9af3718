//! Unified error type for configuration, runtime and config-file operations.

use crate::configuration::EntityKind;
use std::path::PathBuf;

/// Error type for logweave operations.
///
/// Everything except the I/O and config-file variants is an argument error:
/// the caller asked for something the current configuration cannot satisfy.
#[derive(Debug)]
pub enum Error {
    /// A configuration with this name already exists (or is pending removal).
    DuplicateName { kind: EntityKind, name: String },
    /// No visible configuration with this name.
    UnknownName { kind: EntityKind, name: String },
    /// The configuration was removed in the current transaction.
    PendingRemoval { kind: EntityKind, name: String },
    /// The class-loading collaborator has no module with this name.
    ModuleNotFound(String),
    /// The resolved module does not define the class.
    ClassNotFound {
        module: Option<String>,
        class: String,
    },
    /// The class exists but cannot stand in for the requested category.
    NotAssignable { class: String, expected: EntityKind },
    /// Neither a setter nor a constructor parameter exists for the property.
    NoSuchProperty { class: String, property: String },
    /// A constructor property was declared but never given a value.
    MissingConstructorProperty {
        kind: EntityKind,
        name: String,
        property: String,
    },
    /// No constructor matches the constructor-property signature.
    NoConstructor { class: String, signature: String },
    /// Post-configuration method lookup failed.
    NoSuchMethod { class: String, method: String },
    /// A raw value could not be converted to the property type.
    InvalidValue {
        property: String,
        value: String,
        reason: String,
    },
    /// A value of one type was used where another was required.
    TypeMismatch { expected: String, found: String },
    /// Primitive-typed properties cannot be unset.
    NullPrimitive { property: String },
    /// The live context does not know this level name.
    UnknownLevel(String),
    /// Malformed filter expression.
    FilterExpression { expression: String, reason: String },
    /// A constructor factory failed.
    Instantiation { class: String, reason: String },
    /// A setter, method or runtime mutation failed while applying.
    Invocation { target: String, reason: String },
    /// The live object does not support the requested operation.
    Unsupported(String),
    /// I/O error.
    Io(std::io::Error),
    /// TOML config parsing error.
    ConfigParse(toml::de::Error),
    /// TOML config serialization error.
    ConfigSerialize(toml::ser::Error),
    /// Cyclic include detected in config sources.
    CyclicInclude(PathBuf),
    /// Config directory not found.
    ConfigDirNotFound,
}

impl Error {
    /// Structural and validation failures, as opposed to I/O and file parsing.
    #[must_use]
    pub const fn is_argument_error(&self) -> bool {
        !matches!(
            self,
            Self::Io(_)
                | Self::ConfigParse(_)
                | Self::ConfigSerialize(_)
                | Self::CyclicInclude(_)
                | Self::ConfigDirNotFound
        )
    }

    pub(crate) fn invalid_value(
        property: &str,
        value: &str,
        reason: impl std::fmt::Display,
    ) -> Self {
        Self::InvalidValue {
            property: property.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn invocation(target: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Invocation {
            target: target.into(),
            reason: reason.to_string(),
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateName { kind, name } => {
                write!(f, "{kind} \"{name}\" already exists")
            }
            Self::UnknownName { kind, name } => write!(f, "no {kind} named \"{name}\" is defined"),
            Self::PendingRemoval { kind, name } => {
                write!(f, "{kind} \"{name}\" is pending removal")
            }
            Self::ModuleNotFound(module) => write!(f, "module \"{module}\" not found"),
            Self::ClassNotFound { module, class } => match module {
                Some(module) => write!(f, "class \"{class}\" not found in module \"{module}\""),
                None => write!(f, "class \"{class}\" not found"),
            },
            Self::NotAssignable { class, expected } => {
                write!(f, "class \"{class}\" is not a {expected}")
            }
            Self::NoSuchProperty { class, property } => {
                write!(f, "no property \"{property}\" on class \"{class}\"")
            }
            Self::MissingConstructorProperty {
                kind,
                name,
                property,
            } => write!(
                f,
                "no property named \"{property}\" is configured on {kind} \"{name}\""
            ),
            Self::NoConstructor { class, signature } => {
                write!(f, "no constructor ({signature}) in class \"{class}\"")
            }
            Self::NoSuchMethod { class, method } => {
                write!(f, "no method \"{method}\" on class \"{class}\"")
            }
            Self::InvalidValue {
                property,
                value,
                reason,
            } => write!(f, "invalid value \"{value}\" for \"{property}\": {reason}"),
            Self::TypeMismatch { expected, found } => {
                write!(f, "expected {expected}, found {found}")
            }
            Self::NullPrimitive { property } => {
                write!(f, "cannot assign null to primitive property \"{property}\"")
            }
            Self::UnknownLevel(level) => write!(f, "unknown level \"{level}\""),
            Self::FilterExpression { expression, reason } => {
                write!(f, "bad filter expression \"{expression}\": {reason}")
            }
            Self::Instantiation { class, reason } => {
                write!(f, "failed to instantiate \"{class}\": {reason}")
            }
            Self::Invocation { target, reason } => write!(f, "{target} failed: {reason}"),
            Self::Unsupported(what) => write!(f, "unsupported: {what}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::ConfigParse(e) => write!(f, "parse error: {e}"),
            Self::ConfigSerialize(e) => write!(f, "serialize error: {e}"),
            Self::CyclicInclude(p) => write!(f, "cyclic include: {}", p.display()),
            Self::ConfigDirNotFound => write!(f, "config directory not found"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::ConfigParse(e) => Some(e),
            Self::ConfigSerialize(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Self::ConfigParse(e)
    }
}

impl From<toml::ser::Error> for Error {
    fn from(e: toml::ser::Error) -> Self {
        Self::ConfigSerialize(e)
    }
}

/// Crate-wide result alias.
pub type Result<T, E = Error> = std::result::Result<T, E>;
