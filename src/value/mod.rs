//! Typed values flowing from configuration strings into live objects.
//!
//! A property declares a [`ValueType`]; the [`resolver`] turns a
//! [`ValueExpression`] into a [`ValueProducer`] for that type, and the producer
//! yields the [`Value`] handed to a setter or constructor at apply time.

mod expression;
mod producer;
pub(crate) mod resolver;

pub use expression::ValueExpression;
pub use producer::ValueProducer;

use crate::error::Error;
use crate::level::Level;
use crate::runtime::{Charset, ErrorManager, Filter, Formatter, Handler, TimeZone};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Declared type of a constructor parameter or property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Bool,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Char,
    String,
    /// Closed set of names, matched case-sensitively.
    Enum(&'static [&'static str]),
    TimeZone,
    Charset,
    Level,
    Handler,
    Filter,
    Formatter,
    ErrorManager,
    /// Any configured POJO.
    Object,
}

impl ValueType {
    /// Primitive types have no null.
    #[must_use]
    pub const fn is_primitive(self) -> bool {
        matches!(
            self,
            Self::Bool
                | Self::Byte
                | Self::Short
                | Self::Int
                | Self::Long
                | Self::Float
                | Self::Double
                | Self::Char
        )
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Byte => "byte",
            Self::Short => "short",
            Self::Int => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
            Self::Char => "char",
            Self::String => "string",
            Self::Enum(_) => "enum",
            Self::TimeZone => "time zone",
            Self::Charset => "charset",
            Self::Level => "level",
            Self::Handler => "handler",
            Self::Filter => "filter",
            Self::Formatter => "formatter",
            Self::ErrorManager => "error manager",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A resolved value, ready to pass to a setter or constructor.
#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Char(char),
    String(String),
    TimeZone(TimeZone),
    Charset(Charset),
    Level(Level),
    Handler(Arc<dyn Handler>),
    Filter(Arc<dyn Filter>),
    Formatter(Arc<dyn Formatter>),
    ErrorManager(Arc<dyn ErrorManager>),
    Object(Arc<dyn Any + Send + Sync>),
}

impl Value {
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Byte(_) => "byte",
            Self::Short(_) => "short",
            Self::Int(_) => "int",
            Self::Long(_) => "long",
            Self::Float(_) => "float",
            Self::Double(_) => "double",
            Self::Char(_) => "char",
            Self::String(_) => "string",
            Self::TimeZone(_) => "time zone",
            Self::Charset(_) => "charset",
            Self::Level(_) => "level",
            Self::Handler(_) => "handler",
            Self::Filter(_) => "filter",
            Self::Formatter(_) => "formatter",
            Self::ErrorManager(_) => "error manager",
            Self::Object(_) => "object",
        }
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    fn mismatch(&self, expected: &str) -> Error {
        Error::TypeMismatch {
            expected: expected.to_string(),
            found: self.type_name().to_string(),
        }
    }

    /// # Errors
    /// `Error::TypeMismatch` unless this is a bool.
    pub fn as_bool(&self) -> Result<bool, Error> {
        match self {
            Self::Bool(v) => Ok(*v),
            other => Err(other.mismatch("bool")),
        }
    }

    /// Any integral value that fits.
    ///
    /// # Errors
    /// `Error::TypeMismatch` for non-integral values.
    pub fn as_i64(&self) -> Result<i64, Error> {
        match self {
            Self::Byte(v) => Ok(i64::from(*v)),
            Self::Short(v) => Ok(i64::from(*v)),
            Self::Int(v) => Ok(i64::from(*v)),
            Self::Long(v) => Ok(*v),
            other => Err(other.mismatch("integer")),
        }
    }

    /// # Errors
    /// `Error::TypeMismatch` for non-numeric values.
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Result<f64, Error> {
        match self {
            Self::Float(v) => Ok(f64::from(*v)),
            Self::Double(v) => Ok(*v),
            other => other.as_i64().map(|v| v as f64),
        }
    }

    /// # Errors
    /// `Error::TypeMismatch` unless this is a char.
    pub fn as_char(&self) -> Result<char, Error> {
        match self {
            Self::Char(v) => Ok(*v),
            other => Err(other.mismatch("char")),
        }
    }

    /// `None` for null.
    ///
    /// # Errors
    /// `Error::TypeMismatch` for anything but a string or null.
    pub fn as_str(&self) -> Result<Option<&str>, Error> {
        match self {
            Self::Null => Ok(None),
            Self::String(v) => Ok(Some(v)),
            other => Err(other.mismatch("string")),
        }
    }

    /// # Errors
    /// `Error::TypeMismatch` for anything but a level or null.
    pub fn as_level(&self) -> Result<Option<Level>, Error> {
        match self {
            Self::Null => Ok(None),
            Self::Level(v) => Ok(Some(*v)),
            other => Err(other.mismatch("level")),
        }
    }

    /// # Errors
    /// `Error::TypeMismatch` for anything but a time zone or null.
    pub fn as_time_zone(&self) -> Result<Option<TimeZone>, Error> {
        match self {
            Self::Null => Ok(None),
            Self::TimeZone(v) => Ok(Some(*v)),
            other => Err(other.mismatch("time zone")),
        }
    }

    /// # Errors
    /// `Error::TypeMismatch` for anything but a charset or null.
    pub fn as_charset(&self) -> Result<Option<Charset>, Error> {
        match self {
            Self::Null => Ok(None),
            Self::Charset(v) => Ok(Some(*v)),
            other => Err(other.mismatch("charset")),
        }
    }

    /// # Errors
    /// `Error::TypeMismatch` for anything but a handler or null.
    pub fn as_handler(&self) -> Result<Option<Arc<dyn Handler>>, Error> {
        match self {
            Self::Null => Ok(None),
            Self::Handler(v) => Ok(Some(Arc::clone(v))),
            other => Err(other.mismatch("handler")),
        }
    }

    /// # Errors
    /// `Error::TypeMismatch` for anything but a filter or null.
    pub fn as_filter(&self) -> Result<Option<Arc<dyn Filter>>, Error> {
        match self {
            Self::Null => Ok(None),
            Self::Filter(v) => Ok(Some(Arc::clone(v))),
            other => Err(other.mismatch("filter")),
        }
    }

    /// # Errors
    /// `Error::TypeMismatch` for anything but a formatter or null.
    pub fn as_formatter(&self) -> Result<Option<Arc<dyn Formatter>>, Error> {
        match self {
            Self::Null => Ok(None),
            Self::Formatter(v) => Ok(Some(Arc::clone(v))),
            other => Err(other.mismatch("formatter")),
        }
    }

    /// # Errors
    /// `Error::TypeMismatch` for anything but an error manager or null.
    pub fn as_error_manager(&self) -> Result<Option<Arc<dyn ErrorManager>>, Error> {
        match self {
            Self::Null => Ok(None),
            Self::ErrorManager(v) => Ok(Some(Arc::clone(v))),
            other => Err(other.mismatch("error manager")),
        }
    }

    /// Downcasts a POJO value.
    ///
    /// # Errors
    /// `Error::TypeMismatch` when this is not an object of type `T`.
    pub fn as_object<T: Any + Send + Sync>(&self) -> Result<Option<Arc<T>>, Error> {
        match self {
            Self::Null => Ok(None),
            Self::Object(v) => Arc::clone(v)
                .downcast::<T>()
                .map(Some)
                .map_err(|_| self.mismatch(std::any::type_name::<T>())),
            other => Err(other.mismatch("object")),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Bool(v) => write!(f, "Bool({v})"),
            Self::Byte(v) => write!(f, "Byte({v})"),
            Self::Short(v) => write!(f, "Short({v})"),
            Self::Int(v) => write!(f, "Int({v})"),
            Self::Long(v) => write!(f, "Long({v})"),
            Self::Float(v) => write!(f, "Float({v})"),
            Self::Double(v) => write!(f, "Double({v})"),
            Self::Char(v) => write!(f, "Char({v:?})"),
            Self::String(v) => write!(f, "String({v:?})"),
            Self::TimeZone(v) => write!(f, "TimeZone({v})"),
            Self::Charset(v) => write!(f, "Charset({v})"),
            Self::Level(v) => write!(f, "Level({v})"),
            Self::Handler(v) => write!(f, "Handler({v:?})"),
            Self::Filter(v) => write!(f, "Filter({v:?})"),
            Self::Formatter(v) => write!(f, "Formatter({v:?})"),
            Self::ErrorManager(v) => write!(f, "ErrorManager({v:?})"),
            Self::Object(_) => f.write_str("Object(..)"),
        }
    }
}

/// Equality for scalars; references compare by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Byte(a), Self::Byte(b)) => a == b,
            (Self::Short(a), Self::Short(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Long(a), Self::Long(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::Double(a), Self::Double(b)) => a.to_bits() == b.to_bits(),
            (Self::Char(a), Self::Char(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::TimeZone(a), Self::TimeZone(b)) => a == b,
            (Self::Charset(a), Self::Charset(b)) => a == b,
            (Self::Level(a), Self::Level(b)) => a == b,
            (Self::Handler(a), Self::Handler(b)) => Arc::ptr_eq(a, b),
            (Self::Filter(a), Self::Filter(b)) => Arc::ptr_eq(a, b),
            (Self::Formatter(a), Self::Formatter(b)) => Arc::ptr_eq(a, b),
            (Self::ErrorManager(a), Self::ErrorManager(b)) => Arc::ptr_eq(a, b),
            (Self::Object(a), Self::Object(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}
