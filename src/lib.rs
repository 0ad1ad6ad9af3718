//! `logweave` - logging framework with transactional runtime configuration.
//!
//! A live [`LogContext`] holds a hierarchy of named loggers feeding pluggable
//! handlers, formatters, filters and error managers. A
//! [`LogContextConfiguration`] edits that context as a transaction:
//! - every change is queued and reflected in the configuration model at once
//! - `commit` validates the whole queue before any of it touches live objects
//! - `forget` reverts the model instead
//!
//! Objects are built from class descriptors registered in a
//! [`reflect::ClassRegistry`], so external modules can contribute their own
//! handler or formatter types next to the built-in ones.
//!
//! # Example
//!
//! ```
//! use logweave::{LogContext, LogContextConfiguration, Level};
//! use logweave::reflect::builtin::{CONSOLE_HANDLER, PATTERN_FORMATTER};
//!
//! let context = LogContext::new();
//! let mut config = LogContextConfiguration::new(context.clone());
//!
//! config
//!     .add_formatter_configuration(None, PATTERN_FORMATTER, "plain", &[])?
//!     .set_property_value_string("pattern", "{level} {logger}: {msg}")?;
//! let mut console = config.add_handler_configuration(None, CONSOLE_HANDLER, "console", &[])?;
//! console.set_level("DEBUG")?;
//! console.set_formatter_name(Some("plain"))?;
//! config.add_logger_configuration("app")?.add_handler_name("console");
//! config.commit()?;
//!
//! let logger = context.logger("app");
//! assert_eq!(logger.handlers().len(), 1);
//! assert!(logger.is_loggable(Level::Info));
//! # Ok::<(), logweave::Error>(())
//! ```
//!
//! Configuration can also come from a TOML file, see [`config::LoggingConfig`].

pub mod config;
pub mod configuration;
pub mod error;
pub mod error_managers;
pub mod filters;
pub mod formatters;
pub mod handlers;
pub mod internal;
pub mod level;
pub mod reflect;
pub mod runtime;
pub mod value;

pub use config::LoggingConfig;
pub use configuration::{EntityKind, LogContextConfiguration};
pub use error::{Error, Result};
pub use level::Level;
pub use runtime::{LogContext, LogRecord, Logger};
pub use value::{Value, ValueExpression, ValueType};
