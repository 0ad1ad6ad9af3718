//! The unit every logger, filter, formatter and handler works on.

use crate::level::Level;
use chrono::{DateTime, Utc};

/// Carries all data a handler needs to render one log line.
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub level: Level,
    /// Dotted name of the logger the record was created on.
    pub logger_name: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    /// Name of the emitting thread, when it has one.
    pub thread: Option<String>,
}

impl LogRecord {
    /// Stamps the record with the current time and thread.
    #[must_use]
    pub fn new(level: Level, logger_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            logger_name: logger_name.into(),
            message: message.into(),
            timestamp: Utc::now(),
            thread: std::thread::current().name().map(ToString::to_string),
        }
    }
}
