//! Capability interfaces for the pluggable leaves: handlers, formatters,
//! filters and error managers.

use super::record::LogRecord;
use super::HandlerCore;
use crate::error::Error;
use std::fmt;
use std::sync::Arc;

/// Decides whether a record passes, and may rewrite it on the way through.
pub trait Filter: Send + Sync + fmt::Debug {
    fn is_loggable(&self, record: &mut LogRecord) -> bool;
}

/// Renders a record into the line a handler writes.
pub trait Formatter: Send + Sync + fmt::Debug {
    fn format(&self, record: &LogRecord) -> String;
}

/// What a handler was doing when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Generic,
    Write,
    Flush,
    Close,
    Open,
    Format,
}

/// Receives failures a handler cannot propagate to its caller.
pub trait ErrorManager: Send + Sync + fmt::Debug {
    fn error(&self, message: &str, error: Option<&Error>, code: ErrorCode);
}

/// A sink for log records.
///
/// Implementations hold their shared settings (level, formatter, filter,
/// error manager, encoding) in a [`HandlerCore`] and only provide the write
/// path; `publish` does the gating and formatting.
pub trait Handler: Send + Sync + fmt::Debug {
    fn core(&self) -> &HandlerCore;

    /// Emits one already formatted line.
    ///
    /// # Errors
    /// I/O errors from the underlying sink.
    fn write(&self, record: &LogRecord, formatted: &str) -> Result<(), Error>;

    /// # Errors
    /// I/O errors from the underlying sink.
    fn flush(&self) -> Result<(), Error> {
        Ok(())
    }

    /// Releases held resources. Further records are dropped.
    fn close(&self) {
        self.core().mark_closed();
        if let Err(e) = self.flush() {
            self.core().report("flush on close failed", Some(&e), ErrorCode::Close);
        }
    }

    fn publish(&self, record: &LogRecord) {
        let core = self.core();
        let Some(record) = core.accept(record) else {
            return;
        };
        let formatted = core.format(&record);
        if let Err(e) = self.write(&record, &formatted) {
            core.report("write failed", Some(&e), ErrorCode::Write);
        }
    }

    /// Replaces nested handlers, for handlers that delegate.
    ///
    /// # Errors
    /// `Error::Unsupported` for handlers that do not contain handlers.
    fn set_handlers(&self, handlers: Vec<Arc<dyn Handler>>) -> Result<(), Error> {
        drop(handlers);
        Err(Error::Unsupported(format!(
            "{self:?} does not contain handlers"
        )))
    }

    fn handlers(&self) -> Vec<Arc<dyn Handler>> {
        Vec::new()
    }
}

/// Renders without a configured formatter.
pub(crate) fn default_format(record: &LogRecord) -> String {
    format!(
        "{:<5} [{}] {}",
        record.level.as_str(),
        record.logger_name,
        record.message
    )
}
