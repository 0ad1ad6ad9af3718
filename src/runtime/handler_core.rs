//! Settings every handler shares, behind interior locks so a live handler can
//! be reconfigured while other threads publish through it.

use super::encoding::Charset;
use super::record::LogRecord;
use super::traits::{ErrorCode, ErrorManager, Filter, Formatter, default_format};
use super::{lock_read, lock_write};
use crate::error::Error;
use crate::internal;
use crate::level::Level;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

#[derive(Debug, Default)]
pub struct HandlerCore {
    level: RwLock<Level>,
    formatter: RwLock<Option<Arc<dyn Formatter>>>,
    filter: RwLock<Option<Arc<dyn Filter>>>,
    error_manager: RwLock<Option<Arc<dyn ErrorManager>>>,
    encoding: RwLock<Option<Charset>>,
    closed: AtomicBool,
}

impl HandlerCore {
    /// Level `All`: a fresh handler publishes whatever its logger lets through.
    #[must_use]
    pub fn new() -> Self {
        Self {
            level: RwLock::new(Level::All),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn level(&self) -> Level {
        *lock_read(&self.level)
    }

    pub fn set_level(&self, level: Level) {
        *lock_write(&self.level) = level;
    }

    #[must_use]
    pub fn formatter(&self) -> Option<Arc<dyn Formatter>> {
        lock_read(&self.formatter).clone()
    }

    pub fn set_formatter(&self, formatter: Option<Arc<dyn Formatter>>) {
        *lock_write(&self.formatter) = formatter;
    }

    #[must_use]
    pub fn filter(&self) -> Option<Arc<dyn Filter>> {
        lock_read(&self.filter).clone()
    }

    pub fn set_filter(&self, filter: Option<Arc<dyn Filter>>) {
        *lock_write(&self.filter) = filter;
    }

    #[must_use]
    pub fn error_manager(&self) -> Option<Arc<dyn ErrorManager>> {
        lock_read(&self.error_manager).clone()
    }

    pub fn set_error_manager(&self, error_manager: Option<Arc<dyn ErrorManager>>) {
        *lock_write(&self.error_manager) = error_manager;
    }

    #[must_use]
    pub fn encoding(&self) -> Option<Charset> {
        *lock_read(&self.encoding)
    }

    pub fn set_encoding(&self, encoding: Option<Charset>) {
        *lock_write(&self.encoding) = encoding;
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub(crate) fn mark_closed(&self) {
        self.closed.store(true, Ordering::Release);
    }

    /// Level and filter gate. Returns the record as the filter left it.
    #[must_use]
    pub fn accept(&self, record: &LogRecord) -> Option<LogRecord> {
        if self.is_closed() || record.level < self.level() {
            return None;
        }
        let mut record = record.clone();
        match self.filter() {
            Some(filter) if !filter.is_loggable(&mut record) => None,
            _ => Some(record),
        }
    }

    #[must_use]
    pub fn format(&self, record: &LogRecord) -> String {
        self.formatter()
            .map_or_else(|| default_format(record), |f| f.format(record))
    }

    /// Text to bytes with the configured encoding, UTF-8 when unset.
    #[must_use]
    pub fn encode(&self, text: &str) -> Vec<u8> {
        self.encoding().unwrap_or_default().encode(text)
    }

    /// Routes a failure to the error manager, or to the diagnostic log when none is set.
    pub fn report(&self, message: &str, error: Option<&Error>, code: ErrorCode) {
        if let Some(manager) = self.error_manager() {
            manager.error(message, error, code);
        } else {
            let detail = error.map_or_else(String::new, |e| format!(": {e}"));
            internal::error("HANDLER", &format!("{message} ({code:?}){detail}"));
        }
    }
}
