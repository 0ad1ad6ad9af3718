//! A node in the logger hierarchy.
//!
//! Every mutator takes `&self`: logging threads keep publishing through a
//! logger while a configuration commit rewires it.

use super::record::LogRecord;
use super::traits::{Filter, Handler};
use super::{lock_read, lock_write};
use crate::level::Level;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

pub struct Logger {
    name: String,
    parent: Option<Arc<Logger>>,
    /// `None` inherits from the parent chain.
    level: RwLock<Option<Level>>,
    filter: RwLock<Option<Arc<dyn Filter>>>,
    handlers: RwLock<Vec<Arc<dyn Handler>>>,
    use_parent_handlers: AtomicBool,
}

impl Logger {
    pub(crate) fn new(name: impl Into<String>, parent: Option<Arc<Self>>) -> Self {
        Self {
            name: name.into(),
            parent,
            level: RwLock::new(None),
            filter: RwLock::new(None),
            handlers: RwLock::new(Vec::new()),
            use_parent_handlers: AtomicBool::new(true),
        }
    }

    /// Dotted name; the root logger is `""`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn parent(&self) -> Option<&Arc<Self>> {
        self.parent.as_ref()
    }

    /// The explicitly set level, if any.
    #[must_use]
    pub fn level(&self) -> Option<Level> {
        *lock_read(&self.level)
    }

    pub fn set_level(&self, level: Option<Level>) {
        *lock_write(&self.level) = level;
    }

    /// Nearest explicit level walking up to the root; `Info` if none is set anywhere.
    #[must_use]
    pub fn effective_level(&self) -> Level {
        let mut node = Some(self);
        while let Some(logger) = node {
            if let Some(level) = logger.level() {
                return level;
            }
            node = logger.parent.as_deref();
        }
        Level::Info
    }

    #[must_use]
    pub fn is_loggable(&self, level: Level) -> bool {
        level != Level::Off && level >= self.effective_level()
    }

    #[must_use]
    pub fn filter(&self) -> Option<Arc<dyn Filter>> {
        lock_read(&self.filter).clone()
    }

    pub fn set_filter(&self, filter: Option<Arc<dyn Filter>>) {
        *lock_write(&self.filter) = filter;
    }

    #[must_use]
    pub fn handlers(&self) -> Vec<Arc<dyn Handler>> {
        lock_read(&self.handlers).clone()
    }

    pub fn set_handlers(&self, handlers: Vec<Arc<dyn Handler>>) {
        *lock_write(&self.handlers) = handlers;
    }

    pub fn add_handler(&self, handler: Arc<dyn Handler>) {
        lock_write(&self.handlers).push(handler);
    }

    /// Removes by identity. Returns whether the handler was attached.
    pub fn remove_handler(&self, handler: &Arc<dyn Handler>) -> bool {
        let mut handlers = lock_write(&self.handlers);
        let before = handlers.len();
        handlers.retain(|h| !Arc::ptr_eq(h, handler));
        handlers.len() != before
    }

    /// Detaches every handler and hands them back.
    pub fn clear_handlers(&self) -> Vec<Arc<dyn Handler>> {
        std::mem::take(&mut *lock_write(&self.handlers))
    }

    #[must_use]
    pub fn use_parent_handlers(&self) -> bool {
        self.use_parent_handlers.load(Ordering::Acquire)
    }

    pub fn set_use_parent_handlers(&self, enabled: bool) {
        self.use_parent_handlers.store(enabled, Ordering::Release);
    }

    /// Level gate, logger filter, then own handlers and ancestors' handlers
    /// until a logger stops delegating to its parent.
    pub fn log(&self, level: Level, msg: &str) {
        if !self.is_loggable(level) {
            return;
        }
        let mut record = LogRecord::new(level, self.name.as_str(), msg);
        if let Some(filter) = self.filter()
            && !filter.is_loggable(&mut record)
        {
            return;
        }
        self.publish(&record);
    }

    fn publish(&self, record: &LogRecord) {
        let mut node = Some(self);
        while let Some(logger) = node {
            for handler in logger.handlers() {
                handler.publish(record);
            }
            if !logger.use_parent_handlers() {
                break;
            }
            node = logger.parent.as_deref();
        }
    }

    pub fn trace(&self, msg: &str) {
        self.log(Level::Trace, msg);
    }

    pub fn debug(&self, msg: &str) {
        self.log(Level::Debug, msg);
    }

    pub fn info(&self, msg: &str) {
        self.log(Level::Info, msg);
    }

    pub fn warn(&self, msg: &str) {
        self.log(Level::Warn, msg);
    }

    pub fn error(&self, msg: &str) {
        self.log(Level::Error, msg);
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("level", &self.level())
            .field("handlers", &lock_read(&self.handlers).len())
            .field("use_parent_handlers", &self.use_parent_handlers())
            .finish_non_exhaustive()
    }
}
