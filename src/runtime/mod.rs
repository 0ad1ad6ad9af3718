//! The live logging runtime the configuration engine manipulates: a logger
//! hierarchy per [`LogContext`], plus the capability traits for handlers,
//! formatters, filters and error managers.

mod encoding;
mod handler_core;
mod logger;
mod record;
mod traits;
mod zone;

pub use encoding::Charset;
pub use handler_core::HandlerCore;
pub use logger::Logger;
pub use record::LogRecord;
pub use traits::{ErrorCode, ErrorManager, Filter, Formatter, Handler};
pub use zone::TimeZone;

use crate::error::Error;
use crate::level::Level;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A panicking writer must not take every later reader down with it.
pub(crate) fn lock_read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn lock_write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn lock_mutex<T>(lock: &Mutex<T>) -> MutexGuard<'_, T> {
    lock.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One independent logger hierarchy.
#[derive(Debug)]
pub struct LogContext {
    root: Arc<Logger>,
    loggers: RwLock<HashMap<String, Arc<Logger>>>,
}

impl Default for LogContext {
    fn default() -> Self {
        let root = Arc::new(Logger::new("", None));
        root.set_level(Some(Level::Info));
        let mut loggers = HashMap::new();
        loggers.insert(String::new(), Arc::clone(&root));
        Self {
            root,
            loggers: RwLock::new(loggers),
        }
    }
}

impl LogContext {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    #[must_use]
    pub fn root_logger(&self) -> Arc<Logger> {
        Arc::clone(&self.root)
    }

    /// Returns the named logger, creating it and any missing ancestors.
    #[must_use]
    pub fn logger(&self, name: &str) -> Arc<Logger> {
        if let Some(existing) = self.find_logger(name) {
            return existing;
        }
        let parent = parent_name(name).map(|p| self.logger(p));
        let mut loggers = lock_write(&self.loggers);
        Arc::clone(
            loggers
                .entry(name.to_string())
                .or_insert_with(|| Arc::new(Logger::new(name, parent))),
        )
    }

    /// Looks a logger up without creating it.
    #[must_use]
    pub fn find_logger(&self, name: &str) -> Option<Arc<Logger>> {
        lock_read(&self.loggers).get(name).cloned()
    }

    #[must_use]
    pub fn logger_names(&self) -> Vec<String> {
        let mut names: Vec<String> = lock_read(&self.loggers).keys().cloned().collect();
        names.sort();
        names
    }

    /// # Errors
    /// `Error::UnknownLevel` when the name is not a level this context knows.
    pub fn level_for_name(&self, name: &str) -> Result<Level, Error> {
        name.parse()
            .map_err(|_| Error::UnknownLevel(name.to_string()))
    }
}

fn parent_name(name: &str) -> Option<&str> {
    if name.is_empty() {
        return None;
    }
    Some(name.rsplit_once('.').map_or("", |(parent, _)| parent))
}
