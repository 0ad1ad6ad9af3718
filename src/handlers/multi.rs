//! Fans each accepted record out to nested handlers.

use crate::error::Error;
use crate::runtime::{Handler, HandlerCore, LogRecord, lock_read, lock_write};
use std::sync::{Arc, RwLock};

#[derive(Debug)]
pub struct MultiHandler {
    core: HandlerCore,
    handlers: RwLock<Vec<Arc<dyn Handler>>>,
}

impl Default for MultiHandler {
    fn default() -> Self {
        Self {
            core: HandlerCore::new(),
            handlers: RwLock::new(Vec::new()),
        }
    }
}

impl MultiHandler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Handler for MultiHandler {
    fn core(&self) -> &HandlerCore {
        &self.core
    }

    fn write(&self, _record: &LogRecord, _formatted: &str) -> Result<(), Error> {
        Ok(())
    }

    /// Nested handlers format for themselves; this one only gates.
    fn publish(&self, record: &LogRecord) {
        let Some(record) = self.core.accept(record) else {
            return;
        };
        for handler in self.handlers() {
            handler.publish(&record);
        }
    }

    fn flush(&self) -> Result<(), Error> {
        for handler in self.handlers() {
            handler.flush()?;
        }
        Ok(())
    }

    fn set_handlers(&self, handlers: Vec<Arc<dyn Handler>>) -> Result<(), Error> {
        *lock_write(&self.handlers) = handlers;
        Ok(())
    }

    fn handlers(&self) -> Vec<Arc<dyn Handler>> {
        lock_read(&self.handlers).clone()
    }
}
