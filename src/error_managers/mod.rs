//! Built-in error managers.

use crate::error::Error;
use crate::internal;
use crate::runtime::{ErrorCode, ErrorManager};
use std::sync::atomic::{AtomicBool, Ordering};

/// Forwards every handler failure to the diagnostic log.
#[derive(Debug, Default)]
pub struct DiagnosticErrorManager;

impl ErrorManager for DiagnosticErrorManager {
    fn error(&self, message: &str, error: Option<&Error>, code: ErrorCode) {
        match error {
            Some(e) => internal::error("HANDLER", &format!("{message} ({code:?}): {e}")),
            None => internal::error("HANDLER", &format!("{message} ({code:?})")),
        }
    }
}

/// Reports the first failure and swallows the rest, so a broken sink cannot
/// flood the diagnostic log.
#[derive(Debug, Default)]
pub struct OnlyOnceErrorManager {
    reported: AtomicBool,
}

impl OnlyOnceErrorManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn has_reported(&self) -> bool {
        self.reported.load(Ordering::Acquire)
    }
}

impl ErrorManager for OnlyOnceErrorManager {
    fn error(&self, message: &str, error: Option<&Error>, code: ErrorCode) {
        if self.reported.swap(true, Ordering::AcqRel) {
            return;
        }
        DiagnosticErrorManager.error(message, error, code);
    }
}
