//! logweave's own diagnostic logger. Suppressed apply and rollback failures
//! from configuration commits end up here, routed through the crate's own
//! runtime so they get the same handlers and formatting as anything else.
//!
//! Uses `OnceLock` so the logger is initialized exactly once, even if
//! several entry points race to call `init`.

use crate::error_managers::OnlyOnceErrorManager;
use crate::formatters::PatternFormatter;
use crate::handlers::{ConsoleHandler, Target};
use crate::level::Level;
use crate::runtime::{Handler, LogContext, Logger};
use std::sync::{Arc, OnceLock};

/// Name of the diagnostic root; scopes become children such as `logweave.commit`.
pub const ROOT: &str = "logweave";

static INTERNAL_CONTEXT: OnceLock<Arc<LogContext>> = OnceLock::new();

/// Warnings and errors only, unless initialized otherwise.
pub fn init() {
    init_with_level(Level::Warn);
}

/// Only the first call takes effect; later calls are no-ops.
pub fn init_with_level(level: Level) {
    let was_init = INTERNAL_CONTEXT.get().is_some();
    INTERNAL_CONTEXT.get_or_init(|| build_context(level));
    if !was_init {
        debug("INTERNAL", &format!("Diagnostic logger ready at {level}"));
    }
}

/// The diagnostic root logger, for attaching extra handlers.
#[must_use]
pub fn logger() -> Arc<Logger> {
    context().logger(ROOT)
}

fn context() -> &'static Arc<LogContext> {
    INTERNAL_CONTEXT.get_or_init(|| build_context(Level::Warn))
}

fn build_context(level: Level) -> Arc<LogContext> {
    let context = LogContext::new();
    let root = context.logger(ROOT);
    root.set_level(Some(level));
    root.set_use_parent_handlers(false);

    let console = ConsoleHandler::new(Target::Stderr);
    console.core().set_formatter(Some(Arc::new(PatternFormatter::new(
        "{timestamp} {level} [{logger}] {msg}",
    ))));
    // A failing stderr must not report back into itself forever.
    console
        .core()
        .set_error_manager(Some(Arc::new(OnlyOnceErrorManager::new())));
    root.add_handler(Arc::new(console));
    context
}

fn scoped(scope: &str) -> String {
    format!("{ROOT}.{}", scope.to_lowercase())
}

fn log(level: Level, scope: &str, msg: &str) {
    context().logger(&scoped(scope)).log(level, msg);
}

/// Whether `level` would pass for `scope`, without creating its logger.
/// Lets callers skip building expensive messages.
#[must_use]
pub fn enabled(scope: &str, level: Level) -> bool {
    let context = context();
    context
        .find_logger(&scoped(scope))
        .unwrap_or_else(|| context.logger(ROOT))
        .is_loggable(level)
}

/// High-volume instrumentation.
pub fn trace(scope: &str, msg: &str) {
    log(Level::Trace, scope, msg);
}

/// Transaction milestones and handler lifecycle details.
pub fn debug(scope: &str, msg: &str) {
    log(Level::Debug, scope, msg);
}

pub fn info(scope: &str, msg: &str) {
    log(Level::Info, scope, msg);
}

/// Non-fatal anomalies such as a skipped reference.
pub fn warn(scope: &str, msg: &str) {
    log(Level::Warn, scope, msg);
}

/// Failures that were suppressed instead of returned.
pub fn error(scope: &str, msg: &str) {
    log(Level::Error, scope, msg);
}
