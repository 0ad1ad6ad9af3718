//! Console output. Default routing sends warnings and worse to stderr and the
//! rest to stdout.

use crate::error::Error;
use crate::level::Level;
use crate::runtime::{Handler, HandlerCore, LogRecord, lock_read, lock_write};
use std::io::{self, Write};
use std::str::FromStr;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

/// Which standard stream receives records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Target {
    Stdout,
    Stderr,
    /// `Warn` and above to stderr, everything else to stdout.
    #[default]
    Split,
}

impl Target {
    /// Names accepted by the `target` property, matched case-sensitively.
    pub const NAMES: &'static [&'static str] = &["stdout", "stderr", "split"];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
            Self::Split => "split",
        }
    }
}

impl FromStr for Target {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stdout" => Ok(Self::Stdout),
            "stderr" => Ok(Self::Stderr),
            "split" => Ok(Self::Split),
            _ => Err(Error::invalid_value("target", s, "expected stdout, stderr or split")),
        }
    }
}

#[derive(Debug)]
pub struct ConsoleHandler {
    core: HandlerCore,
    target: RwLock<Target>,
    autoflush: AtomicBool,
}

impl Default for ConsoleHandler {
    fn default() -> Self {
        Self::new(Target::default())
    }
}

impl ConsoleHandler {
    #[must_use]
    pub fn new(target: Target) -> Self {
        Self {
            core: HandlerCore::new(),
            target: RwLock::new(target),
            autoflush: AtomicBool::new(true),
        }
    }

    #[must_use]
    pub fn target(&self) -> Target {
        *lock_read(&self.target)
    }

    pub fn set_target(&self, target: Target) {
        *lock_write(&self.target) = target;
    }

    #[must_use]
    pub fn autoflush(&self) -> bool {
        self.autoflush.load(Ordering::Acquire)
    }

    pub fn set_autoflush(&self, enabled: bool) {
        self.autoflush.store(enabled, Ordering::Release);
    }

    fn use_stderr(&self, level: Level) -> bool {
        match self.target() {
            Target::Stdout => false,
            Target::Stderr => true,
            Target::Split => level >= Level::Warn,
        }
    }
}

impl Handler for ConsoleHandler {
    fn core(&self) -> &HandlerCore {
        &self.core
    }

    fn write(&self, record: &LogRecord, formatted: &str) -> Result<(), Error> {
        let mut line = self.core.encode(formatted);
        line.push(b'\n');
        if self.use_stderr(record.level) {
            let mut err = io::stderr().lock();
            err.write_all(&line)?;
            if self.autoflush() {
                err.flush()?;
            }
        } else {
            let mut out = io::stdout().lock();
            out.write_all(&line)?;
            if self.autoflush() {
                out.flush()?;
            }
        }
        Ok(())
    }

    fn flush(&self) -> Result<(), Error> {
        io::stdout().flush()?;
        io::stderr().flush()?;
        Ok(())
    }
}
