//! Severity levels that gate which records reach which handlers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Derives `Ord` so loggers and filters can compare a record against a threshold.
///
/// `All` and `Off` are thresholds only: nothing is logged *at* them.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Lets everything through when used as a threshold.
    All,
    /// High-volume instrumentation.
    Trace,
    /// Diagnostics too noisy for normal operation.
    Debug,
    /// Normal operational milestones.
    #[default]
    Info,
    /// Non-fatal anomalies.
    Warn,
    /// Failures of the current operation.
    Error,
    /// Failures the process cannot recover from.
    Fatal,
    /// Blocks everything when used as a threshold.
    Off,
}

impl Level {
    /// Canonical upper-case name, as written in config files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "ALL",
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
            Self::Fatal => "FATAL",
            Self::Off => "OFF",
        }
    }

    /// Numeric weight, spaced so intermediate custom levels stay possible.
    #[must_use]
    pub const fn int_value(self) -> i32 {
        match self {
            Self::All => i32::MIN,
            Self::Trace => 400,
            Self::Debug => 500,
            Self::Info => 800,
            Self::Warn => 900,
            Self::Error => 1000,
            Self::Fatal => 1100,
            Self::Off => i32::MAX,
        }
    }

    /// Every level a record can carry, lowest first.
    #[must_use]
    pub const fn loggable() -> [Self; 6] {
        [
            Self::Trace,
            Self::Debug,
            Self::Info,
            Self::Warn,
            Self::Error,
            Self::Fatal,
        ]
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned by `FromStr` so callers can distinguish "unknown level" from other parse failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseLevelError(String);

impl ParseLevelError {
    /// The rejected input.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParseLevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown log level: '{}'", self.0)
    }
}

impl std::error::Error for ParseLevelError {}

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "trace" | "finest" | "finer" => Ok(Self::Trace),
            "debug" | "fine" | "config" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" | "err" | "severe" => Ok(Self::Error),
            "fatal" => Ok(Self::Fatal),
            "off" => Ok(Self::Off),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}
