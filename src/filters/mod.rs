//! Built-in filters and the filter expression language used by every
//! filter-typed configuration value.

mod expr;

pub use expr::{FilterExpr, MAX_DEPTH};

use crate::error::Error;
use crate::level::Level;
use crate::runtime::{Filter, LogRecord, lock_read, lock_write};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::{Arc, RwLock};

#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptAllFilter;

impl Filter for AcceptAllFilter {
    fn is_loggable(&self, _record: &mut LogRecord) -> bool {
        true
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DenyAllFilter;

impl Filter for DenyAllFilter {
    fn is_loggable(&self, _record: &mut LogRecord) -> bool {
        false
    }
}

#[derive(Debug)]
pub struct InvertFilter(pub Arc<dyn Filter>);

impl Filter for InvertFilter {
    fn is_loggable(&self, record: &mut LogRecord) -> bool {
        !self.0.is_loggable(record)
    }
}

/// Passes when every child passes; stops at the first rejection.
#[derive(Debug)]
pub struct AllFilter(pub Vec<Arc<dyn Filter>>);

impl Filter for AllFilter {
    fn is_loggable(&self, record: &mut LogRecord) -> bool {
        self.0.iter().all(|f| f.is_loggable(record))
    }
}

/// Passes when any child passes; stops at the first acceptance.
#[derive(Debug)]
pub struct AnyFilter(pub Vec<Arc<dyn Filter>>);

impl Filter for AnyFilter {
    fn is_loggable(&self, record: &mut LogRecord) -> bool {
        self.0.iter().any(|f| f.is_loggable(record))
    }
}

/// Passes records whose level is one of an exact set.
#[derive(Debug, Default)]
pub struct LevelFilter {
    levels: RwLock<BTreeSet<Level>>,
}

impl LevelFilter {
    #[must_use]
    pub fn new(levels: impl IntoIterator<Item = Level>) -> Self {
        Self {
            levels: RwLock::new(levels.into_iter().collect()),
        }
    }

    #[must_use]
    pub fn levels(&self) -> Vec<Level> {
        lock_read(&self.levels).iter().copied().collect()
    }

    pub fn add_level(&self, level: Level) {
        lock_write(&self.levels).insert(level);
    }
}

impl Filter for LevelFilter {
    fn is_loggable(&self, record: &mut LogRecord) -> bool {
        lock_read(&self.levels).contains(&record.level)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Bounds {
    min: Level,
    min_inclusive: bool,
    max: Level,
    max_inclusive: bool,
}

/// Passes records whose level falls inside a range.
#[derive(Debug)]
pub struct LevelRangeFilter {
    bounds: RwLock<Bounds>,
}

impl Default for LevelRangeFilter {
    fn default() -> Self {
        Self::new(Level::All, true, Level::Off, true)
    }
}

impl LevelRangeFilter {
    #[must_use]
    pub const fn new(min: Level, min_inclusive: bool, max: Level, max_inclusive: bool) -> Self {
        Self {
            bounds: RwLock::new(Bounds {
                min,
                min_inclusive,
                max,
                max_inclusive,
            }),
        }
    }

    pub fn set_min_level(&self, level: Level) {
        lock_write(&self.bounds).min = level;
    }

    pub fn set_max_level(&self, level: Level) {
        lock_write(&self.bounds).max = level;
    }

    pub fn set_min_inclusive(&self, inclusive: bool) {
        lock_write(&self.bounds).min_inclusive = inclusive;
    }

    pub fn set_max_inclusive(&self, inclusive: bool) {
        lock_write(&self.bounds).max_inclusive = inclusive;
    }

    #[must_use]
    pub fn min_level(&self) -> Level {
        lock_read(&self.bounds).min
    }

    #[must_use]
    pub fn max_level(&self) -> Level {
        lock_read(&self.bounds).max
    }
}

impl Filter for LevelRangeFilter {
    fn is_loggable(&self, record: &mut LogRecord) -> bool {
        let b = *lock_read(&self.bounds);
        let above = if b.min_inclusive {
            record.level >= b.min
        } else {
            record.level > b.min
        };
        let below = if b.max_inclusive {
            record.level <= b.max
        } else {
            record.level < b.max
        };
        above && below
    }
}

/// Rewrites the record level and always passes.
#[derive(Debug)]
pub struct LevelChangeFilter(pub Level);

impl Filter for LevelChangeFilter {
    fn is_loggable(&self, record: &mut LogRecord) -> bool {
        record.level = self.0;
        true
    }
}

/// Passes records whose message matches a regex anywhere.
#[derive(Debug)]
pub struct RegexFilter {
    pattern: RwLock<Regex>,
}

impl RegexFilter {
    /// # Errors
    /// `Error::InvalidValue` for a malformed pattern.
    pub fn new(pattern: &str) -> Result<Self, Error> {
        Ok(Self {
            pattern: RwLock::new(compile(pattern)?),
        })
    }

    #[must_use]
    pub fn pattern(&self) -> String {
        lock_read(&self.pattern).as_str().to_string()
    }

    /// # Errors
    /// `Error::InvalidValue` for a malformed pattern; the old pattern stays.
    pub fn set_pattern(&self, pattern: &str) -> Result<(), Error> {
        *lock_write(&self.pattern) = compile(pattern)?;
        Ok(())
    }
}

impl Filter for RegexFilter {
    fn is_loggable(&self, record: &mut LogRecord) -> bool {
        lock_read(&self.pattern).is_match(&record.message)
    }
}

/// Replaces the first (or every) regex match in the message and always passes.
#[derive(Debug)]
pub struct SubstituteFilter {
    pattern: Regex,
    replacement: String,
    replace_all: bool,
}

impl SubstituteFilter {
    /// # Errors
    /// `Error::InvalidValue` for a malformed pattern.
    pub fn new(pattern: &str, replacement: &str, replace_all: bool) -> Result<Self, Error> {
        Ok(Self {
            pattern: compile(pattern)?,
            replacement: replacement.to_string(),
            replace_all,
        })
    }
}

impl Filter for SubstituteFilter {
    fn is_loggable(&self, record: &mut LogRecord) -> bool {
        let replaced = if self.replace_all {
            self.pattern
                .replace_all(&record.message, self.replacement.as_str())
        } else {
            self.pattern.replace(&record.message, self.replacement.as_str())
        };
        record.message = replaced.into_owned();
        true
    }
}

pub(crate) fn compile(pattern: &str) -> Result<Regex, Error> {
    Regex::new(pattern).map_err(|e| Error::invalid_value("pattern", pattern, e))
}
