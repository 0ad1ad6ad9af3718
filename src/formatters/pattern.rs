//! Placeholder template formatter: `{timestamp} {level} [{logger}] {msg}`.

use crate::runtime::{Formatter, LogRecord, TimeZone, lock_read, lock_write};
use std::sync::RwLock;

pub const DEFAULT_PATTERN: &str = "{timestamp} {level} [{logger}] {msg}";
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Known substitution tokens. Unknown `{names}` pass through as literal text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    Timestamp,
    Level,
    Logger,
    Msg,
    Thread,
}

impl Placeholder {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Timestamp => "timestamp",
            Self::Level => "level",
            Self::Logger => "logger",
            Self::Msg => "msg",
            Self::Thread => "thread",
        }
    }

    pub const ALL: &'static [Self] = &[
        Self::Timestamp,
        Self::Level,
        Self::Logger,
        Self::Msg,
        Self::Thread,
    ];

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|ph| ph.as_str() == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Placeholder(Placeholder),
}

/// Parsed once when the pattern is set, rendered for every record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    #[must_use]
    pub fn parse(pattern: &str) -> Self {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = pattern;

        while let Some(open) = rest.find('{') {
            let Some(close) = rest[open..].find('}').map(|c| open + c) else {
                break;
            };
            literal.push_str(&rest[..open]);
            let name = &rest[open + 1..close];
            if let Some(ph) = Placeholder::from_name(name) {
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Placeholder(ph));
            } else {
                literal.push_str(&rest[open..=close]);
            }
            rest = &rest[close + 1..];
        }
        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Self { segments }
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

#[derive(Debug)]
pub struct PatternFormatter {
    pattern: RwLock<String>,
    template: RwLock<Template>,
    timestamp_format: RwLock<String>,
    time_zone: RwLock<TimeZone>,
}

impl Default for PatternFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_PATTERN)
    }
}

impl PatternFormatter {
    #[must_use]
    pub fn new(pattern: &str) -> Self {
        Self {
            pattern: RwLock::new(pattern.to_string()),
            template: RwLock::new(Template::parse(pattern)),
            timestamp_format: RwLock::new(DEFAULT_TIMESTAMP_FORMAT.to_string()),
            time_zone: RwLock::new(TimeZone::Local),
        }
    }

    #[must_use]
    pub fn pattern(&self) -> String {
        lock_read(&self.pattern).clone()
    }

    pub fn set_pattern(&self, pattern: &str) {
        *lock_write(&self.template) = Template::parse(pattern);
        *lock_write(&self.pattern) = pattern.to_string();
    }

    #[must_use]
    pub fn timestamp_format(&self) -> String {
        lock_read(&self.timestamp_format).clone()
    }

    pub fn set_timestamp_format(&self, format: &str) {
        *lock_write(&self.timestamp_format) = format.to_string();
    }

    #[must_use]
    pub fn time_zone(&self) -> TimeZone {
        *lock_read(&self.time_zone)
    }

    pub fn set_time_zone(&self, zone: TimeZone) {
        *lock_write(&self.time_zone) = zone;
    }
}

impl Formatter for PatternFormatter {
    fn format(&self, record: &LogRecord) -> String {
        let template = lock_read(&self.template);
        let mut out = String::new();
        for segment in template.segments() {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(Placeholder::Timestamp) => out.push_str(
                    &self
                        .time_zone()
                        .format(record.timestamp, &lock_read(&self.timestamp_format)),
                ),
                Segment::Placeholder(Placeholder::Level) => out.push_str(record.level.as_str()),
                Segment::Placeholder(Placeholder::Logger) => out.push_str(&record.logger_name),
                Segment::Placeholder(Placeholder::Msg) => out.push_str(&record.message),
                Segment::Placeholder(Placeholder::Thread) => {
                    out.push_str(record.thread.as_deref().unwrap_or("-"));
                }
            }
        }
        out
    }
}
