//! Time zones for timestamp rendering.

use chrono::{DateTime, FixedOffset, Local, Offset, Utc};
use serde::{Serialize, Serializer};
use std::fmt;

/// Either the host's local zone or a fixed UTC offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeZone {
    #[default]
    Local,
    Fixed(FixedOffset),
}

impl TimeZone {
    /// UTC as a fixed zone.
    #[must_use]
    pub fn utc() -> Self {
        Self::Fixed(Utc.fix())
    }

    /// Looks up a zone id. Never fails: unknown ids mean GMT.
    ///
    /// Accepts `local`, `UTC`, `GMT`, `Z`, and offsets such as `+02:00`,
    /// `-0530`, `GMT+2` or `UTC-05:00`.
    #[must_use]
    pub fn lookup(id: &str) -> Self {
        let id = id.trim();
        if id.eq_ignore_ascii_case("local") || id.eq_ignore_ascii_case("default") {
            return Self::Local;
        }
        let offset = id
            .strip_prefix("GMT")
            .or_else(|| id.strip_prefix("UTC"))
            .unwrap_or(id);
        if offset.is_empty() || offset == "Z" {
            return Self::utc();
        }
        parse_offset(offset).map_or_else(Self::utc, Self::Fixed)
    }

    /// Renders a UTC instant in this zone with a strftime pattern.
    #[must_use]
    pub fn format(self, instant: DateTime<Utc>, pattern: &str) -> String {
        match self {
            Self::Local => instant.with_timezone(&Local).format(pattern).to_string(),
            Self::Fixed(offset) => instant.with_timezone(&offset).format(pattern).to_string(),
        }
    }
}

fn parse_offset(text: &str) -> Option<FixedOffset> {
    if !text.is_ascii() {
        return None;
    }
    let (sign, rest) = match text.as_bytes().first()? {
        b'+' => (1, &text[1..]),
        b'-' => (-1, &text[1..]),
        _ => return None,
    };
    let (hours, minutes) = match rest.split_once(':') {
        Some((h, m)) => (two_digits(h)?, two_digits(m)?),
        None if rest.len() > 2 => (
            two_digits(&rest[..rest.len() - 2])?,
            two_digits(&rest[rest.len() - 2..])?,
        ),
        None => (two_digits(rest)?, 0),
    };
    if hours > 18 || minutes > 59 {
        return None;
    }
    let seconds = hours.checked_mul(3600)?.checked_add(minutes * 60)?;
    FixedOffset::east_opt(sign * seconds)
}

/// One or two ASCII digits; signs and anything longer are rejected.
fn two_digits(text: &str) -> Option<i32> {
    if text.is_empty() || text.len() > 2 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

impl fmt::Display for TimeZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => f.write_str("local"),
            Self::Fixed(offset) => write!(f, "{offset}"),
        }
    }
}

impl Serialize for TimeZone {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
