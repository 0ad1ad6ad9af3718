//! One JSON object per record, for log shippers.

use crate::runtime::{Formatter, LogRecord, TimeZone, lock_read, lock_write};
use serde::Serialize;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use ulid::Ulid;

#[derive(Debug, Serialize)]
struct JsonEntry<'a> {
    /// Time-sortable and unique across concurrent writers.
    id: String,
    ts: String,
    level: &'static str,
    logger: &'a str,
    msg: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    thread: Option<&'a str>,
}

#[derive(Debug, Default)]
pub struct JsonFormatter {
    pretty_print: AtomicBool,
    time_zone: RwLock<TimeZone>,
}

impl JsonFormatter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn pretty_print(&self) -> bool {
        self.pretty_print.load(Ordering::Acquire)
    }

    pub fn set_pretty_print(&self, enabled: bool) {
        self.pretty_print.store(enabled, Ordering::Release);
    }

    #[must_use]
    pub fn time_zone(&self) -> TimeZone {
        *lock_read(&self.time_zone)
    }

    pub fn set_time_zone(&self, zone: TimeZone) {
        *lock_write(&self.time_zone) = zone;
    }
}

impl Formatter for JsonFormatter {
    fn format(&self, record: &LogRecord) -> String {
        let entry = JsonEntry {
            id: Ulid::new().to_string(),
            ts: self
                .time_zone()
                .format(record.timestamp, "%Y-%m-%dT%H:%M:%S%.3f%:z"),
            level: record.level.as_str(),
            logger: &record.logger_name,
            msg: &record.message,
            thread: record.thread.as_deref(),
        };
        let rendered = if self.pretty_print() {
            serde_json::to_string_pretty(&entry)
        } else {
            serde_json::to_string(&entry)
        };
        // Serializing plain strings cannot fail; keep the record visible regardless.
        rendered.unwrap_or_else(|e| format!("{{\"error\":\"{e}\"}}"))
    }
}
