//! Built-in formatters.

mod json;
mod pattern;

pub use json::JsonFormatter;
pub use pattern::{
    DEFAULT_PATTERN, DEFAULT_TIMESTAMP_FORMAT, PatternFormatter, Placeholder, Segment, Template,
};
