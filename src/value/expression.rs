//! Configuration values that remember how they were written.

use serde::Serialize;
use std::fmt;

/// A resolved value plus, for `${...}` expressions, the text it came from.
///
/// Keeping the raw form lets a configuration be written back out with its
/// environment references intact instead of their current expansion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueExpression<T = String> {
    raw: Option<String>,
    resolved: T,
}

impl<T> ValueExpression<T> {
    #[must_use]
    pub const fn new(raw: Option<String>, resolved: T) -> Self {
        Self { raw, resolved }
    }

    /// The expression text, when this was not a plain literal.
    #[must_use]
    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    #[must_use]
    pub const fn resolved(&self) -> &T {
        &self.resolved
    }

    #[must_use]
    pub const fn is_expression(&self) -> bool {
        self.raw.is_some()
    }

    #[must_use]
    pub fn into_resolved(self) -> T {
        self.resolved
    }
}

impl ValueExpression<String> {
    /// A plain value with no expression form.
    #[must_use]
    pub fn literal(value: impl Into<String>) -> Self {
        Self::new(None, value.into())
    }

    /// Expands `${NAME}` and `${NAME:-default}` against the process
    /// environment. Text without `${` stays a literal; unset variables
    /// without a default are left as written.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        if !text.contains("${") {
            return Self::literal(text);
        }
        let expanded = shellexpand::env_with_context_no_errors(text, |var: &str| {
            std::env::var(var).ok()
        });
        Self::new(Some(text.to_string()), expanded.into_owned())
    }

    /// What to persist: the expression if there is one, else the value.
    #[must_use]
    pub fn source_text(&self) -> &str {
        self.raw.as_deref().unwrap_or(&self.resolved)
    }
}

impl fmt::Display for ValueExpression<String> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.source_text())
    }
}
