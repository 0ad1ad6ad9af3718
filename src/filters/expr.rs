//! Parser for filter expressions such as
//! `all(levelRange([DEBUG, ERROR]), not(match("heartbeat")))`.
//!
//! Grammar:
//!
//! ```text
//! expr  := "accept" | "deny" | IDENT
//!        | "not" "(" expr ")"
//!        | ("all" | "any") "(" expr ("," expr)* ")"
//!        | "levels" "(" LEVEL ("," LEVEL)* ")"
//!        | "levelRange" "(" ("[" | "(") LEVEL "," LEVEL ("]" | ")") ")"
//!        | "levelChange" "(" LEVEL ")"
//!        | "match" "(" STRING ")"
//!        | ("substitute" | "substituteAll") "(" STRING "," STRING ")"
//! ```
//!
//! A bare identifier names a filter configured elsewhere.

use super::{
    AcceptAllFilter, AllFilter, AnyFilter, DenyAllFilter, InvertFilter, LevelChangeFilter,
    LevelFilter, LevelRangeFilter, RegexFilter, SubstituteFilter, compile,
};
use crate::error::Error;
use crate::level::Level;
use crate::runtime::Filter;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FilterExpr {
    Accept,
    Deny,
    Not(Box<FilterExpr>),
    All(Vec<FilterExpr>),
    Any(Vec<FilterExpr>),
    Levels(Vec<Level>),
    LevelRange {
        min: Level,
        min_inclusive: bool,
        max: Level,
        max_inclusive: bool,
    },
    LevelChange(Level),
    Match(String),
    Substitute {
        pattern: String,
        replacement: String,
        all: bool,
    },
    /// Reference to a configured filter.
    Named(String),
}

impl FilterExpr {
    /// # Errors
    /// `Error::FilterExpression` on syntax errors, unknown levels or bad regexes.
    pub fn parse(expression: &str) -> Result<Self, Error> {
        let fail = |reason: String| Error::FilterExpression {
            expression: expression.to_string(),
            reason,
        };
        let tokens = tokenize(expression).map_err(fail)?;
        let mut parser = Parser {
            tokens,
            pos: 0,
            depth: 0,
        };
        let expr = parser.expr().map_err(fail)?;
        if let Some(extra) = parser.peek() {
            return Err(fail(format!("unexpected trailing {extra:?}")));
        }
        Ok(expr)
    }

    /// Names of configured filters referenced anywhere in the tree.
    #[must_use]
    pub fn named_filters(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_names(&mut names);
        names
    }

    fn collect_names<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Named(name) => out.push(name),
            Self::Not(inner) => inner.collect_names(out),
            Self::All(children) | Self::Any(children) => {
                for child in children {
                    child.collect_names(out);
                }
            }
            _ => {}
        }
    }

    /// Builds the live filter tree. `lookup` resolves named references.
    ///
    /// # Errors
    /// `Error::UnknownName` when `lookup` cannot resolve a reference.
    pub fn build(
        &self,
        lookup: &mut dyn FnMut(&str) -> Option<Arc<dyn Filter>>,
    ) -> Result<Arc<dyn Filter>, Error> {
        Ok(match self {
            Self::Accept => Arc::new(AcceptAllFilter),
            Self::Deny => Arc::new(DenyAllFilter),
            Self::Not(inner) => Arc::new(InvertFilter(inner.build(lookup)?)),
            Self::All(children) => Arc::new(AllFilter(build_all(children, lookup)?)),
            Self::Any(children) => Arc::new(AnyFilter(build_all(children, lookup)?)),
            Self::Levels(levels) => Arc::new(LevelFilter::new(levels.iter().copied())),
            Self::LevelRange {
                min,
                min_inclusive,
                max,
                max_inclusive,
            } => Arc::new(LevelRangeFilter::new(
                *min,
                *min_inclusive,
                *max,
                *max_inclusive,
            )),
            Self::LevelChange(level) => Arc::new(LevelChangeFilter(*level)),
            Self::Match(pattern) => Arc::new(RegexFilter::new(pattern)?),
            Self::Substitute {
                pattern,
                replacement,
                all,
            } => Arc::new(SubstituteFilter::new(pattern, replacement, *all)?),
            Self::Named(name) => lookup(name).ok_or_else(|| Error::UnknownName {
                kind: crate::configuration::EntityKind::Filter,
                name: name.clone(),
            })?,
        })
    }
}

fn build_all(
    children: &[FilterExpr],
    lookup: &mut dyn FnMut(&str) -> Option<Arc<dyn Filter>>,
) -> Result<Vec<Arc<dyn Filter>>, Error> {
    children.iter().map(|child| child.build(lookup)).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(String),
    Str(String),
    Open,
    Close,
    OpenBracket,
    CloseBracket,
    Comma,
}

fn tokenize(input: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' | ')' | '[' | ']' | ',' => {
                chars.next();
                tokens.push(match c {
                    '(' => Token::Open,
                    ')' => Token::Close,
                    '[' => Token::OpenBracket,
                    ']' => Token::CloseBracket,
                    _ => Token::Comma,
                });
            }
            '"' => {
                chars.next();
                let mut text = String::new();
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(escaped) => text.push(escaped),
                            None => return Err("unterminated escape".to_string()),
                        },
                        Some(other) => text.push(other),
                        None => return Err("unterminated string".to_string()),
                    }
                }
                tokens.push(Token::Str(text));
            }
            c if is_ident_char(c) => {
                let mut ident = String::new();
                while let Some(&c) = chars.peek() {
                    if !is_ident_char(c) {
                        break;
                    }
                    ident.push(c);
                    chars.next();
                }
                tokens.push(Token::Ident(ident));
            }
            other => return Err(format!("unexpected character '{other}'")),
        }
    }
    Ok(tokens)
}

const fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-' | '$')
}

/// Deepest function nesting accepted.
pub const MAX_DEPTH: usize = 64;

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn expect(&mut self, wanted: &Token) -> Result<(), String> {
        match self.next() {
            Some(ref t) if t == wanted => Ok(()),
            Some(t) => Err(format!("expected {wanted:?}, found {t:?}")),
            None => Err(format!("expected {wanted:?}, found end of input")),
        }
    }

    fn string(&mut self) -> Result<String, String> {
        match self.next() {
            Some(Token::Str(s)) => Ok(s),
            other => Err(format!("expected string, found {other:?}")),
        }
    }

    fn level(&mut self) -> Result<Level, String> {
        match self.next() {
            Some(Token::Ident(name)) => name.parse().map_err(|e| format!("{e}")),
            other => Err(format!("expected level, found {other:?}")),
        }
    }

    fn expr(&mut self) -> Result<FilterExpr, String> {
        let name = match self.next() {
            Some(Token::Ident(name)) => name,
            other => return Err(format!("expected filter, found {other:?}")),
        };
        if self.peek() != Some(&Token::Open) {
            return Ok(match name.as_str() {
                "accept" => FilterExpr::Accept,
                "deny" => FilterExpr::Deny,
                _ => FilterExpr::Named(name),
            });
        }
        self.expect(&Token::Open)?;
        if self.depth == MAX_DEPTH {
            return Err(format!("nested deeper than {MAX_DEPTH} levels"));
        }
        self.depth += 1;
        let expr = match name.as_str() {
            "not" => FilterExpr::Not(Box::new(self.expr()?)),
            "all" => FilterExpr::All(self.list(Self::expr)?),
            "any" => FilterExpr::Any(self.list(Self::expr)?),
            "levels" => FilterExpr::Levels(self.list(Self::level)?),
            "levelChange" => FilterExpr::LevelChange(self.level()?),
            "levelRange" => self.level_range()?,
            "match" => {
                let pattern = self.string()?;
                compile(&pattern).map_err(|e| e.to_string())?;
                FilterExpr::Match(pattern)
            }
            "substitute" | "substituteAll" => {
                let pattern = self.string()?;
                compile(&pattern).map_err(|e| e.to_string())?;
                self.expect(&Token::Comma)?;
                let replacement = self.string()?;
                FilterExpr::Substitute {
                    pattern,
                    replacement,
                    all: name == "substituteAll",
                }
            }
            other => return Err(format!("unknown filter function \"{other}\"")),
        };
        self.expect(&Token::Close)?;
        self.depth -= 1;
        Ok(expr)
    }

    /// One or more comma-separated items; stops before the closing paren.
    fn list<T>(&mut self, item: fn(&mut Self) -> Result<T, String>) -> Result<Vec<T>, String> {
        let mut items = vec![item(self)?];
        while self.peek() == Some(&Token::Comma) {
            self.next();
            items.push(item(self)?);
        }
        Ok(items)
    }

    fn level_range(&mut self) -> Result<FilterExpr, String> {
        let min_inclusive = match self.next() {
            Some(Token::OpenBracket) => true,
            Some(Token::Open) => false,
            other => return Err(format!("expected '[' or '(', found {other:?}")),
        };
        let min = self.level()?;
        self.expect(&Token::Comma)?;
        let max = self.level()?;
        let max_inclusive = match self.next() {
            Some(Token::CloseBracket) => true,
            Some(Token::Close) => false,
            other => return Err(format!("expected ']' or ')', found {other:?}")),
        };
        Ok(FilterExpr::LevelRange {
            min,
            min_inclusive,
            max,
            max_inclusive,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_escaped_strings() {
        let tokens = tokenize(r#"match("a\"b")"#).unwrap();
        assert_eq!(tokens[2], Token::Str("a\"b".to_string()));
    }

    #[test]
    fn half_open_range() {
        let expr = FilterExpr::parse("levelRange([DEBUG, WARN))").unwrap();
        assert_eq!(
            expr,
            FilterExpr::LevelRange {
                min: Level::Debug,
                min_inclusive: true,
                max: Level::Warn,
                max_inclusive: false,
            }
        );
    }
}
