use logweave::filters::{FilterExpr, LevelFilter, LevelRangeFilter, MAX_DEPTH, RegexFilter};
use logweave::runtime::{Filter, LogRecord};
use logweave::{Error, Level};
use std::collections::HashMap;
use std::sync::Arc;

fn record(level: Level, msg: &str) -> LogRecord {
    LogRecord::new(level, "test", msg)
}

fn build(text: &str) -> Arc<dyn Filter> {
    FilterExpr::parse(text).unwrap().build(&mut |_| None).unwrap()
}

fn passes(filter: &dyn Filter, level: Level, msg: &str) -> bool {
    filter.is_loggable(&mut record(level, msg))
}

#[test]
fn parses_nested_expression() {
    let expr =
        FilterExpr::parse(r#"all(levelRange([DEBUG, ERROR]), not(match("heartbeat")))"#).unwrap();
    assert_eq!(
        expr,
        FilterExpr::All(vec![
            FilterExpr::LevelRange {
                min: Level::Debug,
                min_inclusive: true,
                max: Level::Error,
                max_inclusive: true,
            },
            FilterExpr::Not(Box::new(FilterExpr::Match("heartbeat".to_string()))),
        ])
    );
}

#[test]
fn bare_identifiers_are_references() {
    let expr = FilterExpr::parse("any(quiet, accept, audit.rules)").unwrap();
    assert_eq!(expr.named_filters(), ["quiet", "audit.rules"]);
}

#[test]
fn syntax_errors_name_the_expression() {
    for text in [
        "",
        "levels(",
        "levels(LOUD)",
        "match(\"(\")",
        "unknown(accept)",
        "accept deny",
        "match(\"open",
        "levelRange{INFO, WARN}",
    ] {
        let err = FilterExpr::parse(text).unwrap_err();
        assert!(
            matches!(&err, Error::FilterExpression { expression, .. } if expression == text),
            "{text}: {err}"
        );
    }
}

#[test]
fn built_filters_combine() {
    let filter = build(r#"all(levelRange([DEBUG, ERROR]), not(match("heartbeat")))"#);
    assert!(passes(filter.as_ref(), Level::Info, "request served"));
    assert!(!passes(filter.as_ref(), Level::Info, "heartbeat ok"));
    assert!(!passes(filter.as_ref(), Level::Trace, "request served"));
    assert!(!passes(filter.as_ref(), Level::Fatal, "request served"));

    let any = build("any(levels(WARN), deny)");
    assert!(passes(any.as_ref(), Level::Warn, ""));
    assert!(!passes(any.as_ref(), Level::Error, ""));
}

#[test]
fn exclusive_range_bounds() {
    let filter = build("levelRange((DEBUG, ERROR))");
    assert!(!passes(filter.as_ref(), Level::Debug, ""));
    assert!(passes(filter.as_ref(), Level::Info, ""));
    assert!(!passes(filter.as_ref(), Level::Error, ""));
}

#[test]
fn substitute_rewrites_first_or_all() {
    let first = build(r#"substitute("x", "y")"#);
    let mut rec = record(Level::Info, "xxx");
    assert!(first.is_loggable(&mut rec));
    assert_eq!(rec.message, "yxx");

    let all = build(r#"substituteAll("x", "y")"#);
    let mut rec = record(Level::Info, "xxx");
    assert!(all.is_loggable(&mut rec));
    assert_eq!(rec.message, "yyy");
}

#[test]
fn level_change_always_passes() {
    let filter = build("levelChange(FATAL)");
    let mut rec = record(Level::Debug, "m");
    assert!(filter.is_loggable(&mut rec));
    assert_eq!(rec.level, Level::Fatal);
}

#[test]
fn named_references_use_the_lookup() {
    let mut live: HashMap<&str, Arc<dyn Filter>> = HashMap::new();
    live.insert("errors", Arc::new(LevelFilter::new([Level::Error])));

    let expr = FilterExpr::parse("not(errors)").unwrap();
    let filter = expr.build(&mut |name| live.get(name).cloned()).unwrap();
    assert!(passes(filter.as_ref(), Level::Info, ""));
    assert!(!passes(filter.as_ref(), Level::Error, ""));

    let err = FilterExpr::parse("missing")
        .unwrap()
        .build(&mut |name| live.get(name).cloned())
        .unwrap_err();
    assert!(matches!(err, Error::UnknownName { .. }));
}

#[test]
fn mutable_filters_update_in_place() {
    let levels = LevelFilter::new([Level::Info]);
    levels.add_level(Level::Warn);
    assert_eq!(levels.levels(), [Level::Info, Level::Warn]);

    let range = LevelRangeFilter::default();
    range.set_min_level(Level::Warn);
    range.set_max_inclusive(false);
    assert!(!passes(&range, Level::Info, ""));
    assert!(passes(&range, Level::Fatal, ""));
    assert_eq!(range.min_level(), Level::Warn);
    assert_eq!(range.max_level(), Level::Off);

    let regex = RegexFilter::new("a").unwrap();
    assert!(regex.set_pattern("(").is_err());
    assert_eq!(regex.pattern(), "a");
    regex.set_pattern("^b").unwrap();
    assert!(passes(&regex, Level::Info, "bee"));
}

#[test]
fn nesting_depth_is_bounded() {
    let nested = |depth: usize| format!("{}accept{}", "not(".repeat(depth), ")".repeat(depth));
    assert!(FilterExpr::parse(&nested(MAX_DEPTH)).is_ok());

    for text in [nested(MAX_DEPTH + 1), nested(20_000)] {
        let err = FilterExpr::parse(&text).unwrap_err();
        assert!(matches!(&err, Error::FilterExpression { expression, .. } if *expression == text));
    }
}
