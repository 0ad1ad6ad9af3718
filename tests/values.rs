//! Expression parsing and property value resolution through the public surface.

use logweave::configuration::LogContextConfiguration;
use logweave::reflect::builtin::CONSOLE_HANDLER;
use logweave::runtime::{LogContext, TimeZone};
use logweave::value::ValueProducer;
use logweave::{EntityKind, Error, Level, Value, ValueExpression, ValueType};

#[test]
fn plain_text_is_a_literal() {
    let expr = ValueExpression::parse("INFO");
    assert!(!expr.is_expression());
    assert_eq!(expr.resolved(), "INFO");
    assert_eq!(expr.source_text(), "INFO");
}

#[test]
fn unset_variable_falls_back_to_default() {
    let expr = ValueExpression::parse("${LOGWEAVE_TEST_SURELY_UNSET:-WARN}");
    assert!(expr.is_expression());
    assert_eq!(expr.resolved(), "WARN");
    assert_eq!(expr.raw(), Some("${LOGWEAVE_TEST_SURELY_UNSET:-WARN}"));
    assert_eq!(expr.to_string(), "${LOGWEAVE_TEST_SURELY_UNSET:-WARN}");
}

#[test]
fn set_variable_is_expanded() {
    let Ok(path) = std::env::var("PATH") else {
        return;
    };
    let expr = ValueExpression::parse("${PATH}");
    assert_eq!(expr.resolved(), &path);
}

fn config() -> LogContextConfiguration {
    LogContextConfiguration::new(LogContext::new())
}

fn literal(text: &str) -> ValueExpression {
    ValueExpression::literal(text)
}

#[test]
fn scalars_resolve_immediately() {
    let config = config();

    let level = config
        .value("level", ValueType::Level, Some(&literal("debug")), false)
        .unwrap();
    assert!(matches!(level, ValueProducer::Immediate(Value::Level(Level::Debug))));

    let flag = config
        .value("flag", ValueType::Bool, Some(&literal("TRUE")), false)
        .unwrap();
    assert!(matches!(flag, ValueProducer::Immediate(Value::Bool(true))));

    let other = config
        .value("flag", ValueType::Bool, Some(&literal("yes")), false)
        .unwrap();
    assert!(matches!(other, ValueProducer::Immediate(Value::Bool(false))));

    let size = config
        .value("size", ValueType::Int, Some(&literal(" 42 ")), false)
        .unwrap();
    assert!(matches!(size, ValueProducer::Immediate(Value::Int(42))));
}

#[test]
fn bad_numbers_and_enums_are_argument_errors() {
    let config = config();

    let err = config
        .value("size", ValueType::Int, Some(&literal("many")), false)
        .unwrap_err();
    assert!(matches!(err, Error::InvalidValue { .. }));
    assert!(err.is_argument_error());

    let err = config
        .value(
            "target",
            ValueType::Enum(&["stdout", "stderr"]),
            Some(&literal("STDOUT")),
            false,
        )
        .unwrap_err();
    assert!(matches!(err, Error::InvalidValue { .. }));
}

#[test]
fn missing_value_is_null_except_for_primitives() {
    let config = config();

    assert!(matches!(
        config.value("name", ValueType::String, None, false),
        Ok(ValueProducer::Null)
    ));
    assert!(matches!(
        config.value("enabled", ValueType::Bool, None, false),
        Err(Error::NullPrimitive { .. })
    ));
}

#[test]
fn references_are_deferred_until_live() {
    let mut config = config();
    config
        .add_handler_configuration(None, CONSOLE_HANDLER, "console", &[])
        .unwrap();

    let deferred = config
        .value("target", ValueType::Handler, Some(&literal("console")), false)
        .unwrap();
    assert!(matches!(
        deferred,
        ValueProducer::Deferred { kind: EntityKind::Handler, ref name } if name == "console"
    ));

    let err = config
        .value("target", ValueType::Handler, Some(&literal("console")), true)
        .unwrap_err();
    assert!(matches!(err, Error::UnknownName { .. }));

    config.commit().unwrap();
    let immediate = config
        .value("target", ValueType::Handler, Some(&literal("console")), true)
        .unwrap();
    assert!(matches!(immediate, ValueProducer::Immediate(Value::Handler(_))));
}

#[test]
fn undefined_reference_is_rejected() {
    let config = config();
    let err = config
        .value("formatter", ValueType::Formatter, Some(&literal("nope")), false)
        .unwrap_err();
    assert_eq!(err.to_string(), "no formatter named \"nope\" is defined");
}

#[test]
fn filter_values_are_parsed_expressions() {
    let config = config();

    let filter = config
        .value("filter", ValueType::Filter, Some(&literal("levels(INFO, WARN)")), false)
        .unwrap();
    assert!(matches!(filter, ValueProducer::Filter(_)));

    let err = config
        .value("filter", ValueType::Filter, Some(&literal("levels(")), false)
        .unwrap_err();
    assert!(matches!(err, Error::FilterExpression { .. }));

    let err = config
        .value("filter", ValueType::Filter, Some(&literal("missing")), false)
        .unwrap_err();
    assert!(matches!(err, Error::UnknownName { kind: EntityKind::Filter, .. }));
}

#[test]
fn malformed_time_zone_ids_fall_back_to_gmt() {
    let config = config();
    for id in ["+é1", "GMT+1é", "+-999999:0", "-05:-30", "+123456", "+1:2:3"] {
        let zone = config
            .value("time_zone", ValueType::TimeZone, Some(&literal(id)), false)
            .unwrap();
        assert!(
            matches!(zone, ValueProducer::Immediate(Value::TimeZone(z)) if z == TimeZone::utc()),
            "{id}"
        );
    }

    assert_eq!(TimeZone::lookup("GMT+2"), TimeZone::lookup("+02:00"));
    assert_eq!(TimeZone::lookup("-0530").to_string(), "-05:30");
    assert_eq!(TimeZone::lookup("+19"), TimeZone::utc());
}
