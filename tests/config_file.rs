use logweave::config::{LoggingConfig, ObjectSection, PropertyValue, extract_sources};
use logweave::reflect::builtin::{CONSOLE_HANDLER, PATTERN_FORMATTER};
use logweave::runtime::{Handler, LogContext};
use logweave::{Error, Level, LogContextConfiguration};
use std::fs;
use tempfile::TempDir;

const BASE: &str = r#"
[formatters.plain]
class = "logweave.formatters.PatternFormatter"
properties = { pattern = "{level} {msg}" }

[handlers.console]
class = "logweave.handlers.ConsoleHandler"
constructor_properties = ["target"]
properties = { target = "stderr", level = "WARN", formatter = "plain", autoflush = true }

[loggers."app"]
level = "DEBUG"
use_parent_handlers = false
handlers = ["console"]
"#;

#[test]
fn load_with_sources_merges_sections() {
    let tmp_dir = TempDir::new().unwrap();
    let base_path = tmp_dir.path().join("base.toml");
    let child_path = tmp_dir.path().join("child.toml");

    fs::write(
        &base_path,
        format!("source = \"{}\"\n{BASE}", child_path.display()),
    )
    .unwrap();
    fs::write(
        &child_path,
        r#"
[handlers.console]
class = "logweave.handlers.FileHandler"

[loggers."db"]
level = "ERROR"
"#,
    )
    .unwrap();

    let config = LoggingConfig::load_from(&base_path).unwrap();
    assert_eq!(config.handlers["console"].class, CONSOLE_HANDLER);
    assert!(config.loggers.contains_key("app"));
    assert!(config.loggers.contains_key("db"));
}

#[test]
fn relative_sources_resolve_next_to_the_including_file() {
    let tmp_dir = TempDir::new().unwrap();
    fs::create_dir(tmp_dir.path().join("conf.d")).unwrap();
    fs::write(
        tmp_dir.path().join("conf.d").join("extra.toml"),
        "[loggers.\"extra\"]\nlevel = \"INFO\"\n",
    )
    .unwrap();
    let base_path = tmp_dir.path().join("logging.toml");
    fs::write(&base_path, "source = \"conf.d/extra.toml\"\n").unwrap();

    let config = LoggingConfig::load_from(&base_path).unwrap();
    assert_eq!(config.loggers["extra"].level.as_deref(), Some("INFO"));
}

#[test]
fn load_with_missing_source_is_ignored() {
    let tmp_dir = TempDir::new().unwrap();
    let base_path = tmp_dir.path().join("base.toml");
    fs::write(
        &base_path,
        format!(
            "source = \"{}\"\n{BASE}",
            tmp_dir.path().join("missing.toml").display()
        ),
    )
    .unwrap();

    let config = LoggingConfig::load_from(&base_path).unwrap();
    assert!(config.handlers.contains_key("console"));
}

#[test]
fn load_with_cyclic_sources_errors() {
    let tmp_dir = TempDir::new().unwrap();
    let a_path = tmp_dir.path().join("a.toml");
    let b_path = tmp_dir.path().join("b.toml");

    fs::write(&a_path, format!(r#"source = "{}""#, b_path.display())).unwrap();
    fs::write(&b_path, format!(r#"source = "{}""#, a_path.display())).unwrap();

    let err = LoggingConfig::load_from(&a_path).unwrap_err();
    assert!(matches!(err, Error::CyclicInclude(_)));
}

#[test]
fn missing_file_loads_empty_config() {
    let tmp_dir = TempDir::new().unwrap();
    let config = LoggingConfig::load_from(&tmp_dir.path().join("absent.toml")).unwrap();
    assert_eq!(config, LoggingConfig::default());
}

#[test]
fn extract_sources_keeps_other_lines() {
    let (sources, rest) = extract_sources("source = \"a.toml\"\nsources = 1\n[loggers.x]\n");
    assert_eq!(sources, ["a.toml"]);
    assert_eq!(rest, "sources = 1\n[loggers.x]\n");
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let err = LoggingConfig::from_toml_str("[handlers.h\nclass = ").unwrap_err();
    assert!(matches!(err, Error::ConfigParse(_)));
    assert!(!err.is_argument_error());
}

#[test]
fn apply_builds_the_live_context() {
    let file = LoggingConfig::from_toml_str(BASE).unwrap();
    let context = LogContext::new();
    let mut config = LogContextConfiguration::new(context.clone());

    file.apply(&mut config).unwrap();
    config.commit().unwrap();

    let logger = context.logger("app");
    assert_eq!(logger.level(), Some(Level::Debug));
    assert!(!logger.use_parent_handlers());
    assert_eq!(logger.handlers().len(), 1);
    let console = config.handler("console").unwrap();
    assert_eq!(console.core().level(), Level::Warn);
    assert!(console.core().formatter().is_some());
}

#[test]
fn apply_reconciles_with_existing_configuration() {
    let context = LogContext::new();
    let mut config = LogContextConfiguration::new(context.clone());
    LoggingConfig::from_toml_str(BASE)
        .unwrap()
        .apply(&mut config)
        .unwrap();
    config
        .add_logger_configuration("stale")
        .unwrap()
        .set_level(Some("INFO"));
    config.commit().unwrap();

    let mut next = LoggingConfig::from_toml_str(BASE).unwrap();
    next.handlers["console"]
        .properties
        .insert("level".to_string(), PropertyValue::from("ERROR"));
    next.formatters.shift_remove("plain");
    next.handlers["console"].properties.shift_remove("formatter");

    next.apply(&mut config).unwrap();
    config.commit().unwrap();

    assert!(config.logger_configuration("stale").is_none());
    assert!(config.formatter_configuration("plain").is_none());
    let console = config.handler("console").unwrap();
    assert_eq!(console.core().level(), Level::Error);
    assert!(console.core().formatter().is_none());
}

#[test]
fn apply_rejects_a_class_change() {
    let mut config = LogContextConfiguration::new(LogContext::new());
    LoggingConfig::from_toml_str(BASE)
        .unwrap()
        .apply(&mut config)
        .unwrap();
    config.commit().unwrap();

    let mut next = LoggingConfig::from_toml_str(BASE).unwrap();
    next.handlers["console"].class = "logweave.handlers.MultiHandler".to_string();

    let err = next.apply(&mut config).unwrap_err();
    assert!(matches!(err, Error::DuplicateName { .. }));
}

#[test]
fn snapshot_round_trips_through_toml() {
    let mut config = LogContextConfiguration::new(LogContext::new());
    config
        .add_formatter_configuration(None, PATTERN_FORMATTER, "plain", &[])
        .unwrap()
        .set_property_value_expression(
            "pattern",
            logweave::ValueExpression::parse("${LOGWEAVE_TEST_UNSET_PATTERN:-plain}"),
        )
        .unwrap();
    {
        let mut logger = config.add_logger_configuration("app").unwrap();
        logger.set_level(Some("INFO"));
    }

    let snapshot = LoggingConfig::snapshot(&config);
    let text = snapshot.to_toml_string().unwrap();
    let parsed = LoggingConfig::from_toml_str(&text).unwrap();

    assert_eq!(parsed, snapshot);
    assert_eq!(
        parsed.formatters["plain"],
        ObjectSection::new(PATTERN_FORMATTER)
            .property("pattern", "${LOGWEAVE_TEST_UNSET_PATTERN:-plain}")
    );
    assert_eq!(parsed.loggers["app"].level.as_deref(), Some("INFO"));
}
