//! Property edits on configured objects and how they reach the live instances.

use logweave::configuration::{EntityKind, LogContextConfiguration};
use logweave::error_managers::OnlyOnceErrorManager;
use logweave::formatters::{JsonFormatter, PatternFormatter};
use logweave::reflect::builtin::{
    CONSOLE_HANDLER, FILE_HANDLER, JSON_FORMATTER, ONLY_ONCE_ERROR_MANAGER, PATTERN_FORMATTER,
};
use logweave::runtime::{Handler, LogContext};
use logweave::{Error, Level};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn session() -> (Arc<LogContext>, LogContextConfiguration) {
    let context = LogContext::new();
    let config = LogContextConfiguration::new(Arc::clone(&context));
    (context, config)
}

fn add_file_handler(config: &mut LogContextConfiguration, name: &str, path: &Path) {
    let mut handler = config
        .add_handler_configuration(None, FILE_HANDLER, name, &["file_name"])
        .unwrap();
    handler
        .set_property_value_string("file_name", &path.display().to_string())
        .unwrap();
}

#[test]
fn forgotten_removal_restores_property_order() {
    let (_, mut config) = session();
    {
        let mut formatter = config
            .add_formatter_configuration(None, PATTERN_FORMATTER, "plain", &[])
            .unwrap();
        formatter.set_property_value_string("pattern", "{msg}").unwrap();
        formatter
            .set_property_value_string("timestamp_format", "%H:%M")
            .unwrap();
        formatter.set_property_value_string("time_zone", "UTC").unwrap();
    }
    config.commit().unwrap();

    let mut formatter = config.formatter_configuration_mut("plain").unwrap();
    assert!(formatter.remove_property("timestamp_format").unwrap());
    assert!(!formatter.remove_property("timestamp_format").unwrap());
    assert_eq!(formatter.property_names(), ["pattern", "time_zone"]);

    config.forget();

    let formatter = config.formatter_configuration("plain").unwrap();
    assert_eq!(
        formatter.property_names(),
        ["pattern", "timestamp_format", "time_zone"]
    );
    assert_eq!(formatter.property_value_string("timestamp_format"), Some("%H:%M"));
}

#[test]
fn removed_string_property_is_nulled_but_primitives_stay() {
    let (_, mut config) = session();
    config
        .add_formatter_configuration(None, PATTERN_FORMATTER, "plain", &[])
        .unwrap()
        .set_property_value_string("pattern", "{level}")
        .unwrap();
    config
        .add_formatter_configuration(None, JSON_FORMATTER, "json", &[])
        .unwrap()
        .set_property_value_string("pretty_print", "true")
        .unwrap();
    config.commit().unwrap();

    config
        .formatter_configuration_mut("plain")
        .unwrap()
        .remove_property("pattern")
        .unwrap();
    config
        .formatter_configuration_mut("json")
        .unwrap()
        .remove_property("pretty_print")
        .unwrap();
    config.commit().unwrap();

    let plain = config.instance(EntityKind::Formatter, "plain").unwrap();
    assert_eq!(plain.downcast_ref::<PatternFormatter>().unwrap().pattern(), "");
    let json = config.instance(EntityKind::Formatter, "json").unwrap();
    assert!(json.downcast_ref::<JsonFormatter>().unwrap().pretty_print());
}

#[test]
fn encoding_replaces_unmappable_characters() {
    let (context, mut config) = session();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ascii.log");

    config
        .add_formatter_configuration(None, PATTERN_FORMATTER, "bare", &[])
        .unwrap()
        .set_property_value_string("pattern", "{msg}")
        .unwrap();
    add_file_handler(&mut config, "file", &path);
    {
        let mut handler = config.handler_configuration_mut("file").unwrap();
        handler.set_encoding(Some("US-ASCII")).unwrap();
        handler.set_formatter_name(Some("bare")).unwrap();
        assert_eq!(handler.encoding(), Some("US-ASCII"));
    }
    config.add_logger_configuration("app").unwrap().add_handler_name("file");
    config.commit().unwrap();

    context.logger("app").info("café");
    config.handler("file").unwrap().flush().unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "caf?\n");
}

#[test]
fn unknown_encoding_fails_validation() {
    let (_, mut config) = session();
    config
        .add_handler_configuration(None, CONSOLE_HANDLER, "console", &[])
        .unwrap()
        .set_encoding(Some("EBCDIC"))
        .unwrap();

    let err = config.commit().unwrap_err();
    assert!(matches!(err, Error::InvalidValue { .. }));
    assert!(config.handler("console").is_none());
}

#[test]
fn json_formatter_writes_one_object_per_line() {
    let (context, mut config) = session();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("app.json");

    config
        .add_formatter_configuration(None, JSON_FORMATTER, "json", &[])
        .unwrap();
    add_file_handler(&mut config, "file", &path);
    config
        .handler_configuration_mut("file")
        .unwrap()
        .set_formatter_name(Some("json"))
        .unwrap();
    config.add_logger_configuration("app").unwrap().add_handler_name("file");
    config.commit().unwrap();

    let logger = context.logger("app");
    logger.info("hello");
    logger.warn("world");
    config.handler("file").unwrap().flush().unwrap();

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<serde_json::Value> = content
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["level"], "INFO");
    assert_eq!(lines[0]["logger"], "app");
    assert_eq!(lines[0]["msg"], "hello");
    assert_eq!(lines[1]["level"], "WARN");
    assert_eq!(lines[0]["id"].as_str().unwrap().len(), 26);
    assert_ne!(lines[0]["id"], lines[1]["id"]);
}

#[test]
fn write_failures_go_to_the_error_manager() {
    let (context, mut config) = session();
    config
        .add_error_manager_configuration(None, ONLY_ONCE_ERROR_MANAGER, "once", &[])
        .unwrap();
    config
        .add_handler_configuration(None, FILE_HANDLER, "nowhere", &[])
        .unwrap()
        .set_error_manager_name(Some("once"))
        .unwrap();
    config.add_logger_configuration("app").unwrap().add_handler_name("nowhere");
    config.commit().unwrap();

    let manager = config.instance(EntityKind::ErrorManager, "once").unwrap();
    let manager = manager.downcast_ref::<OnlyOnceErrorManager>().unwrap();
    assert!(!manager.has_reported());

    context.logger("app").error("lost");
    assert!(manager.has_reported());
}

#[test]
fn post_configuration_methods_are_deduplicated() {
    let (_, mut config) = session();
    let mut handler = config
        .add_handler_configuration(None, CONSOLE_HANDLER, "console", &[])
        .unwrap();

    handler
        .set_post_configuration_methods(["flush", "flush"])
        .unwrap();
    assert_eq!(handler.post_configuration_methods(), ["flush"]);
    assert!(!handler.add_post_configuration_method("flush").unwrap());
    assert!(handler.remove_post_configuration_method("flush").unwrap());
    assert!(handler.post_configuration_methods().is_empty());

    config.commit().unwrap();
}

#[test]
fn handler_level_and_formatter_are_read_back() {
    let (_, mut config) = session();
    config
        .add_formatter_configuration(None, PATTERN_FORMATTER, "plain", &[])
        .unwrap();
    {
        let mut handler = config
            .add_handler_configuration(None, CONSOLE_HANDLER, "console", &["target"])
            .unwrap();
        handler.set_property_value_string("target", "stdout").unwrap();
        handler.set_level("WARN").unwrap();
        handler.set_formatter_name(Some("plain")).unwrap();
    }

    let handler = config.handler_configuration("console").unwrap();
    assert_eq!(handler.level(), Some("WARN"));
    assert_eq!(handler.formatter_name(), Some("plain"));
    assert_eq!(handler.constructor_properties(), ["target"]);

    config.commit().unwrap();
    let live = config.handler("console").unwrap();
    assert_eq!(live.core().level(), Level::Warn);
    assert!(live.core().formatter().is_some());
}
