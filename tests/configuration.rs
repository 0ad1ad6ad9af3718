//! Transactions against a live context: naming, tombstones, commit and forget.

use logweave::configuration::{EntityKind, LogContextConfiguration};
use logweave::reflect::builtin::{
    CONSOLE_HANDLER, DENY_ALL_FILTER, FILE_HANDLER, MULTI_HANDLER, PATTERN_FORMATTER,
    SUBSTITUTE_FILTER,
};
use logweave::reflect::{ClassBuilder, ClassRegistry, Modules};
use logweave::runtime::{Handler, LogContext};
use logweave::{Error, Level};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

fn session() -> (Arc<LogContext>, LogContextConfiguration) {
    let context = LogContext::new();
    let config = LogContextConfiguration::new(Arc::clone(&context));
    (context, config)
}

#[test]
fn console_handler_level_is_applied_on_commit() {
    let (_, mut config) = session();
    config
        .add_handler_configuration(None, CONSOLE_HANDLER, "H1", &[])
        .unwrap()
        .set_property_value_string("level", "INFO")
        .unwrap();

    assert!(config.handler("H1").is_none());
    config.commit().unwrap();

    let handler = config.handler("H1").unwrap();
    assert_eq!(handler.core().level(), Level::Info);
    assert_eq!(config.pending_actions(), 0);
}

#[test]
fn forgotten_logger_is_never_created() {
    let (context, mut config) = session();
    config
        .add_logger_configuration("com.foo")
        .unwrap()
        .add_handler_name("H1");

    config.forget();

    assert!(context.find_logger("com.foo").is_none());
    assert!(config.logger_configuration("com.foo").is_none());
    assert_eq!(config.pending_actions(), 0);
}

#[test]
fn removal_hides_configuration_until_forget() {
    let (_, mut config) = session();
    config
        .add_handler_configuration(None, CONSOLE_HANDLER, "H1", &[])
        .unwrap();
    config.commit().unwrap();

    assert!(config.remove_handler_configuration("H1"));
    assert!(config.handler_configuration("H1").is_none());
    assert!(!config.handler_names().contains(&"H1".to_string()));

    config.forget();

    let restored = config.handler_configuration("H1").unwrap();
    assert_eq!(restored.class_name(), CONSOLE_HANDLER);
    assert!(config.handler("H1").is_some());
}

#[test]
fn committed_removal_closes_live_handler() {
    let (_, mut config) = session();
    config
        .add_handler_configuration(None, CONSOLE_HANDLER, "H1", &[])
        .unwrap();
    config.commit().unwrap();
    let live = config.handler("H1").unwrap();

    config.remove_handler_configuration("H1");
    config.commit().unwrap();

    assert!(config.handler("H1").is_none());
    assert!(live.core().is_closed());
}

#[test]
fn duplicate_handler_name_is_rejected_until_removal_commits() {
    let (_, mut config) = session();
    config
        .add_handler_configuration(None, CONSOLE_HANDLER, "h", &[])
        .unwrap();

    let err = config
        .add_handler_configuration(None, CONSOLE_HANDLER, "h", &[])
        .unwrap_err();
    assert!(matches!(err, Error::DuplicateName { kind: EntityKind::Handler, .. }));
    config.commit().unwrap();

    assert!(config.remove_handler_configuration("h"));
    assert!(
        config
            .add_handler_configuration(None, CONSOLE_HANDLER, "h", &[])
            .is_err()
    );

    config.commit().unwrap();
    assert!(
        config
            .add_handler_configuration(None, CONSOLE_HANDLER, "h", &[])
            .is_ok()
    );
}

#[test]
fn missing_constructor_property_fails_validation() {
    let (_, mut config) = session();
    {
        let mut filter = config
            .add_filter_configuration(
                None,
                SUBSTITUTE_FILTER,
                "scrub",
                &["pattern", "replacement", "replace_all"],
            )
            .unwrap();
        filter.set_property_value_string("pattern", "secret").unwrap();
        filter.set_property_value_string("replacement", "***").unwrap();
    }

    let err = config.commit().unwrap_err();

    assert!(err.is_argument_error());
    match err {
        Error::MissingConstructorProperty { property, .. } => assert_eq!(property, "replace_all"),
        other => panic!("unexpected error: {other}"),
    }
    assert!(config.filter("scrub").is_none());
}

#[test]
fn validation_failure_leaves_live_context_untouched() {
    let (context, mut config) = session();
    config.add_logger_configuration("app").unwrap();
    config
        .add_handler_configuration(None, CONSOLE_HANDLER, "bad", &[])
        .unwrap()
        .set_level("NOT_A_LEVEL")
        .unwrap();

    assert!(config.commit().is_err());

    assert!(context.find_logger("app").is_none());
    assert!(config.handler("bad").is_none());
    assert!(config.pending_actions() > 0);

    config.forget();
    assert!(config.handler_configuration("bad").is_none());
}

#[test]
fn unknown_handler_reference_fails_validation() {
    let (_, mut config) = session();
    config
        .add_logger_configuration("app")
        .unwrap()
        .add_handler_name("missing");

    let err = config.commit().unwrap_err();
    assert!(matches!(err, Error::UnknownName { kind: EntityKind::Handler, .. }));
}

#[test]
fn class_lookup_errors_are_immediate() {
    let (_, mut config) = session();

    assert!(matches!(
        config.add_handler_configuration(Some("nowhere"), CONSOLE_HANDLER, "a", &[]),
        Err(Error::ModuleNotFound(_))
    ));
    assert!(matches!(
        config.add_handler_configuration(None, "no.such.Handler", "b", &[]),
        Err(Error::ClassNotFound { .. })
    ));
    assert!(matches!(
        config.add_handler_configuration(None, PATTERN_FORMATTER, "c", &[]),
        Err(Error::NotAssignable { .. })
    ));
    assert_eq!(config.pending_actions(), 0);
}

#[test]
fn unknown_property_is_rejected() {
    let (_, mut config) = session();
    let mut handler = config
        .add_handler_configuration(None, CONSOLE_HANDLER, "h", &[])
        .unwrap();

    let err = handler
        .set_property_value_string("colour", "blue")
        .unwrap_err();
    assert!(matches!(err, Error::NoSuchProperty { .. }));
}

#[test]
fn logger_gets_handlers_formatter_and_level() {
    let (context, mut config) = session();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("app.log");

    config
        .add_formatter_configuration(None, PATTERN_FORMATTER, "plain", &[])
        .unwrap()
        .set_property_value_string("pattern", "{level} {logger} {msg}")
        .unwrap();
    {
        let mut file = config
            .add_handler_configuration(None, FILE_HANDLER, "file", &["file_name", "append"])
            .unwrap();
        file.set_property_value_string("file_name", &path.display().to_string())
            .unwrap();
        file.set_property_value_string("append", "false").unwrap();
        file.set_formatter_name(Some("plain")).unwrap();
    }
    {
        let mut logger = config.add_logger_configuration("app.db").unwrap();
        logger.set_level(Some("DEBUG"));
        logger.set_use_parent_handlers(Some(false));
        logger.add_handler_name("file");
    }
    config.commit().unwrap();

    let logger = context.logger("app.db");
    assert_eq!(logger.level(), Some(Level::Debug));
    assert!(!logger.use_parent_handlers());
    logger.debug("connected");
    logger.trace("dropped");
    config.handler("file").unwrap().flush().unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written, "DEBUG app.db connected\n");
}

#[test]
fn handler_filter_expression_can_name_configured_filters() {
    let (_, mut config) = session();
    config
        .add_filter_configuration(None, DENY_ALL_FILTER, "quiet", &[])
        .unwrap();
    config
        .add_handler_configuration(None, CONSOLE_HANDLER, "h", &[])
        .unwrap()
        .set_filter(Some("any(levels(ERROR), quiet)"))
        .unwrap();

    config.commit().unwrap();

    let handler = config.handler("h").unwrap();
    assert!(handler.core().filter().is_some());
    assert!(config.filter("quiet").is_some());
}

#[test]
fn nested_handlers_follow_the_multi_handler() {
    let (_, mut config) = session();
    config
        .add_handler_configuration(None, CONSOLE_HANDLER, "out", &[])
        .unwrap();
    config
        .add_handler_configuration(None, MULTI_HANDLER, "fanout", &[])
        .unwrap()
        .set_handler_names(["out"]);
    config.commit().unwrap();
    assert_eq!(config.handler("fanout").unwrap().handlers().len(), 1);

    config
        .handler_configuration_mut("fanout")
        .unwrap()
        .remove_handler_name("out");
    config.commit().unwrap();
    assert!(config.handler("fanout").unwrap().handlers().is_empty());
}

#[test]
fn prepare_keeps_the_queue_until_commit() {
    let (_, mut config) = session();
    config
        .add_handler_configuration(None, CONSOLE_HANDLER, "h", &[])
        .unwrap();

    config.prepare().unwrap();
    assert!(config.is_prepared());
    assert!(config.handler("h").is_some());
    assert_eq!(config.pending_actions(), 1);

    config.prepare().unwrap();
    config.commit().unwrap();
    assert!(!config.is_prepared());
    assert_eq!(config.pending_actions(), 0);
}

#[test]
fn removed_logger_is_reset_to_defaults() {
    let (context, mut config) = session();
    config
        .add_handler_configuration(None, CONSOLE_HANDLER, "h", &[])
        .unwrap();
    {
        let mut logger = config.add_logger_configuration("svc").unwrap();
        logger.set_level(Some("ERROR"));
        logger.set_use_parent_handlers(Some(false));
        logger.add_handler_name("h");
    }
    config.commit().unwrap();

    assert!(config.remove_logger_configuration("svc"));
    config.commit().unwrap();

    let logger = context.find_logger("svc").unwrap();
    assert_eq!(logger.level(), None);
    assert!(logger.handlers().is_empty());
    assert!(logger.use_parent_handlers());
    assert!(config.logger("svc").is_none());
}

#[test]
fn forgetting_a_property_change_restores_the_old_value() {
    let (_, mut config) = session();
    config
        .add_handler_configuration(None, CONSOLE_HANDLER, "h", &[])
        .unwrap()
        .set_level("WARN")
        .unwrap();
    config.commit().unwrap();

    config
        .handler_configuration_mut("h")
        .unwrap()
        .set_level("ERROR")
        .unwrap();
    assert_eq!(config.handler_configuration("h").unwrap().level(), Some("ERROR"));

    config.forget();

    assert_eq!(config.handler_configuration("h").unwrap().level(), Some("WARN"));
    assert_eq!(config.handler("h").unwrap().core().level(), Level::Warn);
}

#[derive(Default)]
struct Counter {
    hits: AtomicUsize,
}

#[test]
fn module_classes_and_post_configuration_methods() {
    let class = ClassBuilder::<Counter>::pojo("app.Counter")
        .default_constructor()
        .property("start", logweave::ValueType::Int, |c, v| {
            let start = usize::try_from(v.as_i64()?).unwrap_or_default();
            c.hits.store(start, Ordering::SeqCst);
            Ok(())
        })
        .method("bump", |c| {
            c.hits.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .build();
    let modules = Modules::new().with("app", ClassRegistry::new().with(class));
    let mut config = LogContextConfiguration::with_loader(LogContext::new(), Arc::new(modules));

    {
        let mut counter = config
            .add_pojo_configuration(Some("app"), "app.Counter", "counter", &[])
            .unwrap();
        counter.set_property_value_string("start", "10").unwrap();
        assert!(counter.add_post_configuration_method("explode").unwrap());
    }
    assert!(matches!(config.commit(), Err(Error::NoSuchMethod { .. })));
    config.forget();
    assert!(config.pojo_configuration("counter").is_none());

    {
        let mut counter = config
            .add_pojo_configuration(Some("app"), "app.Counter", "counter", &[])
            .unwrap();
        counter.set_property_value_string("start", "10").unwrap();
        counter.add_post_configuration_method("bump").unwrap();
        assert!(!counter.add_post_configuration_method("bump").unwrap());
    }
    config.commit().unwrap();

    let counter = config.pojo::<Counter>("counter").unwrap();
    assert_eq!(counter.hits.load(Ordering::SeqCst), 11);
    assert_eq!(
        config.pojo_configuration("counter").unwrap().module_name(),
        Some("app")
    );
}

#[test]
fn nested_handler_cycles_fail_validation() {
    let (context, mut config) = session();
    config
        .add_handler_configuration(None, MULTI_HANDLER, "m", &[])
        .unwrap()
        .set_handler_names(["m"]);
    config.add_logger_configuration("app").unwrap().add_handler_name("m");

    let err = config.commit().unwrap_err();
    assert!(matches!(err, Error::InvalidValue { .. }));
    assert!(err.is_argument_error());
    assert!(config.handler("m").is_none());
    assert!(context.find_logger("app").is_none());
    config.forget();

    config
        .add_handler_configuration(None, MULTI_HANDLER, "a", &[])
        .unwrap();
    config
        .add_handler_configuration(None, MULTI_HANDLER, "b", &[])
        .unwrap()
        .set_handler_names(["a"]);
    config.commit().unwrap();

    assert!(config.handler_configuration_mut("a").unwrap().add_handler_name("b"));
    assert!(matches!(config.commit(), Err(Error::InvalidValue { .. })));
    config.forget();

    assert!(config.handler_configuration("a").unwrap().handler_names().is_empty());
    assert!(config.handler("a").unwrap().handlers().is_empty());
}

#[test]
fn apply_failures_are_reported_and_the_rest_of_the_commit_lands() {
    let class = ClassBuilder::<Counter>::pojo("app.Fragile")
        .default_constructor()
        .property("start", logweave::ValueType::Int, |c, v| {
            let start = usize::try_from(v.as_i64()?).unwrap_or_default();
            c.hits.store(start, Ordering::SeqCst);
            Ok(())
        })
        .property("limit", logweave::ValueType::Int, |_, _| {
            Err(Error::Unsupported("limit".to_string()))
        })
        .method("fail", |_| Err(Error::Unsupported("fail".to_string())))
        .method("bump", |c| {
            c.hits.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .build();
    let modules = Modules::new().with("app", ClassRegistry::new().with(class));
    let mut config = LogContextConfiguration::with_loader(LogContext::new(), Arc::new(modules));

    {
        let mut fragile = config
            .add_pojo_configuration(Some("app"), "app.Fragile", "fragile", &[])
            .unwrap();
        fragile.set_property_value_string("limit", "3").unwrap();
        fragile.set_property_value_string("start", "5").unwrap();
        fragile
            .set_post_configuration_methods(["fail", "bump"])
            .unwrap();
    }

    config.commit().unwrap();

    let fragile = config.pojo::<Counter>("fragile").unwrap();
    assert_eq!(fragile.hits.load(Ordering::SeqCst), 6);
    assert_eq!(config.pending_actions(), 0);
    assert_eq!(
        config.pojo_configuration("fragile").unwrap().property_value_string("limit"),
        Some("3")
    );
}
