//! Descriptors for the classes that ship with logweave, and their names.

use super::{ClassBuilder, ClassRegistry};
use crate::error::Error;
use crate::error_managers::{DiagnosticErrorManager, OnlyOnceErrorManager};
use crate::filters::{AcceptAllFilter, DenyAllFilter, LevelRangeFilter, RegexFilter, SubstituteFilter};
use crate::formatters::{JsonFormatter, PatternFormatter};
use crate::handlers::{ConsoleHandler, FileHandler, MultiHandler, Target};
use crate::level::Level;
use crate::runtime::Handler;
use crate::value::{Value, ValueType};

pub const CONSOLE_HANDLER: &str = "logweave.handlers.ConsoleHandler";
pub const FILE_HANDLER: &str = "logweave.handlers.FileHandler";
pub const MULTI_HANDLER: &str = "logweave.handlers.MultiHandler";
pub const PATTERN_FORMATTER: &str = "logweave.formatters.PatternFormatter";
pub const JSON_FORMATTER: &str = "logweave.formatters.JsonFormatter";
pub const ACCEPT_ALL_FILTER: &str = "logweave.filters.AcceptAllFilter";
pub const DENY_ALL_FILTER: &str = "logweave.filters.DenyAllFilter";
pub const REGEX_FILTER: &str = "logweave.filters.RegexFilter";
pub const LEVEL_RANGE_FILTER: &str = "logweave.filters.LevelRangeFilter";
pub const SUBSTITUTE_FILTER: &str = "logweave.filters.SubstituteFilter";
pub const DIAGNOSTIC_ERROR_MANAGER: &str = "logweave.error_managers.DiagnosticErrorManager";
pub const ONLY_ONCE_ERROR_MANAGER: &str = "logweave.error_managers.OnlyOnceErrorManager";

fn string_arg(args: &[Value], index: usize) -> Result<String, Error> {
    args.get(index)
        .ok_or_else(|| Error::Unsupported(format!("missing constructor argument {index}")))?
        .as_str()
        .map(|s| s.unwrap_or_default().to_string())
}

fn bool_arg(args: &[Value], index: usize) -> Result<bool, Error> {
    args.get(index)
        .ok_or_else(|| Error::Unsupported(format!("missing constructor argument {index}")))?
        .as_bool()
}

fn target(value: &Value) -> Result<Target, Error> {
    value.as_str()?.unwrap_or("split").parse()
}

pub(super) fn registry() -> ClassRegistry {
    let mut registry = ClassRegistry::new();
    register_handlers(&mut registry);
    register_formatters(&mut registry);
    register_filters(&mut registry);
    register_error_managers(&mut registry);
    registry
}

fn register_handlers(registry: &mut ClassRegistry) {
    let target_type = ValueType::Enum(Target::NAMES);

    registry.register(
        ClassBuilder::<ConsoleHandler>::handler(CONSOLE_HANDLER)
            .default_constructor()
            .constructor(&[target_type], |args| {
                Ok(ConsoleHandler::new(target(args.first().unwrap_or(&Value::Null))?))
            })
            .property("target", target_type, |h, v| {
                h.set_target(target(v)?);
                Ok(())
            })
            .getter("target", target_type, |h| {
                Value::String(h.target().as_str().to_string())
            })
            .property("autoflush", ValueType::Bool, |h, v| {
                h.set_autoflush(v.as_bool()?);
                Ok(())
            })
            .getter("autoflush", ValueType::Bool, |h| Value::Bool(h.autoflush()))
            .build(),
    );

    registry.register(
        ClassBuilder::<FileHandler>::handler(FILE_HANDLER)
            .default_constructor()
            .constructor(&[ValueType::String], |args| {
                Ok(FileHandler::new(&string_arg(args, 0)?, true))
            })
            .constructor(&[ValueType::String, ValueType::Bool], |args| {
                Ok(FileHandler::new(&string_arg(args, 0)?, bool_arg(args, 1)?))
            })
            .property("file_name", ValueType::String, |h, v| {
                h.set_file_name(v.as_str()?);
                Ok(())
            })
            .getter("file_name", ValueType::String, |h| {
                h.file_name().map_or(Value::Null, |p| {
                    Value::String(p.display().to_string())
                })
            })
            .property("append", ValueType::Bool, |h, v| {
                h.set_append(v.as_bool()?);
                Ok(())
            })
            .getter("append", ValueType::Bool, |h| Value::Bool(h.append()))
            .method("close", |h| {
                h.close();
                Ok(())
            })
            .build(),
    );

    registry.register(
        ClassBuilder::<MultiHandler>::handler(MULTI_HANDLER)
            .default_constructor()
            .build(),
    );
}

fn register_formatters(registry: &mut ClassRegistry) {
    registry.register(
        ClassBuilder::<PatternFormatter>::formatter(PATTERN_FORMATTER)
            .default_constructor()
            .constructor(&[ValueType::String], |args| {
                Ok(PatternFormatter::new(&string_arg(args, 0)?))
            })
            .property("pattern", ValueType::String, |f, v| {
                f.set_pattern(v.as_str()?.unwrap_or_default());
                Ok(())
            })
            .getter("pattern", ValueType::String, |f| Value::String(f.pattern()))
            .property("timestamp_format", ValueType::String, |f, v| {
                f.set_timestamp_format(v.as_str()?.unwrap_or_default());
                Ok(())
            })
            .getter("timestamp_format", ValueType::String, |f| {
                Value::String(f.timestamp_format())
            })
            .property("time_zone", ValueType::TimeZone, |f, v| {
                f.set_time_zone(v.as_time_zone()?.unwrap_or_default());
                Ok(())
            })
            .getter("time_zone", ValueType::TimeZone, |f| Value::TimeZone(f.time_zone()))
            .build(),
    );

    registry.register(
        ClassBuilder::<JsonFormatter>::formatter(JSON_FORMATTER)
            .default_constructor()
            .property("pretty_print", ValueType::Bool, |f, v| {
                f.set_pretty_print(v.as_bool()?);
                Ok(())
            })
            .getter("pretty_print", ValueType::Bool, |f| Value::Bool(f.pretty_print()))
            .property("time_zone", ValueType::TimeZone, |f, v| {
                f.set_time_zone(v.as_time_zone()?.unwrap_or_default());
                Ok(())
            })
            .getter("time_zone", ValueType::TimeZone, |f| Value::TimeZone(f.time_zone()))
            .build(),
    );
}

fn register_filters(registry: &mut ClassRegistry) {
    registry.register(
        ClassBuilder::<AcceptAllFilter>::filter(ACCEPT_ALL_FILTER)
            .constructor(&[], |_| Ok(AcceptAllFilter))
            .build(),
    );
    registry.register(
        ClassBuilder::<DenyAllFilter>::filter(DENY_ALL_FILTER)
            .constructor(&[], |_| Ok(DenyAllFilter))
            .build(),
    );

    registry.register(
        ClassBuilder::<RegexFilter>::filter(REGEX_FILTER)
            .constructor(&[ValueType::String], |args| RegexFilter::new(&string_arg(args, 0)?))
            .property("pattern", ValueType::String, |f, v| {
                f.set_pattern(v.as_str()?.unwrap_or_default())
            })
            .getter("pattern", ValueType::String, |f| Value::String(f.pattern()))
            .build(),
    );

    let level = |v: &Value, default: Level| v.as_level().map(|l| l.unwrap_or(default));
    registry.register(
        ClassBuilder::<LevelRangeFilter>::filter(LEVEL_RANGE_FILTER)
            .default_constructor()
            .property("min_level", ValueType::Level, move |f, v| {
                f.set_min_level(level(v, Level::All)?);
                Ok(())
            })
            .getter("min_level", ValueType::Level, |f| Value::Level(f.min_level()))
            .property("max_level", ValueType::Level, move |f, v| {
                f.set_max_level(level(v, Level::Off)?);
                Ok(())
            })
            .getter("max_level", ValueType::Level, |f| Value::Level(f.max_level()))
            .property("min_inclusive", ValueType::Bool, |f, v| {
                f.set_min_inclusive(v.as_bool()?);
                Ok(())
            })
            .property("max_inclusive", ValueType::Bool, |f, v| {
                f.set_max_inclusive(v.as_bool()?);
                Ok(())
            })
            .build(),
    );

    registry.register(
        ClassBuilder::<SubstituteFilter>::filter(SUBSTITUTE_FILTER)
            .constructor_property("pattern", ValueType::String)
            .constructor_property("replacement", ValueType::String)
            .constructor_property("replace_all", ValueType::Bool)
            .constructor(
                &[ValueType::String, ValueType::String, ValueType::Bool],
                |args| {
                    SubstituteFilter::new(
                        &string_arg(args, 0)?,
                        &string_arg(args, 1)?,
                        bool_arg(args, 2)?,
                    )
                },
            )
            .build(),
    );
}

fn register_error_managers(registry: &mut ClassRegistry) {
    registry.register(
        ClassBuilder::<DiagnosticErrorManager>::error_manager(DIAGNOSTIC_ERROR_MANAGER)
            .constructor(&[], |_| Ok(DiagnosticErrorManager))
            .build(),
    );
    registry.register(
        ClassBuilder::<OnlyOnceErrorManager>::error_manager(ONLY_ONCE_ERROR_MANAGER)
            .constructor(&[], |_| Ok(OnlyOnceErrorManager::new()))
            .build(),
    );
}
