//! Converts configuration strings into typed value producers.

use super::{Value, ValueExpression, ValueProducer, ValueType};
use crate::configuration::EntityKind;
use crate::error::Error;
use crate::filters::FilterExpr;
use crate::level::Level;
use crate::reflect::Instance;
use crate::runtime::{Charset, TimeZone};
use std::str::FromStr;

/// Read access to configured names and live instances.
pub(crate) trait Registries {
    /// Whether a configuration with this name is visible (not tombstoned).
    fn is_defined(&self, kind: EntityKind, name: &str) -> bool;

    fn instance(&self, kind: EntityKind, name: &str) -> Option<Instance>;

    /// # Errors
    /// `Error::UnknownLevel` for names the live context does not know.
    fn level_for_name(&self, name: &str) -> Result<Level, Error>;
}

/// Resolves `expr` for a property of type `ty`.
///
/// With `immediate`, referenced objects must already be live and are
/// captured now; otherwise they are looked up again when the producer runs.
pub(crate) fn resolve(
    registries: &dyn Registries,
    property: &str,
    ty: ValueType,
    expr: Option<&ValueExpression>,
    immediate: bool,
) -> Result<ValueProducer, Error> {
    let Some(expr) = expr else {
        if ty.is_primitive() {
            return Err(Error::NullPrimitive {
                property: property.to_string(),
            });
        }
        return Ok(ValueProducer::Null);
    };
    let text = expr.resolved().as_str();
    let value = match ty {
        ValueType::Bool => Value::Bool(text.eq_ignore_ascii_case("true")),
        ValueType::Byte => Value::Byte(parse_number(property, text)?),
        ValueType::Short => Value::Short(parse_number(property, text)?),
        ValueType::Int => Value::Int(parse_number(property, text)?),
        ValueType::Long => Value::Long(parse_number(property, text)?),
        ValueType::Float => Value::Float(parse_number(property, text)?),
        ValueType::Double => Value::Double(parse_number(property, text)?),
        ValueType::Char => Value::Char(
            text.chars()
                .next()
                .ok_or_else(|| Error::invalid_value(property, text, "empty string"))?,
        ),
        ValueType::String => Value::String(text.to_string()),
        ValueType::Enum(variants) => {
            if !variants.contains(&text) {
                return Err(Error::invalid_value(
                    property,
                    text,
                    format!("expected one of {}", variants.join(", ")),
                ));
            }
            Value::String(text.to_string())
        }
        ValueType::TimeZone => Value::TimeZone(TimeZone::lookup(text)),
        ValueType::Charset => Value::Charset(Charset::from_str(text)?),
        ValueType::Level => Value::Level(registries.level_for_name(text)?),
        ValueType::Handler => return reference(registries, EntityKind::Handler, text, immediate),
        ValueType::Formatter => {
            return reference(registries, EntityKind::Formatter, text, immediate);
        }
        ValueType::ErrorManager => {
            return reference(registries, EntityKind::ErrorManager, text, immediate);
        }
        ValueType::Object => return reference(registries, EntityKind::Pojo, text, immediate),
        ValueType::Filter => return filter(registries, text, immediate),
    };
    Ok(ValueProducer::Immediate(value))
}

fn parse_number<T>(property: &str, text: &str) -> Result<T, Error>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    text.trim()
        .parse()
        .map_err(|e| Error::invalid_value(property, text, e))
}

fn reference(
    registries: &dyn Registries,
    kind: EntityKind,
    name: &str,
    immediate: bool,
) -> Result<ValueProducer, Error> {
    let unknown = || Error::UnknownName {
        kind,
        name: name.to_string(),
    };
    if !registries.is_defined(kind, name) {
        return Err(unknown());
    }
    if !immediate {
        return Ok(ValueProducer::Deferred {
            kind,
            name: name.to_string(),
        });
    }
    let instance = registries.instance(kind, name).ok_or_else(unknown)?;
    Ok(ValueProducer::Immediate(instance.value_for(kind)))
}

fn filter(
    registries: &dyn Registries,
    text: &str,
    immediate: bool,
) -> Result<ValueProducer, Error> {
    let expr = FilterExpr::parse(text)?;
    for name in expr.named_filters() {
        let live = !immediate || registries.instance(EntityKind::Filter, name).is_some();
        if !registries.is_defined(EntityKind::Filter, name) || !live {
            return Err(Error::UnknownName {
                kind: EntityKind::Filter,
                name: name.to_string(),
            });
        }
    }
    let producer = ValueProducer::Filter(expr);
    if immediate {
        return Ok(ValueProducer::Immediate(producer.produce(registries)?));
    }
    Ok(producer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::ConsoleHandler;
    use crate::reflect::{Instance, Role};
    use std::collections::HashMap;
    use std::sync::Arc;

    #[derive(Default)]
    struct Fixture {
        defined: Vec<(EntityKind, String)>,
        live: HashMap<(EntityKind, String), Instance>,
    }

    impl Registries for Fixture {
        fn is_defined(&self, kind: EntityKind, name: &str) -> bool {
            self.defined.iter().any(|(k, n)| *k == kind && n == name)
        }

        fn instance(&self, kind: EntityKind, name: &str) -> Option<Instance> {
            self.live.get(&(kind, name.to_string())).cloned()
        }

        fn level_for_name(&self, name: &str) -> Result<Level, Error> {
            name.parse().map_err(|_| Error::UnknownLevel(name.to_string()))
        }
    }

    fn lit(text: &str) -> ValueExpression {
        ValueExpression::literal(text)
    }

    fn immediate(producer: ValueProducer) -> Value {
        match producer {
            ValueProducer::Immediate(value) => value,
            other => panic!("expected immediate, got {other:?}"),
        }
    }

    #[test]
    fn null_is_rejected_only_for_primitives() {
        let reg = Fixture::default();
        assert!(matches!(
            resolve(&reg, "p", ValueType::Int, None, false),
            Err(Error::NullPrimitive { .. })
        ));
        assert!(matches!(
            resolve(&reg, "p", ValueType::String, None, false),
            Ok(ValueProducer::Null)
        ));
    }

    #[test]
    fn scalars_parse() {
        let reg = Fixture::default();
        let v = |ty, text| immediate(resolve(&reg, "p", ty, Some(&lit(text)), false).unwrap());
        assert_eq!(v(ValueType::Bool, "TRUE"), Value::Bool(true));
        assert_eq!(v(ValueType::Bool, "yes"), Value::Bool(false));
        assert_eq!(v(ValueType::Int, "42"), Value::Int(42));
        assert_eq!(v(ValueType::Long, "-7"), Value::Long(-7));
        assert_eq!(v(ValueType::Double, "1.5"), Value::Double(1.5));
        assert_eq!(v(ValueType::Char, "xyz"), Value::Char('x'));
        assert_eq!(v(ValueType::Level, "warning"), Value::Level(Level::Warn));
        assert!(resolve(&reg, "p", ValueType::Byte, Some(&lit("300")), false).is_err());
        assert!(resolve(&reg, "p", ValueType::Char, Some(&lit("")), false).is_err());
    }

    #[test]
    fn enums_match_case_sensitively() {
        let reg = Fixture::default();
        let ty = ValueType::Enum(&["stdout", "stderr"]);
        assert!(resolve(&reg, "target", ty, Some(&lit("stderr")), false).is_ok());
        assert!(resolve(&reg, "target", ty, Some(&lit("STDERR")), false).is_err());
    }

    #[test]
    fn references_defer_or_snapshot() {
        let mut reg = Fixture::default();
        reg.defined.push((EntityKind::Handler, "h".to_string()));

        let deferred = resolve(&reg, "p", ValueType::Handler, Some(&lit("h")), false).unwrap();
        assert!(matches!(deferred, ValueProducer::Deferred { .. }));
        assert!(deferred.produce(&reg).unwrap().is_null());

        // Defined but not live yet.
        assert!(resolve(&reg, "p", ValueType::Handler, Some(&lit("h")), true).is_err());

        let handler = Arc::new(ConsoleHandler::default());
        reg.live.insert(
            (EntityKind::Handler, "h".to_string()),
            Instance::new(handler.clone(), Role::Handler(handler)),
        );
        let snapshot = resolve(&reg, "p", ValueType::Handler, Some(&lit("h")), true).unwrap();
        assert!(matches!(snapshot, ValueProducer::Immediate(Value::Handler(_))));

        assert!(matches!(
            resolve(&reg, "p", ValueType::Formatter, Some(&lit("h")), false),
            Err(Error::UnknownName { .. })
        ));
    }

    #[test]
    fn filter_names_must_be_defined() {
        let reg = Fixture::default();
        assert!(resolve(&reg, "filter", ValueType::Filter, Some(&lit("not(quiet)")), false).is_err());
        assert!(matches!(
            resolve(&reg, "filter", ValueType::Filter, Some(&lit("levels(INFO)")), false),
            Ok(ValueProducer::Filter(_))
        ));
    }
}
