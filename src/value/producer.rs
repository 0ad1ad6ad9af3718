use super::Value;
use super::resolver::Registries;
use crate::configuration::EntityKind;
use crate::error::Error;
use crate::filters::FilterExpr;

/// How a property value is obtained when an action applies.
///
/// `Deferred` and `Filter` are re-read from the live registries at the point
/// of use, so they see instances that earlier actions in the same commit
/// registered during pre-create.
#[derive(Debug, Clone)]
pub enum ValueProducer {
    Null,
    Immediate(Value),
    Deferred { kind: EntityKind, name: String },
    Filter(FilterExpr),
}

impl ValueProducer {
    /// # Errors
    /// Filter expressions fail when a referenced filter has no live instance.
    pub(crate) fn produce(&self, registries: &dyn Registries) -> Result<Value, Error> {
        match self {
            Self::Null => Ok(Value::Null),
            Self::Immediate(value) => Ok(value.clone()),
            Self::Deferred { kind, name } => Ok(registries
                .instance(*kind, name)
                .map_or(Value::Null, |instance| instance.value_for(*kind))),
            Self::Filter(expr) => {
                let filter = expr.build(&mut |name| {
                    registries
                        .instance(EntityKind::Filter, name)
                        .and_then(|instance| instance.filter())
                })?;
                Ok(Value::Filter(filter))
            }
        }
    }
}
