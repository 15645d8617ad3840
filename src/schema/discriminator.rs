use crate::{boot, stmt, Error, Result};
use std::collections::BTreeMap;

/// The resolved discriminator value for one hierarchy member.
///
/// Sentinels are represented explicitly rather than threaded through value
/// slots, so a literal can never alias a marker.
#[derive(Debug, Clone, PartialEq)]
pub enum DiscriminatorValue {
    /// Rows carrying this literal belong to the entity.
    Literal(stmt::Value),

    /// Rows with a null discriminator column belong to the entity.
    Null,

    /// Rows with any non-null, otherwise unmatched value belong to the
    /// entity.
    NotNull,
}

impl DiscriminatorValue {
    pub fn is_sentinel(&self) -> bool {
        !matches!(self, Self::Literal(_))
    }

    pub fn as_literal(&self) -> Option<&stmt::Value> {
        match self {
            Self::Literal(value) => Some(value),
            _ => None,
        }
    }
}

/// Runtime discriminator mapping for one entity.
#[derive(Debug, Clone)]
pub struct DiscriminatorMapping {
    pub source: DiscriminatorSource,
    pub ty: stmt::Type,

    /// This entity's own value. Abstract types keep a value for predicate
    /// construction but never contribute it to the insert-time list.
    pub value: DiscriminatorValue,

    /// The rendered SQL literal; `None` for sentinels.
    pub sql_literal: Option<String>,

    pub force: bool,
    pub insertable: bool,

    /// Entity name -> value for every non-abstract member of the hierarchy.
    /// Populated while linking; identical on every member.
    pub value_map: BTreeMap<String, DiscriminatorValue>,
}

/// Where discriminator values physically come from.
#[derive(Debug, Clone)]
pub enum DiscriminatorSource {
    Column(boot::Column),
    Formula(String),

    /// No declared source; a CASE expression over subtype key null-tests is
    /// synthesized at query time (joined hierarchies only).
    Synthetic,
}

impl DiscriminatorMapping {
    /// SQL literals written at insert time, one per non-abstract hierarchy
    /// member claiming a literal value.
    pub fn insert_literals(&self) -> Vec<String> {
        self.value_map
            .values()
            .filter_map(|value| value.as_literal())
            .map(|value| render_sql_literal(value).expect("validated at resolve"))
            .collect()
    }

    /// The values selecting the named entities (in `value_map` order).
    pub fn values_for<'a>(
        &'a self,
        entities: &'a [String],
    ) -> impl Iterator<Item = &'a DiscriminatorValue> + 'a {
        self.value_map
            .iter()
            .filter(move |(name, _)| entities.iter().any(|entity| entity == *name))
            .map(|(_, value)| value)
    }
}

/// Translates a boot discriminator declaration into its runtime mapping.
///
/// `ordinal` is the entity's position within its hierarchy (root = 0,
/// registration order), used when no explicit value is declared.
pub(crate) fn resolve(
    entity: &str,
    decl: &boot::Discriminator,
    ordinal: usize,
) -> Result<DiscriminatorMapping> {
    let value = match &decl.value {
        boot::DiscriminatorValueSpec::Literal(literal) => {
            if !literal.is_a(&decl.ty) {
                return Err(Error::mapping(
                    entity,
                    format!(
                        "discriminator value {literal:?} does not match declared type {:?}",
                        decl.ty
                    ),
                ));
            }
            DiscriminatorValue::Literal(literal.clone())
        }
        boot::DiscriminatorValueSpec::Default => DiscriminatorValue::Literal(implicit_value(
            entity,
            &decl.ty,
            ordinal,
        )?),
        boot::DiscriminatorValueSpec::Null => DiscriminatorValue::Null,
        boot::DiscriminatorValueSpec::NotNull => DiscriminatorValue::NotNull,
    };

    let sql_literal = match value.as_literal() {
        Some(literal) => {
            Some(render_sql_literal(literal).map_err(|err| {
                err.context(Error::mapping(entity, "unsupported discriminator type"))
            })?)
        }
        None => None,
    };

    let source = match &decl.source {
        boot::DiscriminatorSource::Column(column) => DiscriminatorSource::Column(column.clone()),
        boot::DiscriminatorSource::Formula(fragment) => {
            DiscriminatorSource::Formula(fragment.clone())
        }
        boot::DiscriminatorSource::Implicit => DiscriminatorSource::Synthetic,
    };

    Ok(DiscriminatorMapping {
        source,
        ty: decl.ty.clone(),
        value,
        sql_literal,
        force: decl.force,
        insertable: decl.insertable,
        value_map: BTreeMap::new(),
    })
}

/// The value used when an entity declares no explicit discriminator value.
fn implicit_value(entity: &str, ty: &stmt::Type, ordinal: usize) -> Result<stmt::Value> {
    match ty {
        stmt::Type::String => Ok(stmt::Value::String(entity.to_string())),
        stmt::Type::I32 => Ok(stmt::Value::I32(ordinal as i32)),
        stmt::Type::I64 => Ok(stmt::Value::I64(ordinal as i64)),
        _ => Err(Error::mapping(
            entity,
            format!("cannot derive an implicit discriminator value of type {ty:?}"),
        )),
    }
}

/// Renders a discriminator literal the way it appears in generated SQL.
pub(crate) fn render_sql_literal(value: &stmt::Value) -> Result<String> {
    use crate::err;

    match value {
        stmt::Value::Bool(v) => Ok(if *v { "true".into() } else { "false".into() }),
        stmt::Value::I32(v) => Ok(v.to_string()),
        stmt::Value::I64(v) => Ok(v.to_string()),
        stmt::Value::String(v) => Ok(format!("'{}'", v.replace('\'', "''"))),
        other => Err(err!("cannot render {other:?} as a discriminator literal")),
    }
}

/// Validates and accumulates one hierarchy member's value into the shared
/// value map. At most one subtype may claim a given literal; each sentinel
/// may be used at most once per hierarchy.
pub(crate) fn accumulate(
    root: &str,
    map: &mut BTreeMap<String, DiscriminatorValue>,
    entity: &str,
    value: &DiscriminatorValue,
) -> Result<()> {
    for (other, existing) in map.iter() {
        let conflict = match (existing, value) {
            (DiscriminatorValue::Literal(a), DiscriminatorValue::Literal(b)) => a == b,
            (DiscriminatorValue::Null, DiscriminatorValue::Null) => true,
            (DiscriminatorValue::NotNull, DiscriminatorValue::NotNull) => true,
            _ => false,
        };

        if conflict {
            return Err(Error::mapping(
                root,
                format!("subtypes `{other}` and `{entity}` claim the same discriminator value {value:?}"),
            ));
        }
    }

    map.insert(entity.to_string(), value.clone());
    Ok(())
}
