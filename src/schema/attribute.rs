mod builder;
pub(crate) use builder::append_declared;

use super::EntityId;
use crate::{boot, stmt};

/// One attribute in an entity's flattened state layout.
///
/// Inherited attributes are cloned into each subtype descriptor, so every
/// descriptor carries its complete layout and `state_position` is stable
/// across the hierarchy: a subtype never renumbers what the supertype laid
/// out.
#[derive(Debug, Clone)]
pub struct AttributeMapping {
    pub name: String,

    /// Index into the state array
    pub state_position: usize,

    /// Index into the fetchable enumeration. Embedded attributes span one
    /// index for themselves plus one per leaf field.
    pub fetchable_index: usize,

    /// The hierarchy member that declared the attribute
    pub declared_by: EntityId,

    /// Ordinal of the owning table within the entity's span
    pub table: usize,

    pub selectables: Vec<boot::Selectable>,

    pub insertable: bool,
    pub updatable: bool,
    pub nullable: bool,
    pub optimistic_locked: bool,

    /// Participates in dirty comparison. Plural attributes and lazy
    /// attributes outside their group are excluded elsewhere; this flag
    /// captures the shape-level exclusions.
    pub dirty_checkable: bool,

    pub cascade: boot::Cascade,
    pub fetch: boot::Fetch,

    pub kind: AttributeKind,
}

#[derive(Debug, Clone)]
pub enum AttributeKind {
    Basic {
        ty: stmt::Type,
    },

    Any {
        discriminator_ty: stmt::Type,
        key_ty: stmt::Type,

        /// Stored discriminator value -> target entity name
        mapping: Vec<(stmt::Value, String)>,
    },

    Embedded {
        model: EmbeddedModel,

        /// The composite doubles as a foreign key toward this entity.
        foreign_key_target: Option<String>,
    },

    Plural {
        role: String,
    },

    ToOne {
        target: String,
        key: ForeignKeyMapping,
    },
}

/// The foreign-key half of a to-one association.
#[derive(Debug, Clone)]
pub struct ForeignKeyMapping {
    pub columns: Vec<boot::Column>,

    /// The referenced identifier property on the target
    pub target_property: String,

    pub target_ty: stmt::Type,
}

/// Flattened composite layout. The composite value is a record with one
/// field per entry, nested composites nesting records.
#[derive(Debug, Clone)]
pub struct EmbeddedModel {
    pub fields: Vec<EmbeddedField>,
}

#[derive(Debug, Clone)]
pub struct EmbeddedField {
    pub name: String,
    pub selectables: Vec<boot::Selectable>,
    pub kind: EmbeddedFieldKind,
}

#[derive(Debug, Clone)]
pub enum EmbeddedFieldKind {
    Basic { ty: stmt::Type },
    Embedded(EmbeddedModel),
}

impl EmbeddedModel {
    /// Leaf fields across all nesting levels.
    pub fn leaf_count(&self) -> usize {
        self.fields
            .iter()
            .map(|field| match &field.kind {
                EmbeddedFieldKind::Basic { .. } => 1,
                EmbeddedFieldKind::Embedded(nested) => nested.leaf_count(),
            })
            .sum()
    }
}

impl AttributeMapping {
    pub fn is_lazy(&self) -> bool {
        matches!(self.fetch, boot::Fetch::Lazy { .. })
    }

    /// The fetch group name, when lazy. Ungrouped lazy attributes form a
    /// singleton group named after the attribute.
    pub fn lazy_group(&self) -> Option<&str> {
        match &self.fetch {
            boot::Fetch::Lazy { group } => Some(group.as_deref().unwrap_or(&self.name)),
            boot::Fetch::Eager => None,
        }
    }

    /// Number of fetchable indices this attribute occupies.
    pub fn fetchable_span(&self) -> usize {
        match &self.kind {
            AttributeKind::Embedded { model, .. } => 1 + model.leaf_count(),
            _ => 1,
        }
    }

    /// Whether `new` differs from `old` for write purposes.
    ///
    /// Embedded values compare field by field, skipping fields with no
    /// updatable column; everything else compares whole values.
    pub fn is_dirty(&self, old: &stmt::Value, new: &stmt::Value) -> bool {
        match &self.kind {
            AttributeKind::Embedded { model, .. } => embedded_dirty(model, old, new),
            _ => old != new,
        }
    }

    /// The column types this attribute stores, leaf by leaf. Used to shape
    /// union padding columns.
    pub fn column_types(&self) -> Vec<stmt::Type> {
        match &self.kind {
            AttributeKind::Basic { ty } => match ty {
                stmt::Type::Record(fields) => fields.clone(),
                other => vec![other.clone()],
            },
            AttributeKind::Any {
                discriminator_ty,
                key_ty,
                ..
            } => vec![discriminator_ty.clone(), key_ty.clone()],
            AttributeKind::Embedded { model, .. } => embedded_column_types(model),
            AttributeKind::ToOne { key, .. } => {
                vec![key.target_ty.clone(); key.columns.len()]
            }
            AttributeKind::Plural { .. } => vec![],
        }
    }
}

fn embedded_column_types(model: &EmbeddedModel) -> Vec<stmt::Type> {
    model
        .fields
        .iter()
        .flat_map(|field| match &field.kind {
            EmbeddedFieldKind::Basic { ty } => vec![ty.clone()],
            EmbeddedFieldKind::Embedded(nested) => embedded_column_types(nested),
        })
        .collect()
}

fn embedded_dirty(model: &EmbeddedModel, old: &stmt::Value, new: &stmt::Value) -> bool {
    let (old, new) = match (old, new) {
        (stmt::Value::Record(old), stmt::Value::Record(new))
            if old.len() == model.fields.len() && new.len() == model.fields.len() =>
        {
            (old, new)
        }
        // Null-vs-record and mismatched shapes compare wholesale.
        _ => return old != new,
    };

    model.fields.iter().enumerate().any(|(i, field)| {
        let updatable = field
            .selectables
            .iter()
            .any(boot::Selectable::is_updatable);

        match &field.kind {
            EmbeddedFieldKind::Basic { .. } => updatable && old.fields[i] != new.fields[i],
            EmbeddedFieldKind::Embedded(nested) => {
                embedded_dirty(nested, &old.fields[i], &new.fields[i])
            }
        }
    })
}
