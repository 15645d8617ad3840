use super::{Column, Selectable};
use crate::stmt;
use std::fmt;

/// One declared attribute of an entity.
#[derive(Debug, Clone)]
pub struct Property {
    pub name: String,

    /// The underlying value shape
    pub value: PropertyValue,

    /// Secondary table holding the property's columns; `None` means the
    /// declaring entity's primary table.
    pub table: Option<String>,

    pub insertable: bool,
    pub updatable: bool,
    pub nullable: bool,

    /// Participates in optimistic-lock comparison
    pub optimistic_locked: bool,

    pub cascade: Cascade,
    pub fetch: Fetch,
}

impl Property {
    pub fn basic(name: impl Into<String>, column: Column, ty: stmt::Type) -> Self {
        Self::new(
            name,
            PropertyValue::Basic {
                selectables: vec![column.into()],
                ty,
            },
        )
    }

    pub fn new(name: impl Into<String>, value: PropertyValue) -> Self {
        Self {
            name: name.into(),
            value,
            table: None,
            insertable: true,
            updatable: true,
            nullable: false,
            optimistic_locked: true,
            cascade: Cascade::None,
            fetch: Fetch::Eager,
        }
    }

    pub fn lazy(mut self, group: Option<&str>) -> Self {
        self.fetch = Fetch::Lazy {
            group: group.map(str::to_owned),
        };
        self
    }

    pub fn on_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn is_lazy(&self) -> bool {
        matches!(self.fetch, Fetch::Lazy { .. })
    }
}

/// The five recognized value shapes, plus an escape variant for extension
/// value types the compiler does not understand.
#[derive(Clone)]
pub enum PropertyValue {
    /// Scalar backed by columns and/or formulas
    Basic {
        selectables: Vec<Selectable>,
        ty: stmt::Type,
    },

    /// Discriminated any-association: a stored discriminator value selects
    /// the concrete target entity
    Any(AnyValue),

    /// Composite flattened into the owner's table(s)
    Embedded {
        properties: Vec<Property>,

        /// When set, the composite doubles as a foreign key toward the named
        /// entity.
        foreign_key_target: Option<String>,
    },

    /// Collection; the element mapping lives in a collection descriptor
    /// (out of scope here), but the attribute still occupies a state slot.
    Plural { role: String },

    /// Single-valued association resolved via foreign key
    ToOne {
        target: String,
        columns: Vec<Column>,
    },

    /// An extension value type with no recognized shape. The model builder
    /// omits these attributes.
    Custom { type_name: String },
}

#[derive(Debug, Clone)]
pub struct AnyValue {
    /// Column storing the discriminator value
    pub discriminator_column: Column,

    pub discriminator_ty: stmt::Type,

    /// Column storing the target key
    pub key_column: Column,

    pub key_ty: stmt::Type,

    /// Stored discriminator value -> target entity name
    pub mapping: Vec<(stmt::Value, String)>,
}

impl PropertyValue {
    pub fn is_basic(&self) -> bool {
        matches!(self, Self::Basic { .. })
    }

    pub fn is_plural(&self) -> bool {
        matches!(self, Self::Plural { .. })
    }

    /// The selectables this value contributes to its owning table, if the
    /// shape carries them directly.
    pub fn selectables(&self) -> Vec<Selectable> {
        match self {
            Self::Basic { selectables, .. } => selectables.clone(),
            Self::Any(any) => vec![
                any.discriminator_column.clone().into(),
                any.key_column.clone().into(),
            ],
            Self::ToOne { columns, .. } => {
                columns.iter().cloned().map(Selectable::from).collect()
            }
            Self::Embedded { properties, .. } => properties
                .iter()
                .flat_map(|property| property.value.selectables())
                .collect(),
            Self::Plural { .. } | Self::Custom { .. } => vec![],
        }
    }
}

impl fmt::Debug for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic { selectables, ty } => f
                .debug_struct("Basic")
                .field("selectables", selectables)
                .field("ty", ty)
                .finish(),
            Self::Any(any) => any.fmt(f),
            Self::Embedded { properties, .. } => f
                .debug_struct("Embedded")
                .field("properties", &properties.len())
                .finish(),
            Self::Plural { role } => f.debug_struct("Plural").field("role", role).finish(),
            Self::ToOne { target, .. } => f.debug_struct("ToOne").field("target", target).finish(),
            Self::Custom { type_name } => f
                .debug_struct("Custom")
                .field("type_name", type_name)
                .finish(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Cascade {
    #[default]
    None,
    Persist,
    All,
    Delete,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Fetch {
    #[default]
    Eager,
    Lazy {
        /// Fetch group resolved together in one load; `None` puts the
        /// attribute in its own single-property plan.
        group: Option<String>,
    },
}
