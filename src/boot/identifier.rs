use super::Column;
use crate::stmt;

/// Primary-key declaration.
#[derive(Debug, Clone)]
pub struct Identifier {
    /// The mapped property name; `None` for a purely synthetic key.
    pub property: Option<String>,

    pub columns: Vec<Column>,
    pub ty: stmt::Type,
}

impl Identifier {
    pub fn new(property: impl Into<String>, columns: Vec<Column>, ty: stmt::Type) -> Self {
        Self {
            property: Some(property.into()),
            columns,
            ty,
        }
    }

    /// The property name used for implicit key paths (`assoc.id`).
    pub fn property_name(&self) -> &str {
        self.property.as_deref().unwrap_or("id")
    }
}

/// Optimistic-lock version declaration.
#[derive(Debug, Clone)]
pub struct Version {
    pub property: String,
    pub column: Column,
    pub ty: stmt::Type,
    pub generated: VersionGeneration,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VersionGeneration {
    /// The application increments the version.
    #[default]
    Never,

    /// The database produces the value when the statement executes.
    OnExecution,
}

/// Discriminator declaration on a hierarchy member.
#[derive(Debug, Clone)]
pub struct Discriminator {
    pub source: DiscriminatorSource,
    pub ty: stmt::Type,
    pub value: DiscriminatorValueSpec,

    /// Apply the discriminator restriction even when querying the root.
    pub force: bool,

    /// Write the value on insert (false when the column is formula-backed or
    /// maintained elsewhere).
    pub insertable: bool,
}

#[derive(Debug, Clone)]
pub enum DiscriminatorSource {
    Column(Column),
    Formula(String),

    /// No physical source declared; values are implicit ordinals.
    Implicit,
}

/// The declared discriminator value for one entity.
#[derive(Debug, Clone, PartialEq)]
pub enum DiscriminatorValueSpec {
    /// Derive from the entity's position in the hierarchy.
    Default,

    /// An explicit literal.
    Literal(stmt::Value),

    /// Rows with a null discriminator column belong to this entity.
    Null,

    /// Rows with any non-null, otherwise unmatched value belong to this
    /// entity.
    NotNull,
}

/// Alternate business key declaration.
#[derive(Debug, Clone)]
pub struct NaturalId {
    pub properties: Vec<String>,
    pub mutable: bool,
}

/// Soft-delete indicator column.
#[derive(Debug, Clone)]
pub struct SoftDelete {
    pub column: Column,
}
