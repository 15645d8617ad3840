use super::{
    CustomSql, Discriminator, Identifier, NaturalId, Property, SecondaryTable, SoftDelete, Version,
};

/// One mapped class in the hierarchy.
///
/// Subtypes declare only what they add; identifier, version, and most
/// hierarchy-scoped declarations live on the root.
#[derive(Debug, Clone)]
pub struct Entity {
    pub name: String,

    pub supertype: Option<String>,

    pub is_abstract: bool,

    /// Declared on the root; ignored on subtypes.
    pub inheritance: Inheritance,

    /// Primary table. Under single-table inheritance subtypes repeat the
    /// root's table name; under joined/union each entity names its own.
    pub table: String,

    pub secondary_tables: Vec<SecondaryTable>,

    /// Under joined inheritance, the columns of this entity's table that
    /// foreign-key to the supertype table. Defaults to the root identifier
    /// column names.
    pub key_columns: Option<Vec<super::Column>>,

    /// Properties declared by this entity only (not inherited).
    pub properties: Vec<Property>,

    /// Required on the root; ignored on subtypes.
    pub identifier: Option<Identifier>,

    pub version: Option<Version>,

    pub discriminator: Option<Discriminator>,

    pub natural_id: Option<NaturalId>,

    pub row_id: Option<String>,

    pub soft_delete: Option<SoftDelete>,

    pub custom_sql: CustomSql,

    pub cache: Option<CacheDecl>,
}

impl Entity {
    pub fn new(name: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            supertype: None,
            is_abstract: false,
            inheritance: Inheritance::SingleTable,
            table: table.into(),
            secondary_tables: vec![],
            key_columns: None,
            properties: vec![],
            identifier: None,
            version: None,
            discriminator: None,
            natural_id: None,
            row_id: None,
            soft_delete: None,
            custom_sql: CustomSql::default(),
            cache: None,
        }
    }

    pub fn subtype_of(mut self, supertype: impl Into<String>) -> Self {
        self.supertype = Some(supertype.into());
        self
    }

    pub fn abstract_type(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn with_inheritance(mut self, inheritance: Inheritance) -> Self {
        self.inheritance = inheritance;
        self
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|property| property.name == name)
    }
}

/// How the hierarchy's types map onto physical tables. Selected once at the
/// root; never re-evaluated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Inheritance {
    /// One table shared by the whole hierarchy, rows discriminated by value
    #[default]
    SingleTable,

    /// One table per type, joined root-to-leaf by primary key
    Joined,

    /// One table per concrete type, unioned for polymorphic queries
    Union,
}

/// Second-level cache declaration.
#[derive(Debug, Clone)]
pub struct CacheDecl {
    pub layout: CacheLayout,

    /// Lazy attributes are stored in (and recoverable from) cache entries.
    pub cache_lazy_attributes: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheLayout {
    /// Positional disassembled state array
    Unstructured,

    /// Named-field map, tolerant of attribute reordering between versions
    Structured,

    /// Identifier only; the instance is re-read on cache hit
    Reference,
}
