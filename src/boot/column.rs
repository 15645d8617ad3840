/// A physical column declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,

    pub nullable: bool,
    pub insertable: bool,
    pub updatable: bool,
    pub unique: bool,

    /// Custom read fragment substituted for the plain column in SELECTs
    pub read_expr: Option<String>,

    /// Custom write fragment substituted for the `?` parameter in writes
    pub write_expr: Option<String>,
}

impl Column {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nullable: false,
            insertable: true,
            updatable: true,
            unique: false,
            read_expr: None,
            write_expr: None,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.insertable = false;
        self.updatable = false;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// The fragment used when selecting this column.
    pub fn read_fragment(&self) -> &str {
        self.read_expr.as_deref().unwrap_or(&self.name)
    }
}

/// A selectable is either a real column or a derived formula fragment.
#[derive(Debug, Clone, PartialEq)]
pub enum Selectable {
    Column(Column),
    Formula(String),
}

impl Selectable {
    pub fn column(name: impl Into<String>) -> Self {
        Self::Column(Column::new(name))
    }

    pub fn formula(fragment: impl Into<String>) -> Self {
        Self::Formula(fragment.into())
    }

    pub fn is_formula(&self) -> bool {
        matches!(self, Self::Formula(_))
    }

    pub fn as_column(&self) -> Option<&Column> {
        match self {
            Self::Column(column) => Some(column),
            _ => None,
        }
    }

    /// The fragment used when selecting this selectable.
    pub fn read_fragment(&self) -> &str {
        match self {
            Self::Column(column) => column.read_fragment(),
            Self::Formula(fragment) => fragment,
        }
    }

    pub fn is_insertable(&self) -> bool {
        match self {
            Self::Column(column) => column.insertable,
            Self::Formula(_) => false,
        }
    }

    pub fn is_updatable(&self) -> bool {
        match self {
            Self::Column(column) => column.updatable,
            Self::Formula(_) => false,
        }
    }
}

impl From<Column> for Selectable {
    fn from(value: Column) -> Self {
        Self::Column(value)
    }
}
