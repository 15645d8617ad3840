#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Bool,
    I32,
    I64,
    Id,
    String,
    Record(Vec<Type>),
    List(Box<Type>),
}

impl Type {
    pub fn is_bool(&self) -> bool {
        matches!(self, Self::Bool)
    }

    pub fn is_i32(&self) -> bool {
        matches!(self, Self::I32)
    }

    pub fn is_i64(&self) -> bool {
        matches!(self, Self::I64)
    }

    pub fn is_id(&self) -> bool {
        matches!(self, Self::Id)
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Self::String)
    }

    pub fn is_record(&self) -> bool {
        matches!(self, Self::Record(_))
    }

    pub fn as_record(&self) -> Option<&[Type]> {
        match self {
            Self::Record(fields) => Some(fields),
            _ => None,
        }
    }

    /// Number of physical columns a value of this type occupies.
    pub fn column_span(&self) -> usize {
        match self {
            Self::Record(fields) => fields.len(),
            _ => 1,
        }
    }
}
