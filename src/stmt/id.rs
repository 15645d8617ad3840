use std::fmt;
use uuid::Uuid;

/// A unique entity identifier.
#[derive(Clone, Hash, Eq, PartialEq)]
pub struct Id {
    repr: Repr,
}

#[derive(Debug, Clone, Hash, Eq, PartialEq)]
enum Repr {
    Int(u64),
    String(String),
    Uuid(Uuid),
}

impl Id {
    pub fn from_int(value: u64) -> Self {
        Self {
            repr: Repr::Int(value),
        }
    }

    pub fn from_string(value: impl Into<String>) -> Self {
        Self {
            repr: Repr::String(value.into()),
        }
    }

    pub fn from_uuid(value: Uuid) -> Self {
        Self {
            repr: Repr::Uuid(value),
        }
    }

    pub fn random() -> Self {
        Self::from_uuid(Uuid::new_v4())
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.repr {
            Repr::Int(v) => write!(f, "Id({v})"),
            Repr::String(v) => write!(f, "Id({v})"),
            Repr::Uuid(v) => write!(f, "Id({v})"),
        }
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.repr {
            Repr::Int(v) => write!(f, "{v}"),
            Repr::String(v) => f.write_str(v),
            Repr::Uuid(v) => write!(f, "{v}"),
        }
    }
}

impl From<u64> for Id {
    fn from(value: u64) -> Self {
        Self::from_int(value)
    }
}

impl From<Uuid> for Id {
    fn from(value: Uuid) -> Self {
        Self::from_uuid(value)
    }
}

impl From<&str> for Id {
    fn from(value: &str) -> Self {
        Self::from_string(value)
    }
}
