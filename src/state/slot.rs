use crate::stmt;

/// One position in an instance's state array.
///
/// An attribute that has not been fetched is `Unfetched`, never a null
/// value: null is a loaded fact, absence is not.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Slot {
    Loaded(stmt::Value),

    #[default]
    Unfetched,
}

impl Slot {
    pub fn loaded(value: impl Into<stmt::Value>) -> Self {
        Self::Loaded(value.into())
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }

    pub fn value(&self) -> Option<&stmt::Value> {
        match self {
            Self::Loaded(value) => Some(value),
            Self::Unfetched => None,
        }
    }
}

impl From<stmt::Value> for Slot {
    fn from(value: stmt::Value) -> Self {
        Self::Loaded(value)
    }
}
