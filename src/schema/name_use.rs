/// How an entity name was used during one query compilation.
///
/// Multiple uses of the same name may be registered while compiling a single
/// query; they combine through [`stronger`]/[`weaker`] into the one use the
/// pruning pass acts on.
///
/// [`stronger`]: EntityNameUse::stronger
/// [`weaker`]: EntityNameUse::weaker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityNameUse {
    kind: UseKind,
    requires_restriction: bool,
}

/// Use kinds ordered by strength: `Filter > Treat > Expression > Projection`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum UseKind {
    Projection,
    Expression,
    Treat,
    Filter,
}

impl EntityNameUse {
    /// The name appeared in the projection only.
    pub const PROJECTION: Self = Self {
        kind: UseKind::Projection,
        requires_restriction: false,
    };

    /// The name appeared in a non-restricting expression.
    pub const EXPRESSION: Self = Self {
        kind: UseKind::Expression,
        requires_restriction: false,
    };

    /// A TREAT downcast that must restrict the rows selected.
    pub const TREAT: Self = Self {
        kind: UseKind::Treat,
        requires_restriction: true,
    };

    /// A TREAT downcast already guaranteed by surrounding predicates; no
    /// additional restriction needed.
    pub const TREAT_UNRESTRICTED: Self = Self {
        kind: UseKind::Treat,
        requires_restriction: false,
    };

    /// An explicit subtype filter.
    pub const FILTER: Self = Self {
        kind: UseKind::Filter,
        requires_restriction: true,
    };

    pub fn kind(&self) -> UseKind {
        self.kind
    }

    pub fn requires_restriction(&self) -> bool {
        self.requires_restriction
    }

    /// True when this use narrows the selected rows (as opposed to merely
    /// reading columns).
    pub fn restricts(&self) -> bool {
        match self.kind {
            UseKind::Filter => true,
            UseKind::Treat => self.requires_restriction,
            UseKind::Projection | UseKind::Expression => false,
        }
    }

    /// Combines two uses, keeping the stronger. Symmetric:
    /// `a.stronger(b) == b.stronger(a)` for all `a`, `b`.
    pub fn stronger(self, other: Self) -> Self {
        use std::cmp::Ordering::*;

        match self.kind.cmp(&other.kind) {
            Greater => self,
            Less => other,
            Equal => Self {
                kind: self.kind,
                requires_restriction: self.requires_restriction || other.requires_restriction,
            },
        }
    }

    /// Combines two uses, keeping the weaker. Symmetric like [`stronger`].
    ///
    /// [`stronger`]: EntityNameUse::stronger
    pub fn weaker(self, other: Self) -> Self {
        use std::cmp::Ordering::*;

        match self.kind.cmp(&other.kind) {
            Less => self,
            Greater => other,
            Equal => Self {
                kind: self.kind,
                requires_restriction: self.requires_restriction && other.requires_restriction,
            },
        }
    }
}
