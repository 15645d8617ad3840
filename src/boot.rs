//! The boot-time mapping model: already-validated declarative metadata
//! describing how a class hierarchy maps to tables and columns.
//!
//! This is the compiler's input. It is produced elsewhere (parsing and
//! structural validation are out of scope) and is never mutated here.

mod column;
pub use column::{Column, Selectable};

mod entity;
pub use entity::{CacheDecl, CacheLayout, Entity, Inheritance};

mod identifier;
pub use identifier::{
    Discriminator, DiscriminatorSource, DiscriminatorValueSpec, Identifier, NaturalId, SoftDelete,
    Version, VersionGeneration,
};

mod property;
pub use property::{AnyValue, Cascade, Fetch, Property, PropertyValue};

mod table;
pub use table::{CustomSql, Expectation, MutationSql, SecondaryTable};

use crate::{bail, Result};
use indexmap::IndexMap;

/// The full set of entity declarations handed to the descriptor compiler.
#[derive(Debug, Default, Clone)]
pub struct Schema {
    pub entities: IndexMap<String, Entity>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_entity(&mut self, entity: Entity) {
        self.entities.insert(entity.name.clone(), entity);
    }

    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities.get(name)
    }

    /// The hierarchy root for the named entity, following supertype links.
    pub fn root_of(&self, name: &str) -> Result<&Entity> {
        let mut current = match self.entity(name) {
            Some(entity) => entity,
            None => bail!("unknown entity `{name}`"),
        };

        while let Some(supertype) = &current.supertype {
            current = match self.entity(supertype) {
                Some(entity) => entity,
                None => bail!("entity `{}` names unknown supertype `{supertype}`", current.name),
            };
        }

        Ok(current)
    }

    /// Direct subtypes of the named entity, in registration order.
    pub fn direct_subtypes<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Entity> + 'a {
        self.entities
            .values()
            .filter(move |entity| entity.supertype.as_deref() == Some(name))
    }
}
