use super::{
    AttributeMapping, DiscriminatorMapping, LoadKey, LoadPlan, LoaderCaches, LockMode, PathMap,
    Strategy, TableMapping,
};
use crate::{boot, stmt, Error, Result};
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// Uniquely identifies an entity descriptor within its registry.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub usize);

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

/// The compiled runtime descriptor for one entity.
///
/// Immutable after linking. Each descriptor carries its complete flattened
/// state layout (inherited attributes included), its table span, and the
/// hierarchy-wide structures shared with its root.
#[derive(Debug)]
pub struct EntityDescriptor {
    pub id: EntityId,
    pub name: String,

    pub supertype: Option<EntityId>,

    /// Direct subtypes, registration order
    pub subtypes: Vec<EntityId>,

    /// The hierarchy root (self for roots)
    pub root: EntityId,

    /// Position within the hierarchy, root = 0, registration order
    pub hierarchy_ordinal: usize,

    pub is_abstract: bool,

    pub strategy: Strategy,

    /// Table span in mutation order: supertype tables, own table, secondary
    /// tables. Deletes walk it in reverse.
    pub tables: Vec<TableMapping>,

    /// Complete flattened state layout
    pub attributes: Vec<AttributeMapping>,

    /// Index of the first attribute this entity declares itself
    pub declared_start: usize,

    /// Total fetchable indices occupied by the layout
    pub fetchable_span: usize,

    pub identifier: IdentifierMapping,
    pub version: Option<VersionMapping>,
    pub discriminator: Option<DiscriminatorMapping>,
    pub natural_id: Option<NaturalIdMapping>,
    pub row_id: Option<String>,
    pub soft_delete: Option<SoftDeleteMapping>,
    pub cache: Option<boot::CacheDecl>,

    /// Fetch group name -> state positions resolved together
    pub lazy_groups: IndexMap<String, Vec<usize>>,

    /// Dotted property paths for this entity and (on roots) the subtree
    pub paths: PathMap,

    pub(crate) loaders: LoaderCaches,
}

/// Primary-key mapping. The identifier always lives in the first span table.
#[derive(Debug, Clone)]
pub struct IdentifierMapping {
    pub property: Option<String>,
    pub columns: Vec<boot::Column>,
    pub ty: stmt::Type,
}

impl IdentifierMapping {
    pub fn property_name(&self) -> &str {
        self.property.as_deref().unwrap_or("id")
    }
}

#[derive(Debug, Clone)]
pub struct VersionMapping {
    pub property: String,
    pub column: boot::Column,
    pub ty: stmt::Type,
    pub generated: boot::VersionGeneration,

    /// State position of the version attribute
    pub state_position: usize,
}

#[derive(Debug, Clone)]
pub struct NaturalIdMapping {
    /// State positions of the participating attributes
    pub positions: Vec<usize>,
    pub mutable: bool,
}

#[derive(Debug, Clone)]
pub struct SoftDeleteMapping {
    pub column: boot::Column,
}

impl EntityDescriptor {
    pub fn attribute(&self, name: &str) -> Option<&AttributeMapping> {
        self.attributes.iter().find(|attr| attr.name == name)
    }

    /// Position of a named attribute in the state layout.
    pub fn attribute_position(&self, name: &str) -> Result<usize> {
        self.attribute(name)
            .map(|attr| attr.state_position)
            .ok_or_else(|| {
                Error::mapping(&self.name, format!("no attribute named `{name}`"))
            })
    }

    /// Attributes declared by this entity itself, excluding inherited ones.
    pub fn declared_attributes(&self) -> &[AttributeMapping] {
        &self.attributes[self.declared_start..]
    }

    pub fn is_versioned(&self) -> bool {
        self.version.is_some()
    }

    /// Writable span tables in insert order.
    pub fn insert_ordered_tables(&self) -> impl Iterator<Item = &TableMapping> {
        self.tables.iter().filter(|table| table.is_writable())
    }

    /// Writable span tables in delete order (reverse of insert order, so
    /// dependent rows go first).
    pub fn delete_ordered_tables(&self) -> impl Iterator<Item = &TableMapping> {
        self.tables.iter().rev().filter(|table| table.is_writable())
    }

    /// The load plan fetching all eager state under the requested lock.
    /// Plans are compiled once per mode and cached.
    pub fn load_plan(&self, lock: LockMode) -> Result<Arc<LoadPlan>> {
        if lock.is_force_increment() {
            match &self.version {
                None => {
                    return Err(Error::unsupported_locking(format!(
                        "{lock:?} requested but `{}` is not versioned",
                        self.name
                    )));
                }
                Some(version)
                    if version.generated == boot::VersionGeneration::OnExecution =>
                {
                    return Err(Error::unsupported_locking(format!(
                        "{lock:?} requested but `{}` generates its version in the database",
                        self.name
                    )));
                }
                Some(_) => {}
            }
        }

        self.loaders
            .for_lock(lock, || self.build_plan(lock, None, LoadKey::Identifier))
    }

    /// The load plan fetching eager state by a unique attribute instead of
    /// the identifier. Natural-id members and unique-column attributes
    /// qualify.
    pub fn unique_key_load_plan(&self, attribute: &str) -> Result<Arc<LoadPlan>> {
        let position = self.attribute_position(attribute)?;

        let unique = self
            .natural_id
            .as_ref()
            .is_some_and(|natural_id| natural_id.positions.contains(&position))
            || self.attributes[position].selectables.iter().any(|selectable| {
                selectable
                    .as_column()
                    .is_some_and(|column| column.unique)
            });
        if !unique {
            return Err(Error::mapping(
                &self.name,
                format!("attribute `{attribute}` is not a unique key"),
            ));
        }

        self.loaders.for_unique_key(position, || {
            self.build_plan(LockMode::None, None, LoadKey::UniqueAttribute(position))
        })
    }

    /// The load plan resolving one lazy fetch group.
    pub fn group_load_plan(&self, group: &str) -> Result<Arc<LoadPlan>> {
        let positions = self.lazy_groups.get(group).cloned().ok_or_else(|| {
            Error::mapping(&self.name, format!("no fetch group named `{group}`"))
        })?;

        self.loaders.for_group(group, || {
            self.build_plan(LockMode::None, Some(positions), LoadKey::Identifier)
        })
    }

    /// The load plan fetching an explicit attribute subset.
    pub fn subset_load_plan(&self, positions: &[usize]) -> Result<Arc<LoadPlan>> {
        self.loaders.for_subset(positions, || {
            self.build_plan(
                LockMode::None,
                Some(positions.to_vec()),
                LoadKey::Identifier,
            )
        })
    }

    fn build_plan(
        &self,
        lock: LockMode,
        subset: Option<Vec<usize>>,
        key: LoadKey,
    ) -> Result<LoadPlan> {
        let attributes = match subset {
            Some(positions) => positions,
            None => self
                .attributes
                .iter()
                .filter(|attr| !attr.is_lazy())
                .map(|attr| attr.state_position)
                .collect(),
        };

        let mut tables: Vec<usize> = attributes
            .iter()
            .map(|&position| self.attributes[position].table)
            .collect();
        tables.sort_unstable();
        tables.dedup();
        // The identifier table anchors every plan.
        if !tables.contains(&0) {
            tables.insert(0, 0);
        }

        Ok(LoadPlan {
            entity: self.id,
            lock,
            key,
            attributes,
            tables,
            restriction: self.implicit_restriction(),
        })
    }

    /// The restriction every load of this entity carries: the soft-delete
    /// filter, plus the discriminator filter when the mapping forces it.
    fn implicit_restriction(&self) -> Option<stmt::Expr> {
        let mut parts = vec![];

        if let Some(soft_delete) = &self.soft_delete {
            parts.push(stmt::Expr::eq(
                stmt::Expr::column("t0", &soft_delete.column.name),
                stmt::Expr::Value(stmt::Value::Bool(false)),
            ));
        }

        if let Some(discriminator) = &self.discriminator {
            if discriminator.force {
                let known: Vec<String> = discriminator.value_map.keys().cloned().collect();
                if let Some(predicate) =
                    self.strategy.discriminator_predicate(discriminator, &known)
                {
                    parts.push(predicate);
                }
            }
        }

        if parts.is_empty() {
            None
        } else {
            Some(stmt::Expr::and_from_vec(parts))
        }
    }
}
