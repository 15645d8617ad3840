use super::attribute::append_declared;
use super::strategy::{join_predicate, Joined, JoinedTable, SingleTable, Strategy, Union};
use super::table::{TableDecl, TableSpanBuilder};
use super::{
    discriminator, AttributeKind, AttributeMapping, DiscriminatorMapping, DiscriminatorSource,
    EntityDescriptor, EntityId, EntityNameUse, IdentifierMapping, LoaderCaches, NaturalIdMapping,
    PathMap, SoftDeleteMapping, VersionMapping,
};
use crate::{boot, stmt, Error, Result};
use indexmap::IndexMap;
use std::collections::BTreeMap;
use std::ops;

/// The compiled runtime model: every entity descriptor, fully linked.
///
/// Built once from a boot schema and immutable afterwards. Descriptors refer
/// to each other by [`EntityId`], an index into the registry.
#[derive(Debug)]
pub struct Registry {
    entities: Vec<EntityDescriptor>,
    by_name: IndexMap<String, EntityId>,
}

impl Registry {
    /// Compiles a boot schema into linked runtime descriptors.
    ///
    /// Entities are built supertype-first, repeating passes over the
    /// declarations until every entity links; a pass that makes no progress
    /// means a missing or cyclic supertype.
    pub fn from_boot(schema: &boot::Schema) -> Result<Self> {
        let mut builder = Builder {
            schema,
            registry: Registry {
                entities: vec![],
                by_name: IndexMap::new(),
            },
        };
        builder.build()?;

        let mut registry = builder.registry;
        registry.finalize_hierarchies()?;
        Ok(registry)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntityDescriptor> {
        self.entities.iter()
    }

    pub fn resolve(&self, name: &str) -> Option<EntityId> {
        self.by_name.get(name).copied()
    }

    pub fn entity(&self, name: &str) -> Result<&EntityDescriptor> {
        let id = self
            .resolve(name)
            .ok_or_else(|| Error::mapping(name, "unknown entity"))?;
        Ok(&self[id])
    }

    /// The entity plus all transitive subtypes, supertype-first.
    pub fn closure(&self, id: EntityId) -> Vec<EntityId> {
        let mut out = vec![id];
        let mut cursor = 0;
        while cursor < out.len() {
            let current = out[cursor];
            out.extend(self[current].subtypes.iter().copied());
            cursor += 1;
        }
        out
    }

    pub fn closure_names(&self, name: &str) -> Result<Vec<String>> {
        let root = self.entity(name)?;
        Ok(self
            .closure(root.id)
            .into_iter()
            .map(|id| self[id].name.clone())
            .collect())
    }

    /// The table group a query of `entity` selects from, narrowed by how
    /// entity names were actually used while compiling the query.
    ///
    /// Names whose accumulated use restricts rows are closure-expanded
    /// (restricting to a type includes its subtypes) and handed to the
    /// strategy for pruning.
    pub fn pruned_table_group(
        &self,
        entity: &str,
        uses: &IndexMap<String, EntityNameUse>,
    ) -> Result<stmt::TableGroup> {
        let descriptor = self.entity(entity)?;
        let mut group = descriptor.strategy.polymorphic_table_group();

        let mut restricted = vec![];
        for (name, name_use) in uses {
            if name_use.restricts() {
                for member in self.closure_names(name)? {
                    if !restricted.contains(&member) {
                        restricted.push(member);
                    }
                }
            }
        }

        descriptor
            .strategy
            .prune(&mut group, descriptor.discriminator.as_ref(), &restricted)?;
        Ok(group)
    }

    fn finalize_hierarchies(&mut self) -> Result<()> {
        let roots: Vec<EntityId> = self
            .entities
            .iter()
            .filter(|entity| entity.supertype.is_none())
            .map(|entity| entity.id)
            .collect();

        for root in roots {
            self.finalize_hierarchy(root)?;
        }
        Ok(())
    }

    fn finalize_hierarchy(&mut self, root: EntityId) -> Result<()> {
        let closure = self.closure(root);
        let root_name = self[root].name.clone();

        self.finalize_discriminators(&root_name, &closure)?;

        match self[root].strategy.kind() {
            super::StrategyKind::Joined => self.finalize_joined_branches(&closure)?,
            super::StrategyKind::Union => self.finalize_union_branches(&closure)?,
            super::StrategyKind::SingleTable => {}
        }

        // Fold subtype paths into the root's map so polymorphic queries of
        // the root resolve subtype paths (colliding paths poison).
        let mut merged = self[root].paths.clone();
        for &member in &closure[1..] {
            merged.merge(&self[member].paths);
        }
        self[root].paths = merged;

        tracing::debug!(root = %root_name, members = closure.len(), "linked hierarchy");
        Ok(())
    }

    /// Builds the hierarchy-wide discriminator value map and distributes it
    /// to every member. Only non-abstract members claim values.
    fn finalize_discriminators(&mut self, root_name: &str, closure: &[EntityId]) -> Result<()> {
        if self[closure[0]].discriminator.is_none() {
            if closure.len() > 1
                && self[closure[0]].strategy.kind() == super::StrategyKind::SingleTable
            {
                return Err(Error::mapping(
                    root_name,
                    "single-table hierarchy with subtypes requires a discriminator",
                ));
            }
            return Ok(());
        }

        let mut value_map = BTreeMap::new();
        for &member in closure {
            let entity = &self[member];
            if entity.is_abstract {
                continue;
            }
            let Some(mapping) = &entity.discriminator else {
                continue;
            };
            discriminator::accumulate(root_name, &mut value_map, &entity.name, &mapping.value)?;
        }

        for &member in closure {
            if let Some(mapping) = &mut self.entities[member.0].discriminator {
                mapping.value_map = value_map.clone();
            }
        }
        Ok(())
    }

    /// Fills each joined member's outer-join branches with its strict
    /// subtypes' tables.
    fn finalize_joined_branches(&mut self, closure: &[EntityId]) -> Result<()> {
        for &member in closure {
            let subtree: Vec<EntityId> = self.closure(member)[1..].to_vec();
            let member_table = self.joined_primary_table(member).to_string();

            let mut branches = vec![];
            for sub in subtree {
                // The subtype's own chain entry already carries its table,
                // alias, key columns, and join predicate against t0.
                let own = self[sub]
                    .strategy
                    .as_joined()
                    .and_then(|joined| joined.chain.last());
                let Some(own) = own else { continue };
                if own.table == member_table {
                    continue;
                }
                branches.push(own.clone());
            }

            if let Strategy::Joined(joined) = &mut self.entities[member.0].strategy {
                joined.branches = branches;
            }
        }
        Ok(())
    }

    /// A joined member's own primary table: the last link of its chain, or
    /// the root table for the root itself.
    fn joined_primary_table(&self, member: EntityId) -> &str {
        match self[member].strategy.as_joined() {
            Some(joined) => match joined.chain.last() {
                Some(own) => &own.table,
                None => &joined.root_table,
            },
            None => "",
        }
    }

    /// Builds each union member's `UNION ALL` subquery over the concrete
    /// members of its subtree, padding absent columns with typed nulls.
    fn finalize_union_branches(&mut self, closure: &[EntityId]) -> Result<()> {
        // Hierarchy-wide column list: identifier first, then every member's
        // declared columns in closure order, first declaration wins.
        let mut columns: IndexMap<String, stmt::Type> = IndexMap::new();
        for column in &self[closure[0]].identifier.columns {
            columns.insert(column.name.clone(), self[closure[0]].identifier.ty.clone());
        }
        for &member in closure {
            for attribute in self[member].declared_attributes() {
                let types = attribute.column_types();
                for (selectable, ty) in attribute.selectables.iter().zip(types) {
                    if let Some(column) = selectable.as_column() {
                        columns.entry(column.name.clone()).or_insert(ty);
                    }
                }
            }
        }

        for &member in closure {
            let subtree = self.closure(member);
            let mut branches = vec![];

            for &concrete in &subtree {
                let entity = &self[concrete];
                if entity.is_abstract {
                    continue;
                }

                let table = entity.tables[0].name.clone();
                let selections = columns
                    .iter()
                    .map(|(name, ty)| {
                        let expr = if self.union_member_has_column(concrete, name) {
                            stmt::Expr::column(&table, name)
                        } else {
                            stmt::Expr::typed_null(ty.clone())
                        };
                        stmt::UnionSelection {
                            column: name.clone(),
                            expr,
                        }
                    })
                    .collect();

                branches.push(stmt::UnionBranch {
                    entity: entity.name.clone(),
                    table,
                    selections,
                    discriminator: stmt::Value::I64(entity.hierarchy_ordinal as i64),
                });
            }

            if let Strategy::Union(union) = &mut self.entities[member.0].strategy {
                union.subquery = stmt::UnionSubquery { branches };
            }
        }
        Ok(())
    }

    fn union_member_has_column(&self, member: EntityId, column: &str) -> bool {
        let entity = &self[member];
        entity
            .identifier
            .columns
            .iter()
            .any(|id_column| id_column.name == column)
            || entity.attributes.iter().any(|attribute| {
                attribute
                    .selectables
                    .iter()
                    .any(|selectable| match selectable.as_column() {
                        Some(c) => c.name == column,
                        None => false,
                    })
            })
    }
}

impl ops::Index<EntityId> for Registry {
    type Output = EntityDescriptor;

    fn index(&self, index: EntityId) -> &EntityDescriptor {
        &self.entities[index.0]
    }
}

impl ops::IndexMut<EntityId> for Registry {
    fn index_mut(&mut self, index: EntityId) -> &mut EntityDescriptor {
        &mut self.entities[index.0]
    }
}

struct Builder<'a> {
    schema: &'a boot::Schema,
    registry: Registry,
}

impl<'a> Builder<'a> {
    fn build(&mut self) -> Result<()> {
        let schema = self.schema;
        let mut pass = 0;
        loop {
            let mut progressed = false;
            let mut pending = None;

            for (name, entity) in &schema.entities {
                if self.registry.by_name.contains_key(name) {
                    continue;
                }

                match &entity.supertype {
                    Some(supertype) if !self.registry.by_name.contains_key(supertype) => {
                        pending = Some(name.clone());
                    }
                    _ => {
                        self.build_descriptor(entity)?;
                        progressed = true;
                    }
                }
            }

            pass += 1;
            tracing::debug!(pass, built = self.registry.entities.len(), "link pass");

            match pending {
                None => return Ok(()),
                Some(name) if !progressed => {
                    return Err(Error::consistency(format!(
                        "cannot link `{name}`: supertype missing or cyclic"
                    )));
                }
                Some(_) => {}
            }
        }
    }

    fn build_descriptor(&mut self, entity: &boot::Entity) -> Result<()> {
        let id = EntityId(self.registry.entities.len());

        let supertype = entity
            .supertype
            .as_ref()
            .map(|name| self.registry.by_name[name]);
        let root = match supertype {
            Some(parent) => self.registry[parent].root,
            None => id,
        };
        let hierarchy_ordinal = self
            .registry
            .entities
            .iter()
            .filter(|other| other.root == root)
            .count();

        // Boot declarations root-to-self.
        let chain = self.boot_chain(entity)?;
        let boot_root = chain[0];
        let inheritance = boot_root.inheritance;

        let identifier_decl = boot_root.identifier.as_ref().ok_or_else(|| {
            Error::mapping(&boot_root.name, "hierarchy root declares no identifier")
        })?;
        let identifier = IdentifierMapping {
            property: identifier_decl.property.clone(),
            columns: identifier_decl.columns.clone(),
            ty: identifier_decl.ty.clone(),
        };

        let (span, attributes, declared_start, fetchable_span) =
            self.build_layout(entity, id, &chain, inheritance, &identifier)?;

        let strategy =
            self.build_strategy(entity, &chain, inheritance, &identifier, hierarchy_ordinal)?;

        let version = match &boot_root.version {
            Some(decl) => {
                let state_position = attributes
                    .iter()
                    .find(|attr| attr.name == decl.property)
                    .map(|attr| attr.state_position)
                    .ok_or_else(|| {
                        Error::mapping(
                            &entity.name,
                            format!("version property `{}` is not a mapped attribute", decl.property),
                        )
                    })?;
                Some(VersionMapping {
                    property: decl.property.clone(),
                    column: decl.column.clone(),
                    ty: decl.ty.clone(),
                    generated: decl.generated,
                    state_position,
                })
            }
            None => None,
        };

        let natural_id = match &boot_root.natural_id {
            Some(decl) => {
                let mut positions = vec![];
                for property in &decl.properties {
                    let position = attributes
                        .iter()
                        .find(|attr| attr.name == *property)
                        .map(|attr| attr.state_position)
                        .ok_or_else(|| {
                            Error::mapping(
                                &entity.name,
                                format!("natural-id property `{property}` is not a mapped attribute"),
                            )
                        })?;
                    positions.push(position);
                }
                Some(NaturalIdMapping {
                    positions,
                    mutable: decl.mutable,
                })
            }
            None => None,
        };

        let discriminator =
            self.build_discriminator(entity, boot_root, inheritance, hierarchy_ordinal)?;

        let soft_delete = entity
            .soft_delete
            .as_ref()
            .or(boot_root.soft_delete.as_ref())
            .map(|decl| SoftDeleteMapping {
                column: decl.column.clone(),
            });

        let cache = entity.cache.clone().or_else(|| boot_root.cache.clone());

        let mut lazy_groups: IndexMap<String, Vec<usize>> = IndexMap::new();
        for attribute in &attributes {
            if let Some(group) = attribute.lazy_group() {
                lazy_groups
                    .entry(group.to_string())
                    .or_default()
                    .push(attribute.state_position);
            }
        }

        let paths = build_paths(&identifier, &attributes);

        if let Some(parent) = supertype {
            self.registry.entities[parent.0].subtypes.push(id);
        }
        self.registry.by_name.insert(entity.name.clone(), id);
        self.registry.entities.push(EntityDescriptor {
            id,
            name: entity.name.clone(),
            supertype,
            subtypes: vec![],
            root,
            hierarchy_ordinal,
            is_abstract: entity.is_abstract,
            strategy,
            tables: span,
            attributes,
            declared_start,
            fetchable_span,
            identifier,
            version,
            discriminator,
            natural_id,
            row_id: entity.row_id.clone().or_else(|| boot_root.row_id.clone()),
            soft_delete,
            cache,
            lazy_groups,
            paths,
            loaders: LoaderCaches::new(),
        });

        Ok(())
    }

    /// Walks the ancestor chain root-to-self, building the table span and
    /// the flattened attribute layout in one pass. Each ancestor contributes
    /// its primary table, secondary tables, and declared attributes in that
    /// order, so a subtype's layout is always an extension of its
    /// supertype's.
    fn build_layout(
        &self,
        entity: &boot::Entity,
        id: EntityId,
        chain: &[&boot::Entity],
        inheritance: boot::Inheritance,
        identifier: &IdentifierMapping,
    ) -> Result<(Vec<super::TableMapping>, Vec<AttributeMapping>, usize, usize)> {
        let mut span = TableSpanBuilder::new();
        let mut attributes = vec![];
        let mut fetchable_cursor = 0;
        let mut declared_start = 0;

        for ancestor in chain {
            let primary_name = match inheritance {
                // All hierarchy members share the root's table.
                boot::Inheritance::SingleTable => &chain[0].table,
                // Each member's own table, joined up the chain.
                boot::Inheritance::Joined => &ancestor.table,
                // The concrete table carries all inherited columns.
                boot::Inheritance::Union => &entity.table,
            };

            let key_columns = match inheritance {
                boot::Inheritance::Joined => ancestor
                    .key_columns
                    .clone()
                    .unwrap_or_else(|| identifier.columns.clone()),
                _ => identifier.columns.clone(),
            };

            let first = span.is_empty();
            let primary = span.push(
                &entity.name,
                TableDecl {
                    name: primary_name,
                    key_columns,
                    identifier_table: first,
                    inverse: false,
                    optional: false,
                    custom_sql: &ancestor.custom_sql,
                },
            )?;

            for secondary in &ancestor.secondary_tables {
                span.push(
                    &entity.name,
                    TableDecl {
                        name: &secondary.name,
                        key_columns: secondary.key_columns.clone(),
                        identifier_table: false,
                        inverse: secondary.inverse,
                        optional: secondary.optional,
                        custom_sql: &secondary.custom_sql,
                    },
                )?;
            }

            if ancestor.name == entity.name {
                declared_start = attributes.len();
            }

            let ancestor_id = if ancestor.name == entity.name {
                id
            } else {
                self.registry.by_name[&ancestor.name]
            };

            append_declared(
                self.schema,
                ancestor,
                ancestor_id,
                &mut attributes,
                &mut fetchable_cursor,
                &mut span,
                primary,
            )?;
        }

        Ok((span.finish(), attributes, declared_start, fetchable_cursor))
    }

    fn build_strategy(
        &self,
        entity: &boot::Entity,
        chain: &[&boot::Entity],
        inheritance: boot::Inheritance,
        identifier: &IdentifierMapping,
        hierarchy_ordinal: usize,
    ) -> Result<Strategy> {
        Ok(match inheritance {
            boot::Inheritance::SingleTable => {
                Strategy::SingleTable(SingleTable::new(&chain[0].table))
            }
            boot::Inheritance::Joined => {
                let mut joined_chain = vec![];
                for ancestor in &chain[1..] {
                    let ordinal = if ancestor.name == entity.name {
                        hierarchy_ordinal
                    } else {
                        self.registry[self.registry.by_name[&ancestor.name]].hierarchy_ordinal
                    };

                    let alias = format!("t{ordinal}");
                    let key_columns = ancestor
                        .key_columns
                        .clone()
                        .unwrap_or_else(|| identifier.columns.clone());
                    let predicate =
                        join_predicate("t0", &identifier.columns, &alias, &key_columns)?;

                    joined_chain.push(JoinedTable {
                        entity: ancestor.name.clone(),
                        table: ancestor.table.clone(),
                        alias,
                        key_columns,
                        predicate,
                    });
                }

                Strategy::Joined(Joined {
                    root_entity: chain[0].name.clone(),
                    root_table: chain[0].table.clone(),
                    root_alias: "t0".to_string(),
                    root_key_columns: identifier.columns.clone(),
                    chain: joined_chain,
                    branches: vec![],
                })
            }
            boot::Inheritance::Union => {
                Strategy::Union(Union::new(stmt::UnionSubquery { branches: vec![] }))
            }
        })
    }

    fn build_discriminator(
        &self,
        entity: &boot::Entity,
        boot_root: &boot::Entity,
        inheritance: boot::Inheritance,
        hierarchy_ordinal: usize,
    ) -> Result<Option<DiscriminatorMapping>> {
        if inheritance == boot::Inheritance::Union {
            // Union hierarchies discriminate by branch; the value is the
            // member's ordinal and exists only at query time.
            let value = stmt::Value::I64(hierarchy_ordinal as i64);
            return Ok(Some(DiscriminatorMapping {
                source: DiscriminatorSource::Synthetic,
                ty: stmt::Type::I64,
                value: super::DiscriminatorValue::Literal(value.clone()),
                sql_literal: Some(discriminator::render_sql_literal(&value)?),
                force: false,
                insertable: false,
                value_map: BTreeMap::new(),
            }));
        }

        let root_decl = match &boot_root.discriminator {
            Some(decl) => decl.clone(),
            None if inheritance == boot::Inheritance::Joined => boot::Discriminator {
                source: boot::DiscriminatorSource::Implicit,
                ty: stmt::Type::String,
                value: boot::DiscriminatorValueSpec::Default,
                force: false,
                insertable: false,
            },
            None => return Ok(None),
        };

        // The source, type, and flags come from the root; each member may
        // declare its own value.
        let value = entity
            .discriminator
            .as_ref()
            .map(|decl| decl.value.clone())
            .unwrap_or(boot::DiscriminatorValueSpec::Default);

        let decl = boot::Discriminator {
            source: root_decl.source,
            ty: root_decl.ty,
            value,
            force: root_decl.force,
            insertable: root_decl.insertable,
        };

        discriminator::resolve(&entity.name, &decl, hierarchy_ordinal).map(Some)
    }

    /// Boot declarations for the entity's ancestor chain, root first.
    fn boot_chain(&self, entity: &boot::Entity) -> Result<Vec<&'a boot::Entity>> {
        let mut chain = vec![];
        let mut current = entity.name.as_str();

        loop {
            let declared = self
                .schema
                .entity(current)
                .ok_or_else(|| Error::mapping(current, "unknown entity"))?;
            chain.push(declared);

            match &declared.supertype {
                Some(supertype) => current = supertype,
                None => break,
            }
        }

        chain.reverse();
        Ok(chain)
    }
}

/// Builds the dotted-path index for one entity's own layout.
fn build_paths(identifier: &IdentifierMapping, attributes: &[AttributeMapping]) -> PathMap {
    let mut paths = PathMap::new();

    let id_fragments: Vec<String> = identifier
        .columns
        .iter()
        .map(|column| column.read_fragment().to_string())
        .collect();
    paths.insert(identifier.property_name(), id_fragments);

    for attribute in attributes {
        let fragments: Vec<String> = attribute
            .selectables
            .iter()
            .map(|selectable| selectable.read_fragment().to_string())
            .collect();

        match &attribute.kind {
            AttributeKind::Plural { .. } => {}
            AttributeKind::Embedded { model, .. } => {
                paths.insert(attribute.name.clone(), fragments);
                insert_embedded_paths(&mut paths, &attribute.name, model);
            }
            AttributeKind::ToOne { key, .. } => {
                // The association path and the implicit key path select the
                // same foreign-key columns.
                paths.insert(attribute.name.clone(), fragments.clone());
                paths.insert(
                    format!("{}.{}", attribute.name, key.target_property),
                    fragments,
                );
            }
            _ => {
                paths.insert(attribute.name.clone(), fragments);
            }
        }
    }

    paths
}

fn insert_embedded_paths(paths: &mut PathMap, prefix: &str, model: &super::attribute::EmbeddedModel) {
    for field in &model.fields {
        let path = format!("{prefix}.{}", field.name);
        let fragments: Vec<String> = field
            .selectables
            .iter()
            .map(|selectable| selectable.read_fragment().to_string())
            .collect();
        paths.insert(path.clone(), fragments);

        if let super::attribute::EmbeddedFieldKind::Embedded(nested) = &field.kind {
            insert_embedded_paths(paths, &path, nested);
        }
    }
}
