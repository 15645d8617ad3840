use super::{
    AttributeKind, AttributeMapping, EmbeddedField, EmbeddedFieldKind, EmbeddedModel,
    ForeignKeyMapping,
};
use crate::schema::table::TableSpanBuilder;
use crate::schema::EntityId;
use crate::{boot, Error, Result};

/// Appends the attributes an entity declares itself to a layout already
/// holding the inherited ones.
///
/// State positions and fetchable indices continue where the supertype left
/// off. A redeclared name (already visible from the supertype) is skipped; so
/// is any property with an unrecognized value shape.
pub(crate) fn append_declared(
    schema: &boot::Schema,
    entity: &boot::Entity,
    entity_id: EntityId,
    attributes: &mut Vec<AttributeMapping>,
    fetchable_cursor: &mut usize,
    span: &mut TableSpanBuilder,
    default_table: usize,
) -> Result<()> {
    for property in &entity.properties {
        if attributes.iter().any(|attr| attr.name == property.name) {
            continue;
        }

        let kind = match build_kind(schema, entity, property)? {
            Some(kind) => kind,
            None => {
                tracing::trace!(
                    entity = %entity.name,
                    property = %property.name,
                    "unrecognized value shape; omitting attribute"
                );
                continue;
            }
        };

        let table = match &property.table {
            Some(name) => span.ordinal_of(name).ok_or_else(|| {
                Error::consistency(format!(
                    "property `{}.{}` maps to table `{name}` outside the entity's span",
                    entity.name, property.name
                ))
            })?,
            None => default_table,
        };

        let state_position = attributes.len();
        let dirty_checkable = property.updatable && !property.value.is_plural();

        let attribute = AttributeMapping {
            name: property.name.clone(),
            state_position,
            fetchable_index: *fetchable_cursor,
            declared_by: entity_id,
            table,
            selectables: property.value.selectables(),
            insertable: property.insertable,
            updatable: property.updatable,
            nullable: property.nullable,
            optimistic_locked: property.optimistic_locked,
            dirty_checkable,
            cascade: property.cascade,
            fetch: property.fetch.clone(),
            kind,
        };

        *fetchable_cursor += attribute.fetchable_span();
        span.record_attribute(table, state_position);
        attributes.push(attribute);
    }

    Ok(())
}

fn build_kind(
    schema: &boot::Schema,
    entity: &boot::Entity,
    property: &boot::Property,
) -> Result<Option<AttributeKind>> {
    let kind = match &property.value {
        boot::PropertyValue::Basic { selectables, ty } => {
            if ty.column_span() != selectables.len() {
                return Err(Error::mapping(
                    &entity.name,
                    format!(
                        "property `{}` of type {ty:?} spans {} columns but declares {}",
                        property.name,
                        ty.column_span(),
                        selectables.len()
                    ),
                ));
            }
            AttributeKind::Basic { ty: ty.clone() }
        }
        boot::PropertyValue::Any(any) => AttributeKind::Any {
            discriminator_ty: any.discriminator_ty.clone(),
            key_ty: any.key_ty.clone(),
            mapping: any.mapping.clone(),
        },
        boot::PropertyValue::Embedded {
            properties,
            foreign_key_target,
        } => AttributeKind::Embedded {
            model: build_embedded(entity, &property.name, properties)?,
            foreign_key_target: foreign_key_target.clone(),
        },
        boot::PropertyValue::Plural { role } => AttributeKind::Plural { role: role.clone() },
        boot::PropertyValue::ToOne { target, columns } => {
            let identifier = schema
                .root_of(target)?
                .identifier
                .as_ref()
                .ok_or_else(|| {
                    Error::mapping(
                        &entity.name,
                        format!(
                            "property `{}` targets `{target}`, which declares no identifier",
                            property.name
                        ),
                    )
                })?;

            if columns.len() != identifier.columns.len() {
                return Err(Error::mapping(
                    &entity.name,
                    format!(
                        "property `{}` declares {} key columns; `{target}` identifies by {}",
                        property.name,
                        columns.len(),
                        identifier.columns.len()
                    ),
                ));
            }

            AttributeKind::ToOne {
                target: target.clone(),
                key: ForeignKeyMapping {
                    columns: columns.clone(),
                    target_property: identifier.property_name().to_string(),
                    target_ty: identifier.ty.clone(),
                },
            }
        }
        boot::PropertyValue::Custom { .. } => return Ok(None),
    };

    Ok(Some(kind))
}

fn build_embedded(
    entity: &boot::Entity,
    path: &str,
    properties: &[boot::Property],
) -> Result<EmbeddedModel> {
    let mut fields = Vec::with_capacity(properties.len());

    for property in properties {
        let kind = match &property.value {
            boot::PropertyValue::Basic { ty, selectables } => {
                if ty.column_span() != selectables.len() {
                    return Err(Error::mapping(
                        &entity.name,
                        format!(
                            "embedded field `{path}.{}` spans {} columns but declares {}",
                            property.name,
                            ty.column_span(),
                            selectables.len()
                        ),
                    ));
                }
                EmbeddedFieldKind::Basic { ty: ty.clone() }
            }
            boot::PropertyValue::Embedded { properties, .. } => EmbeddedFieldKind::Embedded(
                build_embedded(entity, &format!("{path}.{}", property.name), properties)?,
            ),
            other => {
                return Err(Error::mapping(
                    &entity.name,
                    format!(
                        "embedded field `{path}.{}` has unsupported shape {other:?}",
                        property.name
                    ),
                ));
            }
        };

        fields.push(EmbeddedField {
            name: property.name.clone(),
            selectables: property.value.selectables(),
            kind,
        });
    }

    Ok(EmbeddedModel { fields })
}
