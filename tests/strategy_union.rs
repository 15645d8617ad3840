use indexmap::IndexMap;
use pretty_assertions::assert_eq;
use stratum::boot::{self, Column, Entity, Identifier, Property};
use stratum::schema::{DiscriminatorValue, EntityNameUse, StrategyKind};
use stratum::stmt::{Expr, TableSource, Type, Value};
use stratum::Registry;

/// Abstract Shape with concrete Circle / Rect, one table per concrete type.
fn shape_schema() -> boot::Schema {
    let mut schema = boot::Schema::new();

    let mut shape = Entity::new("Shape", "shapes")
        .with_inheritance(boot::Inheritance::Union)
        .abstract_type();
    shape.identifier = Some(Identifier::new("id", vec![Column::new("id")], Type::I64));
    shape
        .properties
        .push(Property::basic("name", Column::new("name"), Type::String));
    schema.add_entity(shape);

    let mut circle = Entity::new("Circle", "circles").subtype_of("Shape");
    circle
        .properties
        .push(Property::basic("radius", Column::new("radius"), Type::I64));
    schema.add_entity(circle);

    let mut rect = Entity::new("Rect", "rects").subtype_of("Shape");
    rect.properties
        .push(Property::basic("width", Column::new("width"), Type::I64));
    rect.properties
        .push(Property::basic("height", Column::new("height"), Type::I64));
    schema.add_entity(rect);

    schema
}

#[test]
fn concrete_tables_carry_inherited_columns() {
    let registry = Registry::from_boot(&shape_schema()).unwrap();

    let circle = registry.entity("Circle").unwrap();
    assert_eq!(circle.strategy.kind(), StrategyKind::Union);
    assert_eq!(circle.tables.len(), 1);
    assert_eq!(circle.tables[0].name, "circles");

    // Inherited and declared attributes all map to the one concrete table.
    assert_eq!(circle.attribute("name").unwrap().table, 0);
    assert_eq!(circle.attribute("radius").unwrap().table, 0);
}

#[test]
fn union_branches_pad_missing_columns_with_typed_nulls() {
    let registry = Registry::from_boot(&shape_schema()).unwrap();

    let uses: IndexMap<String, EntityNameUse> = IndexMap::new();
    let group = registry.pruned_table_group("Shape", &uses).unwrap();

    let TableSource::Union(subquery) = &group.root.source else {
        panic!("expected a union source, got {:?}", group.root.source);
    };
    assert_eq!(group.root.alias, "t0");

    // The abstract root contributes no branch.
    assert_eq!(subquery.branches.len(), 2);

    let circle = subquery.branch_for("Circle").unwrap();
    assert_eq!(circle.table, "circles");
    assert_eq!(circle.discriminator, Value::I64(1));

    let columns: Vec<&str> = circle
        .selections
        .iter()
        .map(|s| s.column.as_str())
        .collect();
    assert_eq!(columns, ["id", "name", "radius", "width", "height"]);

    assert_eq!(circle.selections[2].expr, Expr::column("circles", "radius"));
    assert_eq!(circle.selections[3].expr, Expr::typed_null(Type::I64));
    assert_eq!(circle.selections[4].expr, Expr::typed_null(Type::I64));

    let rect = subquery.branch_for("Rect").unwrap();
    assert_eq!(rect.discriminator, Value::I64(2));
    assert_eq!(rect.selections[2].expr, Expr::typed_null(Type::I64));
    assert_eq!(rect.selections[3].expr, Expr::column("rects", "width"));
}

#[test]
fn pruning_to_one_branch_collapses_to_a_table_scan() {
    let registry = Registry::from_boot(&shape_schema()).unwrap();
    let uses = IndexMap::from([("Circle".to_string(), EntityNameUse::TREAT)]);

    let group = registry.pruned_table_group("Shape", &uses).unwrap();

    assert_eq!(group.root.source, TableSource::Table("circles".to_string()));
    assert_eq!(group.restriction, None);
}

#[test]
fn pruning_keeps_multiple_surviving_branches_unioned() {
    let mut schema = shape_schema();

    let mut square = Entity::new("Square", "squares").subtype_of("Rect");
    square
        .properties
        .push(Property::basic("side", Column::new("side"), Type::I64));
    schema.add_entity(square);

    let registry = Registry::from_boot(&schema).unwrap();
    let uses = IndexMap::from([("Rect".to_string(), EntityNameUse::FILTER)]);

    let group = registry.pruned_table_group("Shape", &uses).unwrap();

    let TableSource::Union(subquery) = &group.root.source else {
        panic!("expected a union source, got {:?}", group.root.source);
    };
    let entities: Vec<&str> = subquery
        .branches
        .iter()
        .map(|b| b.entity.as_str())
        .collect();
    assert_eq!(entities, ["Rect", "Square"]);
}

#[test]
fn synthetic_discriminator_values_are_hierarchy_ordinals() {
    let registry = Registry::from_boot(&shape_schema()).unwrap();

    let shape = registry.entity("Shape").unwrap();
    let mapping = shape.discriminator.as_ref().unwrap();

    // The abstract root claims no value; ordinals are query-time only and
    // never written.
    assert!(!mapping.insertable);
    assert_eq!(mapping.value_map.len(), 2);
    assert_eq!(
        mapping.value_map["Circle"],
        DiscriminatorValue::Literal(Value::I64(1))
    );
    assert_eq!(
        mapping.value_map["Rect"],
        DiscriminatorValue::Literal(Value::I64(2))
    );

    assert_eq!(
        shape.strategy.discriminator_expr(mapping),
        Expr::column("t0", "clazz_")
    );
}
