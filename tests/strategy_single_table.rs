use indexmap::IndexMap;
use pretty_assertions::assert_eq;
use stratum::boot::{
    self, Column, Discriminator, DiscriminatorSource, DiscriminatorValueSpec, Entity, Identifier,
    Property,
};
use stratum::schema::{EntityNameUse, StrategyKind};
use stratum::stmt::{Expr, TableSource, Type, Value};
use stratum::Registry;

fn discriminated(value: DiscriminatorValueSpec) -> Discriminator {
    Discriminator {
        source: DiscriminatorSource::Column(Column::new("kind")),
        ty: Type::I64,
        value,
        force: false,
        insertable: true,
    }
}

/// Animal / Dog / Cat in one `animals` table, discriminated 1 / 2 / 3.
fn animal_schema() -> boot::Schema {
    let mut schema = boot::Schema::new();

    let mut animal = Entity::new("Animal", "animals");
    animal.identifier = Some(Identifier::new("id", vec![Column::new("id")], Type::I64));
    animal.discriminator = Some(discriminated(DiscriminatorValueSpec::Literal(Value::I64(1))));
    animal
        .properties
        .push(Property::basic("name", Column::new("name"), Type::String));
    schema.add_entity(animal);

    let mut dog = Entity::new("Dog", "animals").subtype_of("Animal");
    dog.discriminator = Some(discriminated(DiscriminatorValueSpec::Literal(Value::I64(2))));
    dog.properties
        .push(Property::basic("breed", Column::new("breed"), Type::String).lazy(None));
    schema.add_entity(dog);

    let mut cat = Entity::new("Cat", "animals").subtype_of("Animal");
    cat.discriminator = Some(discriminated(DiscriminatorValueSpec::Literal(Value::I64(3))));
    cat.properties
        .push(Property::basic("lives", Column::new("lives"), Type::I64));
    schema.add_entity(cat);

    schema
}

#[test]
fn shared_table_and_layout() {
    let registry = Registry::from_boot(&animal_schema()).unwrap();

    let animal = registry.entity("Animal").unwrap();
    let dog = registry.entity("Dog").unwrap();
    let cat = registry.entity("Cat").unwrap();

    assert_eq!(animal.strategy.kind(), StrategyKind::SingleTable);
    assert_eq!(animal.tables.len(), 1);
    assert_eq!(dog.tables.len(), 1);
    assert_eq!(dog.tables[0].name, "animals");
    assert_eq!(cat.tables[0].name, "animals");

    // Inherited positions stay stable; declared attributes follow.
    assert_eq!(animal.attributes.len(), 1);
    assert_eq!(dog.attributes[0].name, "name");
    assert_eq!(dog.attributes[1].name, "breed");
    assert_eq!(cat.attributes[1].name, "lives");
    assert_eq!(dog.declared_start, 1);
}

#[test]
fn unrestricted_group_is_a_plain_table_scan() {
    let registry = Registry::from_boot(&animal_schema()).unwrap();
    let uses = IndexMap::from([("Dog".to_string(), EntityNameUse::PROJECTION)]);

    let group = registry.pruned_table_group("Animal", &uses).unwrap();

    assert_eq!(group.root.source, TableSource::Table("animals".to_string()));
    assert!(group.joins.is_empty());
    assert_eq!(group.restriction, None);
}

#[test]
fn treat_downcast_restricts_by_discriminator() {
    let registry = Registry::from_boot(&animal_schema()).unwrap();
    let uses = IndexMap::from([("Dog".to_string(), EntityNameUse::TREAT)]);

    let group = registry.pruned_table_group("Animal", &uses).unwrap();

    assert_eq!(group.root.source, TableSource::Table("animals".to_string()));
    assert_eq!(
        group.restriction,
        Some(Expr::eq(Expr::column("t0", "kind"), Value::I64(2)))
    );
}

#[test]
fn unrestricted_treat_adds_no_predicate() {
    let registry = Registry::from_boot(&animal_schema()).unwrap();
    let uses = IndexMap::from([("Dog".to_string(), EntityNameUse::TREAT_UNRESTRICTED)]);

    let group = registry.pruned_table_group("Animal", &uses).unwrap();
    assert_eq!(group.restriction, None);
}

#[test]
fn filter_on_mid_type_covers_its_subtree() {
    let mut schema = animal_schema();

    let mut puppy = Entity::new("Puppy", "animals").subtype_of("Dog");
    puppy.discriminator = Some(discriminated(DiscriminatorValueSpec::Literal(Value::I64(4))));
    schema.add_entity(puppy);

    let registry = Registry::from_boot(&schema).unwrap();
    let uses = IndexMap::from([("Dog".to_string(), EntityNameUse::FILTER)]);

    let group = registry.pruned_table_group("Animal", &uses).unwrap();

    // Dog plus its subtype; Cat's value is excluded.
    assert_eq!(
        group.restriction,
        Some(Expr::in_list(
            Expr::column("t0", "kind"),
            vec![Expr::Value(Value::I64(2)), Expr::Value(Value::I64(4))],
        ))
    );
}

#[test]
fn null_sentinel_becomes_a_null_test() {
    let mut schema = boot::Schema::new();

    let mut animal = Entity::new("Animal", "animals");
    animal.identifier = Some(Identifier::new("id", vec![Column::new("id")], Type::I64));
    animal.discriminator = Some(discriminated(DiscriminatorValueSpec::Null));
    schema.add_entity(animal);

    let mut dog = Entity::new("Dog", "animals").subtype_of("Animal");
    dog.discriminator = Some(discriminated(DiscriminatorValueSpec::Literal(Value::I64(2))));
    schema.add_entity(dog);

    let registry = Registry::from_boot(&schema).unwrap();
    let uses = IndexMap::from([("Animal".to_string(), EntityNameUse::FILTER)]);

    // Animal's closure covers both members: literal 2 OR the null marker.
    let group = registry.pruned_table_group("Animal", &uses).unwrap();
    assert_eq!(
        group.restriction,
        Some(Expr::or(
            Expr::eq(Expr::column("t0", "kind"), Value::I64(2)),
            Expr::is_null(Expr::column("t0", "kind")),
        ))
    );
}

#[test]
fn subtypes_without_discriminator_are_rejected() {
    let mut schema = boot::Schema::new();

    let mut animal = Entity::new("Animal", "animals");
    animal.identifier = Some(Identifier::new("id", vec![Column::new("id")], Type::I64));
    schema.add_entity(animal);
    schema.add_entity(Entity::new("Dog", "animals").subtype_of("Animal"));

    let err = Registry::from_boot(&schema).unwrap_err();
    assert!(err.to_string().contains("requires a discriminator"));
}
