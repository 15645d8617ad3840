use pretty_assertions::assert_eq;
use stratum::boot::{
    self, Column, Discriminator, DiscriminatorSource, DiscriminatorValueSpec, Entity, Identifier,
    Property, PropertyValue,
};
use stratum::stmt::{Type, Value};
use stratum::Registry;

fn discriminated(value: i64) -> Discriminator {
    Discriminator {
        source: DiscriminatorSource::Column(Column::new("kind")),
        ty: Type::I64,
        value: DiscriminatorValueSpec::Literal(Value::I64(value)),
        force: false,
        insertable: true,
    }
}

fn person_and_animals() -> boot::Schema {
    let mut schema = boot::Schema::new();

    let mut person = Entity::new("Person", "people");
    person.identifier = Some(Identifier::new("id", vec![Column::new("id")], Type::I64));
    schema.add_entity(person);

    let mut animal = Entity::new("Animal", "animals");
    animal.identifier = Some(Identifier::new("id", vec![Column::new("id")], Type::I64));
    animal.discriminator = Some(discriminated(1));
    animal
        .properties
        .push(Property::basic("name", Column::new("name"), Type::String));
    animal.properties.push(Property::new(
        "owner",
        PropertyValue::ToOne {
            target: "Person".to_string(),
            columns: vec![Column::new("owner_id")],
        },
    ));
    animal.properties.push(Property::new(
        "origin",
        PropertyValue::Embedded {
            properties: vec![
                Property::basic("country", Column::new("origin_country"), Type::String),
                Property::basic("city", Column::new("origin_city"), Type::String),
            ],
            foreign_key_target: None,
        },
    ));
    schema.add_entity(animal);

    let mut dog = Entity::new("Dog", "animals").subtype_of("Animal");
    dog.discriminator = Some(discriminated(2));
    dog.properties
        .push(Property::basic("code", Column::new("dog_code"), Type::String));
    schema.add_entity(dog);

    let mut cat = Entity::new("Cat", "animals").subtype_of("Animal");
    cat.discriminator = Some(discriminated(3));
    cat.properties
        .push(Property::basic("code", Column::new("cat_code"), Type::String));
    schema.add_entity(cat);

    schema
}

#[test]
fn simple_and_identifier_paths() {
    let registry = Registry::from_boot(&person_and_animals()).unwrap();
    let animal = registry.entity("Animal").unwrap();

    assert_eq!(animal.paths.resolve("Animal", "id").unwrap(), ["id"]);
    assert_eq!(animal.paths.resolve("Animal", "name").unwrap(), ["name"]);
}

#[test]
fn association_paths_select_the_foreign_key() {
    let registry = Registry::from_boot(&person_and_animals()).unwrap();
    let animal = registry.entity("Animal").unwrap();

    // Both the association and its implicit key path resolve without a
    // join.
    assert_eq!(animal.paths.resolve("Animal", "owner").unwrap(), ["owner_id"]);
    assert_eq!(
        animal.paths.resolve("Animal", "owner.id").unwrap(),
        ["owner_id"]
    );
}

#[test]
fn embedded_paths_flatten_with_dots() {
    let registry = Registry::from_boot(&person_and_animals()).unwrap();
    let animal = registry.entity("Animal").unwrap();

    assert_eq!(
        animal.paths.resolve("Animal", "origin").unwrap(),
        ["origin_country", "origin_city"]
    );
    assert_eq!(
        animal.paths.resolve("Animal", "origin.city").unwrap(),
        ["origin_city"]
    );
}

#[test]
fn subtype_paths_fold_into_the_root() {
    let registry = Registry::from_boot(&person_and_animals()).unwrap();
    let animal = registry.entity("Animal").unwrap();

    // `code` exists on both subtypes with different columns: resolving it
    // polymorphically is ambiguous.
    let err = animal.paths.resolve("Animal", "code").unwrap_err();
    assert!(err.is_mapping());
    assert!(err.to_string().contains("ambiguous"));

    // Each subtype's own map is unambiguous.
    let dog = registry.entity("Dog").unwrap();
    assert_eq!(dog.paths.resolve("Dog", "code").unwrap(), ["dog_code"]);

    let cat = registry.entity("Cat").unwrap();
    assert_eq!(cat.paths.resolve("Cat", "code").unwrap(), ["cat_code"]);
}

#[test]
fn unknown_paths_are_unresolvable() {
    let registry = Registry::from_boot(&person_and_animals()).unwrap();
    let animal = registry.entity("Animal").unwrap();

    let err = animal.paths.resolve("Animal", "nope").unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid mapping for entity `Animal`: unresolvable property path `nope`"
    );
}
