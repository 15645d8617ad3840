use pretty_assertions::assert_eq;
use stratum::boot::{self, Column, Entity, Identifier, Property, PropertyValue};
use stratum::state::{find_dirty, find_modified, Slot};
use stratum::stmt::{Type, Value, ValueRecord};
use stratum::Registry;

fn order_schema() -> boot::Schema {
    let mut schema = boot::Schema::new();

    let mut order = Entity::new("Order", "orders");
    order.identifier = Some(Identifier::new("id", vec![Column::new("id")], Type::I64));
    order
        .properties
        .push(Property::basic("code", Column::new("code"), Type::String));
    order
        .properties
        .push(Property::basic("total", Column::new("total"), Type::I64));

    let mut created_at = Property::basic("created_at", Column::new("created_at"), Type::I64);
    created_at.updatable = false;
    order.properties.push(created_at);

    // Embedded address whose zip column is read-only.
    order.properties.push(Property::new(
        "address",
        PropertyValue::Embedded {
            properties: vec![
                Property::basic("street", Column::new("street"), Type::String),
                Property::basic("zip", Column::new("zip").read_only(), Type::String),
            ],
            foreign_key_target: None,
        },
    ));

    schema.add_entity(order);
    schema
}

fn loaded(value: impl Into<Value>) -> Slot {
    Slot::Loaded(value.into())
}

fn address(street: &str, zip: &str) -> Value {
    Value::Record(ValueRecord {
        fields: vec![
            Value::String(street.to_string()),
            Value::String(zip.to_string()),
        ],
    })
}

#[test]
fn unchanged_state_reports_nothing() {
    let registry = Registry::from_boot(&order_schema()).unwrap();
    let order = registry.entity("Order").unwrap();

    let state = vec![
        loaded("A-1".to_string()),
        loaded(100i64),
        loaded(7i64),
        Slot::Loaded(address("Main St", "1010")),
    ];

    assert_eq!(find_dirty(order, &state, Some(&state)), None);
}

#[test]
fn changed_positions_are_reported_in_layout_order() {
    let registry = Registry::from_boot(&order_schema()).unwrap();
    let order = registry.entity("Order").unwrap();

    let previous = vec![
        loaded("A-1".to_string()),
        loaded(100i64),
        loaded(7i64),
        Slot::Loaded(address("Main St", "1010")),
    ];
    let mut current = previous.clone();
    current[0] = loaded("A-2".to_string());
    current[3] = Slot::Loaded(address("Elm St", "1010"));

    assert_eq!(find_dirty(order, &current, Some(&previous)), Some(vec![0, 3]));
}

#[test]
fn missing_previous_state_marks_loaded_slots_dirty() {
    let registry = Registry::from_boot(&order_schema()).unwrap();
    let order = registry.entity("Order").unwrap();

    let current = vec![
        loaded("A-1".to_string()),
        Slot::Unfetched,
        loaded(7i64),
        Slot::Unfetched,
    ];

    // Unfetched slots have nothing to write; non-updatable `created_at`
    // never reports.
    assert_eq!(find_dirty(order, &current, None), Some(vec![0]));
}

#[test]
fn non_updatable_changes_are_ignored() {
    let registry = Registry::from_boot(&order_schema()).unwrap();
    let order = registry.entity("Order").unwrap();

    let previous = vec![
        loaded("A-1".to_string()),
        loaded(100i64),
        loaded(7i64),
        Slot::Loaded(address("Main St", "1010")),
    ];
    let mut current = previous.clone();
    current[2] = loaded(8i64);

    assert_eq!(find_dirty(order, &current, Some(&previous)), None);
}

#[test]
fn read_only_embedded_field_does_not_dirty_the_composite() {
    let registry = Registry::from_boot(&order_schema()).unwrap();
    let order = registry.entity("Order").unwrap();

    let previous = vec![
        loaded("A-1".to_string()),
        loaded(100i64),
        loaded(7i64),
        Slot::Loaded(address("Main St", "1010")),
    ];
    let mut current = previous.clone();

    // Only the read-only zip column differs.
    current[3] = Slot::Loaded(address("Main St", "2020"));
    assert_eq!(find_dirty(order, &current, Some(&previous)), None);

    // An updatable field still reports.
    current[3] = Slot::Loaded(address("Elm St", "1010"));
    assert_eq!(find_dirty(order, &current, Some(&previous)), Some(vec![3]));
}

#[test]
fn short_embedded_records_compare_wholesale() {
    let registry = Registry::from_boot(&order_schema()).unwrap();
    let order = registry.entity("Order").unwrap();

    let previous = vec![
        loaded("A-1".to_string()),
        loaded(100i64),
        loaded(7i64),
        Slot::Loaded(address("Main St", "1010")),
    ];
    let mut current = previous.clone();

    // A truncated record cannot be compared field-wise; it is simply
    // different, read-only mask or not.
    current[3] = Slot::Loaded(Value::Record(ValueRecord {
        fields: vec![Value::String("Main St".to_string())],
    }));
    assert_eq!(find_dirty(order, &current, Some(&previous)), Some(vec![3]));
}

#[test]
fn previously_unfetched_slot_counts_as_changed() {
    let registry = Registry::from_boot(&order_schema()).unwrap();
    let order = registry.entity("Order").unwrap();

    let previous = vec![
        loaded("A-1".to_string()),
        Slot::Unfetched,
        loaded(7i64),
        Slot::Loaded(address("Main St", "1010")),
    ];
    let mut current = previous.clone();
    current[1] = loaded(100i64);

    assert_eq!(find_dirty(order, &current, Some(&previous)), Some(vec![1]));
}

#[test]
fn find_modified_honors_the_include_mask() {
    let registry = Registry::from_boot(&order_schema()).unwrap();
    let order = registry.entity("Order").unwrap();

    let previous = vec![
        loaded("A-1".to_string()),
        loaded(100i64),
        loaded(7i64),
        Slot::Loaded(address("Main St", "1010")),
    ];
    let mut current = previous.clone();
    current[0] = loaded("A-2".to_string());
    current[1] = loaded(200i64);

    let include = vec![false, true, true, true];
    assert_eq!(
        find_modified(order, &current, Some(&previous), &include),
        Some(vec![1])
    );

    let include = vec![false, false, false, false];
    assert_eq!(
        find_modified(order, &current, Some(&previous), &include),
        None
    );
}
