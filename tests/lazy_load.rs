use pretty_assertions::assert_eq;
use std::cell::{Cell, RefCell};
use stratum::boot::{
    self, CacheDecl, CacheLayout, Column, Discriminator, DiscriminatorSource,
    DiscriminatorValueSpec, Entity, Identifier, Property,
};
use stratum::schema::LoadPlan;
use stratum::state::{
    CacheEntry, CacheEntrySource, InstanceState, LazyInitializer, SingleRowLoader, Slot,
};
use stratum::stmt::{Type, Value};
use stratum::{Registry, Result};

fn animal_schema(cache: Option<CacheDecl>) -> boot::Schema {
    let discriminated = |value: i64| Discriminator {
        source: DiscriminatorSource::Column(Column::new("kind")),
        ty: Type::I64,
        value: DiscriminatorValueSpec::Literal(Value::I64(value)),
        force: false,
        insertable: true,
    };

    let mut schema = boot::Schema::new();

    let mut animal = Entity::new("Animal", "animals");
    animal.identifier = Some(Identifier::new("id", vec![Column::new("id")], Type::I64));
    animal.discriminator = Some(discriminated(1));
    animal
        .properties
        .push(Property::basic("name", Column::new("name"), Type::String));
    animal.cache = cache;
    schema.add_entity(animal);

    let mut dog = Entity::new("Dog", "animals").subtype_of("Animal");
    dog.discriminator = Some(discriminated(2));
    dog.properties
        .push(Property::basic("breed", Column::new("breed"), Type::String).lazy(None));
    schema.add_entity(dog);

    schema
}

/// Counts invocations and serves fixed values for the plan's attributes.
struct CountingLoader {
    calls: Cell<usize>,
    rows: RefCell<Vec<(usize, Value)>>,
}

impl CountingLoader {
    fn serving(rows: Vec<(usize, Value)>) -> Self {
        Self {
            calls: Cell::new(0),
            rows: RefCell::new(rows),
        }
    }
}

impl SingleRowLoader for CountingLoader {
    fn load(&self, _plan: &LoadPlan, _id: &Value) -> Result<Vec<(usize, Value)>> {
        self.calls.set(self.calls.get() + 1);
        Ok(self.rows.borrow().clone())
    }
}

struct FailingLoader;

impl SingleRowLoader for FailingLoader {
    fn load(&self, _plan: &LoadPlan, _id: &Value) -> Result<Vec<(usize, Value)>> {
        Err(stratum::err!("connection reset"))
    }
}

#[test]
fn lazy_attribute_is_fetched_once() {
    let registry = Registry::from_boot(&animal_schema(None)).unwrap();
    let dog = registry.entity("Dog").unwrap();

    let breed = dog.attribute_position("breed").unwrap();
    let loader = CountingLoader::serving(vec![(breed, Value::String("collie".to_string()))]);
    let initializer = LazyInitializer::new(dog, &loader);

    let mut state = InstanceState::new(dog.attributes.len());
    state.values[0] = Slot::Loaded(Value::String("Rex".to_string()));

    let value = initializer
        .initialize(&mut state, &Value::I64(7), "breed")
        .unwrap();
    assert_eq!(value, Value::String("collie".to_string()));
    assert_eq!(loader.calls.get(), 1);

    // Resolved state is written back to both snapshots.
    assert_eq!(state.values[breed], Slot::Loaded(Value::String("collie".to_string())));
    assert_eq!(state.loaded[breed], Slot::Loaded(Value::String("collie".to_string())));

    // A second access answers from state without another load.
    let value = initializer
        .initialize(&mut state, &Value::I64(7), "breed")
        .unwrap();
    assert_eq!(value, Value::String("collie".to_string()));
    assert_eq!(loader.calls.get(), 1);
}

#[test]
fn group_plan_targets_the_lazy_positions() {
    let registry = Registry::from_boot(&animal_schema(None)).unwrap();
    let dog = registry.entity("Dog").unwrap();

    let breed = dog.attribute_position("breed").unwrap();
    let plan = dog.group_load_plan("breed").unwrap();

    assert_eq!(plan.entity, dog.id);
    assert_eq!(plan.attributes, vec![breed]);
    assert_eq!(plan.tables, vec![0]);

    // Plans are compiled once per group.
    let again = dog.group_load_plan("breed").unwrap();
    assert!(std::sync::Arc::ptr_eq(&plan, &again));
}

#[test]
fn loader_failure_names_entity_and_id() {
    let registry = Registry::from_boot(&animal_schema(None)).unwrap();
    let dog = registry.entity("Dog").unwrap();

    let initializer = LazyInitializer::new(dog, &FailingLoader);
    let mut state = InstanceState::new(dog.attributes.len());

    let err = initializer
        .initialize(&mut state, &Value::I64(7), "breed")
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "data access failure for `Dog` #I64(7): initializing attribute `breed`: connection reset"
    );
    // A failed resolution leaves state untouched.
    assert_eq!(state.values[1], Slot::Unfetched);
}

#[test]
fn cached_entry_short_circuits_the_loader() {
    let cache_decl = CacheDecl {
        layout: CacheLayout::Structured,
        cache_lazy_attributes: true,
    };
    let registry = Registry::from_boot(&animal_schema(Some(cache_decl))).unwrap();
    let dog = registry.entity("Dog").unwrap();

    struct OneEntry(CacheEntry);

    impl CacheEntrySource for OneEntry {
        fn cache_entry(&self, _entity: &str, _id: &Value) -> Option<CacheEntry> {
            Some(self.0.clone())
        }
    }

    let source = OneEntry(CacheEntry::Structured {
        subclass: "Dog".to_string(),
        version: None,
        fields: indexmap::IndexMap::from([(
            "breed".to_string(),
            Slot::Loaded(Value::String("husky".to_string())),
        )]),
    });

    let loader = CountingLoader::serving(vec![]);
    let initializer = LazyInitializer::new(dog, &loader).with_cache(&source);

    let mut state = InstanceState::new(dog.attributes.len());
    let value = initializer
        .initialize(&mut state, &Value::I64(3), "breed")
        .unwrap();

    assert_eq!(value, Value::String("husky".to_string()));
    assert_eq!(loader.calls.get(), 0);
}

#[test]
fn cached_entry_resolves_the_whole_fetch_group() {
    let cache_decl = CacheDecl {
        layout: CacheLayout::Structured,
        cache_lazy_attributes: true,
    };
    let mut schema = animal_schema(Some(cache_decl));

    // Two attributes in one fetch group: resolving either pulls both.
    let dog = schema.entities.get_mut("Dog").unwrap();
    dog.properties.push(
        Property::basic("pedigree", Column::new("pedigree"), Type::String).lazy(Some("papers")),
    );
    dog.properties.push(
        Property::basic("registry_no", Column::new("registry_no"), Type::String)
            .lazy(Some("papers")),
    );

    let registry = Registry::from_boot(&schema).unwrap();
    let dog = registry.entity("Dog").unwrap();

    struct OneEntry(CacheEntry);

    impl CacheEntrySource for OneEntry {
        fn cache_entry(&self, _entity: &str, _id: &Value) -> Option<CacheEntry> {
            Some(self.0.clone())
        }
    }

    let source = OneEntry(CacheEntry::Structured {
        subclass: "Dog".to_string(),
        version: None,
        fields: indexmap::IndexMap::from([
            (
                "pedigree".to_string(),
                Slot::Loaded(Value::String("champion line".to_string())),
            ),
            (
                "registry_no".to_string(),
                Slot::Loaded(Value::String("R-77".to_string())),
            ),
        ]),
    });

    let loader = CountingLoader::serving(vec![]);
    let initializer = LazyInitializer::new(dog, &loader).with_cache(&source);

    let mut state = InstanceState::new(dog.attributes.len());
    let value = initializer
        .initialize(&mut state, &Value::I64(3), "pedigree")
        .unwrap();

    assert_eq!(value, Value::String("champion line".to_string()));
    assert_eq!(loader.calls.get(), 0);

    // The group sibling is resolved by the same entry, in both snapshots.
    let sibling = dog.attribute_position("registry_no").unwrap();
    assert_eq!(
        state.values[sibling],
        Slot::Loaded(Value::String("R-77".to_string()))
    );
    assert_eq!(
        state.loaded[sibling],
        Slot::Loaded(Value::String("R-77".to_string()))
    );
}

#[test]
fn missing_row_is_a_data_error() {
    let registry = Registry::from_boot(&animal_schema(None)).unwrap();
    let dog = registry.entity("Dog").unwrap();

    let loader = CountingLoader::serving(vec![]);
    let initializer = LazyInitializer::new(dog, &loader);
    let mut state = InstanceState::new(dog.attributes.len());

    let err = initializer
        .initialize(&mut state, &Value::I64(404), "breed")
        .unwrap_err();
    assert!(err.is_runtime_data());
    assert!(err.to_string().contains("no value for `breed`"));
}

#[test]
fn deletion_snapshot_receives_resolved_state() {
    let registry = Registry::from_boot(&animal_schema(None)).unwrap();
    let dog = registry.entity("Dog").unwrap();

    let breed = dog.attribute_position("breed").unwrap();
    let loader = CountingLoader::serving(vec![(breed, Value::String("collie".to_string()))]);
    let initializer = LazyInitializer::new(dog, &loader);

    let mut state = InstanceState::new(dog.attributes.len());
    state.deleted = Some(vec![Slot::Unfetched; dog.attributes.len()]);

    initializer
        .initialize(&mut state, &Value::I64(7), "breed")
        .unwrap();

    assert_eq!(
        state.deleted.as_ref().unwrap()[breed],
        Slot::Loaded(Value::String("collie".to_string()))
    );
}
