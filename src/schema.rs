//! The descriptor compiler: turns the boot-time mapping model into
//! immutable, flat, column-oriented runtime descriptors.

pub mod attribute;
pub use attribute::{AttributeKind, AttributeMapping};

mod discriminator;
pub use discriminator::{DiscriminatorMapping, DiscriminatorSource, DiscriminatorValue};

mod entity;
pub use entity::{
    EntityDescriptor, EntityId, IdentifierMapping, NaturalIdMapping, SoftDeleteMapping,
    VersionMapping,
};

mod loader;
pub use loader::{LoadKey, LoadPlan, LoaderCaches, LockMode};

mod name_use;
pub use name_use::{EntityNameUse, UseKind};

mod path;
pub use path::PathMap;

mod registry;
pub use registry::Registry;

pub mod strategy;
pub use strategy::{Strategy, StrategyKind};

mod table;
pub use table::{MutationDetails, TableMapping};
