use super::EntityId;
use crate::{stmt, Result};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, RwLock};

/// Row lock requested alongside a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockMode {
    None,
    Read,
    Optimistic,
    OptimisticForceIncrement,
    PessimisticRead,
    PessimisticWrite,
    PessimisticForceIncrement,
}

impl LockMode {
    /// The lock bumps the version column as part of acquiring it.
    pub fn is_force_increment(&self) -> bool {
        matches!(
            self,
            Self::OptimisticForceIncrement | Self::PessimisticForceIncrement
        )
    }
}

/// How the row a plan fetches is matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadKey {
    /// Match on the identifier columns.
    Identifier,

    /// Match on the columns of a unique attribute, given by state position.
    UniqueAttribute(usize),
}

/// A compiled single-row load: which attributes to fetch, from which tables,
/// under which lock.
#[derive(Debug, Clone)]
pub struct LoadPlan {
    pub entity: EntityId,
    pub lock: LockMode,

    /// The columns the row is matched by
    pub key: LoadKey,

    /// State positions fetched by this plan
    pub attributes: Vec<usize>,

    /// Ordinals of the span tables the plan reads
    pub tables: Vec<usize>,

    /// Extra restriction beyond the key match (soft-delete, forced
    /// discriminator)
    pub restriction: Option<stmt::Expr>,
}

/// Read-through caches for compiled load plans, keyed four ways: by lock
/// mode, by lazy fetch group, by explicit attribute subset, and by unique
/// key attribute.
///
/// Lookups take the read lock only. On a miss the plan is built outside any
/// lock; two threads racing on the same key may both build, and the first
/// insert wins.
#[derive(Debug, Default)]
pub struct LoaderCaches {
    by_lock: RwLock<HashMap<LockMode, Arc<LoadPlan>>>,
    by_group: RwLock<HashMap<String, Arc<LoadPlan>>>,
    by_subset: RwLock<HashMap<Vec<usize>, Arc<LoadPlan>>>,
    by_unique_key: RwLock<HashMap<usize, Arc<LoadPlan>>>,
}

impl LoaderCaches {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_lock(
        &self,
        lock: LockMode,
        build: impl FnOnce() -> Result<LoadPlan>,
    ) -> Result<Arc<LoadPlan>> {
        get_or_build(&self.by_lock, lock, build)
    }

    pub fn for_group(
        &self,
        group: &str,
        build: impl FnOnce() -> Result<LoadPlan>,
    ) -> Result<Arc<LoadPlan>> {
        get_or_build(&self.by_group, group.to_string(), build)
    }

    pub fn for_subset(
        &self,
        positions: &[usize],
        build: impl FnOnce() -> Result<LoadPlan>,
    ) -> Result<Arc<LoadPlan>> {
        let mut key = positions.to_vec();
        key.sort_unstable();
        key.dedup();
        get_or_build(&self.by_subset, key, build)
    }

    pub fn for_unique_key(
        &self,
        position: usize,
        build: impl FnOnce() -> Result<LoadPlan>,
    ) -> Result<Arc<LoadPlan>> {
        get_or_build(&self.by_unique_key, position, build)
    }
}

fn get_or_build<K: Eq + Hash + Clone>(
    map: &RwLock<HashMap<K, Arc<LoadPlan>>>,
    key: K,
    build: impl FnOnce() -> Result<LoadPlan>,
) -> Result<Arc<LoadPlan>> {
    if let Some(plan) = map.read().unwrap().get(&key) {
        return Ok(plan.clone());
    }

    let plan = Arc::new(build()?);
    tracing::debug!(entity = ?plan.entity, lock = ?plan.lock, "compiled load plan");

    let mut guard = map.write().unwrap();
    Ok(guard.entry(key).or_insert(plan).clone())
}
