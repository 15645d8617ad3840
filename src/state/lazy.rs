use super::{CacheEntry, Slot};
use crate::schema::{EntityDescriptor, LoadPlan};
use crate::{stmt, Error, Result};

/// Fetches the state a load plan describes for one row.
///
/// Implemented by whatever executes statements; this crate only compiles the
/// plan and interprets the result.
pub trait SingleRowLoader {
    /// Returns `(state_position, value)` pairs for the plan's attributes, or
    /// an empty vec when the row no longer exists.
    fn load(&self, plan: &LoadPlan, id: &stmt::Value) -> Result<Vec<(usize, stmt::Value)>>;
}

/// Supplies second-level cache entries, when a cache is wired in.
pub trait CacheEntrySource {
    fn cache_entry(&self, entity: &str, id: &stmt::Value) -> Option<CacheEntry>;
}

/// The mutable per-instance state a session tracks.
#[derive(Debug, Clone)]
pub struct InstanceState {
    /// Current values, one slot per attribute
    pub values: Vec<Slot>,

    /// Snapshot of the values as loaded from the database
    pub loaded: Vec<Slot>,

    /// Snapshot captured when deletion was scheduled; kept in sync so a
    /// delete planned before lazy resolution still sees full state
    pub deleted: Option<Vec<Slot>>,
}

impl InstanceState {
    pub fn new(span: usize) -> Self {
        Self {
            values: vec![Slot::Unfetched; span],
            loaded: vec![Slot::Unfetched; span],
            deleted: None,
        }
    }
}

/// Resolves unfetched attributes on demand: second-level cache first, then a
/// compiled load plan.
pub struct LazyInitializer<'a> {
    descriptor: &'a EntityDescriptor,
    loader: &'a dyn SingleRowLoader,
    cache: Option<&'a dyn CacheEntrySource>,
}

impl<'a> LazyInitializer<'a> {
    pub fn new(descriptor: &'a EntityDescriptor, loader: &'a dyn SingleRowLoader) -> Self {
        Self {
            descriptor,
            loader,
            cache: None,
        }
    }

    pub fn with_cache(mut self, cache: &'a dyn CacheEntrySource) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Resolves one attribute, returning its value.
    ///
    /// An already-loaded slot returns immediately without touching the
    /// database. Otherwise the attribute's whole fetch group is resolved and
    /// written back in one step, so a failure leaves the state untouched.
    pub fn initialize(
        &self,
        state: &mut InstanceState,
        id: &stmt::Value,
        attribute: &str,
    ) -> Result<stmt::Value> {
        let position = self.descriptor.attribute_position(attribute)?;

        if let Slot::Loaded(value) = &state.values[position] {
            return Ok(value.clone());
        }

        if let Some(rows) = self.from_cache(id, position) {
            tracing::debug!(
                entity = %self.descriptor.name,
                attribute,
                "lazy fetch group resolved from cache entry"
            );
            write_back(state, &rows);
            return match &state.values[position] {
                Slot::Loaded(value) => Ok(value.clone()),
                Slot::Unfetched => unreachable!("from_cache guarantees the requested position"),
            };
        }

        let mapping = &self.descriptor.attributes[position];
        let plan = match mapping.lazy_group() {
            Some(group) => self.descriptor.group_load_plan(group)?,
            None => self.descriptor.subset_load_plan(&[position])?,
        };

        let rows = self.loader.load(&plan, id).map_err(|source| {
            source.context(Error::runtime_data(
                &self.descriptor.name,
                id,
                format!("initializing attribute `{attribute}`"),
            ))
        })?;

        if !rows.iter().any(|(loaded, _)| *loaded == position) {
            return Err(Error::runtime_data(
                &self.descriptor.name,
                id,
                format!("load plan returned no value for `{attribute}`"),
            ));
        }

        write_back(state, &rows);

        match &state.values[position] {
            Slot::Loaded(value) => Ok(value.clone()),
            Slot::Unfetched => unreachable!("write_back filled the requested position"),
        }
    }

    /// Resolves a position's whole fetch group from the cache entry, or None
    /// when the entry is absent or missing the requested position. Siblings
    /// the entry does not carry are simply skipped; the caller's write-back
    /// leaves their slots unfetched.
    fn from_cache(&self, id: &stmt::Value, position: usize) -> Option<Vec<(usize, stmt::Value)>> {
        let cache = self.cache?;
        let decl = self.descriptor.cache.as_ref()?;
        if !decl.cache_lazy_attributes {
            return None;
        }

        let entry = cache.cache_entry(&self.descriptor.name, id)?;

        let members = self.descriptor.attributes[position]
            .lazy_group()
            .and_then(|group| self.descriptor.lazy_groups.get(group).cloned())
            .unwrap_or_else(|| vec![position]);

        let mut rows = vec![];
        for member in members {
            let name = &self.descriptor.attributes[member].name;
            if let Some(Slot::Loaded(value)) = entry.slot(self.descriptor, name) {
                rows.push((member, value.clone()));
            }
        }

        // A partial entry without the requested attribute still goes through
        // the loader, which resolves the group in full.
        if rows.iter().any(|(cached, _)| *cached == position) {
            Some(rows)
        } else {
            None
        }
    }
}

/// Applies resolved values to every snapshot the state carries. Positions
/// already loaded keep their current value: a concurrent resolution must not
/// clobber newer state.
fn write_back(state: &mut InstanceState, rows: &[(usize, stmt::Value)]) {
    for (position, value) in rows {
        if !state.values[*position].is_loaded() {
            state.values[*position] = Slot::Loaded(value.clone());
        }
        if !state.loaded[*position].is_loaded() {
            state.loaded[*position] = Slot::Loaded(value.clone());
        }
        if let Some(deleted) = &mut state.deleted {
            if !deleted[*position].is_loaded() {
                deleted[*position] = Slot::Loaded(value.clone());
            }
        }
    }
}
