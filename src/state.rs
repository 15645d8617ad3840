//! Runtime instance state: loaded-value tracking, dirty comparison, cache
//! entry shaping, and lazy-attribute resolution.

mod cache;
pub use cache::{CacheEntry, CacheEntryShaper, CacheShape};

mod dirty;
pub use dirty::{find_dirty, find_modified};

mod lazy;
pub use lazy::{CacheEntrySource, InstanceState, LazyInitializer, SingleRowLoader};

mod slot;
pub use slot::Slot;
