//! Cache layer for derived household views.
//!
//! Three independent bounded, time-expiring caches (mutual likes, activity
//! pages, stats) share one store so that invalidation issued from any code
//! path is visible to all readers. Staleness is bounded by the per-cache
//! TTL; there is no cross-cache transaction with the underlying writes.

mod store;
mod ttl_lru;

pub use store::{ActivityPageKey, CacheConfig, CoupleCacheStore};
pub use ttl_lru::{CacheStats, TtlLruCache};
