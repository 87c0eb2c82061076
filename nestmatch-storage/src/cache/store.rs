//! The shared cache store for derived household views.
//!
//! Bundles the three caches (mutual likes, activity pages, stats) so a
//! single `invalidate_household` call clears every derived view for that
//! household at once. Partial invalidation across the three caches would
//! let one reader observe a mutual like that another cache still denies,
//! so the store never exposes per-cache invalidation.

use std::time::Duration;

use nestmatch_core::{CouplesStats, HouseholdActivity, HouseholdId, MutualLike};

use super::ttl_lru::{CacheStats, TtlLruCache};

/// Cache key for one activity timeline page.
///
/// The household id is part of the key so `invalidate_household` can match
/// every page belonging to a household regardless of its limit/offset - the
/// analogue of a household-scoped key prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActivityPageKey {
    pub household_id: HouseholdId,
    pub limit: i64,
    pub offset: i64,
}

/// Capacities and TTLs for the three household caches.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Max mutual-like entries (one per household).
    pub mutual_capacity: usize,
    /// TTL for cached mutual-like sets.
    pub mutual_ttl: Duration,
    /// Max cached activity pages across all households.
    pub activity_capacity: usize,
    /// TTL for cached activity pages.
    pub activity_ttl: Duration,
    /// Max stats entries (one per household).
    pub stats_capacity: usize,
    /// TTL for cached stats rollups.
    pub stats_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            mutual_capacity: 1000,
            mutual_ttl: Duration::from_secs(5 * 60),
            activity_capacity: 500,
            activity_ttl: Duration::from_secs(2 * 60),
            stats_capacity: 1000,
            stats_ttl: Duration::from_secs(10 * 60),
        }
    }
}

impl CacheConfig {
    /// Create a cache config with the default capacities and TTLs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the mutual-likes cache bounds.
    pub fn with_mutual(mut self, capacity: usize, ttl: Duration) -> Self {
        self.mutual_capacity = capacity;
        self.mutual_ttl = ttl;
        self
    }

    /// Set the activity-page cache bounds.
    pub fn with_activity(mut self, capacity: usize, ttl: Duration) -> Self {
        self.activity_capacity = capacity;
        self.activity_ttl = ttl;
        self
    }

    /// Set the stats cache bounds.
    pub fn with_stats(mut self, capacity: usize, ttl: Duration) -> Self {
        self.stats_capacity = capacity;
        self.stats_ttl = ttl;
        self
    }
}

/// The single long-lived store shared by every couples operation.
///
/// Constructed explicitly and passed to the service (no process-wide
/// singleton), so tests build a fresh instance per case.
pub struct CoupleCacheStore {
    /// Mutual-like sets keyed by household.
    pub mutual_likes: TtlLruCache<HouseholdId, Vec<MutualLike>>,
    /// Activity timeline pages keyed by (household, limit, offset).
    pub activity: TtlLruCache<ActivityPageKey, Vec<HouseholdActivity>>,
    /// Stats rollups keyed by household.
    pub stats: TtlLruCache<HouseholdId, CouplesStats>,
}

impl CoupleCacheStore {
    /// Build the store from a config.
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            mutual_likes: TtlLruCache::new(config.mutual_capacity, config.mutual_ttl),
            activity: TtlLruCache::new(config.activity_capacity, config.activity_ttl),
            stats: TtlLruCache::new(config.stats_capacity, config.stats_ttl),
        }
    }

    /// Build the store with default bounds.
    pub fn with_defaults() -> Self {
        Self::new(&CacheConfig::default())
    }

    /// Remove every cached view for a household: its mutual-like set, all
    /// of its activity pages, and its stats. A no-op when nothing is
    /// cached for the household.
    pub fn invalidate_household(&self, household_id: HouseholdId) {
        self.mutual_likes.remove(&household_id);
        let pages = self
            .activity
            .remove_matching(|key| key.household_id == household_id);
        self.stats.remove(&household_id);
        tracing::debug!(%household_id, pages, "invalidated household caches");
    }

    /// Snapshot hit/miss counters for all three caches.
    pub fn stats_snapshot(&self) -> (CacheStats, CacheStats, CacheStats) {
        (
            self.mutual_likes.stats(),
            self.activity.stats(),
            self.stats.stats(),
        )
    }
}
