//! Bounded LRU cache with per-entry TTL.
//!
//! Entries expire `ttl` after insertion and are evicted lazily on the next
//! lookup; capacity overflow evicts the least recently used entry. All
//! operations take the interior lock, so the cache is shareable behind an
//! `Arc` without external synchronization.

use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use lru::LruCache;

/// Hit/miss counters for one cache, snapshot at read time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

struct Entry<V> {
    value: V,
    inserted: Instant,
}

/// A bounded least-recently-used cache whose entries expire after a fixed
/// time-to-live.
pub struct TtlLruCache<K: Hash + Eq, V: Clone> {
    entries: Mutex<LruCache<K, Entry<V>>>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<K: Hash + Eq, V: Clone> TtlLruCache<K, V> {
    /// Create a cache holding at most `capacity` entries, each valid for
    /// `ttl` after insertion. A zero capacity is rounded up to one.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1))
            .unwrap_or_else(|| unreachable!("capacity clamped to at least 1"));
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Look up a key, treating expired entries as misses (and evicting
    /// them). A hit refreshes the entry's LRU position but not its TTL.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut entries = self.lock();
        match entries.get(key) {
            Some(entry) if entry.inserted.elapsed() <= self.ttl => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(entry.value.clone())
            }
            Some(_) => {
                entries.pop(key);
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Insert or replace a value, resetting its TTL.
    pub fn put(&self, key: K, value: V) {
        self.lock().put(
            key,
            Entry {
                value,
                inserted: Instant::now(),
            },
        );
    }

    /// Remove a single key. Returns true if an entry was present.
    pub fn remove(&self, key: &K) -> bool {
        self.lock().pop(key).is_some()
    }

    /// Remove every entry whose key matches the predicate. Returns the
    /// number of entries removed. Safe to call when nothing matches.
    pub fn remove_matching(&self, predicate: impl Fn(&K) -> bool) -> usize
    where
        K: Clone,
    {
        let mut entries = self.lock();
        let doomed: Vec<K> = entries
            .iter()
            .filter(|(key, _)| predicate(key))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &doomed {
            entries.pop(key);
        }
        doomed.len()
    }

    /// Drop all entries.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of entries currently stored, expired or not.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True when the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot the hit/miss counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<K, Entry<V>>> {
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn test_get_returns_inserted_value() {
        let cache: TtlLruCache<u32, String> = TtlLruCache::new(4, Duration::from_secs(60));
        cache.put(1, "one".to_string());
        assert_eq!(cache.get(&1), Some("one".to_string()));
        assert_eq!(cache.get(&2), None);
    }

    #[test]
    fn test_expired_entry_is_a_miss_and_evicted() {
        let cache: TtlLruCache<u32, u32> = TtlLruCache::new(4, Duration::from_millis(10));
        cache.put(1, 10);
        sleep(Duration::from_millis(25));
        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_capacity_evicts_least_recently_used() {
        let cache: TtlLruCache<u32, u32> = TtlLruCache::new(2, Duration::from_secs(60));
        cache.put(1, 10);
        cache.put(2, 20);
        // Touch 1 so 2 becomes the LRU entry.
        assert_eq!(cache.get(&1), Some(10));
        cache.put(3, 30);
        assert_eq!(cache.get(&2), None);
        assert_eq!(cache.get(&1), Some(10));
        assert_eq!(cache.get(&3), Some(30));
    }

    #[test]
    fn test_remove_matching_only_removes_matches() {
        let cache: TtlLruCache<(u32, u32), u32> = TtlLruCache::new(8, Duration::from_secs(60));
        cache.put((1, 0), 100);
        cache.put((1, 1), 101);
        cache.put((2, 0), 200);
        let removed = cache.remove_matching(|(household, _)| *household == 1);
        assert_eq!(removed, 2);
        assert_eq!(cache.get(&(1, 0)), None);
        assert_eq!(cache.get(&(1, 1)), None);
        assert_eq!(cache.get(&(2, 0)), Some(200));
    }

    #[test]
    fn test_remove_matching_on_empty_cache_is_noop() {
        let cache: TtlLruCache<u32, u32> = TtlLruCache::new(4, Duration::from_secs(60));
        assert_eq!(cache.remove_matching(|_| true), 0);
    }

    #[test]
    fn test_put_resets_ttl() {
        let cache: TtlLruCache<u32, u32> = TtlLruCache::new(4, Duration::from_millis(40));
        cache.put(1, 10);
        sleep(Duration::from_millis(25));
        cache.put(1, 11);
        sleep(Duration::from_millis(25));
        // 50ms after the first put but only 25ms after the second.
        assert_eq!(cache.get(&1), Some(11));
    }

    #[test]
    fn test_stats_track_hits_and_misses() {
        let cache: TtlLruCache<u32, u32> = TtlLruCache::new(4, Duration::from_secs(60));
        cache.put(1, 10);
        cache.get(&1);
        cache.get(&1);
        cache.get(&2);
        let stats = cache.stats();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
    }

    #[test]
    fn test_zero_capacity_rounds_up() {
        let cache: TtlLruCache<u32, u32> = TtlLruCache::new(0, Duration::from_secs(60));
        cache.put(1, 10);
        assert_eq!(cache.get(&1), Some(10));
    }
}
