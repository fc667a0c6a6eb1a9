//! In-process TTL cache.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::schema::DiscoveryRecord;

use super::{ResultCache, StoreError};

#[derive(Debug)]
struct Entry {
    record: DiscoveryRecord,
    expires_at: Instant,
}

/// Map size that triggers the first sweep of expired entries.
const SWEEP_THRESHOLD: usize = 1024;

#[derive(Debug)]
struct Entries {
    map: HashMap<String, Entry>,
    /// Size at which `set` sweeps next; doubles with the live set.
    sweep_at: usize,
}

impl Default for Entries {
    fn default() -> Self {
        Self {
            map: HashMap::new(),
            sweep_at: SWEEP_THRESHOLD,
        }
    }
}

impl Entries {
    fn sweep(&mut self, now: Instant) -> usize {
        let before = self.map.len();
        self.map.retain(|_, entry| entry.expires_at > now);
        self.sweep_at = (self.map.len() * 2).max(SWEEP_THRESHOLD);
        before - self.map.len()
    }
}

/// Fingerprint → record map with per-entry expiry.
///
/// Expired entries are dropped on lookup, and swept in bulk by `set` once
/// the map outgrows its watermark, so the map stays proportional to the
/// live entries.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<Entries>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, expired ones not yet swept included.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .map
            .len()
    }

    /// Drop every expired entry; returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .sweep(Instant::now())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ResultCache for MemoryCache {
    fn get(&self, fingerprint: &str) -> Result<Option<DiscoveryRecord>, StoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        match entries.map.get(fingerprint) {
            Some(entry) if entry.expires_at > Instant::now() => Ok(Some(entry.record.clone())),
            Some(_) => {
                entries.map.remove(fingerprint);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    fn set(
        &self,
        fingerprint: &str,
        record: &DiscoveryRecord,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let now = Instant::now();
        let expires_at = now
            .checked_add(ttl)
            .ok_or_else(|| StoreError::Unavailable(format!("ttl {ttl:?} out of range")))?;
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if entries.map.len() >= entries.sweep_at {
            let removed = entries.sweep(now);
            log::debug!("cache sweep dropped {removed} expired entries");
        }
        entries.map.insert(
            fingerprint.to_string(),
            Entry {
                record: record.clone(),
                expires_at,
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::history::tests::record;

    #[test]
    fn test_hit_and_miss() {
        let cache = MemoryCache::new();
        let r = record("mergesort", 0.8);
        assert!(cache.get("abc").unwrap().is_none());
        cache.set("abc", &r, Duration::from_secs(60)).unwrap();
        assert_eq!(cache.get("abc").unwrap(), Some(r));
        assert!(cache.get("abd").unwrap().is_none());
    }

    #[test]
    fn test_expiry() {
        let cache = MemoryCache::new();
        cache
            .set("abc", &record("heapsort", 0.5), Duration::ZERO)
            .unwrap();
        assert!(cache.get("abc").unwrap().is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_expired_entries_are_swept_on_set() {
        let cache = MemoryCache::new();
        let stale = record("bubble_sort", 0.1);
        for i in 0..10_000 {
            cache.set(&format!("stale-{i}"), &stale, Duration::ZERO).unwrap();
        }
        std::thread::sleep(Duration::from_millis(5));

        let fresh = record("quicksort", 0.9);
        cache.set("fresh", &fresh, Duration::from_secs(60)).unwrap();
        assert!(cache.len() <= SWEEP_THRESHOLD, "{} entries kept", cache.len());
        assert_eq!(cache.get("fresh").unwrap(), Some(fresh));

        cache.purge_expired();
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_sweep_keeps_live_entries() {
        let cache = MemoryCache::new();
        for i in 0..(SWEEP_THRESHOLD * 3) {
            cache
                .set(&format!("live-{i}"), &record("heapsort", 0.5), Duration::from_secs(60))
                .unwrap();
        }
        assert_eq!(cache.len(), SWEEP_THRESHOLD * 3);
        assert_eq!(cache.purge_expired(), 0);
    }
}
