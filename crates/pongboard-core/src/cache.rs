// In-memory TTL cache of parsed CSV payloads, keyed by source URL.
//
// Entries expire on read once `ttl` has elapsed; there is no background sweep.
// Concurrent fetches of the same URL may race on `put` and the last write
// wins. The cache is never invalidated on fetch failure.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::clock::Clock;
use crate::rows::CsvRow;
use crate::source::CsvSnapshot;

/// Default entry lifetime: five minutes.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone)]
struct CacheEntry {
    snapshot: CsvSnapshot,
    stored_at: Instant,
}

/// URL-keyed store of `{rows, last_modified}` pairs with a fixed lifetime.
pub struct TtlCache {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl TtlCache {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Stored snapshot for `url`, if one exists and is younger than the TTL.
    /// An expired entry is dropped as a side effect of the lookup.
    pub fn get(&self, url: &str) -> Option<CsvSnapshot> {
        let now = self.clock.now();
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);

        let entry = entries.get(url)?;
        if now.saturating_duration_since(entry.stored_at) < self.ttl {
            debug!(url, rows = entry.snapshot.rows.len(), "cache hit");
            return Some(entry.snapshot.clone());
        }

        debug!(url, "cache entry expired");
        entries.remove(url);
        None
    }

    /// Store `rows` for `url`, replacing any previous entry and restarting
    /// its lifetime.
    pub fn put(
        &self,
        url: &str,
        rows: Arc<[CsvRow]>,
        last_modified: Option<DateTime<Utc>>,
    ) -> CsvSnapshot {
        let snapshot = CsvSnapshot {
            rows,
            last_modified,
        };
        let entry = CacheEntry {
            snapshot: snapshot.clone(),
            stored_at: self.clock.now(),
        };
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(url.to_string(), entry);
        snapshot
    }

    /// Number of entries currently held, expired or not.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::TimeZone;

    fn rows(body: &str) -> Arc<[CsvRow]> {
        crate::rows::parse_csv(body.as_bytes()).unwrap().into()
    }

    fn cache_with_clock() -> (TtlCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let cache = TtlCache::new(DEFAULT_TTL, clock.clone());
        (cache, clock)
    }

    // -- Hits and misses --

    #[test]
    fn miss_when_nothing_stored() {
        let (cache, _) = cache_with_clock();
        assert!(cache.get("http://club/a.csv").is_none());
    }

    #[test]
    fn hit_within_ttl_returns_same_rows() {
        let (cache, clock) = cache_with_clock();
        let modified = Utc.with_ymd_and_hms(2026, 1, 27, 14, 30, 0).unwrap();
        cache.put("u", rows("a\n1\n2\n"), Some(modified));

        clock.advance(Duration::from_secs(60));
        let first = cache.get("u").unwrap();
        clock.advance(Duration::from_secs(60));
        let second = cache.get("u").unwrap();

        assert!(Arc::ptr_eq(&first.rows, &second.rows));
        assert_eq!(first.rows.len(), 2);
        assert_eq!(second.last_modified, Some(modified));
    }

    #[test]
    fn entries_are_keyed_by_url() {
        let (cache, _) = cache_with_clock();
        cache.put("a", rows("x\n1\n"), None);
        assert!(cache.get("b").is_none());
        assert!(cache.get("a").is_some());
    }

    // -- Expiry --

    #[test]
    fn miss_after_ttl_elapses() {
        let (cache, clock) = cache_with_clock();
        cache.put("u", rows("a\n1\n"), None);

        clock.advance(DEFAULT_TTL - Duration::from_millis(1));
        assert!(cache.get("u").is_some());

        clock.advance(Duration::from_millis(1));
        assert!(cache.get("u").is_none());
    }

    #[test]
    fn expired_entry_is_dropped_on_read() {
        let (cache, clock) = cache_with_clock();
        cache.put("u", rows("a\n1\n"), None);
        clock.advance(DEFAULT_TTL);

        assert_eq!(cache.len(), 1);
        assert!(cache.get("u").is_none());
        assert!(cache.is_empty());
    }

    // -- Overwrite --

    #[test]
    fn put_overwrites_and_restarts_lifetime() {
        let (cache, clock) = cache_with_clock();
        cache.put("u", rows("a\n1\n"), None);
        clock.advance(Duration::from_secs(200));
        cache.put("u", rows("a\n1\n2\n3\n"), None);
        clock.advance(Duration::from_secs(200));

        let hit = cache.get("u").unwrap();
        assert_eq!(hit.rows.len(), 3);
    }
}
