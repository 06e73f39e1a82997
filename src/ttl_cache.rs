use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

pub const DEFAULT_TTL_SECS: u64 = 60;

/// Small in-memory body cache with a fixed time-to-live, handed to the
/// fixture client rather than living as module state. Expired entries are
/// evicted lazily on lookup.
pub struct TtlCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

struct CacheEntry {
    stored_at: Instant,
    body: String,
}

impl TtlCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_default_ttl() -> Self {
        Self::new(Duration::from_secs(DEFAULT_TTL_SECS))
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let mut entries = self.entries.lock().expect("fixture cache lock poisoned");
        match entries.get(key) {
            Some(entry) if entry.stored_at.elapsed() <= self.ttl => Some(entry.body.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn put(&self, key: &str, body: String) {
        let mut entries = self.entries.lock().expect("fixture cache lock poisoned");
        entries.insert(
            key.to_string(),
            CacheEntry {
                stored_at: Instant::now(),
                body,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_entries_are_returned() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.put("k", "body".to_string());
        assert_eq!(cache.get("k").as_deref(), Some("body"));
        assert!(cache.get("other").is_none());
    }

    #[test]
    fn expired_entries_are_evicted() {
        let cache = TtlCache::new(Duration::from_millis(10));
        cache.put("k", "body".to_string());
        std::thread::sleep(Duration::from_millis(25));
        assert!(cache.get("k").is_none());
    }

    #[test]
    fn put_replaces_the_previous_body() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.put("k", "old".to_string());
        cache.put("k", "new".to_string());
        assert_eq!(cache.get("k").as_deref(), Some("new"));
    }
}
