//! Key-value stores with per-key expiry

use std::num::NonZeroUsize;
use std::time::Duration;

use lru::LruCache;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Default bound on the number of in-process cache entries
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

/// Byte-oriented cache backend
#[async_trait::async_trait]
pub trait CacheStore: Send + Sync {
    /// Fetch a live value; expired entries read as absent
    async fn get(&self, key: &str) -> Option<Vec<u8>>;

    /// Store a value that expires after `ttl`
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration);

    /// Remove a value, returning whether one was present
    async fn delete(&self, key: &str) -> bool;
}

#[derive(Debug)]
struct Entry {
    value: Vec<u8>,
    expires_at: Instant,
}

/// In-process cache shared by all request tasks.
///
/// Bounded with LRU eviction. Expiry is lazy: an entry is dropped when read
/// after its deadline, and a full store sweeps expired entries before it
/// evicts a live one.
pub struct MemoryCacheStore {
    entries: Mutex<LruCache<String, Entry>>,
}

impl Default for MemoryCacheStore {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MAX_ENTRIES)
    }
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding at most `max_entries` keys (at least one)
    pub fn with_capacity(max_entries: usize) -> Self {
        let capacity = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Number of stored entries, including expired ones not yet evicted
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

fn purge_expired(entries: &mut LruCache<String, Entry>, now: Instant) {
    let expired: Vec<String> = entries
        .iter()
        .filter(|(_, entry)| entry.expires_at <= now)
        .map(|(key, _)| key.clone())
        .collect();

    for key in &expired {
        entries.pop(key.as_str());
    }
    if !expired.is_empty() {
        tracing::debug!(count = expired.len(), "Purged expired cache entries");
    }
}

#[async_trait::async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> Option<Vec<u8>> {
        let mut entries = self.entries.lock().await;
        let expired = match entries.get(key) {
            Some(entry) if Instant::now() < entry.expires_at => return Some(entry.value.clone()),
            Some(_) => true,
            None => false,
        };

        if expired {
            entries.pop(key);
        }
        None
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        if entries.len() == entries.cap().get() && !entries.contains(key) {
            purge_expired(&mut entries, now);
        }

        entries.put(
            key.to_string(),
            Entry {
                value,
                expires_at: now + ttl,
            },
        );
    }

    async fn delete(&self, key: &str) -> bool {
        self.entries.lock().await.pop(key).is_some()
    }
}
