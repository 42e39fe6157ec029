//! Typed cache for book listings, records and statistics

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::CacheConfig;
use crate::library::{Book, BookStats};

use super::store::CacheStore;

pub const ALL_BOOKS_KEY: &str = "books:all";
pub const STATS_KEY: &str = "books:stats";

pub fn book_key(id: i64) -> String {
    format!("book:{}", id)
}

/// Time-to-live for each kind of entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtls {
    pub books: Duration,
    pub empty_book: Duration,
    pub stats: Duration,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self::from(&CacheConfig::default())
    }
}

impl From<&CacheConfig> for CacheTtls {
    fn from(config: &CacheConfig) -> Self {
        Self {
            books: config.books_ttl(),
            empty_book: config.empty_book_ttl(),
            stats: config.stats_ttl(),
        }
    }
}

/// Result of a per-book lookup
#[derive(Debug, Clone, PartialEq)]
pub enum CachedBook {
    Hit(Book),
    /// The id is known not to exist
    Absent,
    Miss,
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "state", content = "book", rename_all = "lowercase")]
enum BookEntry {
    Present(Book),
    Absent,
}

/// Book cache over a byte store, values encoded as JSON
#[derive(Clone)]
pub struct BookCache {
    store: Arc<dyn CacheStore>,
    ttls: CacheTtls,
}

impl BookCache {
    pub fn new(store: Arc<dyn CacheStore>, ttls: CacheTtls) -> Self {
        Self { store, ttls }
    }

    pub async fn cache_all_books(&self, books: &[Book]) {
        self.put(ALL_BOOKS_KEY, books, self.ttls.books).await;
    }

    pub async fn get_all_books_from_cache(&self) -> Option<Vec<Book>> {
        self.fetch(ALL_BOOKS_KEY).await
    }

    pub async fn cache_book(&self, book: &Book) {
        let entry = BookEntry::Present(book.clone());
        self.put(&book_key(book.id), &entry, self.ttls.books).await;
    }

    /// Remember that `id` does not exist
    pub async fn cache_empty_book(&self, id: i64) {
        self.put(&book_key(id), &BookEntry::Absent, self.ttls.empty_book)
            .await;
    }

    pub async fn get_book_from_cache(&self, id: i64) -> CachedBook {
        match self.fetch::<BookEntry>(&book_key(id)).await {
            Some(BookEntry::Present(book)) => CachedBook::Hit(book),
            Some(BookEntry::Absent) => CachedBook::Absent,
            None => CachedBook::Miss,
        }
    }

    pub async fn cache_stats(&self, stats: &BookStats) {
        self.put(STATS_KEY, stats, self.ttls.stats).await;
    }

    pub async fn get_stats_from_cache(&self) -> Option<BookStats> {
        self.fetch(STATS_KEY).await
    }

    pub async fn clear_all_books_cache(&self) {
        self.store.delete(ALL_BOOKS_KEY).await;
    }

    pub async fn clear_book_cache(&self, id: i64) {
        self.store.delete(&book_key(id)).await;
    }

    pub async fn clear_stats_cache(&self) {
        self.store.delete(STATS_KEY).await;
    }

    async fn put<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Duration) {
        match serde_json::to_vec(value) {
            Ok(bytes) => self.store.set(key, bytes, ttl).await,
            Err(e) => tracing::warn!(key, "Failed to encode cache entry: {}", e),
        }
    }

    async fn fetch<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let bytes = self.store.get(key).await?;
        match serde_json::from_slice(&bytes) {
            Ok(value) => {
                tracing::debug!(key, "Cache hit");
                Some(value)
            }
            Err(e) => {
                tracing::warn!(key, "Discarding corrupt cache entry: {}", e);
                self.store.delete(key).await;
                None
            }
        }
    }
}
