//! Cache layer
//!
//! Cache-aside storage for book listings, single records and statistics.
//! Entries expire after a per-kind TTL; writers invalidate explicitly.

mod books;
mod store;

pub use books::{book_key, BookCache, CacheTtls, CachedBook, ALL_BOOKS_KEY, STATS_KEY};
pub use store::{CacheStore, MemoryCacheStore, DEFAULT_MAX_ENTRIES};
