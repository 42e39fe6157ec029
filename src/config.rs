//! Configuration management for Bookshelf Server

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::DEFAULT_MAX_ENTRIES;

/// Default request body limit for uploads: 100MB
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Root directory for uploaded EPUB files
    pub upload_dir: PathBuf,
    /// Root directory for extracted cover images
    pub cover_dir: PathBuf,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub books_ttl_secs: u64,
    pub empty_book_ttl_secs: u64,
    pub stats_ttl_secs: u64,
    /// Clear the statistics snapshot on every successful mutation
    pub invalidate_stats_on_write: bool,
    /// Upper bound on in-process cache entries
    pub max_entries: usize,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub token: Option<String>,
    pub username: String,
}

impl CacheConfig {
    pub fn books_ttl(&self) -> Duration {
        Duration::from_secs(self.books_ttl_secs)
    }

    pub fn empty_book_ttl(&self) -> Duration {
        Duration::from_secs(self.empty_book_ttl_secs)
    }

    pub fn stats_ttl(&self) -> Duration {
        Duration::from_secs(self.stats_ttl_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            books_ttl_secs: 30 * 60,
            empty_book_ttl_secs: 5 * 60,
            stats_ttl_secs: 60 * 60,
            invalidate_stats_on_write: false,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            storage: StorageConfig {
                upload_dir: PathBuf::from("uploads"),
                cover_dir: PathBuf::from("covers"),
                max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            },
            database: DatabaseConfig {
                url: "sqlite:./bookshelf.db".to_string(),
                max_connections: 5,
            },
            cache: CacheConfig::default(),
            auth: AuthConfig {
                token: None,
                username: "admin".to_string(),
            },
        }
    }
}

impl Config {
    /// Build the configuration from environment variables, falling back to
    /// [`Config::default`] for anything unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = Config::default();

        Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or(defaults.server.host),
                port: parse_var("SERVER_PORT", defaults.server.port),
            },
            storage: StorageConfig {
                upload_dir: env::var("UPLOAD_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.storage.upload_dir),
                cover_dir: env::var("COVER_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.storage.cover_dir),
                max_upload_bytes: parse_var("MAX_UPLOAD_BYTES", defaults.storage.max_upload_bytes),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or(defaults.database.url),
                max_connections: parse_var(
                    "DATABASE_MAX_CONNECTIONS",
                    defaults.database.max_connections,
                ),
            },
            cache: CacheConfig {
                books_ttl_secs: parse_var("CACHE_BOOKS_TTL_SECS", defaults.cache.books_ttl_secs),
                empty_book_ttl_secs: parse_var(
                    "CACHE_EMPTY_BOOK_TTL_SECS",
                    defaults.cache.empty_book_ttl_secs,
                ),
                stats_ttl_secs: parse_var("CACHE_STATS_TTL_SECS", defaults.cache.stats_ttl_secs),
                invalidate_stats_on_write: parse_var(
                    "CACHE_INVALIDATE_STATS_ON_WRITE",
                    defaults.cache.invalidate_stats_on_write,
                ),
                max_entries: parse_var("CACHE_MAX_ENTRIES", defaults.cache.max_entries),
            },
            auth: AuthConfig {
                token: env::var("AUTH_TOKEN").ok().filter(|t| !t.trim().is_empty()),
                username: env::var("AUTH_USERNAME").unwrap_or(defaults.auth.username),
            },
        }
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring invalid value for {}: {:?}", name, raw);
            default
        }),
        Err(_) => default,
    }
}
