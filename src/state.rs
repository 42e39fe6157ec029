//! Application state management

use std::sync::Arc;

use crate::cache::{BookCache, CacheStore, CacheTtls};
use crate::config::Config;
use crate::db::BookRepository;
use crate::epub::MetadataExtractor;
use crate::library::BookService;
use crate::storage::FileStorage;
use crate::upload::UploadPipeline;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    books: BookService,
    upload_pipeline: UploadPipeline,
    uploads: Arc<dyn FileStorage>,
    covers: Arc<dyn FileStorage>,
}

impl AppState {
    /// Wire services together from their backends
    pub fn new(
        config: Config,
        repository: Arc<dyn BookRepository>,
        cache_store: Arc<dyn CacheStore>,
        uploads: Arc<dyn FileStorage>,
        covers: Arc<dyn FileStorage>,
    ) -> Self {
        let cache = BookCache::new(cache_store, CacheTtls::from(&config.cache));
        let books = BookService::new(repository, cache)
            .with_stats_invalidation(config.cache.invalidate_stats_on_write);
        let upload_pipeline =
            UploadPipeline::new(uploads.clone(), MetadataExtractor::new(covers.clone()));

        Self {
            inner: Arc::new(AppStateInner {
                config,
                books,
                upload_pipeline,
                uploads,
                covers,
            }),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the book service
    pub fn books(&self) -> &BookService {
        &self.inner.books
    }

    /// Get the upload pipeline
    pub fn upload_pipeline(&self) -> &UploadPipeline {
        &self.inner.upload_pipeline
    }

    /// Storage for uploaded EPUB files
    pub fn uploads(&self) -> &Arc<dyn FileStorage> {
        &self.inner.uploads
    }

    /// Storage for extracted cover images
    pub fn covers(&self) -> &Arc<dyn FileStorage> {
        &self.inner.covers
    }
}
