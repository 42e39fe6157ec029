//! Book query and mutation service
//!
//! Reads go through the cache first and fall back to the repository; writes
//! go to the repository and then invalidate the affected entries.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;

use crate::cache::{BookCache, CachedBook};
use crate::db::BookRepository;
use crate::error::{AppError, Result};

use super::book::{
    resolve_cover_path, Book, BookCategory, BookFilter, BookStats, BookUpdate, CategoryCount,
    NewBook,
};

#[derive(Clone)]
pub struct BookService {
    repository: Arc<dyn BookRepository>,
    cache: BookCache,
    invalidate_stats_on_write: bool,
}

impl BookService {
    pub fn new(repository: Arc<dyn BookRepository>, cache: BookCache) -> Self {
        Self {
            repository,
            cache,
            invalidate_stats_on_write: false,
        }
    }

    /// Also drop the statistics snapshot after every successful mutation
    pub fn with_stats_invalidation(mut self, enabled: bool) -> Self {
        self.invalidate_stats_on_write = enabled;
        self
    }

    pub fn cache(&self) -> &BookCache {
        &self.cache
    }

    /// List books. Only the unfiltered listing is cached.
    pub async fn list(&self, filter: &BookFilter) -> Result<Vec<Book>> {
        if !filter.is_empty() {
            tracing::debug!(?filter, "Filtered listing, bypassing cache");
            return self.repository.list(filter).await;
        }

        if let Some(books) = self.cache.get_all_books_from_cache().await {
            return Ok(books);
        }

        let books = self.repository.list(filter).await?;
        self.cache.cache_all_books(&books).await;
        Ok(books)
    }

    pub async fn get(&self, id: i64) -> Result<Book> {
        match self.cache.get_book_from_cache(id).await {
            CachedBook::Hit(book) => return Ok(book),
            CachedBook::Absent => return Err(AppError::book_not_found(id)),
            CachedBook::Miss => {}
        }

        match self.repository.get(id).await? {
            Some(book) => {
                self.cache.cache_book(&book).await;
                Ok(book)
            }
            None => {
                self.cache.cache_empty_book(id).await;
                Err(AppError::book_not_found(id))
            }
        }
    }

    pub async fn add(&self, new_book: NewBook) -> Result<Book> {
        let book = Book {
            id: 0,
            title: new_book.title,
            author: new_book.author,
            description: new_book.description,
            category: new_book.category,
            cover_image_path: Some(resolve_cover_path(
                new_book.cover_image_path,
                new_book.cover_url.as_deref(),
            )),
            epub_file_name: new_book.epub_file_name,
            upload_user_id: new_book.upload_user_id,
            upload_time: Some(Utc::now()),
        };

        let stored = self.repository.insert(&book).await?;
        tracing::info!(book_id = stored.id, title = %stored.title, "Book added");

        self.invalidate(stored.id).await;
        Ok(stored)
    }

    pub async fn update(&self, update: BookUpdate) -> Result<Book> {
        let existing = self
            .repository
            .get(update.id)
            .await?
            .ok_or_else(|| AppError::book_not_found(update.id))?;

        let book = Book {
            id: existing.id,
            title: update.title,
            author: update.author,
            description: update.description,
            category: update.category,
            cover_image_path: Some(resolve_cover_path(
                update.cover_image_path,
                update.cover_url.as_deref(),
            )),
            epub_file_name: update.epub_file_name,
            upload_user_id: update.upload_user_id,
            upload_time: existing.upload_time,
        };

        let stored = self
            .repository
            .update(&book)
            .await?
            .ok_or_else(|| AppError::book_not_found(book.id))?;
        tracing::info!(book_id = stored.id, "Book updated");

        self.invalidate(stored.id).await;
        Ok(stored)
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        if self.repository.get(id).await?.is_none() {
            return Err(AppError::book_not_found(id));
        }

        if !self.repository.delete(id).await? {
            return Err(AppError::book_not_found(id));
        }
        tracing::info!(book_id = id, "Book deleted");

        self.invalidate(id).await;
        Ok(())
    }

    pub async fn statistics(&self) -> Result<BookStats> {
        if let Some(stats) = self.cache.get_stats_from_cache().await {
            return Ok(stats);
        }

        let total = self.repository.count_total().await?;

        // Several codes can share a label ("Other")
        let mut by_label: BTreeMap<&'static str, i64> = BTreeMap::new();
        for (code, count) in self.repository.count_by_category().await? {
            *by_label
                .entry(BookCategory::label_for_code(code.as_deref()))
                .or_default() += count;
        }

        let categories = BookCategory::ALL
            .iter()
            .filter_map(|c| {
                by_label.get(c.label()).map(|count| CategoryCount {
                    name: c.label().to_string(),
                    count: *count,
                })
            })
            .collect();

        let stats = BookStats { total, categories };
        self.cache.cache_stats(&stats).await;
        Ok(stats)
    }

    async fn invalidate(&self, id: i64) {
        self.cache.clear_book_cache(id).await;
        self.cache.clear_all_books_cache().await;
        if self.invalidate_stats_on_write {
            self.cache.clear_stats_cache().await;
        }
    }
}
