//! Book database operations

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::error::{AppError, Result};
use crate::library::{Book, BookCategory, BookFilter};

/// Persistence boundary for book records
#[async_trait::async_trait]
pub trait BookRepository: Send + Sync {
    /// List books matching every criterion of `filter`, ordered by id
    async fn list(&self, filter: &BookFilter) -> Result<Vec<Book>>;

    async fn get(&self, id: i64) -> Result<Option<Book>>;

    /// Insert a book, ignoring its `id`, and return the stored record
    async fn insert(&self, book: &Book) -> Result<Book>;

    /// Replace every field except `upload_time`. `None` if the id is unknown.
    async fn update(&self, book: &Book) -> Result<Option<Book>>;

    /// Returns whether a row was deleted
    async fn delete(&self, id: i64) -> Result<bool>;

    async fn count_total(&self) -> Result<i64>;

    /// Book counts per stored category code (`None` for uncategorized)
    async fn count_by_category(&self) -> Result<Vec<(Option<String>, i64)>>;
}

/// Raw row; the category is kept as text so unknown codes don't fail a read
#[derive(Debug, sqlx::FromRow)]
struct BookRow {
    id: i64,
    title: String,
    author: Option<String>,
    description: Option<String>,
    category: Option<String>,
    cover_image_path: Option<String>,
    epub_file_name: Option<String>,
    upload_user_id: Option<i64>,
    upload_time: Option<String>,
}

impl From<BookRow> for Book {
    fn from(row: BookRow) -> Self {
        let category = row.category.as_deref().and_then(|code| {
            code.parse::<BookCategory>()
                .map_err(|e| tracing::debug!(book_id = row.id, "{}", e))
                .ok()
        });
        let upload_time = row.upload_time.as_deref().and_then(|t| {
            DateTime::parse_from_rfc3339(t)
                .map(|dt| dt.with_timezone(&Utc))
                .ok()
        });

        Book {
            id: row.id,
            title: row.title,
            author: row.author,
            description: row.description,
            category,
            cover_image_path: row.cover_image_path,
            epub_file_name: row.epub_file_name,
            upload_user_id: row.upload_user_id,
            upload_time,
        }
    }
}

const SELECT_BOOKS: &str = r#"
    SELECT id, title, author, description, category, cover_image_path,
           epub_file_name, upload_user_id, upload_time
    FROM books
"#;

/// SQLite-backed book repository
#[derive(Clone)]
pub struct SqliteBookRepository {
    pool: SqlitePool,
}

impl SqliteBookRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl BookRepository for SqliteBookRepository {
    async fn list(&self, filter: &BookFilter) -> Result<Vec<Book>> {
        let mut query = SELECT_BOOKS.to_string();
        if filter.category.is_some() {
            query.push_str(" WHERE category = ?");
        }
        query.push_str(" ORDER BY id ASC");

        let mut sql_query = sqlx::query_as::<_, BookRow>(&query);
        if let Some(category) = filter.category {
            sql_query = sql_query.bind(category.code());
        }
        let rows = sql_query.fetch_all(&self.pool).await?;

        // SQLite's LOWER() only folds ASCII, so text terms are matched here
        let title = filter.title.as_deref().map(str::to_lowercase);
        let author = filter.author.as_deref().map(str::to_lowercase);

        Ok(rows
            .into_iter()
            .map(Book::from)
            .filter(|book| matches_term(Some(&book.title), title.as_deref()))
            .filter(|book| matches_term(book.author.as_deref(), author.as_deref()))
            .collect())
    }

    async fn get(&self, id: i64) -> Result<Option<Book>> {
        let query = format!("{} WHERE id = ?", SELECT_BOOKS);
        let row = sqlx::query_as::<_, BookRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Book::from))
    }

    async fn insert(&self, book: &Book) -> Result<Book> {
        let result = sqlx::query(
            r#"
            INSERT INTO books (title, author, description, category, cover_image_path,
                               epub_file_name, upload_user_id, upload_time)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.description)
        .bind(book.category.map(|c| c.code()))
        .bind(&book.cover_image_path)
        .bind(&book.epub_file_name)
        .bind(book.upload_user_id)
        .bind(book.upload_time.map(|t| t.to_rfc3339()))
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        self.get(id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("Failed to fetch created book {}", id)))
    }

    async fn update(&self, book: &Book) -> Result<Option<Book>> {
        let result = sqlx::query(
            r#"
            UPDATE books
            SET title = ?, author = ?, description = ?, category = ?,
                cover_image_path = ?, epub_file_name = ?, upload_user_id = ?
            WHERE id = ?
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.description)
        .bind(book.category.map(|c| c.code()))
        .bind(&book.cover_image_path)
        .bind(&book.epub_file_name)
        .bind(book.upload_user_id)
        .bind(book.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get(book.id).await
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM books WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_total(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn count_by_category(&self) -> Result<Vec<(Option<String>, i64)>> {
        let rows: Vec<(Option<String>, i64)> = sqlx::query_as(
            r#"
            SELECT category, COUNT(*)
            FROM books
            GROUP BY category
            ORDER BY category
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

/// Case-insensitive substring match; `term` is already lower-cased
fn matches_term(value: Option<&str>, term: Option<&str>) -> bool {
    match term {
        None => true,
        Some(term) => value.is_some_and(|v| v.to_lowercase().contains(term)),
    }
}
