//! Book API endpoints
//!
//! - `GET /getall` list books, optionally filtered by title, author, category
//! - `GET /getbook` fetch one book
//! - `POST /addbook` create a book
//! - `PUT /upbook` replace a book
//! - `DELETE /delebook` delete a book
//! - `GET /statistics` per-category counts

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::library::{Book, BookFilter, BookStats, BookUpdate, NewBook};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub title: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct IdQuery {
    pub id: Option<String>,
}

impl IdQuery {
    fn parse(&self) -> Result<i64> {
        let raw = self
            .id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| AppError::BadRequest("Missing query parameter 'id'".to_string()))?;

        raw.parse()
            .map_err(|_| AppError::BadRequest(format!("Invalid book id: {}", raw)))
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/getall", get(list_books))
        .route("/getbook", get(get_book))
        .route("/addbook", post(add_book))
        .route("/upbook", put(update_book))
        .route("/delebook", delete(delete_book))
        .route("/statistics", get(statistics))
}

async fn list_books(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Book>>> {
    let filter = BookFilter::from_params(
        query.title.as_deref(),
        query.author.as_deref(),
        query.category.as_deref(),
    )
    .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let books = state.books().list(&filter).await?;
    Ok(Json(books))
}

async fn get_book(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> Result<Json<Book>> {
    let book = state.books().get(query.parse()?).await?;
    Ok(Json(book))
}

async fn add_book(
    State(state): State<AppState>,
    Json(new_book): Json<NewBook>,
) -> Result<Json<Book>> {
    if new_book.title.trim().is_empty() {
        return Err(AppError::BadRequest("Book title is required".to_string()));
    }

    let book = state.books().add(new_book).await?;
    Ok(Json(book))
}

async fn update_book(
    State(state): State<AppState>,
    Json(update): Json<BookUpdate>,
) -> Result<Json<Book>> {
    if update.title.trim().is_empty() {
        return Err(AppError::BadRequest("Book title is required".to_string()));
    }

    let book = state.books().update(update).await?;
    Ok(Json(book))
}

async fn delete_book(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> Result<StatusCode> {
    state.books().delete(query.parse()?).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn statistics(State(state): State<AppState>) -> Result<Json<BookStats>> {
    let stats = state.books().statistics().await?;
    Ok(Json(stats))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_query_parse() {
        let query = |id: Option<&str>| IdQuery {
            id: id.map(str::to_string),
        };

        assert_eq!(query(Some(" 12 ")).parse().unwrap(), 12);
        assert!(matches!(query(None).parse(), Err(AppError::BadRequest(_))));
        assert!(matches!(query(Some("")).parse(), Err(AppError::BadRequest(_))));
        assert!(matches!(query(Some("abc")).parse(), Err(AppError::BadRequest(_))));
    }
}
