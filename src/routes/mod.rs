//! Route modules for Bookshelf Server

pub mod auth;
pub mod books;
pub mod files;
pub mod health;
pub mod upload;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the full application router
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let max_upload_bytes = state.config().storage.max_upload_bytes;

    Router::new()
        .merge(health::router())
        .merge(books::router())
        .merge(upload::router(max_upload_bytes))
        .merge(files::router())
        .nest("/api/auth", auth::router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
