//! File serving routes
//!
//! Serves uploaded EPUBs and extracted covers from local storage.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::Response,
    routing::get,
    Router,
};

use crate::error::{AppError, Result};
use crate::state::AppState;
use crate::storage::FileStorage;

const COVER_CACHE_CONTROL: &str = "public, max-age=86400";
const UPLOAD_CACHE_CONTROL: &str = "no-cache";

/// Create the files router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/uploads/*name", get(serve_upload))
        .route("/covers/*name", get(serve_cover))
}

async fn serve_upload(State(state): State<AppState>, Path(name): Path<String>) -> Result<Response> {
    serve_file(state.uploads(), &name, UPLOAD_CACHE_CONTROL).await
}

async fn serve_cover(State(state): State<AppState>, Path(name): Path<String>) -> Result<Response> {
    serve_file(state.covers(), &name, COVER_CACHE_CONTROL).await
}

async fn serve_file(
    storage: &Arc<dyn FileStorage>,
    name: &str,
    cache_control: &'static str,
) -> Result<Response> {
    let name = decode_name(name);
    let file = storage.get(&name).await?;

    let filename = file.name.rsplit('/').next().unwrap_or(&file.name).replace('"', "");

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, file.content_type)
        .header(header::CONTENT_LENGTH, file.data.len())
        .header(
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"{}\"", filename),
        )
        .header(header::CACHE_CONTROL, cache_control)
        .body(Body::from(file.data))
        .map_err(|e| AppError::Internal(e.to_string()))
}

/// Decode a name the router already decoded once.
///
/// Some clients encode names twice; containment is enforced by the store.
fn decode_name(name: &str) -> String {
    urlencoding::decode(name)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| name.to_string())
}
