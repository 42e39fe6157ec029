//! Upload endpoint
//!
//! `POST /upload` takes a multipart body with the EPUB in the `file` field.

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};

use crate::state::AppState;
use crate::upload::{UploadError, UploadResponse, FILE_FIELD};

pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/upload", post(upload_book))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}

async fn upload_book(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, UploadError> {
    let max = state.config().storage.max_upload_bytes;
    let multipart_error = |e: axum::extract::multipart::MultipartError| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            UploadError::FileTooLarge { max }
        } else {
            UploadError::InvalidMultipart(e.body_text())
        }
    };

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            tracing::debug!(field = ?field.name(), "Skipping multipart field");
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let data = field.bytes().await.map_err(multipart_error)?;
        tracing::debug!(file = ?file_name, size = data.len(), "Received upload");

        let response = state
            .upload_pipeline()
            .process(file_name.as_deref(), data.to_vec())
            .await?;

        return Ok(Json(response));
    }

    Err(UploadError::MissingFile)
}
