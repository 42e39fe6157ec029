//! Upload types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::epub::ExtractedMetadata;
use crate::storage::StorageError;

/// Multipart field carrying the EPUB
pub const FILE_FIELD: &str = "file";

/// Response after a successful upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    /// Stored name of the EPUB, relative to the upload root
    pub file_name: String,

    pub metadata: ExtractedMetadata,

    /// Same as `metadata.cover_image_path`
    pub cover_image_path: String,
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("No file provided. Use field name '{}'", FILE_FIELD)]
    MissingFile,

    #[error("Failed to read upload: {0}")]
    InvalidMultipart(String),

    #[error("File too large (max: {max} bytes)")]
    FileTooLarge { max: usize },

    #[error("Failed to store upload: {0}")]
    Storage(#[from] StorageError),
}

impl UploadError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingFile => StatusCode::BAD_REQUEST,
            Self::InvalidMultipart(_) => StatusCode::BAD_REQUEST,
            Self::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingFile => "MISSING_FILE",
            Self::InvalidMultipart(_) => "INVALID_MULTIPART",
            Self::FileTooLarge { .. } => "FILE_TOO_LARGE",
            Self::Storage(_) => "UPLOAD_FAILED",
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: &'static str,
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Upload failed: {}", self);
        } else {
            tracing::warn!("Rejected upload: {}", self);
        }

        let body = ErrorResponse {
            error: self.to_string(),
            code: self.code(),
        };

        (status, Json(body)).into_response()
    }
}
