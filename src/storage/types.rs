//! Storage types

use thiserror::Error;

/// A stored file with its data
#[derive(Debug)]
pub struct StoredFile {
    /// Path relative to the storage root
    pub name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Storage-specific errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid file path: {0}")]
    InvalidPath(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
