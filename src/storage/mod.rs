//! File storage for uploaded EPUBs and extracted covers
//!
//! Two independent roots are used: one for original uploads, one for cover
//! images. Both are plain directories on the local filesystem.

mod local;
mod types;

pub use local::LocalFileStorage;
pub use types::*;

use uuid::Uuid;

/// Trait for file storage backends
#[async_trait::async_trait]
pub trait FileStorage: Send + Sync {
    /// Create the storage root if it does not exist yet
    async fn ensure_root(&self) -> Result<(), StorageError>;

    /// Write a new file and return its path relative to the root
    async fn put(&self, name: &str, data: &[u8]) -> Result<String, StorageError>;

    /// Read a stored file by its relative path
    async fn get(&self, name: &str) -> Result<StoredFile, StorageError>;
}

/// Generate a collision-free name for an uploaded file.
///
/// The original name is reduced to its final path component.
pub fn upload_file_name(original: Option<&str>) -> String {
    format!("{}_{}", Uuid::new_v4(), sanitize_file_name(original))
}

/// Generate a name for an extracted cover image
pub fn cover_file_name(media_type: &str) -> String {
    format!("cover_{}{}", Uuid::new_v4(), image_extension(media_type))
}

/// File extension for a cover image media type. Only PNG is kept distinct;
/// everything else is stored as `.jpg`.
pub fn image_extension(media_type: &str) -> &'static str {
    match media_type.trim().to_ascii_lowercase().as_str() {
        "image/png" => ".png",
        "image/jpeg" => ".jpg",
        _ => ".jpg",
    }
}

fn sanitize_file_name(original: Option<&str>) -> String {
    let name = original
        .unwrap_or("")
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or("")
        .chars()
        .filter(|c| !c.is_control())
        .collect::<String>();

    let name = name.trim();
    if name.is_empty() || name == "." || name == ".." {
        "upload.epub".to_string()
    } else {
        name.to_string()
    }
}
