//! Best-effort metadata extraction for uploaded EPUBs
//!
//! Extraction never fails: any problem parsing the book or writing its cover
//! yields the placeholder metadata instead.

use std::sync::Arc;

use crate::library::DEFAULT_COVER;
use crate::storage::{cover_file_name, FileStorage, StorageError};

use super::parser::read_metadata;
use super::types::{EpubMetadata, ExtractedMetadata};

pub const UNKNOWN_TITLE: &str = "Unknown Title";
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";

impl ExtractedMetadata {
    /// Metadata used when nothing could be read from the file
    pub fn placeholder() -> Self {
        Self {
            title: UNKNOWN_TITLE.to_string(),
            author: UNKNOWN_AUTHOR.to_string(),
            description: String::new(),
            cover_image_path: DEFAULT_COVER.to_string(),
        }
    }
}

/// Extracts metadata and persists the cover image into cover storage
#[derive(Clone)]
pub struct MetadataExtractor {
    covers: Arc<dyn FileStorage>,
}

impl MetadataExtractor {
    pub fn new(covers: Arc<dyn FileStorage>) -> Self {
        Self { covers }
    }

    /// Extract metadata from EPUB bytes
    pub async fn extract(&self, data: Vec<u8>) -> ExtractedMetadata {
        let parsed = tokio::task::spawn_blocking(move || read_metadata(&data)).await;

        let metadata = match parsed {
            Ok(Ok(metadata)) => metadata,
            Ok(Err(e)) => {
                tracing::warn!("Failed to parse EPUB metadata: {}", e);
                return ExtractedMetadata::placeholder();
            }
            Err(e) => {
                tracing::error!("EPUB parse task failed: {}", e);
                return ExtractedMetadata::placeholder();
            }
        };

        match self.store_cover(&metadata).await {
            Ok(cover_image_path) => ExtractedMetadata {
                title: non_empty(metadata.title.as_deref()).unwrap_or(UNKNOWN_TITLE).to_string(),
                author: non_empty(metadata.primary_author())
                    .unwrap_or(UNKNOWN_AUTHOR)
                    .to_string(),
                description: metadata.description.clone().unwrap_or_default(),
                cover_image_path,
            },
            Err(e) => {
                tracing::warn!("Failed to store cover image: {}", e);
                ExtractedMetadata::placeholder()
            }
        }
    }

    /// Write the cover (if any) and return its stored name
    async fn store_cover(&self, metadata: &EpubMetadata) -> Result<String, StorageError> {
        let Some(cover) = metadata.cover.as_ref() else {
            return Ok(DEFAULT_COVER.to_string());
        };

        let name = cover_file_name(&cover.media_type);
        self.covers.put(&name, &cover.data).await?;

        tracing::debug!(cover = %name, source = %cover.href, "Extracted cover image");
        Ok(name)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
