//! Upload pipeline: persist the original file, then extract its metadata

use std::sync::Arc;

use crate::epub::MetadataExtractor;
use crate::storage::{upload_file_name, FileStorage};

use super::types::{UploadError, UploadResponse};

#[derive(Clone)]
pub struct UploadPipeline {
    uploads: Arc<dyn FileStorage>,
    extractor: MetadataExtractor,
}

impl UploadPipeline {
    pub fn new(uploads: Arc<dyn FileStorage>, extractor: MetadataExtractor) -> Self {
        Self { uploads, extractor }
    }

    /// Store `data` under a unique name derived from `original_name` and
    /// extract its metadata. Extraction problems never fail the upload.
    pub async fn process(
        &self,
        original_name: Option<&str>,
        data: Vec<u8>,
    ) -> Result<UploadResponse, UploadError> {
        let name = upload_file_name(original_name);
        let file_name = self.uploads.put(&name, &data).await?;
        tracing::info!(file = %file_name, size = data.len(), "Stored uploaded file");

        let metadata = self.extractor.extract(data).await;
        tracing::debug!(file = %file_name, title = %metadata.title, "Extracted metadata");

        Ok(UploadResponse {
            file_name,
            cover_image_path: metadata.cover_image_path.clone(),
            metadata,
        })
    }
}
