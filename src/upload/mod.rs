//! EPUB upload handling

mod pipeline;
mod types;

pub use pipeline::UploadPipeline;
pub use types::{UploadError, UploadResponse, FILE_FIELD};
