//! EPUB metadata module
//!
//! Reads the OPF package document directly from the ZIP container and
//! extracts title, author, description and cover image.

mod extractor;
mod parser;
mod types;

pub use extractor::{MetadataExtractor, UNKNOWN_AUTHOR, UNKNOWN_TITLE};
pub use parser::{read_metadata, EpubError};
pub use types::{CoverImage, Creator, EpubMetadata, ExtractedMetadata, ManifestItem};
