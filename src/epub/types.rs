//! EPUB data types

use serde::{Deserialize, Serialize};

/// Metadata read from an EPUB package document
#[derive(Debug, Clone, Default)]
pub struct EpubMetadata {
    pub title: Option<String>,
    pub creators: Vec<Creator>,
    pub description: Option<String>,
    pub cover: Option<CoverImage>,
}

impl EpubMetadata {
    /// Display name of the primary author.
    ///
    /// Prefers the first creator declared as author (or without a role),
    /// then any creator at all.
    pub fn primary_author(&self) -> Option<&str> {
        self.creators
            .iter()
            .find(|c| c.role.as_deref().map_or(true, |r| r.eq_ignore_ascii_case("aut")))
            .or_else(|| self.creators.first())
            .map(|c| c.name.as_str())
    }
}

/// Creator (author) information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Creator {
    pub name: String,
    pub role: Option<String>,
}

/// Raw cover image bytes with their declared media type
#[derive(Debug, Clone)]
pub struct CoverImage {
    pub href: String,
    pub media_type: String,
    pub data: Vec<u8>,
}

/// Manifest item from OPF
#[derive(Debug, Clone)]
pub struct ManifestItem {
    pub id: String,
    pub href: String,
    pub media_type: String,
    pub properties: Option<String>,
}

impl ManifestItem {
    pub fn is_image(&self) -> bool {
        self.media_type.starts_with("image/")
    }

    pub fn has_property(&self, property: &str) -> bool {
        self.properties
            .as_deref()
            .map_or(false, |p| p.split_whitespace().any(|v| v == property))
    }
}

/// Metadata returned to upload clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedMetadata {
    pub title: String,
    pub author: String,
    pub description: String,
    pub cover_image_path: String,
}
