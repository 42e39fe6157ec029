//! Book types and structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Cover file name used when a book has no extracted cover
pub const DEFAULT_COVER: &str = "default-cover.jpg";

/// URL prefix under which cover images are served
pub const COVER_URL_PREFIX: &str = "/covers/";

/// A book in the library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Repository-assigned identifier
    pub id: i64,

    pub title: String,

    pub author: Option<String>,

    pub description: Option<String>,

    pub category: Option<BookCategory>,

    /// Cover image path relative to the cover root
    pub cover_image_path: Option<String>,

    /// EPUB file path relative to the upload root
    pub epub_file_name: Option<String>,

    pub upload_user_id: Option<i64>,

    /// Set once at creation
    pub upload_time: Option<DateTime<Utc>>,
}

impl Book {
    /// Public URL of the cover image
    pub fn cover_url(&self) -> String {
        cover_url_for(self.cover_image_path.as_deref())
    }
}

/// Derive the cover URL from a stored cover path
pub fn cover_url_for(cover_image_path: Option<&str>) -> String {
    match cover_image_path {
        Some(path) if !path.is_empty() => format!("{}{}", COVER_URL_PREFIX, path),
        _ => format!("{}{}", COVER_URL_PREFIX, DEFAULT_COVER),
    }
}

/// Resolve the cover path to store for a book.
///
/// An explicit path wins; otherwise the last segment of a cover URL is used,
/// and failing both the default cover.
pub fn resolve_cover_path(cover_image_path: Option<String>, cover_url: Option<&str>) -> String {
    if let Some(path) = cover_image_path.filter(|p| !p.is_empty()) {
        return path;
    }

    cover_url
        .and_then(|url| url.rsplit('/').next())
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| DEFAULT_COVER.to_string())
}

/// Book categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BookCategory {
    Fiction,
    Technology,
    History,
    Detective,
    Biography,
    Other,
}

impl BookCategory {
    pub const ALL: [BookCategory; 6] = [
        BookCategory::Fiction,
        BookCategory::Technology,
        BookCategory::History,
        BookCategory::Detective,
        BookCategory::Biography,
        BookCategory::Other,
    ];

    /// Stored/wire code
    pub fn code(&self) -> &'static str {
        match self {
            BookCategory::Fiction => "FICTION",
            BookCategory::Technology => "TECHNOLOGY",
            BookCategory::History => "HISTORY",
            BookCategory::Detective => "DETECTIVE",
            BookCategory::Biography => "BIOGRAPHY",
            BookCategory::Other => "OTHER",
        }
    }

    /// Human readable label
    pub fn label(&self) -> &'static str {
        match self {
            BookCategory::Fiction => "Fiction",
            BookCategory::Technology => "Science & Technology",
            BookCategory::History => "History & Humanities",
            BookCategory::Detective => "Detective Fiction",
            BookCategory::Biography => "Biography",
            BookCategory::Other => "Other",
        }
    }

    /// Label for a stored code; unknown codes count as `Other`
    pub fn label_for_code(code: Option<&str>) -> &'static str {
        code.and_then(|c| c.parse::<BookCategory>().ok())
            .unwrap_or(BookCategory::Other)
            .label()
    }
}

impl fmt::Display for BookCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown book category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for BookCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BookCategory::ALL
            .into_iter()
            .find(|c| c.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// Request body for creating a book
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBook {
    pub title: String,
    pub author: Option<String>,
    pub description: Option<String>,
    pub category: Option<BookCategory>,
    pub cover_image_path: Option<String>,
    pub cover_url: Option<String>,
    pub epub_file_name: Option<String>,
    pub upload_user_id: Option<i64>,
}

/// Request body for a full-record update
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookUpdate {
    pub id: i64,
    pub title: String,
    pub author: Option<String>,
    pub description: Option<String>,
    pub category: Option<BookCategory>,
    pub cover_image_path: Option<String>,
    pub cover_url: Option<String>,
    pub epub_file_name: Option<String>,
    pub upload_user_id: Option<i64>,
}

/// Listing filter; every present field narrows the result
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookFilter {
    /// Case-insensitive substring of the title
    pub title: Option<String>,
    /// Case-insensitive substring of the author
    pub author: Option<String>,
    pub category: Option<BookCategory>,
}

impl BookFilter {
    /// Build a filter from raw query values. Blank values are dropped and the
    /// rest trimmed.
    pub fn from_params(
        title: Option<&str>,
        author: Option<&str>,
        category: Option<&str>,
    ) -> Result<Self, UnknownCategory> {
        let category = match clean_param(category) {
            Some(code) => Some(code.parse()?),
            None => None,
        };

        Ok(Self {
            title: clean_param(title),
            author: clean_param(author),
            category,
        })
    }

    /// Whether any criterion is set
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.author.is_none() && self.category.is_none()
    }
}

fn clean_param(param: Option<&str>) -> Option<String> {
    param
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
}

/// Library statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookStats {
    pub total: i64,
    pub categories: Vec<CategoryCount>,
}

/// Book count for one category label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub name: String,
    pub count: i64,
}
