//! EPUB container parser
//!
//! Reads `META-INF/container.xml` to locate the OPF package document, then
//! pulls Dublin Core metadata and the cover image out of it.

use std::io::{Cursor, Read, Seek};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;
use zip::ZipArchive;

use super::types::{CoverImage, Creator, EpubMetadata, ManifestItem};

const CONTAINER_PATH: &str = "META-INF/container.xml";

#[derive(Debug, Error)]
pub enum EpubError {
    #[error("Failed to read ZIP archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid EPUB: {0}")]
    InvalidEpub(String),

    #[error("XML parse error: {0}")]
    Xml(String),
}

/// Read title, creators, description and cover from EPUB bytes
pub fn read_metadata(data: &[u8]) -> Result<EpubMetadata, EpubError> {
    let mut archive = ZipArchive::new(Cursor::new(data))?;

    let container = read_entry_string(&mut archive, CONTAINER_PATH)?;
    let opf_path = find_opf_path(&container)?;
    let opf_dir = opf_path
        .rsplit_once('/')
        .map(|(dir, _)| dir.to_string())
        .unwrap_or_default();

    let opf = read_entry_string(&mut archive, &opf_path)?;
    let package = parse_package(&opf)?;

    let cover = match package.cover_item() {
        Some(item) => {
            let path = resolve_href(&opf_dir, &item.href);
            match read_entry(&mut archive, &path) {
                Ok(data) => Some(CoverImage {
                    href: path,
                    media_type: item.media_type.clone(),
                    data,
                }),
                Err(e) => {
                    tracing::debug!(href = %path, "Declared cover is not readable: {}", e);
                    None
                }
            }
        }
        None => None,
    };

    Ok(EpubMetadata {
        title: package.title,
        creators: package.creators,
        description: package.description,
        cover,
    })
}

/// Contents of the OPF package relevant for metadata extraction
#[derive(Debug, Default)]
struct Package {
    title: Option<String>,
    creators: Vec<Creator>,
    description: Option<String>,
    /// Manifest id referenced by `<meta name="cover">`
    cover_id: Option<String>,
    manifest: Vec<ManifestItem>,
}

impl Package {
    /// Find the cover image item.
    ///
    /// Order: EPUB 3 `cover-image` property, EPUB 2 cover meta, then any image
    /// whose id mentions "cover".
    fn cover_item(&self) -> Option<&ManifestItem> {
        if let Some(item) = self.manifest.iter().find(|i| i.has_property("cover-image")) {
            return Some(item);
        }

        if let Some(ref id) = self.cover_id {
            if let Some(item) = self.manifest.iter().find(|i| &i.id == id && i.is_image()) {
                return Some(item);
            }
        }

        self.manifest
            .iter()
            .find(|i| i.is_image() && i.id.to_lowercase().contains("cover"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Creator,
    Description,
}

fn find_opf_path(container: &str) -> Result<String, EpubError> {
    let mut reader = Reader::from_str(container);
    reader.trim_text(true);

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"rootfile" => {
                if let Some(path) = attribute(&e, b"full-path")? {
                    if !path.is_empty() {
                        return Ok(path);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Err(EpubError::InvalidEpub(
        "container.xml declares no rootfile".to_string(),
    ))
}

fn parse_package(opf: &str) -> Result<Package, EpubError> {
    let mut reader = Reader::from_str(opf);
    reader.trim_text(true);

    let mut package = Package::default();
    let mut saw_metadata = false;
    let mut in_metadata = false;
    let mut current: Option<(Field, Option<String>)> = None;
    let mut text = String::new();

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"metadata" => {
                    saw_metadata = true;
                    in_metadata = true;
                }
                b"title" if in_metadata => current = Some((Field::Title, None)),
                b"creator" if in_metadata => {
                    current = Some((Field::Creator, attribute(&e, b"role")?));
                }
                b"description" if in_metadata => current = Some((Field::Description, None)),
                b"meta" if in_metadata => read_cover_meta(&e, &mut package)?,
                b"item" => read_manifest_item(&e, &mut package)?,
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"meta" if in_metadata => read_cover_meta(&e, &mut package)?,
                b"item" => read_manifest_item(&e, &mut package)?,
                _ => {}
            },
            Event::Text(t) if current.is_some() => {
                let value = t
                    .unescape()
                    .map(|s| s.into_owned())
                    .unwrap_or_else(|_| String::from_utf8_lossy(&t).into_owned());
                text.push_str(&value);
            }
            Event::CData(c) if current.is_some() => {
                text.push_str(&String::from_utf8_lossy(&c.into_inner()));
            }
            Event::End(e) => {
                let name = e.local_name();
                if name.as_ref() == b"metadata" {
                    in_metadata = false;
                }
                if let Some((field, role)) = current.take() {
                    let value = std::mem::take(&mut text).trim().to_string();
                    match field {
                        Field::Title if package.title.is_none() && !value.is_empty() => {
                            package.title = Some(value)
                        }
                        Field::Description if package.description.is_none() => {
                            package.description = Some(value)
                        }
                        Field::Creator if !value.is_empty() => package.creators.push(Creator {
                            name: value,
                            role,
                        }),
                        _ => {}
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_metadata {
        return Err(EpubError::InvalidEpub(
            "package document has no metadata section".to_string(),
        ));
    }

    Ok(package)
}

fn read_cover_meta(e: &BytesStart<'_>, package: &mut Package) -> Result<(), EpubError> {
    if attribute(e, b"name")?.as_deref() == Some("cover") {
        package.cover_id = attribute(e, b"content")?;
    }
    Ok(())
}

fn read_manifest_item(e: &BytesStart<'_>, package: &mut Package) -> Result<(), EpubError> {
    if let (Some(id), Some(href)) = (attribute(e, b"id")?, attribute(e, b"href")?) {
        package.manifest.push(ManifestItem {
            id,
            href,
            media_type: attribute(e, b"media-type")?.unwrap_or_default(),
            properties: attribute(e, b"properties")?,
        });
    }
    Ok(())
}

/// Look up an attribute by local name, ignoring namespace prefixes
fn attribute(e: &BytesStart<'_>, name: &[u8]) -> Result<Option<String>, EpubError> {
    for attr in e.attributes() {
        let attr = attr.map_err(xml_error)?;
        if attr.key.local_name().as_ref() == name {
            let value = attr.unescape_value().map_err(xml_error)?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// Resolve a manifest href against the OPF directory
fn resolve_href(opf_dir: &str, href: &str) -> String {
    let href = href.split('#').next().unwrap_or(href);
    let href = urlencoding::decode(href)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| href.to_string());

    let mut segments: Vec<&str> = if href.starts_with('/') {
        Vec::new()
    } else {
        opf_dir.split('/').filter(|s| !s.is_empty()).collect()
    };

    for segment in href.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    segments.join("/")
}

fn read_entry<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str) -> Result<Vec<u8>, EpubError> {
    // Some packagers disagree with the manifest on letter case
    let name = if archive.index_for_name(path).is_some() {
        path.to_string()
    } else {
        archive
            .file_names()
            .find(|n| n.eq_ignore_ascii_case(path))
            .map(str::to_string)
            .ok_or_else(|| EpubError::InvalidEpub(format!("missing entry {}", path)))?
    };

    let mut file = archive.by_name(&name)?;
    let mut data = Vec::new();
    file.read_to_end(&mut data)?;
    Ok(data)
}

fn read_entry_string<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    path: &str,
) -> Result<String, EpubError> {
    let data = read_entry(archive, path)?;
    Ok(String::from_utf8_lossy(&data).into_owned())
}

fn xml_error(e: impl std::fmt::Display) -> EpubError {
    EpubError::Xml(e.to_string())
}
