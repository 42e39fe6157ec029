#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::sync::Arc;

use axum::Router;
use sqlx::sqlite::SqlitePoolOptions;
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use bookshelf_server::cache::MemoryCacheStore;
use bookshelf_server::config::Config;
use bookshelf_server::db::{initialize_schema, SqliteBookRepository};
use bookshelf_server::routes;
use bookshelf_server::storage::{FileStorage, LocalFileStorage};
use bookshelf_server::AppState;

pub const BOUNDARY: &str = "bookshelf-test-boundary";

/// Application over temporary directories and an in-memory database
pub struct TestApp {
    pub router: Router,
    pub dir: TempDir,
    pub config: Config,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(Config::default()).await
    }

    pub async fn with_config(mut config: Config) -> Self {
        let dir = TempDir::new().expect("temp dir");
        config.storage.upload_dir = dir.path().join("uploads");
        config.storage.cover_dir = dir.path().join("covers");

        let uploads: Arc<dyn FileStorage> =
            Arc::new(LocalFileStorage::new(&config.storage.upload_dir));
        let covers: Arc<dyn FileStorage> =
            Arc::new(LocalFileStorage::new(&config.storage.cover_dir));
        uploads.ensure_root().await.expect("upload root");
        covers.ensure_root().await.expect("cover root");

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("sqlite");
        initialize_schema(&pool).await.expect("schema");

        let state = AppState::new(
            config.clone(),
            Arc::new(SqliteBookRepository::new(pool)),
            Arc::new(MemoryCacheStore::with_capacity(config.cache.max_entries)),
            uploads,
            covers,
        );

        Self {
            router: routes::app(state),
            dir,
            config,
        }
    }
}

/// Build an EPUB with the given metadata and optional `(href, media type)` cover
pub fn build_epub(title: &str, author: &str, cover: Option<(&str, &str)>) -> Vec<u8> {
    let (item, meta) = match cover {
        Some((href, media_type)) => (
            format!(r#"<item id="cover-image" href="{href}" media-type="{media_type}"/>"#),
            r#"<meta name="cover" content="cover-image"/>"#,
        ),
        None => (String::new(), ""),
    };
    let opf = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="2.0" unique-identifier="uid">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
    <dc:title>{title}</dc:title>
    <dc:creator>{author}</dc:creator>
    <dc:description>A test book.</dc:description>
    {meta}
  </metadata>
  <manifest>
    <item id="ch1" href="ch1.xhtml" media-type="application/xhtml+xml"/>
    {item}
  </manifest>
  <spine><itemref idref="ch1"/></spine>
</package>"#
    );
    let container = r#"<?xml version="1.0"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#;

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    zip.start_file("mimetype", options).unwrap();
    zip.write_all(b"application/epub+zip").unwrap();
    zip.start_file("META-INF/container.xml", options).unwrap();
    zip.write_all(container.as_bytes()).unwrap();
    zip.start_file("OEBPS/content.opf", options).unwrap();
    zip.write_all(opf.as_bytes()).unwrap();
    zip.start_file("OEBPS/ch1.xhtml", options).unwrap();
    zip.write_all(b"<html><body><p>Hello</p></body></html>").unwrap();
    if let Some((href, _)) = cover {
        zip.start_file(format!("OEBPS/{}", href), options).unwrap();
        zip.write_all(b"cover-image-bytes").unwrap();
    }
    zip.finish().unwrap().into_inner()
}

/// Encode a single-field multipart body
pub fn multipart_body(field: &str, file_name: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, file_name
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/epub+zip\r\n\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub async fn read_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

pub async fn read_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body")
        .to_vec()
}
