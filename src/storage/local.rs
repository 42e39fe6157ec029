//! Local filesystem storage backend

use std::path::{Component, Path, PathBuf};

use tokio::io::AsyncWriteExt;

use super::types::{StorageError, StoredFile};
use super::FileStorage;

/// Filesystem-backed storage rooted at a single directory
#[derive(Debug, Clone)]
pub struct LocalFileStorage {
    root: PathBuf,
}

impl LocalFileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a relative name to a file inside the root.
    ///
    /// Rejects absolute paths and any `..` component, then checks the
    /// canonical location still lies under the canonical root.
    async fn resolve(&self, name: &str) -> Result<PathBuf, StorageError> {
        let relative = validate_relative(name)?;

        let root = tokio::fs::canonicalize(&self.root)
            .await
            .map_err(|_| StorageError::NotFound(name.to_string()))?;
        let path = tokio::fs::canonicalize(root.join(relative))
            .await
            .map_err(|_| StorageError::NotFound(name.to_string()))?;

        if !path.starts_with(&root) {
            tracing::warn!(requested = %name, "Rejected path outside storage root");
            return Err(StorageError::InvalidPath(name.to_string()));
        }

        Ok(path)
    }
}

#[async_trait::async_trait]
impl FileStorage for LocalFileStorage {
    async fn ensure_root(&self) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    async fn put(&self, name: &str, data: &[u8]) -> Result<String, StorageError> {
        let relative = validate_relative(name)?;
        let path = self.root.join(relative);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;
        file.write_all(data).await?;
        file.flush().await?;

        tracing::debug!(path = %path.display(), size = data.len(), "Stored file");

        Ok(name.to_string())
    }

    async fn get(&self, name: &str) -> Result<StoredFile, StorageError> {
        let path = self.resolve(name).await?;

        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|_| StorageError::NotFound(name.to_string()))?;
        if !metadata.is_file() {
            return Err(StorageError::NotFound(name.to_string()));
        }

        let data = tokio::fs::read(&path).await.map_err(|e| {
            tracing::warn!(path = %path.display(), "Failed to read stored file: {}", e);
            StorageError::NotFound(name.to_string())
        })?;

        let content_type = mime_guess::from_path(&path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();

        Ok(StoredFile {
            name: name.to_string(),
            content_type,
            data,
        })
    }
}

/// Accept only plain relative paths made of normal components
fn validate_relative(name: &str) -> Result<&Path, StorageError> {
    let path = Path::new(name);
    let mut has_component = false;

    for component in path.components() {
        match component {
            Component::Normal(_) => has_component = true,
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(StorageError::InvalidPath(name.to_string()));
            }
        }
    }

    if !has_component || name.contains('\0') {
        return Err(StorageError::InvalidPath(name.to_string()));
    }

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_put_and_get() {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalFileStorage::new(temp_dir.path().join("covers"));
        store.ensure_root().await.unwrap();

        let name = store.put("cover_1.png", b"png-bytes").await.unwrap();
        assert_eq!(name, "cover_1.png");

        let file = store.get("cover_1.png").await.unwrap();
        assert_eq!(file.data, b"png-bytes");
        assert_eq!(file.content_type, "image/png");
    }

    #[tokio::test]
    async fn test_ensure_root_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalFileStorage::new(temp_dir.path().join("uploads"));
        store.ensure_root().await.unwrap();
        store.ensure_root().await.unwrap();
        assert!(store.root().is_dir());
    }

    #[tokio::test]
    async fn test_put_refuses_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalFileStorage::new(temp_dir.path());

        store.put("a.epub", b"first").await.unwrap();
        let result = store.put("a.epub", b"second").await;
        assert!(matches!(result, Err(StorageError::Io(_))));

        assert_eq!(store.get("a.epub").await.unwrap().data, b"first");
    }

    #[tokio::test]
    async fn test_get_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalFileStorage::new(temp_dir.path());

        let result = store.get("missing.epub").await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_rejects_traversal() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("covers");
        let store = LocalFileStorage::new(&root);
        store.ensure_root().await.unwrap();
        tokio::fs::write(temp_dir.path().join("secret.txt"), b"secret")
            .await
            .unwrap();

        for name in ["../secret.txt", "/etc/passwd", "", ".", "a/../../secret.txt"] {
            let result = store.get(name).await;
            assert!(
                matches!(result, Err(StorageError::InvalidPath(_))),
                "{name:?} should be rejected"
            );
        }

        assert!(matches!(
            store.put("../escape.txt", b"x").await,
            Err(StorageError::InvalidPath(_))
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_rejects_symlink_escape() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("uploads");
        let store = LocalFileStorage::new(&root);
        store.ensure_root().await.unwrap();

        let outside = temp_dir.path().join("outside.txt");
        tokio::fs::write(&outside, b"outside").await.unwrap();
        std::os::unix::fs::symlink(&outside, root.join("link.txt")).unwrap();

        let result = store.get("link.txt").await;
        assert!(matches!(result, Err(StorageError::InvalidPath(_))));
    }
}
