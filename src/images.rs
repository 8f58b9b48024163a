//! Content-addressed image storage.
//!
//! Uploaded bytes are hashed with SHA-256 and written to
//! `<images dir>/<hex digest>.jpg`, so identical uploads collapse onto one
//! file. Lookups take a bare file name; anything that could resolve
//! outside the images directory is rejected.

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::ImagesConfig;
use crate::error::{CatalogError, Result};
use crate::models::StoredImage;

pub const IMAGE_SUFFIX: &str = ".jpg";

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Lowercase hex SHA-256 of `data`.
pub fn content_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
    default_image: String,
}

impl ImageStore {
    pub fn new(dir: impl Into<PathBuf>, default_image: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            default_image: default_image.into(),
        }
    }

    pub fn from_config(config: &ImagesConfig) -> Self {
        Self::new(config.dir.clone(), config.default_image.clone())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn default_path(&self) -> PathBuf {
        self.dir.join(&self.default_image)
    }

    pub async fn ensure_dir(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    /// Persists `data` under its content digest.
    ///
    /// An existing file for the same digest already holds these bytes and
    /// is left untouched.
    pub async fn store(&self, data: &[u8]) -> Result<StoredImage> {
        if data.is_empty() {
            return Err(CatalogError::invalid("uploaded image is empty"));
        }

        let content_hash = content_hash(data);
        let file_name = format!("{}{}", content_hash, IMAGE_SUFFIX);
        let path = self.dir.join(&file_name);

        if tokio::fs::try_exists(&path).await? {
            tracing::debug!("image {} already stored", file_name);
        } else {
            self.ensure_dir().await?;
            // Write beside the target and rename so a reader never sees a
            // partially written image.
            let n = TMP_COUNTER.fetch_add(1, Ordering::Relaxed);
            let tmp = self.dir.join(format!(".{}.{}.tmp", file_name, n));
            tokio::fs::write(&tmp, data).await?;
            tokio::fs::rename(&tmp, &path).await?;
        }

        Ok(StoredImage {
            content_hash,
            file_name,
            path,
        })
    }

    /// Maps a requested image file name to a path on disk.
    ///
    /// The name must be a single `.jpg` path component. Names that do not
    /// exist resolve to the placeholder image instead of failing.
    pub async fn resolve(&self, file_name: &str) -> Result<PathBuf> {
        validate_file_name(file_name)?;

        let path = self.dir.join(file_name);
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            Ok(path)
        } else {
            tracing::debug!("image not found: {}", path.display());
            Ok(self.default_path())
        }
    }
}

fn validate_file_name(file_name: &str) -> Result<()> {
    if !file_name.ends_with(IMAGE_SUFFIX) {
        return Err(CatalogError::invalid("image path does not end with .jpg"));
    }

    let is_leaf = !file_name.contains(|c: char| c == '/' || c == '\\')
        && Path::new(file_name).file_name().and_then(|n| n.to_str()) == Some(file_name)
        && !file_name.starts_with('.');
    if !is_leaf {
        return Err(CatalogError::invalid(format!(
            "image name must be a bare file name: {}",
            file_name
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(tmp: &TempDir) -> ImageStore {
        ImageStore::new(tmp.path().join("images"), "default.jpg")
    }

    #[test]
    fn test_hash_is_lowercase_hex_sha256() {
        let h = content_hash(b"hello");
        assert_eq!(
            h,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[tokio::test]
    async fn test_store_then_resolve_returns_same_bytes() {
        let tmp = TempDir::new().unwrap();
        let images = store_in(&tmp);

        let stored = images.store(b"\xff\xd8\xff jpeg bytes").await.unwrap();
        assert_eq!(stored.file_name, format!("{}.jpg", stored.content_hash));

        let path = images.resolve(&stored.file_name).await.unwrap();
        assert_eq!(path, stored.path);
        let read_back = std::fs::read(&path).unwrap();
        assert_eq!(read_back, b"\xff\xd8\xff jpeg bytes");
    }

    #[tokio::test]
    async fn test_identical_uploads_share_one_file() {
        let tmp = TempDir::new().unwrap();
        let images = store_in(&tmp);

        let first = images.store(b"same bytes").await.unwrap();
        let second = images.store(b"same bytes").await.unwrap();
        assert_eq!(first.content_hash, second.content_hash);
        assert_eq!(first.path, second.path);

        let files: Vec<_> = std::fs::read_dir(images.dir())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(files.len(), 1, "expected one stored file, got {:?}", files);
    }

    #[tokio::test]
    async fn test_missing_image_resolves_to_placeholder() {
        let tmp = TempDir::new().unwrap();
        let images = store_in(&tmp);

        let path = images.resolve("nonexistent.jpg").await.unwrap();
        assert_eq!(path, images.default_path());
    }

    #[tokio::test]
    async fn test_traversal_rejected() {
        let tmp = TempDir::new().unwrap();
        let images = store_in(&tmp);

        for name in [
            "../../etc/passwd",
            "../secret.jpg",
            "nested/file.jpg",
            "..\\file.jpg",
            "/etc/shadow.jpg",
            "..jpg",
        ] {
            let err = images.resolve(name).await.unwrap_err();
            assert!(
                matches!(err, CatalogError::InvalidRequest(_)),
                "{} should be rejected, got {:?}",
                name,
                err
            );
        }
    }

    #[tokio::test]
    async fn test_wrong_suffix_rejected() {
        let tmp = TempDir::new().unwrap();
        let images = store_in(&tmp);

        let err = images.resolve("photo.png").await.unwrap_err();
        assert!(matches!(err, CatalogError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_empty_upload_rejected() {
        let tmp = TempDir::new().unwrap();
        let images = store_in(&tmp);

        let err = images.store(b"").await.unwrap_err();
        assert!(matches!(err, CatalogError::InvalidRequest(_)));
    }
}
