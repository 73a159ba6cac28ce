//! Filesystem-based artifact storage.
//!
//! Artifacts are stored by content hash, so regenerating an identical image
//! reuses the existing file.

use crate::{ArtifactStore, ImageFormat};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use storyboard_core::{ImageArtifact, SceneId};
use storyboard_error::{StorageError, StorageErrorKind, StoryboardResult};
use uuid::Uuid;

/// Content-addressed image files on local disk.
///
/// Layout: `{base_path}/{hash[0:2]}/{hash}.{ext}`
///
/// ```text
/// ./storyboard-images/
/// ├── 3f/
/// │   └── 3fa1c0...e9.png
/// └── a7/
///     └── a70b44...12.jpg
/// ```
///
/// Writes go to a uniquely named temp file that is renamed into place, so a
/// reader never sees a partial image.
#[derive(Debug, Clone)]
pub struct FileSystemArtifactStore {
    base_path: PathBuf,
}

impl FileSystemArtifactStore {
    /// Create a store rooted at `base_path`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    #[tracing::instrument(skip(base_path))]
    pub fn new(base_path: impl Into<PathBuf>) -> StoryboardResult<Self> {
        let base_path = base_path.into();

        std::fs::create_dir_all(&base_path).map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                base_path.display(),
                e
            )))
        })?;

        tracing::info!(path = %base_path.display(), "Created artifact storage");
        Ok(Self { base_path })
    }

    /// Root directory.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn compute_hash(data: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(data);
        format!("{:x}", hasher.finalize())
    }

    fn path_for(&self, hash: &str, format: Option<ImageFormat>) -> PathBuf {
        let ext = format.map(|f| f.extension()).unwrap_or("bin");
        self.base_path
            .join(&hash[0..2])
            .join(format!("{}.{}", hash, ext))
    }
}

#[async_trait]
impl ArtifactStore for FileSystemArtifactStore {
    #[tracing::instrument(skip(self, artifact), fields(size = artifact.data().len(), provider = %artifact.provider()))]
    async fn store(&self, scene: SceneId, artifact: &ImageArtifact) -> StoryboardResult<String> {
        let data = artifact.data();
        if data.is_empty() {
            return Err(
                StorageError::new(StorageErrorKind::EmptyArtifact(artifact.provider().clone()))
                    .into(),
            );
        }

        let format = ImageFormat::from_mime(artifact.mime_type());
        if format.is_none() {
            tracing::warn!(mime_type = %artifact.mime_type(), "Unknown image MIME type, storing as .bin");
        }

        let hash = Self::compute_hash(data);
        let path = self.path_for(&hash, format);
        let url = path.to_string_lossy().to_string();

        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            tracing::debug!(%scene, hash = %hash, "Artifact already stored, reusing");
            return Ok(url);
        }

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                    "{}: {}",
                    parent.display(),
                    e
                )))
            })?;
        }

        let temp_path = path.with_file_name(format!(".{}.tmp", Uuid::new_v4()));
        tokio::fs::write(&temp_path, data).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "{}: {}",
                temp_path.display(),
                e
            )))
        })?;

        if let Err(e) = tokio::fs::rename(&temp_path, &path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(StorageError::new(StorageErrorKind::FileWrite(format!(
                "rename {} to {}: {}",
                temp_path.display(),
                path.display(),
                e
            )))
            .into());
        }

        tracing::info!(
            %scene,
            hash = %hash,
            path = %path.display(),
            size = data.len(),
            "Stored artifact"
        );

        Ok(url)
    }

    #[tracing::instrument(skip(self))]
    async fn retrieve(&self, url: &str) -> StoryboardResult<Vec<u8>> {
        let path = Path::new(url);
        if !path.starts_with(&self.base_path) {
            return Err(StorageError::new(StorageErrorKind::NotFound(format!(
                "{} is outside {}",
                url,
                self.base_path.display()
            )))
            .into());
        }

        let data = tokio::fs::read(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::new(StorageErrorKind::NotFound(url.to_string()))
            } else {
                StorageError::new(StorageErrorKind::FileRead(format!("{}: {}", url, e)))
            }
        })?;

        let expected = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_default();
        let actual = Self::compute_hash(&data);
        if actual != expected {
            return Err(StorageError::new(StorageErrorKind::FileRead(format!(
                "Hash mismatch for {}: expected {}, got {}",
                url, expected, actual
            )))
            .into());
        }

        Ok(data)
    }

    fn backend_name(&self) -> &str {
        "filesystem"
    }
}
