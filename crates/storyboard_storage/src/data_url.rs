//! Inline data URL storage.

use crate::ArtifactStore;
use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use storyboard_core::{ImageArtifact, SceneId};
use storyboard_error::{StorageError, StorageErrorKind, StoryboardResult};

/// Encodes artifacts as `data:{mime};base64,{payload}` URLs.
///
/// Nothing touches the disk; the image lives in the storyboard document.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataUrlArtifactStore;

impl DataUrlArtifactStore {
    /// Create the store.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ArtifactStore for DataUrlArtifactStore {
    #[tracing::instrument(skip(self, artifact), fields(size = artifact.data().len(), provider = %artifact.provider()))]
    async fn store(&self, scene: SceneId, artifact: &ImageArtifact) -> StoryboardResult<String> {
        if artifact.data().is_empty() {
            return Err(
                StorageError::new(StorageErrorKind::EmptyArtifact(artifact.provider().clone()))
                    .into(),
            );
        }
        tracing::debug!(%scene, "Encoded artifact as data URL");
        Ok(format!(
            "data:{};base64,{}",
            artifact.mime_type(),
            STANDARD.encode(artifact.data())
        ))
    }

    async fn retrieve(&self, url: &str) -> StoryboardResult<Vec<u8>> {
        let payload = url
            .strip_prefix("data:")
            .and_then(|rest| rest.split_once(";base64,"))
            .map(|(_, payload)| payload)
            .ok_or_else(|| {
                StorageError::new(StorageErrorKind::NotFound(format!(
                    "not a base64 data URL: {}",
                    url.chars().take(32).collect::<String>()
                )))
            })?;

        STANDARD.decode(payload).map_err(|e| {
            StorageError::new(StorageErrorKind::FileRead(format!(
                "invalid base64 payload: {}",
                e
            )))
            .into()
        })
    }

    fn backend_name(&self) -> &str {
        "data-url"
    }
}
