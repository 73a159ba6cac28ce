//! Artifact storage trait.

use async_trait::async_trait;
use storyboard_core::{ImageArtifact, SceneId};
use storyboard_error::StoryboardResult;

/// Persists generated images and resolves them again later.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Persist `artifact` for `scene` and return the URL to record on the scene.
    ///
    /// # Errors
    ///
    /// Returns an error if the artifact is empty or cannot be written.
    async fn store(&self, scene: SceneId, artifact: &ImageArtifact) -> StoryboardResult<String>;

    /// Read back the bytes behind a URL previously returned by [`store`](Self::store).
    ///
    /// # Errors
    ///
    /// Returns an error if the URL does not belong to this store or the
    /// content is missing or corrupted.
    async fn retrieve(&self, url: &str) -> StoryboardResult<Vec<u8>>;

    /// Backend name for logging.
    fn backend_name(&self) -> &str;
}
