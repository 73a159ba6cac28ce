//! Trait definitions for image backends and script analyzers.

use async_trait::async_trait;
use storyboard_core::{ImageArtifact, SceneDraft};
use storyboard_error::{AnalysisResult, ProviderResult};

/// Core trait that every image-generation backend implements.
///
/// A single call makes exactly one attempt; retries and fallback are the
/// caller's concern.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Generate one image for a fully assembled prompt.
    async fn generate(&self, prompt: &str) -> ProviderResult<ImageArtifact>;

    /// Name used in logs, events and error messages (e.g. `"imagen-4"`).
    fn provider_name(&self) -> &str;
}

/// Converts raw script text into ordered scene drafts.
#[async_trait]
pub trait ScriptAnalyzer: Send + Sync {
    /// Segment a script into shots, in script order.
    async fn analyze(&self, script: &str) -> AnalysisResult<Vec<SceneDraft>>;
}
