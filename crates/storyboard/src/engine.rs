//! Wiring configuration into a ready-to-run queue processor.

use std::path::Path;
use std::sync::Arc;
use storyboard_core::Storyboard;
use storyboard_error::{AnalysisResult, StoryboardResult};
use storyboard_models::{GeminiScriptAnalyzer, build_provider};
use storyboard_queue::{FailureClassifier, ProviderChain, ProviderEntry, QueueProcessor};
use storyboard_rate_limit::{RateLimiter, Sleeper, StoryboardConfig, TokioSleeper};
use storyboard_storage::{ArtifactStore, DataUrlArtifactStore, FileSystemArtifactStore};
use tracing::{debug, info, instrument};

/// Builds analyzers, provider chains and processors from a loaded configuration.
///
/// The same [`Sleeper`] drives both retry backoff and scene pacing, so a test
/// can substitute one that returns immediately.
#[derive(Clone)]
pub struct Engine {
    config: StoryboardConfig,
    api_key: String,
    sleeper: Arc<dyn Sleeper>,
}

impl Engine {
    /// Create an engine using the tokio timer.
    pub fn new(config: StoryboardConfig, api_key: impl Into<String>) -> Self {
        Self {
            config,
            api_key: api_key.into(),
            sleeper: Arc::new(TokioSleeper),
        }
    }

    /// Replace the sleeper used for backoff and pacing.
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// The configuration this engine was built from.
    pub fn config(&self) -> &StoryboardConfig {
        &self.config
    }

    /// Script analyzer for the configured model, capped at `max_scenes`.
    pub fn analyzer(&self) -> AnalysisResult<GeminiScriptAnalyzer> {
        Ok(
            GeminiScriptAnalyzer::new(self.config.analysis.model.clone(), self.api_key.clone())?
                .with_max_scenes(self.config.generation.max_scenes),
        )
    }

    /// Provider chain in configuration order.
    ///
    /// Every entry gets the single `generation.max_retries` ceiling; only the
    /// retry signals may differ per provider.
    #[instrument(skip(self), fields(providers = self.config.providers.len()))]
    pub fn chain(&self) -> StoryboardResult<ProviderChain> {
        let entries = self
            .config
            .providers
            .iter()
            .map(|spec| -> StoryboardResult<ProviderEntry> {
                let provider = build_provider(spec, &self.api_key)?;
                let policy = spec.retry_policy(&self.config.generation, &self.config.retry);
                debug!(
                    provider = %spec.name,
                    kind = %spec.kind,
                    model = %spec.model,
                    max_retries = *policy.max_retries(),
                    "Chain entry configured"
                );
                Ok(ProviderEntry::new(provider, policy))
            })
            .collect::<StoryboardResult<Vec<_>>>()?;

        Ok(ProviderChain::new(
            entries,
            FailureClassifier::new(&self.config.failure),
            self.sleeper.clone(),
        )?)
    }

    /// Queue processor owning `board`.
    pub fn processor(
        &self,
        board: Storyboard,
        store: Arc<dyn ArtifactStore>,
    ) -> StoryboardResult<QueueProcessor> {
        let pacing = RateLimiter::new(self.config.pacing_delay(), self.sleeper.clone());
        info!(
            pacing_ms = pacing.delay().as_millis() as u64,
            scenes = board.len(),
            "Queue processor ready"
        );
        Ok(QueueProcessor::new(
            board,
            self.chain()?,
            store,
            pacing,
            self.config.prompt.clone(),
        ))
    }

    /// Artifact store: content-addressed files under `output_dir`, or inline
    /// data URLs when no directory is given.
    pub fn open_store(output_dir: Option<&Path>) -> StoryboardResult<Arc<dyn ArtifactStore>> {
        Ok(match output_dir {
            Some(dir) => Arc::new(FileSystemArtifactStore::new(dir)?),
            None => Arc::new(DataUrlArtifactStore::new()),
        })
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("api_key", &"<redacted>")
            .field("sleeper", &self.sleeper)
            .finish()
    }
}
