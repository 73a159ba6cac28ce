//! Layered configuration.
//!
//! Sources, later overriding earlier:
//! - Bundled defaults (include_str! from storyboard.toml)
//! - `~/.config/storyboard/storyboard.toml`
//! - `./storyboard.toml`

use crate::{DEFAULT_RETRY_SIGNALS, RetryClassifier, RetryPolicy};
use config::{Config, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::time::Duration;
use storyboard_core::PromptTemplate;
use storyboard_error::{ConfigError, StoryboardError, StoryboardResult};
use tracing::{debug, instrument};

/// Batch and retry settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Maximum number of scenes kept from an analysis
    pub max_scenes: usize,

    /// Retries after the initial attempt, per provider
    pub max_retries: u32,

    /// Delay before the first retry; doubles on each further retry
    pub base_retry_delay_ms: u64,

    /// Fixed delay between consecutive scenes of a batch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_limit_delay_ms: Option<u64>,

    /// Used to derive the delay between scenes when no explicit delay is set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requests_per_minute: Option<u32>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_scenes: 40,
            max_retries: 5,
            base_retry_delay_ms: 2000,
            rate_limit_delay_ms: None,
            requests_per_minute: Some(10),
        }
    }
}

impl GenerationConfig {
    /// Delay between consecutive scenes.
    ///
    /// An explicit `rate_limit_delay_ms` wins; otherwise the delay is derived
    /// from `requests_per_minute`; otherwise six seconds.
    pub fn pacing_delay(&self) -> Duration {
        if let Some(ms) = self.rate_limit_delay_ms {
            return Duration::from_millis(ms);
        }
        match self.requests_per_minute.and_then(NonZeroU32::new) {
            Some(rpm) => Duration::from_millis(60_000 / u64::from(rpm.get())),
            None => Duration::from_millis(6000),
        }
    }

    /// Retry policy with the given classifier.
    pub fn retry_policy(&self, classifier: RetryClassifier) -> RetryPolicy {
        RetryPolicy::new(
            self.max_retries,
            Duration::from_millis(self.base_retry_delay_ms),
            classifier,
        )
    }
}

/// Retryable error signals.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// HTTP status codes (digits only) and case-insensitive phrases that mark
    /// a failure as transient
    pub signals: Vec<String>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            signals: DEFAULT_RETRY_SIGNALS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl RetryConfig {
    /// Classifier built from the configured signals.
    pub fn classifier(&self) -> RetryClassifier {
        RetryClassifier::new(self.signals.iter().cloned())
    }
}

/// Signals used to turn the last error of a failed chain into a user-facing
/// category.
///
/// As with [`RetryConfig::signals`], a digits-only entry is an HTTP status
/// code and anything else is a phrase; see [`crate::SignalSet`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct FailureSignals {
    /// Content policy rejections
    pub safety_signals: Vec<String>,
    /// Authorization problems
    pub permission_signals: Vec<String>,
    /// Rate limits and quota exhaustion
    pub quota_signals: Vec<String>,
}

impl Default for FailureSignals {
    fn default() -> Self {
        let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        Self {
            safety_signals: owned(&["blocked", "safety", "400", "invalid argument"]),
            permission_signals: owned(&["403", "401", "permission", "api key not valid"]),
            quota_signals: owned(&["429", "quota", "resource exhausted", "resource_exhausted"]),
        }
    }
}

/// Script analysis settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Model used to split scripts into scenes
    pub model: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
        }
    }
}

/// Image provider backends.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Deserialize,
    Serialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ProviderKind {
    /// Gemini generateContent with image output
    Gemini,
    /// Imagen predict endpoint
    Imagen,
}

/// One entry of the provider chain, in priority order.
///
/// ```toml
/// [[providers]]
/// name = "imagen-fast"
/// kind = "imagen"
/// model = "imagen-4.0-fast-generate-001"
/// requests_per_minute = 10
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProviderSpec {
    /// Name used in logs and failure reports
    pub name: String,

    /// Backend
    pub kind: ProviderKind,

    /// Model identifier
    pub model: String,

    /// Requests-per-minute guard for this provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requests_per_minute: Option<u32>,

    /// Retry signals for this provider, replacing `[retry] signals`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_signals: Option<Vec<String>>,
}

impl ProviderSpec {
    /// Retry policy for this provider.
    pub fn retry_policy(&self, generation: &GenerationConfig, retry: &RetryConfig) -> RetryPolicy {
        let classifier = match &self.retry_signals {
            Some(signals) => RetryClassifier::new(signals.iter().cloned()),
            None => retry.classifier(),
        };
        generation.retry_policy(classifier)
    }
}

/// Top-level configuration.
///
/// # Example
///
/// ```no_run
/// use storyboard_rate_limit::StoryboardConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = StoryboardConfig::load()?;
/// println!("First provider: {}", config.providers[0].name);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
pub struct StoryboardConfig {
    /// Batch and retry settings
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Retryable error signals
    #[serde(default)]
    pub retry: RetryConfig,

    /// Final failure categorization
    #[serde(default)]
    pub failure: FailureSignals,

    /// Script analysis
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Provider chain in priority order
    #[serde(default)]
    pub providers: Vec<ProviderSpec>,

    /// Prompt fragments
    #[serde(default)]
    pub prompt: PromptTemplate,
}

impl StoryboardConfig {
    /// Load configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> StoryboardResult<Self> {
        debug!("Loading configuration from file");

        let config: Self = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                StoryboardError::from(ConfigError::new(format!(
                    "Failed to read configuration from {}: {}",
                    path.as_ref().display(),
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                StoryboardError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration with precedence: current dir > home dir > bundled defaults.
    ///
    /// User config files are optional and silently skipped if missing.
    #[instrument]
    pub fn load() -> StoryboardResult<Self> {
        debug!("Loading configuration with precedence: current dir > home dir > bundled defaults");

        const DEFAULT_CONFIG: &str = include_str!("../../../storyboard.toml");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/storyboard/storyboard.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("storyboard").required(false));

        let config: Self = builder
            .build()
            .map_err(|e| {
                StoryboardError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                StoryboardError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Check invariants the loader cannot express.
    ///
    /// # Errors
    ///
    /// Fails when no provider is configured, when `max_scenes` is zero, or
    /// when two providers share a name.
    pub fn validate(&self) -> StoryboardResult<()> {
        if self.providers.is_empty() {
            return Err(ConfigError::new("At least one [[providers]] entry is required").into());
        }
        if self.generation.max_scenes == 0 {
            return Err(ConfigError::new("generation.max_scenes must be at least 1").into());
        }
        for (index, provider) in self.providers.iter().enumerate() {
            if provider.model.trim().is_empty() {
                return Err(ConfigError::new(format!(
                    "Provider '{}' has no model",
                    provider.name
                ))
                .into());
            }
            if self.providers[..index]
                .iter()
                .any(|other| other.name == provider.name)
            {
                return Err(ConfigError::new(format!(
                    "Duplicate provider name '{}'",
                    provider.name
                ))
                .into());
            }
        }
        Ok(())
    }

    /// Delay between consecutive scenes.
    pub fn pacing_delay(&self) -> Duration {
        self.generation.pacing_delay()
    }
}
