//! Retry, pacing and configuration for storyboard generation.
//!
//! This crate provides:
//! - [`RetryPolicy`]: exponential backoff around a single provider call
//! - [`RetryClassifier`]: decides which failures are transient
//! - [`RateLimiter`]: fixed spacing between consecutive queue items
//! - [`ProviderQuota`]: per-provider requests-per-minute guard backed by `governor`
//! - [`StoryboardConfig`]: layered TOML configuration
//!
//! All waiting goes through the [`Sleeper`] trait so tests can observe the
//! exact delays without sleeping.

#![forbid(unsafe_code)]

mod classifier;
mod config;
mod pacing;
mod quota;
mod retry;
mod sleeper;

pub use classifier::{DEFAULT_RETRY_SIGNALS, RetryClassifier, SignalSet};
pub use config::{
    AnalysisConfig, FailureSignals, GenerationConfig, ProviderKind, ProviderSpec, RetryConfig,
    StoryboardConfig,
};
pub use pacing::RateLimiter;
pub use quota::ProviderQuota;
pub use retry::{RetryFailure, RetryPolicy};
pub use sleeper::{Sleeper, TokioSleeper};
