//! Generation orchestration for storyboards.
//!
//! - [`ProviderChain`]: ordered image providers, each wrapped in its own
//!   [`RetryPolicy`](storyboard_rate_limit::RetryPolicy), with classification of
//!   the final failure
//! - [`QueueProcessor`]: drains a batch of scenes one at a time, paced by a
//!   [`RateLimiter`](storyboard_rate_limit::RateLimiter), with cooperative stop
//!   at item boundaries
//!
//! The processor is the only writer of scene generation state. Readers take
//! snapshots through [`QueueProcessor::snapshot`] or watch changes with
//! [`QueueProcessor::subscribe`], and follow progress on the
//! [`QueueEvent`] stream.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod chain;
mod classify;
mod events;
mod processor;

pub use chain::{ChainEvent, ProviderChain, ProviderEntry};
pub use classify::FailureClassifier;
pub use events::{BatchReport, QueueEvent};
pub use processor::QueueProcessor;
