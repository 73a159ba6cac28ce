//! Storyboard - script-to-storyboard image generation
//!
//! Storyboard turns a free-form script into an ordered list of scenes and
//! generates one image per scene, working through a priority-ordered chain of
//! image providers with per-provider retry, exponential backoff and a fixed
//! pacing delay between scenes.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use storyboard::{
//!     DataUrlArtifactStore, Engine, GeminiScriptAnalyzer, ScriptAnalyzer, Storyboard,
//!     StoryboardConfig,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = StoryboardConfig::load()?;
//!     let key = std::env::var("GEMINI_API_KEY")?;
//!
//!     let analyzer = GeminiScriptAnalyzer::new(config.analysis.model.clone(), key.clone())?;
//!     let drafts = analyzer.analyze("A lighthouse keeper climbs the stairs...").await?;
//!     let board = Storyboard::from_drafts(drafts, config.generation.max_scenes);
//!
//!     let engine = Engine::new(config, key);
//!     let processor = engine.processor(board, Arc::new(DataUrlArtifactStore::new()))?;
//!     let report = processor.start_selected(&Default::default()).await?;
//!     println!("{}", report);
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - `storyboard_core` - scenes, storyboard, selection, prompt template
//! - `storyboard_error` - error types
//! - `storyboard_interface` - `ImageProvider` and `ScriptAnalyzer` traits
//! - `storyboard_rate_limit` - retry wrapper, pacing, quotas, configuration
//! - `storyboard_storage` - artifact stores
//! - `storyboard_models` - Gemini and Imagen clients
//! - `storyboard_queue` - provider chain and queue processor
//!
//! This crate re-exports everything for convenience and adds the wiring the
//! CLI uses.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod engine;
mod export;
mod observability;

pub use engine::Engine;
pub use export::{SceneManifest, StoryboardManifest, export_images, shot_list, status_report};
pub use observability::{LoggingConfig, init_logging};

pub use storyboard_core::*;
pub use storyboard_error::*;
pub use storyboard_interface::*;
pub use storyboard_models::*;
pub use storyboard_queue::*;
pub use storyboard_rate_limit::*;
pub use storyboard_storage::*;
