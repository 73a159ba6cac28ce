//! Core data types for the storyboard generation engine.
//!
//! A [`Storyboard`] is an ordered collection of [`Scene`]s produced by script
//! analysis. Each scene moves through the [`SceneStatus`] state machine as the
//! queue processor generates its image; the transition methods on [`Scene`] are
//! the only way to change generation state.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod artifact;
mod prompt;
mod scene;
mod selection;
mod storyboard;

pub use artifact::ImageArtifact;
pub use prompt::{PromptTemplate, PromptTemplateBuilder};
pub use scene::{GenerationMode, Scene, SceneDraft, SceneId, SceneStatus};
pub use selection::Selection;
pub use storyboard::{StatusCounts, Storyboard};
