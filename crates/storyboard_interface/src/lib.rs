//! Trait definitions for the external collaborators of the storyboard engine.
//!
//! - [`ImageProvider`]: one image-generation backend in the provider chain
//! - [`ScriptAnalyzer`]: one-shot conversion of script text into scene drafts

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod traits;

pub use traits::{ImageProvider, ScriptAnalyzer};
