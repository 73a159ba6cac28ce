//! Gemini API clients for storyboard generation.
//!
//! # Image providers
//!
//! - [`GeminiImageProvider`]: `generateContent` with image output
//! - [`ImagenProvider`]: Imagen `predict`
//!
//! # Script analysis
//!
//! - [`GeminiScriptAnalyzer`]: splits a script into scene drafts using
//!   structured JSON output
//!
//! # Example
//!
//! ```no_run
//! use storyboard_interface::ImageProvider;
//! use storyboard_models::ImagenProvider;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = ImagenProvider::new("imagen", "imagen-4.0-generate-001", "my-key")?;
//! let artifact = provider.generate("A lighthouse at dusk").await?;
//! println!("{} bytes of {}", artifact.data().len(), artifact.mime_type());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod analyzer;
mod credentials;
mod dto;
mod extraction;
mod factory;
mod gemini_image;
mod http;
mod imagen;

pub use analyzer::{GeminiScriptAnalyzer, parse_scene_drafts};
pub use credentials::{API_KEY_ENV, resolve_api_key};
pub use dto::{
    Candidate, Content, GenerateContentRequest, GenerateContentResponse, GenerationOptions, InlineData, Part,
    PredictInstance, PredictParameters, PredictRequest, PredictResponse, Prediction,
    PromptFeedback,
};
pub use extraction::extract_json;
pub use factory::build_provider;
pub use gemini_image::{GeminiImageProvider, parse_generate_content_image};
pub use http::{GEMINI_API_BASE, describe_api_error};
pub use imagen::{ImagenProvider, parse_predict_image};
