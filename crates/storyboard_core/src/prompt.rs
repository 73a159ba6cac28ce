//! Generation prompt assembly.

use crate::{GenerationMode, Scene};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Text fragments combined with a scene's visual description to form the
/// final image prompt.
///
/// The wording is configuration; only the assembly order is fixed.
///
/// # Examples
///
/// ```
/// use storyboard_core::{GenerationMode, PromptTemplate, Scene, SceneDraft, SceneId};
///
/// let template = PromptTemplate::builder()
///     .main_character("A tall courier in a red coat.")
///     .no_main_character("No recurring characters.")
///     .style("Ink wash.")
///     .retry_modifier("Simplify the composition.")
///     .build()
///     .unwrap();
///
/// let scene = Scene::from_draft(SceneId::from(1), SceneDraft::new("...", "A bridge in fog", true));
/// let prompt = template.assemble(&scene, GenerationMode::Retry);
/// assert!(prompt.starts_with("A bridge in fog"));
/// assert!(prompt.contains("red coat"));
/// assert!(prompt.ends_with("Simplify the composition."));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[builder(setter(into), default)]
#[serde(default)]
pub struct PromptTemplate {
    /// Character definition used when the main character is visible
    pub main_character: String,
    /// Character definition used when the main character is absent
    pub no_main_character: String,
    /// Visual style fragment
    pub style: String,
    /// Content safety fragment
    pub safety: String,
    /// Things the image must not contain
    pub negative: String,
    /// Appended on retries to make the request easier to satisfy
    pub retry_modifier: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            main_character: "The main character appears in this shot and must look consistent with every other shot.".to_string(),
            no_main_character: "The main character does not appear in this shot.".to_string(),
            style: "Cinematic storyboard frame, consistent art direction, 16:9 composition.".to_string(),
            safety: "Family-friendly depiction, no graphic violence.".to_string(),
            negative: "No text, captions, watermarks or speech bubbles.".to_string(),
            retry_modifier: "Use a simpler composition with fewer details.".to_string(),
        }
    }
}

impl PromptTemplate {
    /// Create a builder.
    pub fn builder() -> PromptTemplateBuilder {
        PromptTemplateBuilder::default()
    }

    /// Assemble the full generation prompt for a scene.
    ///
    /// Order: scene description, character fragment chosen by
    /// `main_character_visible`, style, safety, negative constraints, and the
    /// retry modifier in retry mode. Empty fragments are skipped.
    pub fn assemble(&self, scene: &Scene, mode: GenerationMode) -> String {
        let character = if *scene.main_character_visible() {
            &self.main_character
        } else {
            &self.no_main_character
        };

        let mut fragments = vec![
            scene.english_prompt().trim(),
            character.trim(),
            self.style.trim(),
            self.safety.trim(),
            self.negative.trim(),
        ];
        if mode.is_retry() {
            fragments.push(self.retry_modifier.trim());
        }

        fragments
            .into_iter()
            .filter(|fragment| !fragment.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
