//! Gemini REST API data transfer objects.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// One part of a content turn: text or inline binary data.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    /// Text content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    /// Inline binary content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

impl Part {
    /// A text part.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    /// Consume the part, returning its inline data if any.
    pub fn into_inline_data(self) -> Option<InlineData> {
        self.inline_data
    }
}

/// Base64 payload with its MIME type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    /// MIME type, e.g. `image/png`
    mime_type: String,
    /// Base64-encoded bytes
    data: String,
}

/// A content turn.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, Getters)]
pub struct Content {
    /// `user` or `model`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    /// Parts of the turn
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    /// A user turn with a single text part.
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: Some("user".to_string()),
            parts: vec![Part::from_text(text)],
        }
    }

    /// Concatenated text of all parts.
    pub fn joined_text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect::<Vec<_>>()
            .join("")
    }

    /// Consume the turn, returning its parts.
    pub fn into_parts(self) -> Vec<Part> {
        self.parts
    }
}

/// `generationConfig` block of a `generateContent` request.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOptions {
    /// Requested output modalities, e.g. `["IMAGE"]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_modalities: Option<Vec<String>>,
    /// Requested MIME type for text output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    /// JSON schema the output must follow
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<serde_json::Value>,
    /// Sampling temperature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// `generateContent` request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    /// Conversation turns
    contents: Vec<Content>,
    /// System instruction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    /// Output options
    #[serde(default, skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationOptions>,
}

impl GenerateContentRequest {
    /// A single-prompt request asking for image output.
    pub fn image(prompt: &str) -> Self {
        Self {
            contents: vec![Content::user_text(prompt)],
            system_instruction: None,
            generation_config: Some(GenerationOptions {
                response_modalities: Some(vec!["IMAGE".to_string()]),
                ..GenerationOptions::default()
            }),
        }
    }

    /// A request for JSON output matching `schema`.
    pub fn structured(instruction: &str, input: &str, schema: serde_json::Value) -> Self {
        Self {
            contents: vec![Content::user_text(input)],
            system_instruction: Some(Content {
                role: None,
                parts: vec![Part::from_text(instruction)],
            }),
            generation_config: Some(GenerationOptions {
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(schema),
                temperature: Some(0.2),
                ..GenerationOptions::default()
            }),
        }
    }
}

/// One response candidate.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Generated content
    #[serde(default)]
    content: Option<Content>,
    /// Why generation stopped, e.g. `STOP` or `SAFETY`
    #[serde(default)]
    finish_reason: Option<String>,
}

impl Candidate {
    /// Split into content and finish reason.
    pub fn into_parts(self) -> (Option<Content>, Option<String>) {
        (self.content, self.finish_reason)
    }
}

/// Feedback on the prompt itself.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    /// Set when the prompt was blocked before generation
    #[serde(default)]
    block_reason: Option<String>,
}

/// `generateContent` response body.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    /// Candidates, usually one
    #[serde(default)]
    candidates: Vec<Candidate>,
    /// Prompt-level feedback
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

impl GenerateContentResponse {
    /// Reason the prompt was blocked, if it was.
    pub fn block_reason(&self) -> Option<&str> {
        self.prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
    }

    /// Concatenated text of the first candidate.
    pub fn first_text(&self) -> Option<String> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(Content::joined_text)
    }

    /// Consume the response, returning its candidates.
    pub fn into_candidates(self) -> Vec<Candidate> {
        self.candidates
    }
}

/// Imagen `predict` instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictInstance {
    /// Image prompt
    pub prompt: String,
}

/// Imagen `predict` parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictParameters {
    /// Number of images to generate
    pub sample_count: u32,
    /// Aspect ratio, e.g. `16:9`
    pub aspect_ratio: String,
}

/// Imagen `predict` request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictRequest {
    /// Prompts
    pub instances: Vec<PredictInstance>,
    /// Generation parameters
    pub parameters: PredictParameters,
}

impl PredictRequest {
    /// One 16:9 image for `prompt`.
    pub fn single(prompt: &str) -> Self {
        Self {
            instances: vec![PredictInstance {
                prompt: prompt.to_string(),
            }],
            parameters: PredictParameters {
                sample_count: 1,
                aspect_ratio: "16:9".to_string(),
            },
        }
    }
}

/// One Imagen prediction.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    /// Base64-encoded image
    #[serde(default)]
    bytes_base64_encoded: Option<String>,
    /// MIME type of the image
    #[serde(default)]
    mime_type: Option<String>,
    /// Responsible-AI filter reason when the image was withheld
    #[serde(default)]
    rai_filtered_reason: Option<String>,
}

/// Imagen `predict` response body.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, Getters)]
pub struct PredictResponse {
    /// Predictions; empty when every image was filtered
    #[serde(default)]
    predictions: Vec<Prediction>,
}

impl PredictResponse {
    /// Consume the response, returning its predictions.
    pub fn into_predictions(self) -> Vec<Prediction> {
        self.predictions
    }
}
