//! Script analysis with Gemini structured output.

use crate::http::{GEMINI_API_BASE, HttpFailure, build_client, post_json};
use crate::{GenerateContentRequest, GenerateContentResponse, extract_json};
use async_trait::async_trait;
use serde_json::json;
use storyboard_core::SceneDraft;
use storyboard_error::{AnalysisError, AnalysisErrorKind, AnalysisResult};
use storyboard_interface::ScriptAnalyzer;
use tracing::{debug, info, instrument, warn};

const INSTRUCTION: &str = "You are a storyboard artist. Split the user's script into consecutive shots. \
For every shot return: scriptSegment, the exact script text the shot covers, in the script's original language; \
englishPrompt, a concrete visual description in English suitable for an image model, describing setting, action, \
framing and lighting without naming real people; mainCharacterVisible, true if the script's protagonist appears in the frame. \
Cover the whole script in order and do not invent events.";

/// Script analyzer backed by a Gemini text model.
#[derive(Debug, Clone)]
pub struct GeminiScriptAnalyzer {
    model: String,
    api_key: String,
    base_url: String,
    max_scenes: usize,
    client: reqwest::Client,
}

impl GeminiScriptAnalyzer {
    /// Create an analyzer for `model`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is blank or the HTTP client cannot be built.
    #[instrument(skip_all)]
    pub fn new(model: impl Into<String>, api_key: impl Into<String>) -> AnalysisResult<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(AnalysisError::new(AnalysisErrorKind::MissingApiKey));
        }
        let client = build_client()
            .map_err(|e| AnalysisError::new(AnalysisErrorKind::Request(e.to_string())))?;

        Ok(Self {
            model: model.into(),
            api_key,
            base_url: GEMINI_API_BASE.to_string(),
            max_scenes: 40,
            client,
        })
    }

    /// Ask the model for at most `max_scenes` shots.
    pub fn with_max_scenes(mut self, max_scenes: usize) -> Self {
        self.max_scenes = max_scenes.max(1);
        self
    }

    /// Point the analyzer at a different API host.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn instruction(&self) -> String {
        format!(
            "{} Produce at most {} shots; merge neighbouring lines if needed.",
            INSTRUCTION, self.max_scenes
        )
    }
}

/// Schema for the analyzer's JSON output.
fn scene_schema() -> serde_json::Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "scriptSegment": { "type": "STRING" },
                "englishPrompt": { "type": "STRING" },
                "mainCharacterVisible": { "type": "BOOLEAN" }
            },
            "required": ["scriptSegment", "englishPrompt", "mainCharacterVisible"],
            "propertyOrdering": ["scriptSegment", "englishPrompt", "mainCharacterVisible"]
        }
    })
}

#[async_trait]
impl ScriptAnalyzer for GeminiScriptAnalyzer {
    #[instrument(skip(self, script), fields(model = %self.model, script_len = script.len()))]
    async fn analyze(&self, script: &str) -> AnalysisResult<Vec<SceneDraft>> {
        if script.trim().is_empty() {
            return Err(AnalysisError::new(AnalysisErrorKind::EmptyScript));
        }

        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let body = GenerateContentRequest::structured(&self.instruction(), script, scene_schema());
        let text = post_json(&self.client, &url, &self.api_key, &body)
            .await
            .map_err(|failure| match failure {
                HttpFailure::Transport(message) => {
                    AnalysisError::new(AnalysisErrorKind::Request(message))
                }
                HttpFailure::Status {
                    status_code,
                    message,
                } => AnalysisError::new(AnalysisErrorKind::HttpError {
                    status_code,
                    message,
                }),
            })?;

        let response: GenerateContentResponse = serde_json::from_str(&text)
            .map_err(|e| AnalysisError::new(AnalysisErrorKind::Parse(e.to_string())))?;
        if let Some(reason) = response.block_reason() {
            warn!(reason, "Script analysis was blocked");
            return Err(AnalysisError::new(AnalysisErrorKind::Request(format!(
                "script blocked: {}",
                reason
            ))));
        }
        let output = response
            .first_text()
            .ok_or_else(|| AnalysisError::new(AnalysisErrorKind::NoScenes))?;
        debug!(output_len = output.len(), "Received analysis output");

        let drafts = parse_scene_drafts(&output)?;
        info!(scenes = drafts.len(), "Script analyzed");
        Ok(drafts)
    }
}

/// Parse analyzer output into scene drafts.
///
/// Accepts a bare array or an object with a `scenes` array, optionally
/// wrapped in a markdown fence.
///
/// # Errors
///
/// Fails if the text is not JSON, does not match the scene shape, or holds no scenes.
///
/// # Examples
///
/// ```
/// use storyboard_models::parse_scene_drafts;
///
/// let output = r#"```json
/// [{"scriptSegment": "Он вошёл.", "englishPrompt": "A man enters a dark room", "mainCharacterVisible": true}]
/// ```"#;
/// let drafts = parse_scene_drafts(output).unwrap();
/// assert_eq!(drafts[0].english_prompt(), "A man enters a dark room");
/// ```
pub fn parse_scene_drafts(output: &str) -> AnalysisResult<Vec<SceneDraft>> {
    let payload = extract_json(output);
    let value: serde_json::Value = serde_json::from_str(payload)
        .map_err(|e| AnalysisError::new(AnalysisErrorKind::Parse(e.to_string())))?;

    let scenes = match value {
        serde_json::Value::Object(mut map) => map
            .remove("scenes")
            .ok_or_else(|| AnalysisError::new(AnalysisErrorKind::Schema("missing 'scenes'".into())))?,
        other => other,
    };

    let drafts: Vec<SceneDraft> = serde_json::from_value(scenes)
        .map_err(|e| AnalysisError::new(AnalysisErrorKind::Schema(e.to_string())))?;

    let drafts: Vec<SceneDraft> = drafts
        .into_iter()
        .filter(|d| !d.english_prompt().trim().is_empty())
        .collect();

    if drafts.is_empty() {
        return Err(AnalysisError::new(AnalysisErrorKind::NoScenes));
    }
    Ok(drafts)
}
