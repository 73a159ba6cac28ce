//! Gemini image generation through `generateContent`.

use crate::http::{GEMINI_API_BASE, HttpFailure, build_client, post_json};
use crate::{GenerateContentRequest, GenerateContentResponse};
use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use storyboard_core::ImageArtifact;
use storyboard_error::{ProviderError, ProviderErrorKind, ProviderResult};
use storyboard_interface::ImageProvider;
use storyboard_rate_limit::ProviderQuota;
use tracing::{debug, instrument};

/// Finish reasons that mean the output was withheld by a content filter.
const BLOCKING_FINISH_REASONS: &[&str] = &[
    "SAFETY",
    "IMAGE_SAFETY",
    "PROHIBITED_CONTENT",
    "BLOCKLIST",
    "SPII",
];

/// Image provider backed by a Gemini image model.
#[derive(Debug, Clone)]
pub struct GeminiImageProvider {
    name: String,
    model: String,
    api_key: String,
    base_url: String,
    client: reqwest::Client,
    quota: Option<ProviderQuota>,
}

impl GeminiImageProvider {
    /// Create a provider for `model`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is blank or the HTTP client cannot be built.
    #[instrument(skip_all)]
    pub fn new(
        name: impl AsRef<str>,
        model: impl AsRef<str>,
        api_key: impl Into<String>,
    ) -> ProviderResult<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ProviderError::new(ProviderErrorKind::MissingApiKey));
        }
        let client = build_client()
            .map_err(|e| ProviderError::new(ProviderErrorKind::ClientCreation(e.to_string())))?;

        Ok(Self {
            name: name.as_ref().to_string(),
            model: model.as_ref().to_string(),
            api_key,
            base_url: GEMINI_API_BASE.to_string(),
            client,
            quota: None,
        })
    }

    /// Point the provider at a different API host.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Guard calls with a requests-per-minute quota.
    pub fn with_quota(mut self, quota: ProviderQuota) -> Self {
        self.quota = Some(quota);
        self
    }

    /// Model identifier.
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ImageProvider for GeminiImageProvider {
    #[instrument(skip(self, prompt), fields(provider = %self.name, model = %self.model, prompt_len = prompt.len()))]
    async fn generate(&self, prompt: &str) -> ProviderResult<ImageArtifact> {
        if let Some(quota) = &self.quota {
            quota.until_ready().await;
        }

        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let body = GenerateContentRequest::image(prompt);
        let text = post_json(&self.client, &url, &self.api_key, &body)
            .await
            .map_err(provider_error)?;

        let artifact = parse_generate_content_image(&self.name, &text)?;
        debug!(bytes = artifact.data().len(), mime_type = %artifact.mime_type(), "Received image");
        Ok(artifact)
    }

    fn provider_name(&self) -> &str {
        &self.name
    }
}

#[track_caller]
pub(crate) fn provider_error(failure: HttpFailure) -> ProviderError {
    match failure {
        HttpFailure::Transport(message) => {
            ProviderError::new(ProviderErrorKind::ApiRequest(message))
        }
        HttpFailure::Status {
            status_code,
            message,
        } => ProviderError::new(ProviderErrorKind::HttpError {
            status_code,
            message,
        }),
    }
}

#[track_caller]
pub(crate) fn decode_image(
    provider: &str,
    mime_type: &str,
    data: &str,
) -> ProviderResult<ImageArtifact> {
    let bytes = STANDARD
        .decode(data.trim())
        .map_err(|e| ProviderError::new(ProviderErrorKind::Base64Decode(e.to_string())))?;
    if bytes.is_empty() {
        return Err(ProviderError::new(ProviderErrorKind::NoImage(
            "image payload was empty".to_string(),
        )));
    }
    Ok(ImageArtifact::new(bytes, mime_type, provider))
}

/// Extract the first inline image from a `generateContent` response body.
///
/// A blocked prompt or a safety finish reason becomes
/// [`ProviderErrorKind::Blocked`]; a response with no image part becomes
/// [`ProviderErrorKind::NoImage`], carrying any text the model returned.
///
/// # Examples
///
/// ```
/// use storyboard_models::parse_generate_content_image;
///
/// let body = r#"{"candidates":[{"content":{"parts":[
///     {"inlineData":{"mimeType":"image/png","data":"aGVsbG8="}}
/// ]},"finishReason":"STOP"}]}"#;
/// let artifact = parse_generate_content_image("gemini", body).unwrap();
/// assert_eq!(artifact.data(), b"hello");
/// ```
pub fn parse_generate_content_image(provider: &str, body: &str) -> ProviderResult<ImageArtifact> {
    let response: GenerateContentResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::new(ProviderErrorKind::InvalidResponse(e.to_string())))?;

    if let Some(reason) = response.block_reason() {
        return Err(ProviderError::new(ProviderErrorKind::Blocked(format!(
            "prompt blocked: {}",
            reason
        ))));
    }

    let mut finish_reasons = Vec::new();
    let mut model_text = String::new();
    for candidate in response.into_candidates() {
        let (content, finish_reason) = candidate.into_parts();
        if let Some(content) = content {
            model_text.push_str(&content.joined_text());
            for part in content.into_parts() {
                if let Some(inline) = part.into_inline_data() {
                    return decode_image(provider, inline.mime_type(), inline.data());
                }
            }
        }
        finish_reasons.extend(finish_reason);
    }

    if let Some(reason) = finish_reasons
        .iter()
        .find(|r| BLOCKING_FINISH_REASONS.contains(&r.as_str()))
    {
        return Err(ProviderError::new(ProviderErrorKind::Blocked(format!(
            "finish reason {}",
            reason
        ))));
    }

    let detail = if model_text.trim().is_empty() {
        format!("finish reasons: {}", finish_reasons.join(", "))
    } else {
        model_text.trim().to_string()
    };
    Err(ProviderError::new(ProviderErrorKind::NoImage(detail)))
}
