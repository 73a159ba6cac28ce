//! Imagen image generation through `predict`.

use crate::gemini_image::{decode_image, provider_error};
use crate::http::{GEMINI_API_BASE, build_client, post_json};
use crate::{PredictRequest, PredictResponse};
use async_trait::async_trait;
use storyboard_core::ImageArtifact;
use storyboard_error::{ProviderError, ProviderErrorKind, ProviderResult};
use storyboard_interface::ImageProvider;
use storyboard_rate_limit::ProviderQuota;
use tracing::{debug, instrument};

/// Image provider backed by an Imagen model.
#[derive(Debug, Clone)]
pub struct ImagenProvider {
    name: String,
    model: String,
    api_key: String,
    base_url: String,
    client: reqwest::Client,
    quota: Option<ProviderQuota>,
}

impl ImagenProvider {
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
impl ImageProvider for ImagenProvider {
    #[instrument(skip(self, prompt), fields(provider = %self.name, model = %self.model, prompt_len = prompt.len()))]
    async fn generate(&self, prompt: &str) -> ProviderResult<ImageArtifact> {
        if let Some(quota) = &self.quota {
            quota.until_ready().await;
        }

        let url = format!("{}/models/{}:predict", self.base_url, self.model);
        let body = PredictRequest::single(prompt);
        let text = post_json(&self.client, &url, &self.api_key, &body)
            .await
            .map_err(provider_error)?;

        let artifact = parse_predict_image(&self.name, &text)?;
        debug!(bytes = artifact.data().len(), mime_type = %artifact.mime_type(), "Received image");
        Ok(artifact)
    }

    fn provider_name(&self) -> &str {
        &self.name
    }
}

/// Extract the first image from an Imagen `predict` response body.
///
/// Imagen drops filtered images from `predictions` instead of returning an
/// error, so an empty or fully filtered response is reported as
/// [`ProviderErrorKind::Blocked`].
///
/// # Examples
///
/// ```
/// use storyboard_models::parse_predict_image;
///
/// let body = r#"{"predictions":[{"bytesBase64Encoded":"aGVsbG8=","mimeType":"image/png"}]}"#;
/// let artifact = parse_predict_image("imagen", body).unwrap();
/// assert_eq!(artifact.mime_type(), "image/png");
///
/// assert!(parse_predict_image("imagen", "{}").is_err());
/// ```
pub fn parse_predict_image(provider: &str, body: &str) -> ProviderResult<ImageArtifact> {
    let response: PredictResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::new(ProviderErrorKind::InvalidResponse(e.to_string())))?;

    let mut filtered = Vec::new();
    for prediction in response.into_predictions() {
        if let Some(data) = prediction.bytes_base64_encoded() {
            let mime_type = prediction.mime_type().as_deref().unwrap_or("image/png");
            return decode_image(provider, mime_type, data);
        }
        if let Some(reason) = prediction.rai_filtered_reason() {
            filtered.push(reason.clone());
        }
    }

    let detail = if filtered.is_empty() {
        "no predictions returned".to_string()
    } else {
        filtered.join("; ")
    };
    Err(ProviderError::new(ProviderErrorKind::Blocked(detail)))
}
