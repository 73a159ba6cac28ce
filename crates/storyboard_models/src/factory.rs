//! Building providers from configuration.

use crate::{GeminiImageProvider, ImagenProvider};
use std::num::NonZeroU32;
use std::sync::Arc;
use storyboard_error::ProviderResult;
use storyboard_interface::ImageProvider;
use storyboard_rate_limit::{ProviderKind, ProviderQuota, ProviderSpec};

/// Build the provider described by `spec`.
///
/// A `requests_per_minute` of zero or none disables the quota guard.
///
/// # Errors
///
/// Returns an error if the API key is blank or the HTTP client cannot be built.
pub fn build_provider(spec: &ProviderSpec, api_key: &str) -> ProviderResult<Arc<dyn ImageProvider>> {
    let quota = spec
        .requests_per_minute
        .and_then(NonZeroU32::new)
        .map(ProviderQuota::per_minute);

    let provider: Arc<dyn ImageProvider> = match spec.kind {
        ProviderKind::Gemini => {
            let mut provider = GeminiImageProvider::new(&spec.name, &spec.model, api_key)?;
            if let Some(quota) = quota {
                provider = provider.with_quota(quota);
            }
            Arc::new(provider)
        }
        ProviderKind::Imagen => {
            let mut provider = ImagenProvider::new(&spec.name, &spec.model, api_key)?;
            if let Some(quota) = quota {
                provider = provider.with_quota(quota);
            }
            Arc::new(provider)
        }
    };

    tracing::debug!(name = %spec.name, kind = %spec.kind, model = %spec.model, "Built image provider");
    Ok(provider)
}
