//! Generated image artifacts.

/// Raw image returned by a provider, before it is stored.
#[derive(Clone, PartialEq, Eq, derive_getters::Getters)]
pub struct ImageArtifact {
    /// Encoded image bytes
    data: Vec<u8>,
    /// MIME type reported by the provider (e.g. `image/png`)
    mime_type: String,
    /// Name of the provider that produced the image
    provider: String,
}

impl ImageArtifact {
    /// Create a new artifact.
    pub fn new(data: Vec<u8>, mime_type: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            data,
            mime_type: mime_type.into(),
            provider: provider.into(),
        }
    }
}

impl std::fmt::Debug for ImageArtifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageArtifact")
            .field("bytes", &self.data.len())
            .field("mime_type", &self.mime_type)
            .field("provider", &self.provider)
            .finish()
    }
}
