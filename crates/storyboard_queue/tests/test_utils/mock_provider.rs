//! Mock image provider and artifact store.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use storyboard_core::{ImageArtifact, SceneId};
use storyboard_error::{
    ProviderError, ProviderErrorKind, ProviderResult, StorageError, StorageErrorKind,
    StoryboardResult,
};
use storyboard_interface::ImageProvider;
use storyboard_storage::ArtifactStore;
use tokio::sync::Notify;

/// A single scripted response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    Image,
    Error(ProviderErrorKind),
}

impl MockResponse {
    pub fn http(status_code: u16, message: &str) -> Self {
        Self::Error(ProviderErrorKind::HttpError {
            status_code,
            message: message.to_string(),
        })
    }
}

/// Holds one call open until released.
#[derive(Debug, Clone, Default)]
pub struct Gate {
    pub entered: Arc<Notify>,
    pub release: Arc<Notify>,
}

/// Image provider that replays a response sequence; the last response repeats.
#[derive(Debug)]
pub struct MockImageProvider {
    name: String,
    responses: Vec<MockResponse>,
    prompts: Mutex<Vec<String>>,
    gate: Option<(usize, Gate)>,
}

impl MockImageProvider {
    pub fn sequence(name: &str, responses: Vec<MockResponse>) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            responses,
            prompts: Mutex::new(Vec::new()),
            gate: None,
        })
    }

    pub fn succeeding(name: &str) -> Arc<Self> {
        Self::sequence(name, vec![MockResponse::Image])
    }

    pub fn failing(name: &str, kind: ProviderErrorKind) -> Arc<Self> {
        Self::sequence(name, vec![MockResponse::Error(kind)])
    }

    /// Succeeding provider whose call number `on_call` (zero-based) waits on `gate`.
    pub fn gated(name: &str, on_call: usize, gate: Gate) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            responses: vec![MockResponse::Image],
            prompts: Mutex::new(Vec::new()),
            gate: Some((on_call, gate)),
        })
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageProvider for MockImageProvider {
    async fn generate(&self, prompt: &str) -> ProviderResult<ImageArtifact> {
        let index = {
            let mut prompts = self.prompts.lock().unwrap();
            prompts.push(prompt.to_string());
            prompts.len() - 1
        };

        if let Some((on_call, gate)) = &self.gate {
            if *on_call == index {
                gate.entered.notify_one();
                gate.release.notified().await;
            }
        }

        let response = self
            .responses
            .get(index)
            .or_else(|| self.responses.last())
            .cloned()
            .unwrap_or(MockResponse::Image);

        match response {
            MockResponse::Image => Ok(ImageArtifact::new(
                format!("{}#{}", self.name, index).into_bytes(),
                "image/png",
                self.name.clone(),
            )),
            MockResponse::Error(kind) => Err(ProviderError::new(kind)),
        }
    }

    fn provider_name(&self) -> &str {
        &self.name
    }
}

/// Store whose writes always fail.
#[derive(Debug, Default)]
pub struct FailingStore;

#[async_trait]
impl ArtifactStore for FailingStore {
    async fn store(&self, _scene: SceneId, _artifact: &ImageArtifact) -> StoryboardResult<String> {
        Err(StorageError::new(StorageErrorKind::FileWrite("disk full".to_string())).into())
    }

    async fn retrieve(&self, url: &str) -> StoryboardResult<Vec<u8>> {
        Err(StorageError::new(StorageErrorKind::NotFound(url.to_string())).into())
    }

    fn backend_name(&self) -> &str {
        "failing"
    }
}
