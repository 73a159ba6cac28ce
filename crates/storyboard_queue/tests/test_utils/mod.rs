//! Test utilities for queue tests.
//!
//! Mock providers with scripted behaviour, a sleeper that records instead of
//! waiting, and board builders.

#![allow(dead_code)]

pub mod mock_provider;

pub use mock_provider::{FailingStore, Gate, MockImageProvider, MockResponse};

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use storyboard_core::{PromptTemplate, SceneDraft, SceneStatus, Storyboard};
use storyboard_interface::ImageProvider;
use storyboard_queue::{FailureClassifier, ProviderChain, ProviderEntry, QueueProcessor};
use storyboard_rate_limit::{RateLimiter, RetryClassifier, RetryPolicy, Sleeper};
use storyboard_storage::{ArtifactStore, DataUrlArtifactStore};

/// Records requested durations and returns immediately.
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    calls: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<Duration> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.calls.lock().unwrap().push(duration);
    }
}

/// Never wakes up.
#[derive(Debug, Default)]
pub struct PendingSleeper;

#[async_trait]
impl Sleeper for PendingSleeper {
    async fn sleep(&self, _duration: Duration) {
        std::future::pending::<()>().await;
    }
}

pub const PACING: Duration = Duration::from_millis(6000);
pub const BASE_DELAY: Duration = Duration::from_millis(1000);

pub fn template() -> PromptTemplate {
    PromptTemplate::builder()
        .main_character("HERO")
        .no_main_character("NO HERO")
        .style("STYLE")
        .safety("SAFE")
        .negative("NEGATIVE")
        .retry_modifier("SIMPLER")
        .build()
        .unwrap()
}

/// Board of `n` idle scenes with prompts `shot 1` .. `shot n`.
pub fn idle_board(n: u32) -> Storyboard {
    Storyboard::from_drafts(
        (1..=n).map(|i| SceneDraft::new(format!("segment {i}"), format!("shot {i}"), i % 2 == 1)),
        40,
    )
}

/// Board whose scenes start in the given statuses, ids from 1.
pub fn board_with_statuses(statuses: &[SceneStatus]) -> Storyboard {
    let scenes: Vec<String> = statuses
        .iter()
        .enumerate()
        .map(|(index, status)| {
            let id = index + 1;
            let result = match status {
                SceneStatus::Success => format!(r#", "imageUrl": "old://{id}""#),
                SceneStatus::Error => r#", "errorMsg": "earlier failure""#.to_string(),
                _ => String::new(),
            };
            format!(
                r#"{{"id": {id}, "scriptSegment": "segment {id}", "englishPrompt": "shot {id}", "mainCharacterVisible": true, "status": "{status}", "retryCount": 0{result}}}"#
            )
        })
        .collect();
    Storyboard::from_json(&format!(r#"{{"scenes": [{}]}}"#, scenes.join(","))).unwrap()
}

pub fn policy(max_retries: u32) -> RetryPolicy {
    RetryPolicy::new(max_retries, BASE_DELAY, RetryClassifier::default())
}

pub fn chain(
    providers: &[Arc<MockImageProvider>],
    max_retries: u32,
    sleeper: Arc<dyn Sleeper>,
) -> ProviderChain {
    let entries = providers
        .iter()
        .map(|p| ProviderEntry::new(p.clone() as Arc<dyn ImageProvider>, policy(max_retries)))
        .collect();
    ProviderChain::new(entries, FailureClassifier::default(), sleeper).unwrap()
}

pub struct Harness {
    pub processor: Arc<QueueProcessor>,
    pub retry_sleeper: Arc<RecordingSleeper>,
    pub pacing_sleeper: Arc<RecordingSleeper>,
}

/// Processor with recording sleepers for backoff and pacing, storing images as data URLs.
pub fn harness(board: Storyboard, providers: &[Arc<MockImageProvider>]) -> Harness {
    harness_with_store(board, providers, Arc::new(DataUrlArtifactStore::new()))
}

pub fn harness_with_store(
    board: Storyboard,
    providers: &[Arc<MockImageProvider>],
    store: Arc<dyn ArtifactStore>,
) -> Harness {
    let retry_sleeper = RecordingSleeper::new();
    let pacing_sleeper = RecordingSleeper::new();
    let processor = QueueProcessor::new(
        board,
        chain(providers, 2, retry_sleeper.clone()),
        store,
        RateLimiter::new(PACING, pacing_sleeper.clone()),
        template(),
    );
    Harness {
        processor: Arc::new(processor),
        retry_sleeper,
        pacing_sleeper,
    }
}

/// Assert the result-field invariant for every scene.
pub fn assert_invariant(board: &Storyboard) {
    for scene in board.scenes() {
        assert_eq!(
            scene.image_url().is_some(),
            *scene.status() == SceneStatus::Success,
            "image url / status mismatch on scene {}",
            scene.id()
        );
        assert_eq!(
            scene.error_msg().is_some(),
            *scene.status() == SceneStatus::Error,
            "error message / status mismatch on scene {}",
            scene.id()
        );
    }
    let in_flight = board
        .scenes()
        .iter()
        .filter(|s| s.status().is_in_flight())
        .count();
    assert!(in_flight <= 1, "{in_flight} scenes in flight");
}
