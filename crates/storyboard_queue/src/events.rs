//! Batch progress events and reports.

use derive_getters::Getters;
use serde::Serialize;
use storyboard_core::{GenerationMode, SceneId, SceneStatus};
use storyboard_error::GenerationErrorKind;
use uuid::Uuid;

/// Progress of a generation batch, in the order it happened.
///
/// Delivered on a broadcast channel; a subscriber that falls behind loses the
/// oldest events instead of slowing the processor down.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum QueueEvent {
    /// A batch began.
    #[display("Batch {} started: {} scene(s), {:?} mode", batch_id, targets.len(), mode)]
    BatchStarted {
        /// Batch id
        batch_id: Uuid,
        /// First pass or retry
        mode: GenerationMode,
        /// Scenes in processing order
        targets: Vec<SceneId>,
    },
    /// A scene entered `GENERATING` or `RETRYING`.
    #[display("Scene {} {} ({}/{})", scene_id, status, position, total)]
    SceneStarted {
        /// Batch id
        batch_id: Uuid,
        /// Scene id
        scene_id: SceneId,
        /// Status entered
        status: SceneStatus,
        /// One-based position in the batch
        position: usize,
        /// Batch size
        total: usize,
    },
    /// A provider is called again after a transient failure.
    #[display("Scene {}: retrying {} (attempt {}) after {}ms", scene_id, provider, attempt, delay_ms)]
    Retrying {
        /// Batch id
        batch_id: Uuid,
        /// Scene id
        scene_id: SceneId,
        /// Provider name
        provider: String,
        /// Attempt number, starting at 2
        attempt: u32,
        /// Backoff waited
        delay_ms: u64,
    },
    /// A provider gave up on a scene.
    #[display("Scene {}: provider {} failed after {} attempt(s): {}", scene_id, provider, attempts, message)]
    ProviderFailed {
        /// Batch id
        batch_id: Uuid,
        /// Scene id
        scene_id: SceneId,
        /// Provider name
        provider: String,
        /// Attempts made
        attempts: u32,
        /// Retry budget ran out
        exhausted: bool,
        /// Last error text
        message: String,
    },
    /// A scene's image was generated and stored.
    #[display("Scene {} done via {}", scene_id, provider)]
    SceneSucceeded {
        /// Batch id
        batch_id: Uuid,
        /// Scene id
        scene_id: SceneId,
        /// Provider that produced the image
        provider: String,
        /// Stored reference
        image_url: String,
    },
    /// A scene failed terminally.
    #[display("Scene {} failed: {}", scene_id, message)]
    SceneFailed {
        /// Batch id
        batch_id: Uuid,
        /// Scene id
        scene_id: SceneId,
        /// Chain failure category; `None` when storing the image failed
        kind: Option<GenerationErrorKind>,
        /// Message recorded on the scene
        message: String,
    },
    /// Waiting before the next scene.
    #[display("Waiting {}ms before next scene", delay_ms)]
    Pacing {
        /// Batch id
        batch_id: Uuid,
        /// Delay
        delay_ms: u64,
    },
    /// A stop was requested; the batch ends after the current scene.
    #[display("Stop requested for batch {}", batch_id)]
    StopRequested {
        /// Batch id
        batch_id: Uuid,
    },
    /// A batch ended.
    #[display("{}", _0)]
    BatchFinished(BatchReport),
}

/// Outcome of one batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Getters, derive_more::Display)]
#[display(
    "Batch {} finished: {} succeeded, {} failed, {} untouched{}",
    batch_id,
    succeeded.len(),
    failed.len(),
    untouched.len(),
    if *stopped { " (stopped)" } else { "" }
)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    /// Batch id
    batch_id: Uuid,
    /// First pass or retry
    mode: GenerationMode,
    /// Scenes processed, in order
    attempted: Vec<SceneId>,
    /// Scenes that ended in `SUCCESS`
    succeeded: Vec<SceneId>,
    /// Scenes that ended in `ERROR`
    failed: Vec<SceneId>,
    /// Targets never reached because of a stop
    untouched: Vec<SceneId>,
    /// Whether a stop was requested during the batch
    stopped: bool,
}

impl BatchReport {
    pub(crate) fn new(batch_id: Uuid, mode: GenerationMode) -> Self {
        Self {
            batch_id,
            mode,
            attempted: Vec::new(),
            succeeded: Vec::new(),
            failed: Vec::new(),
            untouched: Vec::new(),
            stopped: false,
        }
    }

    pub(crate) fn record(&mut self, scene_id: SceneId, success: bool) {
        self.attempted.push(scene_id);
        if success {
            self.succeeded.push(scene_id);
        } else {
            self.failed.push(scene_id);
        }
    }

    pub(crate) fn finish(&mut self, untouched: Vec<SceneId>, stopped: bool) {
        self.untouched = untouched;
        self.stopped = stopped;
    }
}
