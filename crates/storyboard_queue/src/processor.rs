//! Sequential generation queue.

use crate::{BatchReport, ChainEvent, ProviderChain, QueueEvent};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use storyboard_core::{
    GenerationMode, PromptTemplate, SceneDraft, SceneId, SceneStatus, Selection, Storyboard,
};
use storyboard_error::{QueueError, QueueErrorKind, StoryboardErrorKind, StoryboardResult};
use storyboard_rate_limit::RateLimiter;
use storyboard_storage::ArtifactStore;
use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

const EVENT_CAPACITY: usize = 256;

/// Releases the active-batch flag when dropped.
struct ActiveGuard<'a>(&'a AtomicBool);

impl<'a> ActiveGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, QueueError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| Self(flag))
            .map_err(|_| QueueError::new(QueueErrorKind::BatchActive))
    }
}

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

enum ItemOutcome {
    Succeeded,
    Failed,
    Missing,
}

/// Drives scenes through generation, one at a time.
///
/// At most one batch runs at a time. Within a batch, scenes are processed in
/// the order given; between two scenes the processor waits for the pacing
/// delay, except after the last scene or once a stop was requested. A stop is
/// only observed between scenes, so the scene in flight always finishes.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use storyboard_core::{GenerationMode, Storyboard};
/// use storyboard_queue::{ProviderChain, QueueProcessor};
/// use storyboard_rate_limit::RateLimiter;
/// use storyboard_storage::DataUrlArtifactStore;
///
/// # async fn run(chain: ProviderChain, pacing: RateLimiter, board: Storyboard) -> storyboard_error::StoryboardResult<()> {
/// let processor = Arc::new(QueueProcessor::new(
///     board,
///     chain,
///     Arc::new(DataUrlArtifactStore::new()),
///     pacing,
///     Default::default(),
/// ));
///
/// let targets = processor.snapshot().default_targets();
/// let report = processor.start_generation(targets, GenerationMode::Initial).await?;
/// println!("{}", report);
/// # Ok(())
/// # }
/// ```
pub struct QueueProcessor {
    board: watch::Sender<Storyboard>,
    events: broadcast::Sender<QueueEvent>,
    chain: ProviderChain,
    store: Arc<dyn ArtifactStore>,
    pacing: RateLimiter,
    template: PromptTemplate,
    active: AtomicBool,
    cancel: Mutex<Option<(Uuid, CancellationToken)>>,
}

impl QueueProcessor {
    /// Create a processor owning `board`.
    pub fn new(
        board: Storyboard,
        chain: ProviderChain,
        store: Arc<dyn ArtifactStore>,
        pacing: RateLimiter,
        template: PromptTemplate,
    ) -> Self {
        let (board, _) = watch::channel(board);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            board,
            events,
            chain,
            store,
            pacing,
            template,
            active: AtomicBool::new(false),
            cancel: Mutex::new(None),
        }
    }

    /// Current storyboard.
    pub fn snapshot(&self) -> Storyboard {
        self.board.borrow().clone()
    }

    /// Watch the storyboard; every scene transition publishes a new value.
    pub fn subscribe(&self) -> watch::Receiver<Storyboard> {
        self.board.subscribe()
    }

    /// Follow batch progress.
    pub fn events(&self) -> broadcast::Receiver<QueueEvent> {
        self.events.subscribe()
    }

    /// Whether a batch is running.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Replace the whole scene collection with a fresh analysis.
    ///
    /// # Errors
    ///
    /// Fails with [`QueueErrorKind::BatchActive`] while a batch is running.
    #[instrument(skip_all, fields(drafts = drafts.len(), max_scenes = max_scenes))]
    pub fn replace_scenes(&self, drafts: Vec<SceneDraft>, max_scenes: usize) -> StoryboardResult<()> {
        self.replace_board(Storyboard::from_drafts(drafts, max_scenes))
    }

    /// Replace the whole storyboard, e.g. with one loaded from disk.
    ///
    /// # Errors
    ///
    /// Fails with [`QueueErrorKind::BatchActive`] while a batch is running.
    pub fn replace_board(&self, board: Storyboard) -> StoryboardResult<()> {
        let _guard = ActiveGuard::acquire(&self.active)?;
        info!(scenes = board.len(), "Storyboard replaced");
        self.board.send_replace(board);
        Ok(())
    }

    /// Request a cooperative stop of the running batch.
    ///
    /// The scene in flight finishes; no further scene is started. Returns
    /// false if no batch is running.
    pub fn request_stop(&self) -> bool {
        let current = match self.cancel.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        match current {
            Some((batch_id, token)) => {
                if !token.is_cancelled() {
                    info!(%batch_id, "Stop requested");
                    token.cancel();
                    self.emit(QueueEvent::StopRequested { batch_id });
                }
                true
            }
            None => false,
        }
    }

    /// Retry every scene currently in `ERROR`.
    ///
    /// # Errors
    ///
    /// Fails with [`QueueErrorKind::NoTargets`] if no scene is in `ERROR`.
    pub async fn retry_failed(&self) -> StoryboardResult<BatchReport> {
        let targets = self.board.borrow().ids_with_status(SceneStatus::Error);
        self.start_generation(targets, GenerationMode::Retry).await
    }

    /// Regenerate one scene in retry mode, whatever its status.
    pub async fn retry_one(&self, id: SceneId) -> StoryboardResult<BatchReport> {
        self.start_generation(vec![id], GenerationMode::Retry).await
    }

    /// Generate the selected scenes, or the default targets when nothing is selected.
    pub async fn start_selected(&self, selection: &Selection) -> StoryboardResult<BatchReport> {
        let targets = self.board.borrow().resolve_targets(selection);
        self.start_generation(targets, GenerationMode::Initial).await
    }

    /// Generate `targets` in order.
    ///
    /// # Errors
    ///
    /// - [`QueueErrorKind::BatchActive`] if another batch is running
    /// - [`QueueErrorKind::NoTargets`] if `targets` is empty
    /// - [`QueueErrorKind::UnknownScene`] if a target is not on the board
    ///
    /// Individual scene failures are not errors; they are recorded on the
    /// scene and in the returned report.
    #[instrument(skip(self, targets), fields(targets = targets.len()))]
    pub async fn start_generation(
        &self,
        targets: Vec<SceneId>,
        mode: GenerationMode,
    ) -> StoryboardResult<BatchReport> {
        let _guard = ActiveGuard::acquire(&self.active)?;

        if targets.is_empty() {
            return Err(QueueError::new(QueueErrorKind::NoTargets).into());
        }
        {
            let board = self.board.borrow();
            if let Some(missing) = targets.iter().find(|id| !board.contains(**id)) {
                return Err(QueueError::new(QueueErrorKind::UnknownScene(missing.get())).into());
            }
        }

        let batch_id = Uuid::new_v4();
        let token = CancellationToken::new();
        self.set_cancel(Some((batch_id, token.clone())));

        info!(%batch_id, total = targets.len(), "Batch started");
        self.emit(QueueEvent::BatchStarted {
            batch_id,
            mode,
            targets: targets.clone(),
        });

        let mut report = BatchReport::new(batch_id, mode);
        let total = targets.len();
        let mut next = 0;

        while next < total {
            if token.is_cancelled() {
                break;
            }
            let id = targets[next];
            next += 1;

            match self.process_item(batch_id, id, mode, next, total).await {
                ItemOutcome::Succeeded => report.record(id, true),
                ItemOutcome::Failed => report.record(id, false),
                ItemOutcome::Missing => warn!(scene_id = %id, "Scene disappeared from board"),
            }

            if next == total || token.is_cancelled() {
                break;
            }

            let delay_ms = self.pacing.delay().as_millis() as u64;
            self.emit(QueueEvent::Pacing { batch_id, delay_ms });
            tokio::select! {
                _ = self.pacing.wait() => {}
                _ = token.cancelled() => {
                    debug!(%batch_id, "Pacing interrupted by stop");
                    break;
                }
            }
        }

        report.finish(targets[next..].to_vec(), token.is_cancelled());
        self.set_cancel(None);

        info!(
            %batch_id,
            succeeded = report.succeeded().len(),
            failed = report.failed().len(),
            untouched = report.untouched().len(),
            stopped = *report.stopped(),
            "Batch finished"
        );
        self.emit(QueueEvent::BatchFinished(report.clone()));
        Ok(report)
    }

    #[instrument(skip_all, fields(%batch_id, scene_id = %id, position = position, total = total))]
    async fn process_item(
        &self,
        batch_id: Uuid,
        id: SceneId,
        mode: GenerationMode,
        position: usize,
        total: usize,
    ) -> ItemOutcome {
        let mut started = None;
        self.board.send_if_modified(|board| match board.get_mut(id) {
            Some(scene) => {
                scene.begin(mode);
                started = Some(scene.clone());
                true
            }
            None => false,
        });
        let Some(scene) = started else {
            return ItemOutcome::Missing;
        };

        self.emit(QueueEvent::SceneStarted {
            batch_id,
            scene_id: id,
            status: *scene.status(),
            position,
            total,
        });

        let prompt = self.template.assemble(&scene, mode);
        debug!(prompt_len = prompt.len(), "Prompt assembled");

        let observer = |event: ChainEvent| {
            self.emit(match event {
                ChainEvent::Retrying {
                    provider,
                    attempt,
                    delay_ms,
                } => QueueEvent::Retrying {
                    batch_id,
                    scene_id: id,
                    provider,
                    attempt,
                    delay_ms,
                },
                ChainEvent::ProviderFailed {
                    provider,
                    attempts,
                    exhausted,
                    message,
                } => QueueEvent::ProviderFailed {
                    batch_id,
                    scene_id: id,
                    provider,
                    attempts,
                    exhausted,
                    message,
                },
            })
        };

        let artifact = match self.chain.generate_observed(&prompt, &observer).await {
            Ok(artifact) => artifact,
            Err(err) => {
                let message = err.user_message();
                error!(kind = ?err.kind, provider = %err.provider, detail = %err.detail, "Scene failed");
                self.finish_failed(batch_id, id, mode, Some(err.kind), message);
                return ItemOutcome::Failed;
            }
        };

        let image_url = match self.store.store(id, &artifact).await {
            Ok(url) => url,
            Err(err) => {
                let detail = match err.kind() {
                    StoryboardErrorKind::Storage(storage) => storage.kind.to_string(),
                    other => other.to_string(),
                };
                error!(backend = self.store.backend_name(), %detail, "Storing image failed");
                let message = format!("The image was generated but could not be saved: {}", detail);
                self.finish_failed(batch_id, id, mode, None, message);
                return ItemOutcome::Failed;
            }
        };

        self.board.send_modify(|board| {
            if let Some(scene) = board.get_mut(id) {
                scene.succeed(image_url.clone(), mode);
            }
        });
        info!(provider = %artifact.provider(), "Scene succeeded");
        self.emit(QueueEvent::SceneSucceeded {
            batch_id,
            scene_id: id,
            provider: artifact.provider().clone(),
            image_url,
        });
        ItemOutcome::Succeeded
    }

    fn finish_failed(
        &self,
        batch_id: Uuid,
        id: SceneId,
        mode: GenerationMode,
        kind: Option<storyboard_error::GenerationErrorKind>,
        message: String,
    ) {
        self.board.send_modify(|board| {
            if let Some(scene) = board.get_mut(id) {
                scene.fail(message.clone(), mode);
            }
        });
        self.emit(QueueEvent::SceneFailed {
            batch_id,
            scene_id: id,
            kind,
            message,
        });
    }

    fn set_cancel(&self, value: Option<(Uuid, CancellationToken)>) {
        match self.cancel.lock() {
            Ok(mut guard) => *guard = value,
            Err(poisoned) => *poisoned.into_inner() = value,
        }
    }

    fn emit(&self, event: QueueEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

impl std::fmt::Debug for QueueProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueProcessor")
            .field("scenes", &self.board.borrow().len())
            .field("providers", &self.chain.names())
            .field("store", &self.store.backend_name())
            .field("pacing", &self.pacing.delay())
            .field("active", &self.is_active())
            .finish()
    }
}
