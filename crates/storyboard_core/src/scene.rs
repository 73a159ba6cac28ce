//! Scene data model and its generation state machine.

use serde::{Deserialize, Serialize};

/// Stable scene identifier, assigned in script order starting at 1.
///
/// # Examples
///
/// ```
/// use storyboard_core::SceneId;
///
/// let id = SceneId::from(3);
/// assert_eq!(id.get(), 3);
/// assert_eq!(format!("{}", id), "3");
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct SceneId(u32);

impl SceneId {
    /// Raw numeric id.
    pub fn get(self) -> u32 {
        self.0
    }
}

/// Generation status of a scene.
///
/// `IDLE -> GENERATING -> {SUCCESS, ERROR}` on a first pass and
/// `ERROR -> RETRYING -> {SUCCESS, ERROR}` on a retry. `PENDING` is treated
/// exactly like `IDLE`. No state is terminal; any scene can be re-driven.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum SceneStatus {
    /// Eligible, never started
    #[default]
    Idle,
    /// Queued, not yet started
    Pending,
    /// First-pass generation in flight
    Generating,
    /// Image generated
    Success,
    /// Generation failed
    Error,
    /// Retry generation in flight
    Retrying,
}

impl SceneStatus {
    /// Whether a generation call is in flight for this status.
    pub fn is_in_flight(self) -> bool {
        matches!(self, SceneStatus::Generating | SceneStatus::Retrying)
    }

    /// Whether the scene is picked up when the user has no explicit selection.
    pub fn is_default_target(self) -> bool {
        matches!(
            self,
            SceneStatus::Idle | SceneStatus::Pending | SceneStatus::Error
        )
    }
}

/// Whether a batch is a first pass or a retry.
///
/// Retry mode marks scenes `RETRYING` instead of `GENERATING` and appends the
/// simplification modifier to the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GenerationMode {
    /// First pass
    #[default]
    Initial,
    /// Retry of earlier failures (or an explicit regeneration)
    Retry,
}

impl GenerationMode {
    /// True for [`GenerationMode::Retry`].
    pub fn is_retry(self) -> bool {
        matches!(self, GenerationMode::Retry)
    }

    /// Status a scene enters when its attempt starts in this mode.
    pub fn in_flight_status(self) -> SceneStatus {
        match self {
            GenerationMode::Initial => SceneStatus::Generating,
            GenerationMode::Retry => SceneStatus::Retrying,
        }
    }
}

/// Analyzer output for one shot, before an id is assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
#[serde(rename_all = "camelCase")]
pub struct SceneDraft {
    /// Source-language script text for this shot
    script_segment: String,
    /// Generation-ready visual description
    english_prompt: String,
    /// Whether the main character appears in the shot
    main_character_visible: bool,
}

impl SceneDraft {
    /// Create a new draft.
    pub fn new(
        script_segment: impl Into<String>,
        english_prompt: impl Into<String>,
        main_character_visible: bool,
    ) -> Self {
        Self {
            script_segment: script_segment.into(),
            english_prompt: english_prompt.into(),
            main_character_visible,
        }
    }
}

/// One storyboard shot.
///
/// `image_url` is set iff the status is `SUCCESS` and `error_msg` is set iff
/// the status is `ERROR`. Fields are private so that the transition methods
/// below are the only writers.
///
/// # Examples
///
/// ```
/// use storyboard_core::{GenerationMode, Scene, SceneDraft, SceneId, SceneStatus};
///
/// let mut scene = Scene::from_draft(SceneId::from(1), SceneDraft::new("Rain.", "A rainy street", false));
/// assert_eq!(*scene.status(), SceneStatus::Idle);
///
/// scene.begin(GenerationMode::Initial);
/// assert_eq!(*scene.status(), SceneStatus::Generating);
///
/// scene.fail("quota exhausted", GenerationMode::Initial);
/// assert_eq!(scene.error_msg().as_deref(), Some("quota exhausted"));
///
/// scene.begin(GenerationMode::Retry);
/// scene.succeed("data:image/png;base64,AAAA", GenerationMode::Retry);
/// assert_eq!(*scene.status(), SceneStatus::Success);
/// assert!(scene.error_msg().is_none());
/// assert_eq!(*scene.retry_count(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    /// Stable id, never reused
    id: SceneId,
    /// Source-language script text
    script_segment: String,
    /// Generation-ready visual description
    english_prompt: String,
    /// Selects the character fragment injected into the prompt
    main_character_visible: bool,
    /// Reference to the most recent artifact
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image_url: Option<String>,
    /// Current generation status
    #[serde(default)]
    status: SceneStatus,
    /// Human-readable failure description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error_msg: Option<String>,
    /// Completed retry attempts (informational)
    #[serde(default)]
    retry_count: u32,
}

impl Scene {
    /// Create an idle scene from an analyzer draft.
    pub fn from_draft(id: SceneId, draft: SceneDraft) -> Self {
        Self {
            id,
            script_segment: draft.script_segment,
            english_prompt: draft.english_prompt,
            main_character_visible: draft.main_character_visible,
            image_url: None,
            status: SceneStatus::Idle,
            error_msg: None,
            retry_count: 0,
        }
    }

    /// Enter `GENERATING` or `RETRYING`, clearing any previous result.
    pub fn begin(&mut self, mode: GenerationMode) {
        self.status = mode.in_flight_status();
        self.image_url = None;
        self.error_msg = None;
    }

    /// Record a generated artifact; overwrites any earlier reference.
    pub fn succeed(&mut self, image_url: impl Into<String>, mode: GenerationMode) {
        self.status = SceneStatus::Success;
        self.image_url = Some(image_url.into());
        self.error_msg = None;
        self.count_attempt(mode);
    }

    /// Record a terminal failure.
    pub fn fail(&mut self, error_msg: impl Into<String>, mode: GenerationMode) {
        self.status = SceneStatus::Error;
        self.image_url = None;
        self.error_msg = Some(error_msg.into());
        self.count_attempt(mode);
    }

    /// Reset a scene interrupted mid-generation (or otherwise inconsistent)
    /// to a state that satisfies the field invariant.
    ///
    /// Returns true if anything changed.
    pub fn reset_interrupted(&mut self) -> bool {
        let before = self.clone();
        match self.status {
            SceneStatus::Generating | SceneStatus::Retrying | SceneStatus::Pending => {
                self.status = SceneStatus::Idle;
                self.image_url = None;
                self.error_msg = None;
            }
            SceneStatus::Idle => {
                self.image_url = None;
                self.error_msg = None;
            }
            SceneStatus::Success => {
                self.error_msg = None;
                if self.image_url.is_none() {
                    self.status = SceneStatus::Idle;
                }
            }
            SceneStatus::Error => {
                self.image_url = None;
                if self.error_msg.is_none() {
                    self.error_msg = Some("Generation was interrupted.".to_string());
                }
            }
        }
        *self != before
    }

    fn count_attempt(&mut self, mode: GenerationMode) {
        if mode.is_retry() {
            self.retry_count = self.retry_count.saturating_add(1);
        }
    }
}
