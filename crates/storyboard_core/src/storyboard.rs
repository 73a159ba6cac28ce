//! The ordered scene collection.

use crate::{Scene, SceneDraft, SceneId, SceneStatus, Selection};
use serde::{Deserialize, Serialize};
use storyboard_error::{JsonError, StoryboardResult};
use tracing::{debug, warn};

/// Per-status scene counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, derive_getters::Getters)]
pub struct StatusCounts {
    /// Scenes not yet started (`IDLE` or `PENDING`)
    idle: usize,
    /// Scenes with a generation in flight
    in_flight: usize,
    /// Scenes with an image
    success: usize,
    /// Scenes that failed
    error: usize,
}

/// Ordered collection of scenes, index-stable by id.
///
/// The whole collection is replaced on every script analysis; individual scenes
/// are only mutated through [`Storyboard::get_mut`] by the queue processor.
///
/// # Examples
///
/// ```
/// use storyboard_core::{SceneDraft, SceneId, Storyboard};
///
/// let board = Storyboard::from_drafts(
///     vec![
///         SceneDraft::new("First.", "a field at dawn", true),
///         SceneDraft::new("Second.", "a city at night", false),
///     ],
///     10,
/// );
/// assert_eq!(board.len(), 2);
/// assert_eq!(board.scenes()[1].id(), &SceneId::from(2));
/// ```
///
/// Deserializing resets scenes that were saved mid-generation, so a loaded
/// storyboard never carries a `GENERATING` or `RETRYING` scene.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SceneList")]
pub struct Storyboard {
    scenes: Vec<Scene>,
}

#[derive(Deserialize)]
struct SceneList {
    scenes: Vec<Scene>,
}

impl From<SceneList> for Storyboard {
    fn from(list: SceneList) -> Self {
        let mut board = Self { scenes: list.scenes };
        let recovered = board.recover_interrupted();
        if recovered > 0 {
            warn!(recovered, "Reset scenes left in an inconsistent state");
        }
        board
    }
}

impl Storyboard {
    /// Create an empty storyboard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a storyboard from analyzer drafts.
    ///
    /// Ids are assigned sequentially from 1 in draft order. Drafts beyond
    /// `max_scenes` are dropped.
    pub fn from_drafts(drafts: impl IntoIterator<Item = SceneDraft>, max_scenes: usize) -> Self {
        let mut drafts: Vec<SceneDraft> = drafts.into_iter().collect();
        if drafts.len() > max_scenes {
            warn!(
                returned = drafts.len(),
                max_scenes, "Analyzer returned more scenes than allowed, truncating"
            );
            drafts.truncate(max_scenes);
        }

        let scenes = drafts
            .into_iter()
            .zip(1u32..)
            .map(|(draft, id)| Scene::from_draft(SceneId::from(id), draft))
            .collect();
        Self { scenes }
    }

    /// Parse a storyboard from JSON and recover any interrupted scenes.
    pub fn from_json(json: &str) -> StoryboardResult<Self> {
        Ok(serde_json::from_str(json)
            .map_err(|e| JsonError::new(format!("Failed to parse storyboard: {}", e)))?)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> StoryboardResult<String> {
        Ok(serde_json::to_string_pretty(self)
            .map_err(|e| JsonError::new(format!("Failed to serialize storyboard: {}", e)))?)
    }

    /// All scenes in collection order.
    pub fn scenes(&self) -> &[Scene] {
        &self.scenes
    }

    /// Number of scenes.
    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    /// True if there are no scenes.
    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    /// Look up a scene by id.
    pub fn get(&self, id: SceneId) -> Option<&Scene> {
        self.scenes.iter().find(|scene| *scene.id() == id)
    }

    /// Look up a scene by id for mutation.
    pub fn get_mut(&mut self, id: SceneId) -> Option<&mut Scene> {
        self.scenes.iter_mut().find(|scene| *scene.id() == id)
    }

    /// True if a scene with this id exists.
    pub fn contains(&self, id: SceneId) -> bool {
        self.get(id).is_some()
    }

    /// Ids of scenes in the given status, in collection order.
    pub fn ids_with_status(&self, status: SceneStatus) -> Vec<SceneId> {
        self.scenes
            .iter()
            .filter(|scene| *scene.status() == status)
            .map(|scene| *scene.id())
            .collect()
    }

    /// Ids of every `IDLE`, `PENDING` or `ERROR` scene, in collection order.
    pub fn default_targets(&self) -> Vec<SceneId> {
        self.scenes
            .iter()
            .filter(|scene| scene.status().is_default_target())
            .map(|scene| *scene.id())
            .collect()
    }

    /// Generation targets for a selection.
    ///
    /// A non-empty selection yields exactly the selected scenes in collection
    /// order, whatever their status. An empty selection falls back to
    /// [`Storyboard::default_targets`].
    pub fn resolve_targets(&self, selection: &Selection) -> Vec<SceneId> {
        if selection.is_empty() {
            debug!("No explicit selection, using default targets");
            return self.default_targets();
        }
        self.scenes
            .iter()
            .map(|scene| *scene.id())
            .filter(|id| selection.contains(*id))
            .collect()
    }

    /// Count scenes by status.
    pub fn counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for scene in &self.scenes {
            match scene.status() {
                SceneStatus::Idle | SceneStatus::Pending => counts.idle += 1,
                SceneStatus::Generating | SceneStatus::Retrying => counts.in_flight += 1,
                SceneStatus::Success => counts.success += 1,
                SceneStatus::Error => counts.error += 1,
            }
        }
        counts
    }

    /// Reset scenes left mid-generation by a crash, and normalize any scene
    /// whose fields disagree with its status.
    ///
    /// Returns the number of scenes changed.
    pub fn recover_interrupted(&mut self) -> usize {
        self.scenes
            .iter_mut()
            .map(Scene::reset_interrupted)
            .filter(|changed| *changed)
            .count()
    }
}
