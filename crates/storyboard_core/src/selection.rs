//! Explicit user selection of scenes.

use crate::{SceneId, Storyboard};
use std::collections::BTreeSet;

/// Set of scene ids the user picked for generation.
///
/// Order is not tracked here; targets are always produced in storyboard order
/// by [`Storyboard::resolve_targets`].
///
/// # Examples
///
/// ```
/// use storyboard_core::{SceneId, Selection};
///
/// let mut selection = Selection::new();
/// selection.toggle(SceneId::from(2));
/// selection.toggle(SceneId::from(5));
/// selection.toggle(SceneId::from(2));
/// assert!(!selection.contains(SceneId::from(2)));
/// assert!(selection.contains(SceneId::from(5)));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: BTreeSet<SceneId>,
}

impl Selection {
    /// Create an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a scene.
    pub fn select(&mut self, id: SceneId) {
        self.ids.insert(id);
    }

    /// Remove a scene.
    pub fn deselect(&mut self, id: SceneId) {
        self.ids.remove(&id);
    }

    /// Flip membership of a scene.
    pub fn toggle(&mut self, id: SceneId) {
        if !self.ids.remove(&id) {
            self.ids.insert(id);
        }
    }

    /// Select every scene of the storyboard.
    pub fn select_all(&mut self, board: &Storyboard) {
        self.ids.extend(board.scenes().iter().map(|scene| *scene.id()));
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Drop ids that no longer exist, e.g. after the storyboard was replaced.
    pub fn retain_existing(&mut self, board: &Storyboard) {
        self.ids.retain(|id| board.contains(*id));
    }

    /// Membership test.
    pub fn contains(&self, id: SceneId) -> bool {
        self.ids.contains(&id)
    }

    /// True if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Number of selected ids.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Selected ids in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = SceneId> + '_ {
        self.ids.iter().copied()
    }
}

impl FromIterator<SceneId> for Selection {
    fn from_iter<I: IntoIterator<Item = SceneId>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}
