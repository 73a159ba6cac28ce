//! Presentation of a storyboard: export manifest, shot list, status table and
//! image files.

use serde::Serialize;
use std::fmt::Write;
use std::path::{Path, PathBuf};
use storyboard_core::{SceneId, SceneStatus, Storyboard};
use storyboard_error::{JsonError, StorageError, StorageErrorKind, StoryboardResult};
use storyboard_storage::{ArtifactStore, DataUrlArtifactStore, FileSystemArtifactStore, ImageFormat};
use tracing::{debug, info, instrument};

/// One scene in an export manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneManifest {
    /// Scene id
    pub id: SceneId,
    /// Source-language script text
    pub script_segment: String,
    /// Visual description sent to the providers
    pub english_prompt: String,
    /// Final status
    pub status: SceneStatus,
    /// Reference to the generated image, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Failure description, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_msg: Option<String>,
}

/// Export manifest for a whole storyboard.
///
/// # Examples
///
/// ```
/// use storyboard::{SceneDraft, Storyboard, StoryboardManifest};
///
/// let board = Storyboard::from_drafts(vec![SceneDraft::new("Dawn.", "a field at dawn", true)], 10);
/// let manifest = StoryboardManifest::from_board(&board);
/// assert_eq!(manifest.total, 1);
/// assert_eq!(manifest.completed, 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryboardManifest {
    /// Number of scenes
    pub total: usize,
    /// Scenes with an image
    pub completed: usize,
    /// Scenes that failed
    pub failed: usize,
    /// Scenes in storyboard order
    pub scenes: Vec<SceneManifest>,
}

impl StoryboardManifest {
    /// Build a manifest from the current storyboard.
    pub fn from_board(board: &Storyboard) -> Self {
        let counts = board.counts();
        let scenes = board
            .scenes()
            .iter()
            .map(|scene| SceneManifest {
                id: *scene.id(),
                script_segment: scene.script_segment().clone(),
                english_prompt: scene.english_prompt().clone(),
                status: *scene.status(),
                image_url: scene.image_url().clone(),
                error_msg: scene.error_msg().clone(),
            })
            .collect();
        Self {
            total: board.len(),
            completed: *counts.success(),
            failed: *counts.error(),
            scenes,
        }
    }

    /// Pretty-printed JSON.
    pub fn to_json_pretty(&self) -> StoryboardResult<String> {
        Ok(serde_json::to_string_pretty(self)
            .map_err(|e| JsonError::new(format!("Failed to serialize manifest: {}", e)))?)
    }
}

/// Plain-text shot list: one numbered block per scene.
pub fn shot_list(board: &Storyboard) -> String {
    let mut out = String::new();
    for scene in board.scenes() {
        let _ = writeln!(out, "Shot {}", scene.id());
        let _ = writeln!(out, "  Script: {}", scene.script_segment().trim());
        let _ = writeln!(out, "  Visual: {}", scene.english_prompt().trim());
        if *scene.main_character_visible() {
            let _ = writeln!(out, "  Main character in frame");
        }
        if let Some(url) = scene.image_url() {
            let _ = writeln!(out, "  Image: {}", abbreviate(url, 80));
        }
        out.push('\n');
    }
    out
}

/// Status counts followed by one line per scene.
pub fn status_report(board: &Storyboard) -> String {
    let counts = board.counts();
    let mut out = format!(
        "{} scenes: {} done, {} failed, {} waiting, {} in flight\n",
        board.len(),
        counts.success(),
        counts.error(),
        counts.idle(),
        counts.in_flight(),
    );
    for scene in board.scenes() {
        let detail = match scene.status() {
            SceneStatus::Success => scene.image_url().as_deref().map(|url| abbreviate(url, 60)),
            SceneStatus::Error => scene.error_msg().clone(),
            _ => None,
        }
        .unwrap_or_else(|| abbreviate(scene.english_prompt(), 60));
        let retries = match *scene.retry_count() {
            0 => String::new(),
            n => format!(" (retried {n}x)"),
        };
        let _ = writeln!(
            out,
            "{:>4}  {:<10} {}{}",
            scene.id().to_string(),
            scene.status().to_string(),
            detail,
            retries
        );
    }
    out
}

/// Copy every generated image into `out_dir` as `shot-{id}.{ext}`.
///
/// Images are read back through their artifact store, so file-backed images
/// are hash-checked and must live under `image_dir` (the directory they were
/// generated into). Inline data URLs need no directory. Returns the written
/// paths in storyboard order.
///
/// # Errors
///
/// Fails if a file-backed image is referenced without an `image_dir`, or if
/// an image is missing, corrupted or cannot be written.
#[instrument(skip_all, fields(scenes = board.len(), out_dir = %out_dir.display()))]
pub async fn export_images(
    board: &Storyboard,
    image_dir: Option<&Path>,
    out_dir: &Path,
) -> StoryboardResult<Vec<PathBuf>> {
    let inline = DataUrlArtifactStore::new();
    let files = image_dir.map(FileSystemArtifactStore::new).transpose()?;
    tokio::fs::create_dir_all(out_dir).await.map_err(|e| {
        StorageError::new(StorageErrorKind::DirectoryCreation(format!(
            "{}: {}",
            out_dir.display(),
            e
        )))
    })?;
    let mut written = Vec::new();

    for scene in board.scenes() {
        let Some(url) = scene.image_url() else {
            continue;
        };

        let store: &dyn ArtifactStore = match (url.starts_with("data:"), files.as_ref()) {
            (true, _) => &inline,
            (false, Some(files)) => files,
            (false, None) => {
                return Err(StorageError::new(StorageErrorKind::NotFound(format!(
                    "scene {} references {} but no image directory was given",
                    scene.id(),
                    url
                )))
                .into());
            }
        };

        let data = store.retrieve(url).await?;
        let ext = ImageFormat::from_url(url).map_or("bin", |format| format.extension());
        let path = out_dir.join(format!("shot-{:03}.{}", scene.id().get(), ext));
        tokio::fs::write(&path, &data).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!("{}: {}", path.display(), e)))
        })?;
        debug!(scene_id = %scene.id(), backend = store.backend_name(), path = %path.display(), "Image exported");
        written.push(path);
    }

    info!(images = written.len(), "Images exported");
    Ok(written)
}

fn abbreviate(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{kept}...")
}
