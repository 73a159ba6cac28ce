//! Reading and writing storyboard files.

use std::path::Path;
use storyboard::{JsonError, Storyboard, StoryboardResult};
use tracing::{debug, info};

/// Load a storyboard, resetting scenes a crash left mid-generation.
pub async fn load_board(path: &Path) -> StoryboardResult<Storyboard> {
    let json = tokio::fs::read_to_string(path).await.map_err(|e| {
        JsonError::new(format!("Failed to read storyboard {}: {}", path.display(), e))
    })?;
    let board = Storyboard::from_json(&json)?;
    debug!(path = %path.display(), scenes = board.len(), "Storyboard loaded");
    Ok(board)
}

/// Write a storyboard through a temporary file so a crash never leaves half a file.
pub async fn save_board(path: &Path, board: &Storyboard) -> StoryboardResult<()> {
    let json = board.to_json_pretty()?;
    let temp = path.with_extension("json.tmp");
    tokio::fs::write(&temp, json).await.map_err(|e| {
        JsonError::new(format!("Failed to write storyboard {}: {}", temp.display(), e))
    })?;
    tokio::fs::rename(&temp, path).await.map_err(|e| {
        JsonError::new(format!("Failed to replace storyboard {}: {}", path.display(), e))
    })?;
    info!(path = %path.display(), scenes = board.len(), "Storyboard saved");
    Ok(())
}
