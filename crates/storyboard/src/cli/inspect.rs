//! Status and export command handlers.

use super::board_file::load_board;
use std::path::Path;
use storyboard::{StoryboardManifest, export_images, shot_list, status_report};
use tracing::info;

/// Print scene counts and one line per scene.
pub async fn show_status(board: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let board = load_board(board).await?;
    print!("{}", status_report(&board));
    Ok(())
}

/// Write `manifest.json`, `shot-list.txt` and one image file per generated scene into `out_dir`.
pub async fn export_board(
    board: &Path,
    out_dir: &Path,
    images_dir: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let board = load_board(board).await?;
    tokio::fs::create_dir_all(out_dir).await?;

    let manifest_path = out_dir.join("manifest.json");
    tokio::fs::write(&manifest_path, StoryboardManifest::from_board(&board).to_json_pretty()?).await?;

    let shots_path = out_dir.join("shot-list.txt");
    tokio::fs::write(&shots_path, shot_list(&board)).await?;

    let images = export_images(&board, images_dir, out_dir).await?;

    info!(dir = %out_dir.display(), scenes = board.len(), images = images.len(), "Storyboard exported");
    println!(
        "Exported {} scenes and {} images to {}",
        board.len(),
        images.len(),
        out_dir.display()
    );
    Ok(())
}
