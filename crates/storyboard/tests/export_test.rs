//! Tests for export manifest, shot list and status rendering.

use storyboard::{
    ArtifactStore, DataUrlArtifactStore, FileSystemArtifactStore, GenerationMode, ImageArtifact,
    SceneDraft, SceneId, SceneStatus, Storyboard, StoryboardManifest, export_images, shot_list,
    status_report,
};

fn board() -> Storyboard {
    let mut board = Storyboard::from_drafts(
        vec![
            SceneDraft::new("Der Leuchtturm.", "a lighthouse at dusk", false),
            SceneDraft::new("Sie steigt die Treppe hinauf.", "a woman climbing spiral stairs", true),
            SceneDraft::new("Das Licht erlischt.", "a dark lantern room", false),
        ],
        10,
    );
    let first = board.get_mut(SceneId::from(1)).unwrap();
    first.begin(GenerationMode::Initial);
    first.succeed("images/ab/abcdef.png", GenerationMode::Initial);

    let second = board.get_mut(SceneId::from(2)).unwrap();
    second.begin(GenerationMode::Initial);
    second.fail("quota exhausted", GenerationMode::Initial);
    second.begin(GenerationMode::Retry);
    second.fail("still exhausted", GenerationMode::Retry);
    board
}

#[test]
fn test_manifest_counts_and_fields() -> anyhow::Result<()> {
    let manifest = StoryboardManifest::from_board(&board());
    assert_eq!(manifest.total, 3);
    assert_eq!(manifest.completed, 1);
    assert_eq!(manifest.failed, 1);
    assert_eq!(manifest.scenes[0].image_url.as_deref(), Some("images/ab/abcdef.png"));
    assert_eq!(manifest.scenes[1].status, SceneStatus::Error);

    let json: serde_json::Value = serde_json::from_str(&manifest.to_json_pretty()?)?;
    assert_eq!(json["scenes"][1]["errorMsg"], "still exhausted");
    assert_eq!(json["scenes"][2]["status"], "IDLE");
    assert!(json["scenes"][2].get("imageUrl").is_none());
    Ok(())
}

#[test]
fn test_shot_list_numbers_every_scene() {
    let text = shot_list(&board());
    assert!(text.contains("Shot 1\n  Script: Der Leuchtturm.\n  Visual: a lighthouse at dusk\n"));
    assert!(text.contains("Shot 2"));
    assert!(text.contains("Main character in frame"));
    assert!(text.contains("Image: images/ab/abcdef.png"));
    assert_eq!(text.matches("Shot ").count(), 3);
}

#[test]
fn test_status_report_lines() {
    let report = status_report(&board());
    let lines: Vec<&str> = report.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "3 scenes: 1 done, 1 failed, 1 waiting, 0 in flight");
    assert!(lines[1].contains("SUCCESS"));
    assert!(lines[2].contains("still exhausted"));
    assert!(lines[2].ends_with("(retried 1x)"));
    assert!(lines[3].contains("IDLE") && lines[3].contains("a dark lantern room"));
}

#[test]
fn test_status_report_abbreviates_long_urls() {
    let mut board = Storyboard::from_drafts(vec![SceneDraft::new("x", "y", false)], 1);
    let scene = board.get_mut(SceneId::from(1)).unwrap();
    scene.begin(GenerationMode::Initial);
    scene.succeed(format!("data:image/png;base64,{}", "A".repeat(500)), GenerationMode::Initial);

    let report = status_report(&board);
    let line = report.lines().nth(1).unwrap();
    assert!(line.ends_with("..."));
    assert!(line.len() < 100);
}

fn two_scene_board() -> Storyboard {
    Storyboard::from_drafts(
        vec![
            SceneDraft::new("Der Leuchtturm.", "a lighthouse at dusk", false),
            SceneDraft::new("Das Licht erlischt.", "a dark lantern room", false),
        ],
        10,
    )
}

fn succeed(board: &mut Storyboard, id: u32, url: &str) {
    let scene = board.get_mut(SceneId::from(id)).unwrap();
    scene.begin(GenerationMode::Initial);
    scene.succeed(url, GenerationMode::Initial);
}

#[tokio::test]
async fn test_export_images_reads_back_both_backends() -> anyhow::Result<()> {
    let images = tempfile::tempdir()?;
    let out = tempfile::tempdir()?;
    let files = FileSystemArtifactStore::new(images.path())?;

    let png = ImageArtifact::new(vec![0x89, b'P', b'N', b'G', 1, 2, 3], "image/png", "imagen");
    let jpeg = ImageArtifact::new(vec![0xFF, 0xD8, 0xFF, 9, 9], "image/jpeg", "gemini");
    let file_url = files.store(SceneId::from(1), &png).await?;
    let data_url = DataUrlArtifactStore::new().store(SceneId::from(2), &jpeg).await?;

    let mut board = two_scene_board();
    succeed(&mut board, 1, &file_url);
    succeed(&mut board, 2, &data_url);

    let written = export_images(&board, Some(images.path()), out.path()).await?;
    assert_eq!(written.len(), 2);
    assert_eq!(tokio::fs::read(out.path().join("shot-001.png")).await?, png.data().clone());
    assert_eq!(tokio::fs::read(out.path().join("shot-002.jpg")).await?, jpeg.data().clone());
    Ok(())
}

#[tokio::test]
async fn test_export_images_skips_scenes_without_image() -> anyhow::Result<()> {
    let out = tempfile::tempdir()?;
    let written = export_images(&two_scene_board(), None, out.path()).await?;
    assert!(written.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_export_images_needs_image_dir_for_files() -> anyhow::Result<()> {
    let images = tempfile::tempdir()?;
    let out = tempfile::tempdir()?;
    let files = FileSystemArtifactStore::new(images.path())?;
    let png = ImageArtifact::new(vec![1, 2, 3], "image/png", "imagen");
    let url = files.store(SceneId::from(1), &png).await?;

    let mut board = two_scene_board();
    succeed(&mut board, 1, &url);

    let err = export_images(&board, None, out.path()).await.unwrap_err();
    assert!(err.to_string().contains("no image directory"));
    Ok(())
}

#[tokio::test]
async fn test_export_images_rejects_tampered_file() -> anyhow::Result<()> {
    let images = tempfile::tempdir()?;
    let out = tempfile::tempdir()?;
    let files = FileSystemArtifactStore::new(images.path())?;
    let png = ImageArtifact::new(vec![1, 2, 3], "image/png", "imagen");
    let url = files.store(SceneId::from(1), &png).await?;
    tokio::fs::write(&url, b"not the stored image").await?;

    let mut board = two_scene_board();
    succeed(&mut board, 1, &url);

    let err = export_images(&board, Some(images.path()), out.path()).await.unwrap_err();
    assert!(err.to_string().contains("Hash mismatch"));
    assert!(!out.path().join("shot-001.png").exists());
    Ok(())
}
