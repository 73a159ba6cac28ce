//! Tests for the filesystem and data URL artifact stores.

use storyboard_core::{ImageArtifact, SceneId};
use storyboard_error::{StorageErrorKind, StoryboardErrorKind};
use storyboard_storage::{ArtifactStore, DataUrlArtifactStore, FileSystemArtifactStore};
use tempfile::TempDir;

fn artifact(bytes: &[u8], mime: &str) -> ImageArtifact {
    ImageArtifact::new(bytes.to_vec(), mime, "imagen")
}

#[tokio::test]
async fn test_store_and_retrieve() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let store = FileSystemArtifactStore::new(temp_dir.path())?;

    let url = store
        .store(SceneId::from(1), &artifact(b"\x89PNG fake", "image/png"))
        .await?;

    assert!(url.starts_with(&*temp_dir.path().to_string_lossy()));
    assert!(url.ends_with(".png"));
    assert_eq!(store.retrieve(&url).await?, b"\x89PNG fake");
    Ok(())
}

#[tokio::test]
async fn test_identical_content_is_deduplicated() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let store = FileSystemArtifactStore::new(temp_dir.path())?;

    let first = store
        .store(SceneId::from(1), &artifact(b"same", "image/jpeg"))
        .await?;
    let second = store
        .store(SceneId::from(2), &artifact(b"same", "image/jpeg"))
        .await?;

    assert_eq!(first, second);
    assert!(first.ends_with(".jpg"));
    Ok(())
}

#[tokio::test]
async fn test_no_temp_files_left_behind() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let store = FileSystemArtifactStore::new(temp_dir.path())?;
    let url = store
        .store(SceneId::from(3), &artifact(b"frame", "image/webp"))
        .await?;

    let parent = std::path::Path::new(&url).parent().unwrap().to_path_buf();
    let names: Vec<String> = std::fs::read_dir(parent)?
        .map(|entry| entry.map(|e| e.file_name().to_string_lossy().to_string()))
        .collect::<Result<_, _>>()?;
    assert_eq!(names.len(), 1);
    assert!(!names[0].ends_with(".tmp"));
    Ok(())
}

#[tokio::test]
async fn test_empty_artifact_is_rejected() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let store = FileSystemArtifactStore::new(temp_dir.path())?;

    let err = store
        .store(SceneId::from(1), &artifact(b"", "image/png"))
        .await
        .unwrap_err();
    match err.kind() {
        StoryboardErrorKind::Storage(e) => {
            assert!(matches!(e.kind, StorageErrorKind::EmptyArtifact(_)))
        }
        other => panic!("unexpected error: {other}"),
    }
    Ok(())
}

#[tokio::test]
async fn test_corrupted_file_fails_hash_check() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let store = FileSystemArtifactStore::new(temp_dir.path())?;
    let url = store
        .store(SceneId::from(1), &artifact(b"original", "image/png"))
        .await?;

    std::fs::write(&url, b"tampered")?;
    assert!(store.retrieve(&url).await.is_err());
    Ok(())
}

#[tokio::test]
async fn test_retrieve_outside_base_is_rejected() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let store = FileSystemArtifactStore::new(temp_dir.path().join("images"))?;
    let outside = temp_dir.path().join("elsewhere.png");
    std::fs::write(&outside, b"x")?;

    assert!(store.retrieve(&outside.to_string_lossy()).await.is_err());
    Ok(())
}

#[tokio::test]
async fn test_data_url_store() -> anyhow::Result<()> {
    let store = DataUrlArtifactStore::new();
    let url = store
        .store(SceneId::from(4), &artifact(b"hello", "image/png"))
        .await?;

    assert_eq!(url, "data:image/png;base64,aGVsbG8=");
    assert_eq!(store.retrieve(&url).await?, b"hello");
    assert!(store.retrieve("https://example.com/a.png").await.is_err());
    assert_eq!(store.backend_name(), "data-url");
    Ok(())
}
