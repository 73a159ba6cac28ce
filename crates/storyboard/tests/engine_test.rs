//! Tests for wiring configuration into chains and processors.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use storyboard::{
    DataUrlArtifactStore, Engine, QueueErrorKind, SceneDraft, Storyboard, StoryboardConfig,
    StoryboardErrorKind,
};

fn config_from(contents: &str) -> anyhow::Result<StoryboardConfig> {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile()?;
    file.write_all(contents.as_bytes())?;
    file.flush()?;
    Ok(StoryboardConfig::from_file(file.path())?)
}

const TWO_PROVIDERS: &str = r#"
[generation]
max_scenes = 2
max_retries = 1
base_retry_delay_ms = 10
rate_limit_delay_ms = 250

[[providers]]
name = "primary"
kind = "gemini"
model = "gemini-2.5-flash-image"

[[providers]]
name = "fallback"
kind = "imagen"
model = "imagen-4.0-generate-001"
"#;

#[test]
fn test_chain_follows_configured_order() -> anyhow::Result<()> {
    let engine = Engine::new(config_from(TWO_PROVIDERS)?, "test-key");
    let chain = engine.chain()?;
    assert_eq!(chain.names(), vec!["primary", "fallback"]);
    Ok(())
}

#[test]
fn test_bundled_chain_has_gemini_then_imagen() -> anyhow::Result<()> {
    let engine = Engine::new(StoryboardConfig::load()?, "test-key");
    let names = engine
        .chain()?
        .names()
        .into_iter()
        .map(str::to_string)
        .collect::<Vec<_>>();
    assert_eq!(names.first().map(String::as_str), Some("gemini-image"));
    assert!(names.iter().skip(1).all(|name| name.starts_with("imagen")));
    Ok(())
}

#[test]
fn test_blank_api_key_is_rejected() -> anyhow::Result<()> {
    let engine = Engine::new(config_from(TWO_PROVIDERS)?, "   ");
    assert!(engine.chain().is_err());
    assert!(engine.analyzer().is_err());
    Ok(())
}

#[tokio::test]
async fn test_processor_owns_board_and_rejects_empty_batch() -> anyhow::Result<()> {
    let engine = Engine::new(config_from(TWO_PROVIDERS)?, "test-key");
    assert_eq!(engine.config().pacing_delay(), Duration::from_millis(250));

    let board = Storyboard::from_drafts(
        vec![
            SceneDraft::new("One.", "first shot", true),
            SceneDraft::new("Two.", "second shot", false),
            SceneDraft::new("Three.", "third shot", false),
        ],
        engine.config().generation.max_scenes,
    );
    let processor = engine.processor(board, Arc::new(DataUrlArtifactStore::new()))?;
    assert_eq!(processor.snapshot().len(), 2);

    let err = processor.retry_failed().await.unwrap_err();
    match err.kind() {
        StoryboardErrorKind::Queue(queue) => assert_eq!(queue.kind, QueueErrorKind::NoTargets),
        other => panic!("unexpected error {other}"),
    }
    Ok(())
}

#[test]
fn test_open_store_picks_backend() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let files = Engine::open_store(Some(dir.path()))?;
    assert_eq!(files.backend_name(), "filesystem");

    let inline = Engine::open_store(None)?;
    assert_eq!(inline.backend_name(), "data-url");
    Ok(())
}
