//! Tests for batch processing, pacing, stop and retry operations.

mod test_utils;

use std::sync::Arc;
use storyboard_core::{GenerationMode, SceneDraft, SceneId, SceneStatus, Selection};
use storyboard_error::{GenerationErrorKind, ProviderErrorKind, QueueErrorKind, StoryboardErrorKind};
use storyboard_queue::{QueueEvent, QueueProcessor};
use storyboard_rate_limit::RateLimiter;
use storyboard_storage::DataUrlArtifactStore;
use test_utils::{
    FailingStore, Gate, MockImageProvider, MockResponse, PACING, PendingSleeper,
    RecordingSleeper, assert_invariant, board_with_statuses, chain, harness, harness_with_store,
    idle_board, template,
};

fn ids(raw: &[u32]) -> Vec<SceneId> {
    raw.iter().copied().map(SceneId::from).collect()
}

fn queue_kind(err: &storyboard_error::StoryboardError) -> Option<QueueErrorKind> {
    match err.kind() {
        StoryboardErrorKind::Queue(e) => Some(e.kind.clone()),
        _ => None,
    }
}

#[tokio::test]
async fn test_batch_calls_chain_once_per_scene_and_paces_between() -> anyhow::Result<()> {
    let provider = MockImageProvider::succeeding("primary");
    let h = harness(idle_board(4), &[provider.clone()]);

    let report = h
        .processor
        .start_generation(ids(&[3, 1, 4]), GenerationMode::Initial)
        .await?;

    assert_eq!(provider.call_count(), 3);
    assert_eq!(h.pacing_sleeper.calls(), vec![PACING; 2]);
    assert!(h.retry_sleeper.calls().is_empty());
    assert_eq!(report.attempted(), &ids(&[3, 1, 4]));
    assert_eq!(report.succeeded(), &ids(&[3, 1, 4]));
    assert!(report.untouched().is_empty());
    assert!(!*report.stopped());

    let prompts = provider.prompts();
    assert!(prompts[0].starts_with("shot 3"));
    assert!(prompts[1].starts_with("shot 1"));
    assert!(prompts[2].starts_with("shot 4"));
    assert!(!prompts[0].contains("SIMPLER"));
    assert!(prompts[0].lines().any(|line| line == "HERO"));
    assert!(prompts[2].lines().any(|line| line == "NO HERO"));

    let board = h.processor.snapshot();
    assert_invariant(&board);
    assert_eq!(
        *board.get(SceneId::from(2)).unwrap().status(),
        SceneStatus::Idle
    );
    assert!(board.get(SceneId::from(4)).unwrap().image_url().is_some());
    Ok(())
}

#[tokio::test]
async fn test_single_scene_batch_does_not_pace() -> anyhow::Result<()> {
    let h = harness(idle_board(1), &[MockImageProvider::succeeding("primary")]);
    h.processor
        .start_generation(ids(&[1]), GenerationMode::Initial)
        .await?;
    assert!(h.pacing_sleeper.calls().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_failed_scene_does_not_abort_batch() -> anyhow::Result<()> {
    let provider = MockImageProvider::sequence(
        "primary",
        vec![
            MockResponse::Image,
            MockResponse::Error(ProviderErrorKind::Blocked("SAFETY".into())),
            MockResponse::Image,
        ],
    );
    let h = harness(idle_board(3), &[provider]);
    let mut events = h.processor.events();

    let report = h
        .processor
        .start_generation(ids(&[1, 2, 3]), GenerationMode::Initial)
        .await?;

    assert_eq!(report.succeeded(), &ids(&[1, 3]));
    assert_eq!(report.failed(), &ids(&[2]));

    let board = h.processor.snapshot();
    assert_invariant(&board);
    let failed = board.get(SceneId::from(2)).unwrap();
    assert_eq!(*failed.status(), SceneStatus::Error);
    assert_eq!(
        failed.error_msg().as_deref(),
        Some(GenerationErrorKind::Safety.to_string().as_str())
    );

    let mut saw_failure = false;
    while let Ok(event) = events.try_recv() {
        if let QueueEvent::SceneFailed { scene_id, kind, .. } = event {
            assert_eq!(scene_id, SceneId::from(2));
            assert_eq!(kind, Some(GenerationErrorKind::Safety));
            saw_failure = true;
        }
    }
    assert!(saw_failure);
    Ok(())
}

#[tokio::test]
async fn test_stop_during_scene_lets_it_finish_and_leaves_rest_untouched() -> anyhow::Result<()> {
    let gate = Gate::default();
    let provider = MockImageProvider::gated("primary", 1, gate.clone());
    let before = board_with_statuses(&[
        SceneStatus::Idle,
        SceneStatus::Idle,
        SceneStatus::Error,
        SceneStatus::Success,
        SceneStatus::Idle,
    ]);
    let h = harness(before.clone(), &[provider.clone()]);

    let processor = h.processor.clone();
    let batch = tokio::spawn(async move {
        processor
            .start_generation(ids(&[1, 2, 3, 4, 5]), GenerationMode::Initial)
            .await
    });

    gate.entered.notified().await;
    let during = h.processor.snapshot();
    assert_eq!(
        *during.get(SceneId::from(2)).unwrap().status(),
        SceneStatus::Generating
    );
    assert_invariant(&during);

    assert!(h.processor.request_stop());
    gate.release.notify_one();
    let report = batch.await??;

    assert!(*report.stopped());
    assert_eq!(report.attempted(), &ids(&[1, 2]));
    assert_eq!(report.untouched(), &ids(&[3, 4, 5]));
    assert_eq!(provider.call_count(), 2);
    assert_eq!(h.pacing_sleeper.calls().len(), 1);

    let after = h.processor.snapshot();
    assert_invariant(&after);
    assert_eq!(*after.get(SceneId::from(2)).unwrap().status(), SceneStatus::Success);
    for id in 3..=5 {
        let id = SceneId::from(id);
        assert_eq!(after.get(id), before.get(id));
    }
    assert!(!h.processor.is_active());
    assert!(!h.processor.request_stop());
    Ok(())
}

#[tokio::test]
async fn test_stop_interrupts_pacing_delay() -> anyhow::Result<()> {
    let provider = MockImageProvider::succeeding("primary");
    let retry_sleeper = RecordingSleeper::new();
    let processor = Arc::new(QueueProcessor::new(
        idle_board(3),
        chain(&[provider.clone()], 2, retry_sleeper),
        Arc::new(DataUrlArtifactStore::new()),
        RateLimiter::new(PACING, Arc::new(PendingSleeper)),
        template(),
    ));
    let mut events = processor.events();

    let runner = processor.clone();
    let batch = tokio::spawn(async move {
        runner
            .start_generation(ids(&[1, 2, 3]), GenerationMode::Initial)
            .await
    });

    loop {
        if let QueueEvent::Pacing { .. } = events.recv().await? {
            break;
        }
    }
    assert!(processor.request_stop());
    let report = batch.await??;

    assert_eq!(provider.call_count(), 1);
    assert_eq!(report.succeeded(), &ids(&[1]));
    assert_eq!(report.untouched(), &ids(&[2, 3]));
    Ok(())
}

#[tokio::test]
async fn test_second_batch_and_replacement_rejected_while_active() -> anyhow::Result<()> {
    let gate = Gate::default();
    let provider = MockImageProvider::gated("primary", 0, gate.clone());
    let h = harness(idle_board(2), &[provider]);

    let processor = h.processor.clone();
    let batch = tokio::spawn(async move {
        processor
            .start_generation(ids(&[1]), GenerationMode::Initial)
            .await
    });
    gate.entered.notified().await;

    assert!(h.processor.is_active());
    let err = h
        .processor
        .start_generation(ids(&[2]), GenerationMode::Initial)
        .await
        .unwrap_err();
    assert_eq!(queue_kind(&err), Some(QueueErrorKind::BatchActive));

    let err = h
        .processor
        .replace_scenes(vec![SceneDraft::new("x", "y", false)], 40)
        .unwrap_err();
    assert_eq!(queue_kind(&err), Some(QueueErrorKind::BatchActive));

    gate.release.notify_one();
    batch.await??;

    h.processor
        .replace_scenes(vec![SceneDraft::new("x", "y", false)], 40)?;
    assert_eq!(h.processor.snapshot().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_retry_failed_targets_error_scenes_in_retry_mode() -> anyhow::Result<()> {
    let provider = MockImageProvider::succeeding("primary");
    let h = harness(
        board_with_statuses(&[
            SceneStatus::Success,
            SceneStatus::Error,
            SceneStatus::Idle,
            SceneStatus::Error,
        ]),
        &[provider.clone()],
    );
    let mut watcher = h.processor.subscribe();

    let report = h.processor.retry_failed().await?;

    assert_eq!(*report.mode(), GenerationMode::Retry);
    assert_eq!(report.attempted(), &ids(&[2, 4]));
    assert!(provider.prompts().iter().all(|p| p.ends_with("SIMPLER")));
    assert!(watcher.has_changed()?);

    let board = watcher.borrow_and_update().clone();
    assert_invariant(&board);
    assert_eq!(*board.get(SceneId::from(2)).unwrap().retry_count(), 1);
    assert_eq!(*board.get(SceneId::from(3)).unwrap().status(), SceneStatus::Idle);
    assert_eq!(
        board.get(SceneId::from(1)).unwrap().image_url().as_deref(),
        Some("old://1")
    );
    Ok(())
}

#[tokio::test]
async fn test_retry_failed_without_errors_is_rejected() {
    let h = harness(idle_board(2), &[MockImageProvider::succeeding("primary")]);
    let err = h.processor.retry_failed().await.unwrap_err();
    assert_eq!(queue_kind(&err), Some(QueueErrorKind::NoTargets));
}

#[tokio::test]
async fn test_retry_one_regenerates_successful_scene() -> anyhow::Result<()> {
    let provider = MockImageProvider::succeeding("primary");
    let h = harness(
        board_with_statuses(&[SceneStatus::Success, SceneStatus::Idle]),
        &[provider.clone()],
    );

    h.processor.retry_one(SceneId::from(1)).await?;

    let board = h.processor.snapshot();
    let scene = board.get(SceneId::from(1)).unwrap();
    assert_eq!(*scene.status(), SceneStatus::Success);
    assert_ne!(scene.image_url().as_deref(), Some("old://1"));
    assert_eq!(*scene.retry_count(), 1);
    assert_eq!(provider.call_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_selection_overrides_default_targets() -> anyhow::Result<()> {
    let provider = MockImageProvider::succeeding("primary");
    let h = harness(
        board_with_statuses(&[
            SceneStatus::Success,
            SceneStatus::Error,
            SceneStatus::Idle,
            SceneStatus::Success,
        ]),
        &[provider.clone()],
    );

    let selection: Selection = ids(&[4, 1]).into_iter().collect();
    let report = h.processor.start_selected(&selection).await?;
    assert_eq!(report.attempted(), &ids(&[1, 4]));

    let report = h.processor.start_selected(&Selection::new()).await?;
    assert_eq!(report.attempted(), &ids(&[2, 3]));
    assert_eq!(provider.call_count(), 4);
    Ok(())
}

#[tokio::test]
async fn test_storage_failure_marks_scene_error() -> anyhow::Result<()> {
    let h = harness_with_store(
        idle_board(1),
        &[MockImageProvider::succeeding("primary")],
        Arc::new(FailingStore),
    );

    let report = h
        .processor
        .start_generation(ids(&[1]), GenerationMode::Initial)
        .await?;

    assert_eq!(report.failed(), &ids(&[1]));
    let board = h.processor.snapshot();
    let scene = board.get(SceneId::from(1)).unwrap();
    assert_eq!(*scene.status(), SceneStatus::Error);
    assert!(scene.error_msg().as_deref().unwrap_or_default().contains("disk full"));
    Ok(())
}

#[tokio::test]
async fn test_invalid_targets_are_rejected() {
    let h = harness(idle_board(2), &[MockImageProvider::succeeding("primary")]);

    let err = h
        .processor
        .start_generation(Vec::new(), GenerationMode::Initial)
        .await
        .unwrap_err();
    assert_eq!(queue_kind(&err), Some(QueueErrorKind::NoTargets));

    let err = h
        .processor
        .start_generation(ids(&[1, 9]), GenerationMode::Initial)
        .await
        .unwrap_err();
    assert_eq!(queue_kind(&err), Some(QueueErrorKind::UnknownScene(9)));
    assert!(!h.processor.is_active());
    assert_eq!(*h.processor.snapshot().get(SceneId::from(1)).unwrap().status(), SceneStatus::Idle);
}

#[tokio::test]
async fn test_events_follow_batch_order() -> anyhow::Result<()> {
    let h = harness(idle_board(2), &[MockImageProvider::succeeding("primary")]);
    let mut events = h.processor.events();

    h.processor
        .start_generation(ids(&[2, 1]), GenerationMode::Initial)
        .await?;

    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(match event {
            QueueEvent::BatchStarted { .. } => "batch-started".to_string(),
            QueueEvent::SceneStarted { scene_id, .. } => format!("started-{scene_id}"),
            QueueEvent::SceneSucceeded { scene_id, .. } => format!("done-{scene_id}"),
            QueueEvent::Pacing { .. } => "pacing".to_string(),
            QueueEvent::BatchFinished(_) => "batch-finished".to_string(),
            other => panic!("unexpected event {other}"),
        });
    }
    assert_eq!(
        seen,
        [
            "batch-started",
            "started-2",
            "done-2",
            "pacing",
            "started-1",
            "done-1",
            "batch-finished"
        ]
    );
    Ok(())
}
