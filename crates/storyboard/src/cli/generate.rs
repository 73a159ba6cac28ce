//! Image generation command handler.

use super::board_file::{load_board, save_board};
use super::commands::GenerateArgs;
use super::require_api_key;
use std::sync::Arc;
use storyboard::{Engine, QueueEvent, SceneId, Selection, StoryboardConfig};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, instrument, warn};

/// Run one generation batch over the storyboard file and save the result.
///
/// Ctrl-C requests a cooperative stop: the scene in flight finishes and the
/// board is saved with the remaining scenes untouched.
#[instrument(skip_all, fields(board = %args.board.display()))]
pub async fn run_generate(
    config: StoryboardConfig,
    api_key: Option<&str>,
    args: GenerateArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let board = load_board(&args.board).await?;
    let store = Engine::open_store(args.output_dir.as_deref())?;
    let engine = Engine::new(config, require_api_key(api_key)?);
    let processor = Arc::new(engine.processor(board, store)?);

    let mut events = processor.events();
    let printer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(QueueEvent::BatchFinished(report)) => {
                    println!("{}", report);
                    break;
                }
                Ok(event) => println!("{}", event),
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "Event printer fell behind"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    let stopper = {
        let processor = processor.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() && processor.request_stop() {
                info!("Stopping after the current scene");
            }
        })
    };

    let result = if args.retry_failed {
        processor.retry_failed().await
    } else if let Some(id) = args.retry_one {
        processor.retry_one(SceneId::from(id)).await
    } else {
        let selection: Selection = args.select.iter().copied().map(SceneId::from).collect();
        processor.start_selected(&selection).await
    };
    stopper.abort();

    let report = match result {
        Ok(report) => report,
        Err(err) => {
            printer.abort();
            return Err(err.into());
        }
    };
    let _ = printer.await;

    save_board(&args.board, &processor.snapshot()).await?;
    if *report.stopped() {
        println!(
            "Stopped early; {} scenes left untouched",
            report.untouched().len()
        );
    }
    Ok(())
}
