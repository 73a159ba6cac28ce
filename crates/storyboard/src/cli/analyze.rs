//! Script analysis command handler.

use super::board_file::save_board;
use super::commands::AnalyzeArgs;
use super::require_api_key;
use storyboard::{Engine, ScriptAnalyzer, Storyboard, StoryboardConfig};
use tracing::{info, instrument};

/// Analyze a script and write a fresh storyboard.
#[instrument(skip_all, fields(script = %args.script.display(), output = %args.output.display()))]
pub async fn run_analyze(
    config: StoryboardConfig,
    api_key: Option<&str>,
    args: AnalyzeArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    if !args.force && tokio::fs::try_exists(&args.output).await? {
        return Err(format!(
            "{} already exists; pass --force to replace it",
            args.output.display()
        )
        .into());
    }

    let script = tokio::fs::read_to_string(&args.script).await?;
    let max_scenes = config.generation.max_scenes;
    let engine = Engine::new(config, require_api_key(api_key)?);

    let drafts = engine.analyzer()?.analyze(&script).await?;
    let board = Storyboard::from_drafts(drafts, max_scenes);
    info!(scenes = board.len(), "Script analyzed");

    save_board(&args.output, &board).await?;
    println!("Wrote {} scenes to {}", board.len(), args.output.display());
    Ok(())
}
