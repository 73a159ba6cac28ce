//! Storyboard CLI binary.
//!
//! - Analyze a script into a storyboard file
//! - Generate scene images with provider fallback and pacing
//! - Inspect and export a storyboard

use clap::Parser;
use storyboard::{LoggingConfig, init_logging};

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, Commands, export_board, load_config, run_analyze, run_generate, show_status};

    // Load .env before anything reads GEMINI_API_KEY
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    init_logging(
        &LoggingConfig::new()
            .with_verbose(cli.verbose)
            .with_json_logs(cli.json_logs),
    )?;

    match cli.command {
        Commands::Analyze(args) => {
            let config = load_config(cli.config.as_deref())?;
            run_analyze(config, cli.api_key.as_deref(), args).await?;
        }
        Commands::Generate(args) => {
            let config = load_config(cli.config.as_deref())?;
            run_generate(config, cli.api_key.as_deref(), args).await?;
        }
        Commands::Status { board } => {
            show_status(&board).await?;
        }
        Commands::Export {
            board,
            out_dir,
            images_dir,
        } => {
            export_board(&board, &out_dir, images_dir.as_deref()).await?;
        }
    }

    Ok(())
}
