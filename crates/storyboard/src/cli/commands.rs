//! CLI command definitions.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Storyboard - turn a script into a storyboard and generate an image per scene
#[derive(Parser, Debug)]
#[command(name = "storyboard")]
#[command(about = "Turn a script into a storyboard and generate an image per scene", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Configuration file (defaults to the layered storyboard.toml lookup)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Gemini API key (defaults to GEMINI_API_KEY)
    #[arg(long, global = true)]
    pub api_key: Option<String>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Split a script into scenes and write a new storyboard file
    Analyze(AnalyzeArgs),

    /// Generate images for storyboard scenes
    Generate(GenerateArgs),

    /// Show scene counts and per-scene status
    Status {
        /// Storyboard file
        #[arg(long, default_value = "storyboard.json")]
        board: PathBuf,
    },

    /// Write a JSON manifest, a plain-text shot list and the generated images
    Export {
        /// Storyboard file
        #[arg(long, default_value = "storyboard.json")]
        board: PathBuf,

        /// Directory to write into
        #[arg(long, default_value = "export")]
        out_dir: PathBuf,

        /// Directory the images were generated into (`generate --output-dir`)
        #[arg(long)]
        images_dir: Option<PathBuf>,
    },
}

/// Arguments for `analyze`
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Script file (any language)
    pub script: PathBuf,

    /// Storyboard file to write
    #[arg(long, default_value = "storyboard.json")]
    pub output: PathBuf,

    /// Replace an existing storyboard file
    #[arg(long)]
    pub force: bool,
}

/// Arguments for `generate`
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Storyboard file, updated in place
    #[arg(long, default_value = "storyboard.json")]
    pub board: PathBuf,

    /// Generate exactly these scene ids (comma separated), whatever their status
    #[arg(long, value_delimiter = ',', conflicts_with_all = ["retry_failed", "retry_one"])]
    pub select: Vec<u32>,

    /// Retry every failed scene with the simplification modifier
    #[arg(long, conflicts_with = "retry_one")]
    pub retry_failed: bool,

    /// Regenerate one scene in retry mode
    #[arg(long, value_name = "ID")]
    pub retry_one: Option<u32>,

    /// Store images as files under this directory instead of inline data URLs
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
}
