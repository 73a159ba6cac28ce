//! Command-line interface module.
//!
//! CLI structure and command handlers for the storyboard binary.

mod analyze;
mod board_file;
mod commands;
mod generate;
mod inspect;

pub use analyze::run_analyze;
pub use commands::{Cli, Commands};
pub use generate::run_generate;
pub use inspect::{export_board, show_status};

use std::path::Path;
use storyboard::{API_KEY_ENV, StoryboardConfig, StoryboardResult, resolve_api_key};
use tracing::debug;

/// Explicit `--config` file, or the layered defaults.
pub fn load_config(path: Option<&Path>) -> StoryboardResult<StoryboardConfig> {
    match path {
        Some(path) => StoryboardConfig::from_file(path),
        None => StoryboardConfig::load(),
    }
}

/// `--api-key` or `GEMINI_API_KEY`.
fn require_api_key(explicit: Option<&str>) -> Result<String, String> {
    let key = resolve_api_key(explicit)
        .ok_or_else(|| format!("No API key: pass --api-key or set {}", API_KEY_ENV))?;
    debug!(from_flag = explicit.is_some(), "API key resolved");
    Ok(key)
}
