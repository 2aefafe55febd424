//! Command-line arguments and the top-level run loop.

use crate::session::{AppResult, Session};
use clap::Parser;
use std::path::PathBuf;
use visionboard_core::{EditorConfig, ShortcutRegistry};

#[derive(Parser, Debug, Clone, PartialEq)]
#[command(
    name = "visionboard",
    version,
    about = "Replay a recorded Visionboard session and print the resulting board as JSON."
)]
pub struct CliArgs {
    /// Recorded session (JSON).
    #[arg(value_name = "SESSION", required_unless_present = "shortcuts")]
    pub session: Option<PathBuf>,

    /// Editor configuration overriding the one recorded in the session.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print the keyboard shortcuts.
    #[arg(long)]
    pub shortcuts: bool,
}

/// Replay the session named on the command line and print the report.
pub fn run(args: CliArgs) -> AppResult<()> {
    if args.shortcuts {
        println!("=== Keyboard Shortcuts ===");
        println!("{}", ShortcutRegistry::describe());
    }
    let Some(path) = args.session else {
        return Ok(());
    };

    let config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from {}", path.display());
            Some(EditorConfig::from_json(&std::fs::read_to_string(path)?)?)
        }
        None => None,
    };
    let session = Session::load(&path)?;
    let report = session.replay(config);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
