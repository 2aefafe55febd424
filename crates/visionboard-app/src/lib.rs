//! Visionboard Application
//!
//! Command-line shell that replays recorded editing sessions through the
//! core canvas and prints the resulting board.

mod cli;
mod session;

pub use cli::{CliArgs, run};
pub use session::{AppError, AppResult, ReplayReport, Session, SessionStep};
