//! Recorded editing sessions and their replay.

use kurbo::Size;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use visionboard_core::{BoardState, Canvas, ConfigError, EditorConfig, InputEvent, Instant, Response};

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid session file: {0}")]
    Session(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Result type for application operations.
pub type AppResult<T> = Result<T, AppError>;

/// One recorded input event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStep {
    /// Milliseconds since the session started.
    #[serde(default)]
    pub at_ms: u64,
    #[serde(flatten)]
    pub event: InputEvent,
}

/// A recorded sequence of input events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Session {
    /// Editor configuration the session was recorded with.
    pub config: Option<EditorConfig>,
    pub steps: Vec<SessionStep>,
}

/// Outcome of a replay.
#[derive(Debug, Serialize)]
pub struct ReplayReport {
    /// Canvas area at the end of the session.
    pub canvas: Size,
    pub state: BoardState,
    /// One response per step.
    pub responses: Vec<Response>,
}

impl Session {
    pub fn from_json(json: &str) -> AppResult<Self> {
        let session: Self = serde_json::from_str(json)?;
        if let Some(config) = &session.config {
            config.validate()?;
        }
        Ok(session)
    }

    pub fn load(path: &Path) -> AppResult<Self> {
        log::info!("Loading session from {}", path.display());
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Feed every step through a fresh canvas.
    ///
    /// `config` overrides the recorded configuration. Pending drag timers
    /// fire before any later step, as a host event loop would.
    pub fn replay(&self, config: Option<EditorConfig>) -> ReplayReport {
        let config = config.or_else(|| self.config.clone()).unwrap_or_default();
        let mut canvas = Canvas::new(config);
        let start = Instant::now();
        let mut elapsed = 0;
        let mut responses = Vec::with_capacity(self.steps.len());

        for (index, step) in self.steps.iter().enumerate() {
            if step.at_ms < elapsed {
                log::warn!("Step {} goes back in time ({} < {} ms)", index, step.at_ms, elapsed);
            }
            elapsed = elapsed.max(step.at_ms);
            let now = start + Duration::from_millis(elapsed);

            if canvas.next_deadline().is_some_and(|deadline| deadline <= now) {
                log::trace!("Timer fired before step {}", index);
                canvas.tick(now);
            }
            let response = canvas.handle_event(step.event.clone(), now);
            log::debug!("Step {} at {} ms: {:?}", index, elapsed, response);
            responses.push(response);
        }

        log::info!("Replayed {} steps, {} elements on board", self.steps.len(), canvas.state().len());
        ReplayReport {
            canvas: canvas.canvas_size(),
            state: canvas.into_state(),
            responses,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;
    use std::io::Write;
    use visionboard_core::{GestureOutcome, ToolKind};

    const DRAG_SESSION: &str = r#"{
        "steps": [
            { "at_ms": 0, "event": "select_tool", "tool": "image" },
            { "at_ms": 10, "event": "canvas_click", "position": { "x": 700, "y": 100 } },
            { "at_ms": 20, "event": "image_resolved", "reference": "https://example.com/a.png" },
            { "at_ms": 30, "event": "canvas_click", "position": { "x": 0, "y": 690 } },
            { "at_ms": 40, "event": "element_down", "id": "__IMAGE__", "position": { "x": 710, "y": 110 } },
            { "at_ms": 300, "event": "pointer_move", "position": { "x": 2000, "y": 110 } },
            { "at_ms": 320, "event": "pointer_up", "position": { "x": 2000, "y": 110 } }
        ]
    }"#;

    #[test]
    fn test_parse_steps() {
        let session = Session::from_json(
            r#"{ "steps": [ { "at_ms": 5, "event": "tick" }, { "event": "key", "key": "Escape" } ] }"#,
        )
        .unwrap();
        assert_eq!(session.steps.len(), 2);
        assert_eq!(session.steps[0].event, InputEvent::Tick);
        assert_eq!(session.steps[1].at_ms, 0);
        assert!(session.config.is_none());
    }

    #[test]
    fn test_text_placement_replay() {
        let session = Session::from_json(
            r#"{ "steps": [
                { "event": "select_tool", "tool": "text" },
                { "event": "canvas_click", "position": { "x": 50, "y": 50 } }
            ] }"#,
        )
        .unwrap();
        let report = session.replay(None);
        assert_eq!(report.state.len(), 1);
        assert_eq!(report.state.tool(), ToolKind::Select);
        assert_eq!(report.state.elements()[0].position(), Point::new(50.0, 50.0));
        assert!(matches!(report.responses[1], Response::ElementCreated { .. }));
    }

    #[test]
    fn test_timer_drag_replay() {
        // Ids are generated at placement, so place first and patch the press in.
        let placement = Session::from_json(DRAG_SESSION).unwrap();
        let first = placement.replay(None);
        let Response::ImagePlaced { id } = &first.responses[2] else {
            panic!("expected the image to be placed");
        };
        let session = Session::from_json(&DRAG_SESSION.replace("__IMAGE__", id.as_str())).unwrap();

        // The press-time grab offset is (10, 10); the element is 250 wide.
        let report = session.replay(None);
        let Response::Gesture {
            outcome: GestureOutcome::Drag { position, .. },
        } = &report.responses[6]
        else {
            panic!("expected a drag, got {:?}", report.responses[6]);
        };
        assert_eq!(*position, Point::new(750.0, 100.0));
        assert!(!report.state.is_dragging());
        assert!(report.state.is_panel_open());
    }

    #[test]
    fn test_config_override() {
        let session = Session::from_json(r#"{ "config": { "canvas": { "width": 400, "height": 300 } } }"#).unwrap();
        assert_eq!(session.replay(None).canvas, Size::new(400.0, 300.0));
        assert_eq!(
            session.replay(Some(EditorConfig::default())).canvas,
            Size::new(1000.0, 700.0)
        );
    }

    #[test]
    fn test_invalid_session_config_rejected() {
        let err = Session::from_json(r#"{ "config": { "canvas": { "width": -1, "height": 300 } } }"#).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        let err = Session::from_json(r#"{ "steps": [ { "event": "teleport" } ] }"#).unwrap_err();
        assert!(matches!(err, AppError::Session(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "steps": [ {{ "event": "clear_board" }} ] }}"#).unwrap();
        let session = Session::load(file.path()).unwrap();
        assert_eq!(session.steps[0].event, InputEvent::ClearBoard);

        let err = Session::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, AppError::Io(_)));
    }
}
