//! Input events delivered by the rendering layer.
//!
//! Coordinates are canvas-local: the rendering layer converts screen
//! coordinates (and the first touch point for touch input) before handing
//! events to the core.

use crate::elements::{ElementId, ElementPatch};
use crate::tools::ToolKind;
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};

// Use web_time for WASM compatibility
#[cfg(target_arch = "wasm32")]
pub use web_time::Instant;
#[cfg(not(target_arch = "wasm32"))]
pub use std::time::Instant;

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl on most platforms, Cmd on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// A key press.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    /// Key name as reported by the platform (`"Delete"`, `"d"`, …).
    pub key: String,
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            modifiers: Modifiers::default(),
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Everything the interactive surface can report to the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum InputEvent {
    /// Pointer (mouse or first touch) pressed on an element.
    ElementDown { id: ElementId, position: Point },
    /// Pointer moved anywhere in the document.
    PointerMove { position: Point },
    /// Pointer released anywhere in the document.
    PointerUp { position: Point },
    /// Click on empty canvas.
    CanvasClick { position: Point },
    /// The host's timer woke the core up.
    Tick,
    /// Toolbar button pressed.
    SelectTool { tool: ToolKind },
    /// Toolbar "clear" pressed.
    ClearBoard,
    Key(KeyEvent),
    /// The canvas area changed size.
    Resize { size: Size },
    /// Property panel committed an edit.
    Edit { id: ElementId, patch: ElementPatch },
    /// Layout measured an auto-sized element.
    ContentMeasured { id: ElementId, size: Size },
    /// The image acquisition layer resolved a reference.
    ImageResolved { reference: String },
    /// The interactive surface is going away.
    Unmount,
}
