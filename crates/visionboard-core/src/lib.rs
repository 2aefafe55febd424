//! Visionboard Core Library
//!
//! Platform-agnostic board state and interaction logic for the Visionboard
//! editor: a reducer-driven element store plus click/drag disambiguation for
//! pointer gestures.

pub mod board;
pub mod canvas;
pub mod config;
pub mod elements;
pub mod fields;
pub mod gesture;
pub mod input;
pub mod shortcuts;
pub mod tools;

pub use board::{Action, BoardState, BoardStore, Dispatch};
pub use canvas::{Canvas, Response};
pub use config::{ConfigError, EditorConfig};
pub use elements::{Element, ElementId, ElementPatch, ElementTrait};
pub use fields::{ColorField, GeometryField, NumericField};
pub use gesture::{GestureConfig, GestureDisambiguator, GestureOutcome, Subscription, clamp_to_canvas};
pub use input::{InputEvent, Instant, KeyEvent, Modifiers};
pub use shortcuts::{Command, ShortcutRegistry};
pub use tools::ToolKind;
