//! Tool system for the board.

use serde::{Deserialize, Serialize};

/// Available tools. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    #[default]
    Select,
    Text,
    Image,
}

impl ToolKind {
    /// Get all tools in toolbar order.
    pub fn all() -> &'static [ToolKind] {
        &[ToolKind::Select, ToolKind::Text, ToolKind::Image]
    }

    /// Get display name for UI.
    pub fn display_name(&self) -> &'static str {
        match self {
            ToolKind::Select => "Select",
            ToolKind::Text => "Text",
            ToolKind::Image => "Image",
        }
    }

    /// CSS cursor the canvas shows while this tool is active.
    pub fn cursor(&self) -> &'static str {
        match self {
            ToolKind::Select => "default",
            ToolKind::Text => "text",
            ToolKind::Image => "crosshair",
        }
    }

    /// Whether a click on empty canvas creates an element with this tool.
    pub fn places_element(&self) -> bool {
        matches!(self, ToolKind::Text | ToolKind::Image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tool_is_select() {
        assert_eq!(ToolKind::default(), ToolKind::Select);
        assert!(!ToolKind::Select.places_element());
    }

    #[test]
    fn test_tool_serialization() {
        assert_eq!(serde_json::to_string(&ToolKind::Image).unwrap(), "\"image\"");
        let tool: ToolKind = serde_json::from_str("\"text\"").unwrap();
        assert_eq!(tool, ToolKind::Text);
        assert_eq!(tool.cursor(), "text");
    }
}
