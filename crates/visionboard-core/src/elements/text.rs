//! Text element.

use super::{Color, ElementFrame, ElementId, ElementPatch, ElementTrait, Fill};
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};

/// Font families offered by the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FontFamily {
    #[default]
    Poppins,
    Inter,
    #[serde(rename = "Playfair Display")]
    PlayfairDisplay,
    Roboto,
    #[serde(rename = "Open Sans")]
    OpenSans,
    Montserrat,
    Lato,
    #[serde(rename = "Source Sans Pro")]
    SourceSansPro,
}

impl FontFamily {
    /// Family name as understood by the font loader.
    pub fn name(&self) -> &'static str {
        match self {
            FontFamily::Poppins => "Poppins",
            FontFamily::Inter => "Inter",
            FontFamily::PlayfairDisplay => "Playfair Display",
            FontFamily::Roboto => "Roboto",
            FontFamily::OpenSans => "Open Sans",
            FontFamily::Montserrat => "Montserrat",
            FontFamily::Lato => "Lato",
            FontFamily::SourceSansPro => "Source Sans Pro",
        }
    }

    /// Get all available font families.
    pub fn all() -> &'static [FontFamily] {
        &[
            FontFamily::Poppins,
            FontFamily::Inter,
            FontFamily::PlayfairDisplay,
            FontFamily::Roboto,
            FontFamily::OpenSans,
            FontFamily::Montserrat,
            FontFamily::Lato,
            FontFamily::SourceSansPro,
        ]
    }

    /// Look up a family by its name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|family| family.name() == name)
    }
}

/// Values used for text elements placed with the text tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextDefaults {
    pub size: Size,
    pub content: String,
    pub color: Color,
    pub font_size: f64,
    pub font_family: FontFamily,
    pub background: Fill,
    pub auto_height: bool,
}

impl Default for TextDefaults {
    fn default() -> Self {
        Self {
            size: Size::new(200.0, 50.0),
            content: "Your Vision Here".to_string(),
            color: Color::new(0x8b, 0x5c, 0xf6),
            font_size: TextElement::DEFAULT_FONT_SIZE,
            font_family: FontFamily::default(),
            background: Fill::Transparent,
            auto_height: true,
        }
    }
}

/// A block of styled text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextElement {
    pub(crate) id: ElementId,
    #[serde(flatten)]
    pub frame: ElementFrame,
    /// The text content (may be empty).
    pub content: String,
    /// Text color.
    pub color: Color,
    /// Font size in pixels. The panel offers 12–72 but nothing enforces it.
    pub font_size: f64,
    pub font_family: FontFamily,
    /// Background behind the text.
    #[serde(default)]
    pub background: Fill,
    /// Whether the size tracks rendered content.
    #[serde(default)]
    pub auto_height: bool,
}

impl TextElement {
    pub const DEFAULT_FONT_SIZE: f64 = 24.0;
    /// Smallest font size offered by the panel.
    pub const MIN_FONT_SIZE: f64 = 12.0;
    /// Largest font size offered by the panel.
    pub const MAX_FONT_SIZE: f64 = 72.0;

    /// Create a text element with the stock defaults.
    pub fn new(id: ElementId, position: Point, content: String) -> Self {
        let defaults = TextDefaults {
            content,
            ..TextDefaults::default()
        };
        Self::from_defaults(id, position, &defaults)
    }

    /// Create a text element from configured defaults.
    pub fn from_defaults(id: ElementId, position: Point, defaults: &TextDefaults) -> Self {
        Self {
            id,
            frame: ElementFrame::new(position, defaults.size),
            content: defaults.content.clone(),
            color: defaults.color,
            font_size: defaults.font_size,
            font_family: defaults.font_family,
            background: defaults.background,
            auto_height: defaults.auto_height,
        }
    }

    pub(super) fn apply_patch(&mut self, patch: &ElementPatch) {
        if let Some(content) = &patch.content {
            self.content.clone_from(content);
        }
        if let Some(color) = patch.color {
            self.color = color;
        }
        if let Some(font_size) = patch.font_size {
            self.font_size = font_size;
        }
        if let Some(font_family) = patch.font_family {
            self.font_family = font_family;
        }
        if let Some(background) = patch.background {
            self.background = background;
        }
        if let Some(auto_height) = patch.auto_height {
            self.auto_height = auto_height;
        }
    }
}

impl ElementTrait for TextElement {
    fn id(&self) -> &ElementId {
        &self.id
    }

    fn frame(&self) -> &ElementFrame {
        &self.frame
    }

    fn frame_mut(&mut self) -> &mut ElementFrame {
        &mut self.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_defaults() {
        let text = TextElement::new(ElementId::from("t"), Point::new(50.0, 50.0), "Hello".to_string());
        assert_eq!(text.content, "Hello");
        assert_eq!(text.frame.size, Size::new(200.0, 50.0));
        assert!((text.font_size - 24.0).abs() < f64::EPSILON);
        assert_eq!(text.font_family, FontFamily::Poppins);
        assert!(text.background.is_transparent());
        assert!(text.auto_height);
    }

    #[test]
    fn test_font_family_names() {
        assert_eq!(FontFamily::all().len(), 8);
        for family in FontFamily::all() {
            assert_eq!(FontFamily::from_name(family.name()), Some(*family));
            let json = serde_json::to_string(family).unwrap();
            assert_eq!(json, format!("\"{}\"", family.name()));
        }
        assert_eq!(FontFamily::from_name("Comic Sans"), None);
    }

    #[test]
    fn test_font_size_is_not_enforced() {
        let mut text = TextElement::new(ElementId::from("t"), Point::ZERO, String::new());
        text.apply_patch(&ElementPatch {
            font_size: Some(200.0),
            ..ElementPatch::default()
        });
        assert!((text.font_size - 200.0).abs() < f64::EPSILON);
    }
}
