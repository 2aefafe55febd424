//! Editable property-panel fields.
//!
//! A field holds the last committed value plus whatever the user is typing.
//! Bad input never reaches the store: numeric fields revert to the last
//! value, color fields keep the draft and report an inline error.

use crate::elements::{Color, ColorParseError, ElementFrame, ElementPatch, Fill};
use kurbo::Size;

/// Round the way the panel displays numbers (halves round up).
fn display_number(value: f64) -> String {
    let rounded = (value + 0.5).floor();
    // Avoid "-0".
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{}", rounded)
}

/// A numeric input with optional bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericField {
    value: f64,
    draft: String,
    focused: bool,
    min: Option<f64>,
    max: Option<f64>,
}

impl NumericField {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            draft: display_number(value),
            focused: false,
            min: None,
            max: None,
        }
    }

    pub fn with_min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn with_max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    /// Last committed value.
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Text the input shows: the draft while focused, otherwise the rounded value.
    pub fn display(&self) -> String {
        if self.focused {
            self.draft.clone()
        } else {
            display_number(self.value)
        }
    }

    pub fn focus(&mut self) {
        self.focused = true;
    }

    /// Free typing; nothing is validated until commit.
    pub fn input(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Enter or blur. Returns the clamped value to hand to the store, or
    /// `None` when the draft was empty or not a number.
    pub fn commit(&mut self) -> Option<f64> {
        self.focused = false;
        let parsed = self
            .draft
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|value| !value.is_nan());
        let Some(mut value) = parsed else {
            log::debug!("Reverting numeric field draft {:?}", self.draft);
            self.draft = display_number(self.value);
            return None;
        };
        if let Some(min) = self.min {
            value = value.max(min);
        }
        if let Some(max) = self.max {
            value = value.min(max);
        }
        self.value = value;
        self.draft = display_number(value);
        Some(value)
    }

    /// Take an externally changed value. Ignored while the user is typing.
    pub fn sync(&mut self, value: f64) {
        if self.focused {
            return;
        }
        self.value = value;
        self.draft = display_number(value);
    }
}

/// A hex color input with palette.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorField {
    value: Fill,
    draft: String,
    editing: bool,
    error: Option<ColorParseError>,
    allow_transparent: bool,
}

impl ColorField {
    /// Field for an opaque color (text color, border color).
    pub fn opaque(color: Color) -> Self {
        Self {
            value: Fill::Solid(color),
            draft: String::new(),
            editing: false,
            error: None,
            allow_transparent: false,
        }
    }

    /// Field that also offers `transparent` (backgrounds).
    pub fn fill(value: Fill) -> Self {
        Self {
            value,
            draft: String::new(),
            editing: false,
            error: None,
            allow_transparent: true,
        }
    }

    pub fn value(&self) -> Fill {
        self.value
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    /// Inline error from the last rejected hex entry.
    pub fn error(&self) -> Option<&ColorParseError> {
        self.error.as_ref()
    }

    pub fn display(&self) -> String {
        if self.editing {
            self.draft.clone()
        } else {
            self.value.to_string()
        }
    }

    pub fn focus(&mut self) {
        self.editing = true;
        self.draft = match self.value {
            Fill::Transparent => String::new(),
            Fill::Solid(color) => color.to_hex(),
        };
        self.error = None;
    }

    pub fn input(&mut self, text: impl Into<String>) {
        self.draft = text.into();
        self.error = None;
    }

    /// Apply the draft. Returns the new value when it changed.
    ///
    /// An empty or `transparent` draft leaves the value alone. A missing `#`
    /// is added. Invalid hex sets [`Self::error`] and keeps the draft.
    pub fn blur(&mut self) -> Option<Fill> {
        self.editing = false;
        if self.draft.is_empty() || self.draft == Fill::TRANSPARENT {
            return None;
        }
        let hex = if self.draft.starts_with('#') {
            self.draft.clone()
        } else {
            format!("#{}", self.draft)
        };
        match Color::from_hex(&hex) {
            Ok(color) => {
                self.value = Fill::Solid(color);
                self.error = None;
                Some(self.value)
            }
            Err(err) => {
                log::debug!("Rejected color input: {}", err);
                self.error = Some(err);
                None
            }
        }
    }

    /// Palette or transparent swatch. Commits immediately.
    pub fn pick(&mut self, fill: Fill) -> Option<Fill> {
        if fill.is_transparent() && !self.allow_transparent {
            return None;
        }
        self.value = fill;
        self.editing = false;
        self.draft.clear();
        self.error = None;
        Some(fill)
    }

    /// Take an externally changed value. Ignored while editing.
    pub fn sync(&mut self, value: Fill) {
        if !self.editing {
            self.value = value;
        }
    }
}

/// Position and size inputs of the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryField {
    X,
    Y,
    Width,
    Height,
}

impl GeometryField {
    pub fn read(self, frame: &ElementFrame) -> f64 {
        match self {
            GeometryField::X => frame.position.x,
            GeometryField::Y => frame.position.y,
            GeometryField::Width => frame.size.width,
            GeometryField::Height => frame.size.height,
        }
    }

    pub fn patch(self, value: f64) -> ElementPatch {
        let mut patch = ElementPatch::default();
        match self {
            GeometryField::X => patch.x = Some(value),
            GeometryField::Y => patch.y = Some(value),
            GeometryField::Width => patch.width = Some(value),
            GeometryField::Height => patch.height = Some(value),
        }
        patch
    }

    pub fn is_size(self) -> bool {
        matches!(self, GeometryField::Width | GeometryField::Height)
    }

    /// Keep a panel edit inside the canvas.
    ///
    /// Positions stay within `0..=canvas - size`; sizes within
    /// `min_size..=canvas - position`. The lower bound wins when the two cross.
    pub fn clamp(self, value: f64, frame: &ElementFrame, canvas: Size, min_size: f64) -> f64 {
        match self {
            GeometryField::X => value.min(canvas.width - frame.size.width).max(0.0),
            GeometryField::Y => value.min(canvas.height - frame.size.height).max(0.0),
            GeometryField::Width => value.min(canvas.width - frame.position.x).max(min_size),
            GeometryField::Height => value.min(canvas.height - frame.position.y).max(min_size),
        }
    }
}
