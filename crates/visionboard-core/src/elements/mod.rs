//! Element definitions for the board.

mod image;
mod text;

pub use image::{ImageDefaults, ImageElement, ImageSource, ImageSourceError};
pub use text::{FontFamily, TextDefaults, TextElement};

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Lower bound for element rotation, in degrees.
pub const MIN_ROTATION: f64 = -180.0;
/// Upper bound for element rotation, in degrees.
pub const MAX_ROTATION: f64 = 180.0;

/// Unique identifier for elements.
///
/// Generated once at creation and stable for the element's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    /// Generate a fresh id with a kind prefix (e.g. `text-…`).
    pub fn generate(prefix: &str) -> Self {
        Self(format!("{}-{}", prefix, Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ElementId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ElementId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Error returned when a hex color string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid hex color code: {0}")]
pub struct ColorParseError(pub String);

/// Opaque RGB color, serialized as a `#rrggbb` hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn black() -> Self {
        Self::new(0, 0, 0)
    }

    pub const fn white() -> Self {
        Self::new(255, 255, 255)
    }

    /// Parse `#rgb` or `#rrggbb` (case-insensitive). The leading `#` is required.
    pub fn from_hex(hex: &str) -> Result<Self, ColorParseError> {
        let invalid = || ColorParseError(hex.to_string());
        let digits = hex.strip_prefix('#').ok_or_else(invalid)?;
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
        match digits.len() {
            3 => Ok(Self::new(
                channel(&digits[0..1])? * 17,
                channel(&digits[1..2])? * 17,
                channel(&digits[2..3])? * 17,
            )),
            6 => Ok(Self::new(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            )),
            _ => Err(invalid()),
        }
    }

    /// Format as lowercase `#rrggbb`.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl TryFrom<String> for Color {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

impl From<peniko::Color> for Color {
    fn from(color: peniko::Color) -> Self {
        let rgba = color.to_rgba8();
        Self::new(rgba.r, rgba.g, rgba.b)
    }
}

impl From<Color> for peniko::Color {
    fn from(color: Color) -> Self {
        peniko::Color::from_rgba8(color.r, color.g, color.b, 255)
    }
}

/// Quick-pick palette offered by the style panel.
pub const PALETTE: [Color; 10] = [
    Color::new(0x8b, 0x5c, 0xf6),
    Color::new(0xec, 0x48, 0x99),
    Color::new(0x06, 0xb6, 0xd4),
    Color::new(0x10, 0xb9, 0x81),
    Color::new(0xf5, 0x9e, 0x0b),
    Color::new(0xef, 0x44, 0x44),
    Color::new(0x63, 0x66, 0xf1),
    Color::new(0x84, 0xcc, 0x16),
    Color::new(0xf9, 0x73, 0x16),
    Color::new(0x14, 0xb8, 0xa6),
];

/// A background fill: either a solid color or the `transparent` sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Fill {
    #[default]
    Transparent,
    Solid(Color),
}

impl Fill {
    pub const TRANSPARENT: &'static str = "transparent";

    pub fn color(&self) -> Option<Color> {
        match self {
            Fill::Transparent => None,
            Fill::Solid(color) => Some(*color),
        }
    }

    pub fn is_transparent(&self) -> bool {
        matches!(self, Fill::Transparent)
    }
}

impl fmt::Display for Fill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fill::Transparent => f.write_str(Self::TRANSPARENT),
            Fill::Solid(color) => color.fmt(f),
        }
    }
}

impl TryFrom<String> for Fill {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value == Self::TRANSPARENT {
            Ok(Fill::Transparent)
        } else {
            Color::from_hex(&value).map(Fill::Solid)
        }
    }
}

impl From<Fill> for String {
    fn from(fill: Fill) -> Self {
        fill.to_string()
    }
}

impl From<Color> for Fill {
    fn from(color: Color) -> Self {
        Fill::Solid(color)
    }
}

/// Border line style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorderStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

impl BorderStyle {
    /// Cycle to the next border style.
    pub fn next(self) -> Self {
        match self {
            BorderStyle::Solid => BorderStyle::Dashed,
            BorderStyle::Dashed => BorderStyle::Dotted,
            BorderStyle::Dotted => BorderStyle::Solid,
        }
    }
}

/// Element border.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Border {
    /// Width in pixels (never negative).
    pub width: f64,
    pub style: BorderStyle,
    pub color: Color,
}

impl Default for Border {
    fn default() -> Self {
        Self {
            width: 0.0,
            style: BorderStyle::Solid,
            color: Color::black(),
        }
    }
}

/// Independent corner radii in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CornerRadii {
    pub top_left: f64,
    pub top_right: f64,
    pub bottom_left: f64,
    pub bottom_right: f64,
}

impl CornerRadii {
    /// Same radius on every corner.
    pub fn uniform(radius: f64) -> Self {
        Self {
            top_left: radius,
            top_right: radius,
            bottom_left: radius,
            bottom_right: radius,
        }
    }

    /// Copy with every negative radius raised to zero.
    pub fn clamped(self) -> Self {
        Self {
            top_left: self.top_left.max(0.0),
            top_right: self.top_right.max(0.0),
            bottom_left: self.bottom_left.max(0.0),
            bottom_right: self.bottom_right.max(0.0),
        }
    }
}

/// Geometry and decoration shared by every element kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementFrame {
    /// Top-left corner in canvas-local pixels.
    pub position: Point,
    /// Width and height in pixels.
    pub size: Size,
    /// Rotation in degrees, within [`MIN_ROTATION`, `MAX_ROTATION`].
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub border: Border,
    #[serde(default)]
    pub radii: CornerRadii,
}

impl ElementFrame {
    pub fn new(position: Point, size: Size) -> Self {
        Self {
            position,
            size: Size::new(size.width.max(0.0), size.height.max(0.0)),
            rotation: 0.0,
            border: Border::default(),
            radii: CornerRadii::default(),
        }
    }

    /// Axis-aligned bounds, ignoring rotation.
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.position, self.size)
    }

    /// Check whether a canvas point falls inside the (rotated) frame.
    pub fn contains(&self, point: Point) -> bool {
        let bounds = self.bounds();
        let local = if self.rotation == 0.0 {
            point
        } else {
            Affine::rotate_about(-self.rotation.to_radians(), bounds.center()) * point
        };
        bounds.contains(local)
    }

    fn apply_patch(&mut self, patch: &ElementPatch, size_locked: bool) {
        if let Some(x) = patch.x {
            self.position.x = x;
        }
        if let Some(y) = patch.y {
            self.position.y = y;
        }
        if !size_locked {
            if let Some(width) = patch.width {
                self.size.width = width.max(0.0);
            }
            if let Some(height) = patch.height {
                self.size.height = height.max(0.0);
            }
        }
        if let Some(rotation) = patch.rotation {
            self.rotation = rotation.clamp(MIN_ROTATION, MAX_ROTATION);
        }
        if let Some(width) = patch.border_width {
            self.border.width = width.max(0.0);
        }
        if let Some(style) = patch.border_style {
            self.border.style = style;
        }
        if let Some(color) = patch.border_color {
            self.border.color = color;
        }
        if let Some(radii) = patch.radii {
            self.radii = radii.clamped();
        }
    }
}

/// Common trait for all elements.
pub trait ElementTrait {
    /// Get the unique identifier.
    fn id(&self) -> &ElementId;

    /// Get the shared geometry.
    fn frame(&self) -> &ElementFrame;

    /// Get mutable shared geometry.
    fn frame_mut(&mut self) -> &mut ElementFrame;

    /// Bounding box in canvas coordinates.
    fn bounds(&self) -> Rect {
        self.frame().bounds()
    }

    /// Check if a canvas point hits this element.
    fn hit_test(&self, point: Point) -> bool {
        self.frame().contains(point)
    }
}

/// Discriminant of [`Element`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Text,
    Image,
}

impl ElementKind {
    /// Prefix used for generated ids.
    pub fn id_prefix(&self) -> &'static str {
        match self {
            ElementKind::Text => "text",
            ElementKind::Image => "image",
        }
    }
}

/// A placed element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Element {
    Text(TextElement),
    Image(ImageElement),
}

impl Element {
    pub fn kind(&self) -> ElementKind {
        match self {
            Element::Text(_) => ElementKind::Text,
            Element::Image(_) => ElementKind::Image,
        }
    }

    pub fn as_text(&self) -> Option<&TextElement> {
        match self {
            Element::Text(text) => Some(text),
            Element::Image(_) => None,
        }
    }

    pub fn as_image(&self) -> Option<&ImageElement> {
        match self {
            Element::Image(image) => Some(image),
            Element::Text(_) => None,
        }
    }

    pub fn position(&self) -> Point {
        self.frame().position
    }

    pub fn size(&self) -> Size {
        self.frame().size
    }

    /// Whether width/height follow content layout instead of user input.
    pub fn is_auto_sized(&self) -> bool {
        matches!(self, Element::Text(text) if text.auto_height)
    }

    /// Merge a partial update into this element.
    ///
    /// Fields that do not apply to this element kind are ignored. On an
    /// auto-sized element user-supplied width/height are ignored unless the
    /// same patch turns auto-sizing off.
    pub fn apply_patch(&mut self, patch: &ElementPatch) {
        let size_locked = self.is_auto_sized() && patch.auto_height != Some(false);
        match self {
            Element::Text(text) => text.apply_patch(patch),
            Element::Image(image) => image.apply_patch(patch),
        }
        self.frame_mut().apply_patch(patch, size_locked);
    }

    /// Adopt a size measured from rendered content.
    ///
    /// Returns `false` (and changes nothing) unless the element is auto-sized.
    pub fn measure_content(&mut self, measured: Size) -> bool {
        if !self.is_auto_sized() {
            return false;
        }
        self.frame_mut().size = Size::new(
            measured.width.round().max(0.0),
            measured.height.round().max(0.0),
        );
        true
    }

    /// Copy this element under a new id, shifted by `offset`.
    pub fn duplicate(&self, id: ElementId, offset: Vec2) -> Self {
        let mut copy = self.clone();
        match &mut copy {
            Element::Text(text) => text.id = id,
            Element::Image(image) => image.id = id,
        }
        copy.frame_mut().position += offset;
        copy
    }
}

impl ElementTrait for Element {
    fn id(&self) -> &ElementId {
        match self {
            Element::Text(text) => text.id(),
            Element::Image(image) => image.id(),
        }
    }

    fn frame(&self) -> &ElementFrame {
        match self {
            Element::Text(text) => text.frame(),
            Element::Image(image) => image.frame(),
        }
    }

    fn frame_mut(&mut self) -> &mut ElementFrame {
        match self {
            Element::Text(text) => text.frame_mut(),
            Element::Image(image) => image.frame_mut(),
        }
    }
}

impl From<TextElement> for Element {
    fn from(text: TextElement) -> Self {
        Element::Text(text)
    }
}

impl From<ImageElement> for Element {
    fn from(image: ImageElement) -> Self {
        Element::Image(image)
    }
}

/// Partial element update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementPatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub rotation: Option<f64>,
    pub border_width: Option<f64>,
    pub border_style: Option<BorderStyle>,
    pub border_color: Option<Color>,
    pub radii: Option<CornerRadii>,
    // Text only.
    pub content: Option<String>,
    pub color: Option<Color>,
    pub font_size: Option<f64>,
    pub font_family: Option<FontFamily>,
    pub background: Option<Fill>,
    pub auto_height: Option<bool>,
    // Image only.
    pub source: Option<ImageSource>,
}

impl ElementPatch {
    /// Patch that moves an element's top-left corner.
    pub fn position(point: Point) -> Self {
        Self {
            x: Some(point.x),
            y: Some(point.y),
            ..Self::default()
        }
    }

    /// Patch that resizes an element.
    pub fn size(size: Size) -> Self {
        Self {
            width: Some(size.width),
            height: Some(size.height),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
