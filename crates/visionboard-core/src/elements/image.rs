//! Image element for placing raster images by reference.

use super::{ElementFrame, ElementId, ElementPatch, ElementTrait};
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised at the image acquisition boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageSourceError {
    #[error("Image reference is empty")]
    Empty,
}

/// Where an image's pixels come from.
///
/// The core does not fetch, decode or validate either kind; it only keeps
/// the reference the acquisition layer resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ImageSource {
    /// Inline `data:` URL (e.g. from a file upload).
    Embedded(String),
    /// Remote URL entered by the user.
    Remote(String),
}

impl ImageSource {
    /// Classify a resolved reference.
    pub fn from_reference(reference: &str) -> Result<Self, ImageSourceError> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(ImageSourceError::Empty);
        }
        if reference.starts_with("data:") {
            Ok(ImageSource::Embedded(reference.to_string()))
        } else {
            Ok(ImageSource::Remote(reference.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ImageSource::Embedded(url) | ImageSource::Remote(url) => url,
        }
    }

    pub fn is_embedded(&self) -> bool {
        matches!(self, ImageSource::Embedded(_))
    }

    /// MIME type declared by an embedded data URL.
    pub fn mime_type(&self) -> Option<&str> {
        let ImageSource::Embedded(url) = self else {
            return None;
        };
        let header = url.strip_prefix("data:")?.split(',').next()?;
        let mime = header.split(';').next()?;
        (!mime.is_empty()).then_some(mime)
    }
}

impl TryFrom<String> for ImageSource {
    type Error = ImageSourceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_reference(&value)
    }
}

impl From<ImageSource> for String {
    fn from(source: ImageSource) -> Self {
        match source {
            ImageSource::Embedded(url) | ImageSource::Remote(url) => url,
        }
    }
}

/// Values used for images placed with the image tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageDefaults {
    pub size: Size,
}

impl Default for ImageDefaults {
    fn default() -> Self {
        Self {
            size: Size::new(250.0, 200.0),
        }
    }
}

/// An image shown at a user-controlled size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageElement {
    pub(crate) id: ElementId,
    #[serde(flatten)]
    pub frame: ElementFrame,
    /// Resolved image reference.
    pub source: ImageSource,
}

impl ImageElement {
    /// Create a new image element.
    pub fn new(id: ElementId, position: Point, source: ImageSource, size: Size) -> Self {
        Self {
            id,
            frame: ElementFrame::new(position, size),
            source,
        }
    }

    pub(super) fn apply_patch(&mut self, patch: &ElementPatch) {
        if let Some(source) = &patch.source {
            self.source = source.clone();
        }
    }
}

impl ElementTrait for ImageElement {
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
    fn test_source_classification() {
        let remote = ImageSource::from_reference(" https://example.com/cat.jpg ").unwrap();
        assert_eq!(remote, ImageSource::Remote("https://example.com/cat.jpg".to_string()));
        assert!(!remote.is_embedded());
        assert_eq!(remote.mime_type(), None);

        let embedded = ImageSource::from_reference("data:image/png;base64,iVBORw0KGgo=").unwrap();
        assert!(embedded.is_embedded());
        assert_eq!(embedded.mime_type(), Some("image/png"));
    }

    #[test]
    fn test_empty_reference_is_rejected() {
        assert_eq!(ImageSource::from_reference(""), Err(ImageSourceError::Empty));
        assert_eq!(ImageSource::from_reference("   "), Err(ImageSourceError::Empty));
        assert!(serde_json::from_str::<ImageSource>("\"\"").is_err());
    }

    #[test]
    fn test_image_keeps_requested_size() {
        let source = ImageSource::from_reference("https://example.com/a.png").unwrap();
        let image = ImageElement::new(ElementId::from("i"), Point::new(5.0, 6.0), source, Size::new(250.0, 200.0));
        assert_eq!(image.frame.size, Size::new(250.0, 200.0));
        assert_eq!(image.bounds().x1, 255.0);
    }
}
