//! Shared types for the sigverify verification lifecycle.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Synthesized filename for samples rasterized from a drawing.
pub const DRAWN_FILENAME: &str = "drawn.png";

/// MIME type of rasterized drawings.
pub const PNG_MIME: &str = "image/png";

/// A 2D point in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position (pixels from left edge).
    pub x: f64,
    /// Vertical position (pixels from top edge).
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// One continuous pointer-drawn segment, from pointer down to pointer up.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stroke(Vec<Point>);

impl Stroke {
    /// Create a stroke from a vector of points.
    #[must_use]
    pub const fn new(points: Vec<Point>) -> Self {
        Self(points)
    }

    /// Append a point to the end of the stroke.
    pub fn push(&mut self, point: Point) {
        self.0.push(point);
    }

    /// Returns `true` if the stroke has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of points in the stroke.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns a slice of all points.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.0
    }
}

/// Canvas dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Which of the two comparison inputs a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Slot {
    /// The reference sample.
    Original,
    /// The sample being checked against the reference.
    Test,
}

impl Slot {
    /// Both slots, in submission order.
    pub const ALL: [Self; 2] = [Self::Original, Self::Test];

    /// Display label for the slot.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Original => "Original Sample",
            Self::Test => "Test Sample",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An encoded image ready for transmission.
///
/// Owns its byte buffer. Rasterized drawings allocate a fresh buffer per
/// attempt; it is released when the request carrying it is dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryImage {
    /// Encoded image bytes (PNG, JPEG, ...).
    pub bytes: Vec<u8>,
    /// Filename sent with the multipart part.
    pub filename: String,
    /// MIME type sent with the multipart part.
    pub mime_type: String,
}

/// The selected file was not recognized as an image.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported file type: {name}")]
pub struct UnsupportedFileType {
    /// Name of the rejected file.
    pub name: String,
}

/// A user-selected image file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    name: String,
    mime_type: String,
    bytes: Vec<u8>,
}

impl UploadedFile {
    /// Wrap a selected file, determining its `image/*` MIME type.
    ///
    /// The type is sniffed from the content first and falls back to the
    /// file extension (empty files have no content to sniff).
    ///
    /// # Errors
    ///
    /// Returns [`UnsupportedFileType`] if neither the content nor the
    /// extension identify an image format.
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, UnsupportedFileType> {
        let name = name.into();
        let mime_type = image::guess_format(&bytes)
            .ok()
            .map(|format| format.to_mime_type())
            .filter(|mime| mime.starts_with("image/"))
            .or_else(|| mime_for_extension(&name));
        match mime_type {
            Some(mime) => Ok(Self {
                name,
                mime_type: mime.to_owned(),
                bytes,
            }),
            None => Err(UnsupportedFileType { name }),
        }
    }

    /// The original filename.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The `image/*` MIME type.
    #[must_use]
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// The raw file bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns `true` if the file has no content.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Map a filename extension to the MIME type of a readable image format.
fn mime_for_extension(name: &str) -> Option<&'static str> {
    let (_, ext) = name.rsplit_once('.')?;
    image::ImageFormat::from_extension(ext)
        .filter(|format| format.reading_enabled())
        .map(|format| format.to_mime_type())
}
