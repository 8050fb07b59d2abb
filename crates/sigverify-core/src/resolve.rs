//! Image source resolution: turn either acquisition path into a
//! [`BinaryImage`].
//!
//! Uploaded files pass through untouched. Drawings are kept as strokes
//! and only rasterized (to PNG, at the canvas' configured size) when a
//! submission needs them.

use image::ImageEncoder;
use tiny_skia::{
    Color, FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke as SkStroke, Transform,
};

use crate::config::CanvasConfig;
use crate::error::VerifyError;
use crate::types::{BinaryImage, CanvasSize, DRAWN_FILENAME, PNG_MIME, Point, Slot, Stroke, UploadedFile};

/// Capability of a freehand drawing widget.
///
/// Any surface that can list its strokes, forget them, and produce a
/// PNG satisfies the resolver.
pub trait DrawingSurface {
    /// Strokes drawn so far, in drawing order.
    fn strokes(&self) -> &[Stroke];

    /// Discard every stroke, returning the surface to its empty state.
    fn clear(&mut self);

    /// Render the current strokes into a PNG image.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError::Rasterize`] if the raster cannot be
    /// allocated or encoded.
    fn rasterize(&self, slot: Slot) -> Result<BinaryImage, VerifyError>;
}

/// In-memory drawing surface rasterized with `tiny-skia`.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeCanvas {
    config: CanvasConfig,
    strokes: Vec<Stroke>,
}

impl StrokeCanvas {
    /// Create an empty canvas.
    #[must_use]
    pub const fn new(config: CanvasConfig) -> Self {
        Self {
            config,
            strokes: Vec::new(),
        }
    }

    /// Canvas dimensions in pixels.
    #[must_use]
    pub const fn size(&self) -> CanvasSize {
        self.config.size()
    }

    /// Stroke width in pixels.
    #[must_use]
    pub const fn stroke_width(&self) -> f32 {
        self.config.stroke_width
    }

    /// Append a completed stroke. Empty strokes are ignored.
    pub fn push_stroke(&mut self, stroke: Stroke) {
        if !stroke.is_empty() {
            self.strokes.push(stroke);
        }
    }

    /// Returns `true` if nothing has been drawn.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }
}

impl DrawingSurface for StrokeCanvas {
    fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    fn clear(&mut self) {
        self.strokes.clear();
    }

    #[allow(clippy::cast_possible_truncation)]
    fn rasterize(&self, slot: Slot) -> Result<BinaryImage, VerifyError> {
        let fail = |reason: String| VerifyError::Rasterize { slot, reason };
        let CanvasSize { width, height } = self.size();

        let mut pixmap = Pixmap::new(width, height)
            .ok_or_else(|| fail(format!("cannot allocate a {width}x{height} canvas")))?;
        pixmap.fill(Color::WHITE);

        // Round caps and joins for smooth pen-like curves.
        let stroke = SkStroke {
            width: self.config.stroke_width,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..SkStroke::default()
        };
        let mut paint = Paint::default();
        paint.set_color_rgba8(0, 0, 0, 255);
        paint.anti_alias = true;

        for drawn in &self.strokes {
            match drawn.points() {
                [] => {}
                // A tap leaves a round dot the width of the pen.
                [Point { x, y }] => {
                    let radius = self.config.stroke_width / 2.0;
                    if let Some(dot) = PathBuilder::from_circle(*x as f32, *y as f32, radius) {
                        pixmap.fill_path(&dot, &paint, FillRule::Winding, Transform::identity(), None);
                    }
                }
                points => {
                    if let Some(path) = polyline_path(points) {
                        pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
                    }
                }
            }
        }

        // The background is opaque, so premultiplied RGBA equals straight RGBA.
        let mut bytes = Vec::new();
        image::codecs::png::PngEncoder::new(&mut bytes)
            .write_image(pixmap.data(), width, height, image::ExtendedColorType::Rgba8)
            .map_err(|e| fail(e.to_string()))?;

        Ok(BinaryImage {
            bytes,
            filename: DRAWN_FILENAME.to_owned(),
            mime_type: PNG_MIME.to_owned(),
        })
    }
}

/// Build a `tiny-skia` path through `points`.
#[allow(clippy::cast_possible_truncation)]
fn polyline_path(points: &[Point]) -> Option<tiny_skia::Path> {
    let (first, rest) = points.split_first()?;
    let mut pb = PathBuilder::new();
    pb.move_to(first.x as f32, first.y as f32);
    for p in rest {
        pb.line_to(p.x as f32, p.y as f32);
    }
    pb.finish()
}

/// A comparison sample, by acquisition method.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageInput {
    /// A user-selected image file.
    Uploaded(UploadedFile),
    /// A freehand drawing.
    Drawn(StrokeCanvas),
}

impl ImageInput {
    /// Returns `true` if the input cannot yet produce an image: an upload
    /// with no bytes or a drawing with no strokes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Uploaded(file) => file.is_empty(),
            Self::Drawn(canvas) => canvas.strokes().is_empty(),
        }
    }
}

/// Resolve an input into the image that will be transmitted.
///
/// # Errors
///
/// Returns [`VerifyError::EmptyInput`] for an empty upload or a drawing
/// with no strokes, and [`VerifyError::Rasterize`] if a drawing cannot
/// be encoded.
pub fn resolve(input: &ImageInput, slot: Slot) -> Result<BinaryImage, VerifyError> {
    if input.is_empty() {
        return Err(VerifyError::EmptyInput { slot });
    }
    match input {
        ImageInput::Uploaded(file) => Ok(BinaryImage {
            bytes: file.bytes().to_vec(),
            filename: file.name().to_owned(),
            mime_type: file.mime_type().to_owned(),
        }),
        ImageInput::Drawn(canvas) => canvas.rasterize(slot),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn canvas() -> StrokeCanvas {
        StrokeCanvas::new(CanvasConfig {
            width: 40,
            height: 20,
            stroke_width: 3.0,
        })
    }

    fn diagonal() -> Stroke {
        Stroke::new(vec![Point::new(2.0, 2.0), Point::new(38.0, 18.0)])
    }

    fn decode(image: &BinaryImage) -> image::RgbaImage {
        image::load_from_memory_with_format(&image.bytes, image::ImageFormat::Png)
            .unwrap()
            .to_rgba8()
    }

    #[test]
    fn empty_drawing_is_empty_input() {
        let input = ImageInput::Drawn(canvas());
        let err = resolve(&input, Slot::Test).unwrap_err();
        assert_eq!(err, VerifyError::EmptyInput { slot: Slot::Test });
    }

    #[test]
    fn single_stroke_rasterizes_to_png() {
        let mut c = canvas();
        c.push_stroke(diagonal());
        let image = resolve(&ImageInput::Drawn(c), Slot::Original).unwrap();
        assert_eq!(image.filename, "drawn.png");
        assert_eq!(image.mime_type, "image/png");

        let decoded = decode(&image);
        assert_eq!(decoded.dimensions(), (40, 20));
        // Ink along the stroke, paper away from it.
        assert!(decoded.get_pixel(20, 10).0[0] < 128);
        assert_eq!(decoded.get_pixel(38, 2).0, [255, 255, 255, 255]);
    }

    #[test]
    fn tap_renders_a_dot() {
        let mut c = canvas();
        c.push_stroke(Stroke::new(vec![Point::new(10.0, 10.0)]));
        let decoded = decode(&c.rasterize(Slot::Test).unwrap());
        assert!(decoded.get_pixel(10, 10).0[0] < 128);
        assert_eq!(decoded.get_pixel(30, 10).0, [255, 255, 255, 255]);
    }

    #[test]
    fn any_non_empty_stroke_set_resolves() {
        for n in 1..=5 {
            let mut c = canvas();
            for i in 0..n {
                let y = f64::from(i) * 3.0 + 1.0;
                c.push_stroke(Stroke::new(vec![Point::new(1.0, y), Point::new(30.0, y)]));
            }
            assert!(resolve(&ImageInput::Drawn(c), Slot::Test).is_ok());
        }
    }

    #[test]
    fn empty_strokes_are_not_recorded() {
        let mut c = canvas();
        c.push_stroke(Stroke::default());
        assert!(c.is_empty());
    }

    #[test]
    fn clear_rearms_empty_input() {
        let mut c = canvas();
        c.push_stroke(diagonal());
        assert!(resolve(&ImageInput::Drawn(c.clone()), Slot::Test).is_ok());
        c.clear();
        assert!(matches!(
            resolve(&ImageInput::Drawn(c), Slot::Test),
            Err(VerifyError::EmptyInput { .. })
        ));
    }

    #[test]
    fn upload_passes_through_unchanged() {
        let bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 1, 2, 3];
        let file = UploadedFile::new("sample.png", bytes.clone()).unwrap();
        let image = resolve(&ImageInput::Uploaded(file), Slot::Original).unwrap();
        assert_eq!(image.bytes, bytes);
        assert_eq!(image.filename, "sample.png");
        assert_eq!(image.mime_type, "image/png");
    }

    #[test]
    fn empty_upload_is_empty_input() {
        let file = UploadedFile::new("blank.png", Vec::new()).unwrap();
        let err = resolve(&ImageInput::Uploaded(file), Slot::Original).unwrap_err();
        assert_eq!(err, VerifyError::EmptyInput { slot: Slot::Original });
    }
}
