//! CPU rasterization of the canvas state.
//!
//! The live canvas and the export path both go through [`compose`], so an
//! exported image matches what was on screen pixel for pixel.

use crate::error::CanvasError;
use crate::stroke::{Point, StrokeRef};
use egui::Color32;
use image::RgbaImage;
use tiny_skia::{
    Color, ColorU8, FillRule, FilterQuality, LineCap, LineJoin, Paint, PathBuilder, Pixmap,
    PixmapPaint, Stroke as SkiaStroke, Transform,
};

/// Fill used wherever no background image covers the surface
pub const BACKGROUND_COLOR: Color32 = Color32::WHITE;

/// An immutable RGBA picture composited behind the strokes
#[derive(Clone)]
pub struct BackgroundImage {
    pixmap: Pixmap,
}

impl std::fmt::Debug for BackgroundImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackgroundImage")
            .field("width", &self.pixmap.width())
            .field("height", &self.pixmap.height())
            .finish()
    }
}

impl BackgroundImage {
    /// Build from straight (non-premultiplied) row-major RGBA8 pixels
    pub fn from_rgba(pixels: &[u8], width: u32, height: u32) -> Result<Self, CanvasError> {
        let invalid = || CanvasError::InvalidBackground {
            width,
            height,
            len: pixels.len(),
        };

        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(invalid)?;
        if expected != pixels.len() {
            return Err(invalid());
        }

        let mut pixmap = Pixmap::new(width, height).ok_or_else(invalid)?;
        for (dst, src) in pixmap.pixels_mut().iter_mut().zip(pixels.chunks_exact(4)) {
            *dst = ColorU8::from_rgba(src[0], src[1], src[2], src[3]).premultiply();
        }

        Ok(Self { pixmap })
    }

    pub fn from_image(image: &RgbaImage) -> Result<Self, CanvasError> {
        Self::from_rgba(image.as_raw(), image.width(), image.height())
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }
}

/// Allocate a surface, rejecting zero or unallocatable sizes
pub fn new_surface(width: u32, height: u32) -> Result<Pixmap, CanvasError> {
    Pixmap::new(width, height).ok_or(CanvasError::InvalidDimensions { width, height })
}

/// Paint the background and the given strokes over the whole surface
pub fn compose(
    surface: &mut Pixmap,
    background: Option<&BackgroundImage>,
    strokes: &[StrokeRef],
) {
    paint_background(surface, background);
    for stroke in strokes {
        paint_stroke(surface, stroke.points(), stroke.color(), stroke.width());
    }
}

pub fn paint_background(surface: &mut Pixmap, background: Option<&BackgroundImage>) {
    surface.fill(to_skia_color(BACKGROUND_COLOR));

    let Some(background) = background else {
        return;
    };

    // Stretch over the surface bounds; anything outside is clipped
    let sx = surface.width() as f32 / background.width() as f32;
    let sy = surface.height() as f32 / background.height() as f32;
    let paint = PixmapPaint {
        quality: FilterQuality::Bilinear,
        ..PixmapPaint::default()
    };
    surface.draw_pixmap(
        0,
        0,
        background.pixmap.as_ref(),
        &paint,
        Transform::from_scale(sx, sy),
        None,
    );
}

/// Draw a polyline with round caps and joins.
///
/// A stroke whose points all coincide becomes a dot of diameter `width`.
pub fn paint_stroke(surface: &mut Pixmap, points: &[Point], color: Color32, width: f32) {
    let Some(&first) = points.first() else {
        return;
    };

    let mut paint = Paint::default();
    paint.set_color(to_skia_color(color));
    paint.anti_alias = true;

    if points.iter().all(|p| *p == first) {
        paint_dot(surface, first, width, &paint);
        return;
    }

    let mut builder = PathBuilder::new();
    builder.move_to(first.x, first.y);
    let mut last = first;
    for &point in &points[1..] {
        if point != last {
            builder.line_to(point.x, point.y);
            last = point;
        }
    }

    let stroke = SkiaStroke {
        width,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..SkiaStroke::default()
    };
    match builder.finish() {
        Some(path) => {
            surface.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
        }
        None => paint_dot(surface, first, width, &paint),
    }
}

fn paint_dot(surface: &mut Pixmap, center: Point, width: f32, paint: &Paint<'_>) {
    if let Some(circle) = PathBuilder::from_circle(center.x, center.y, width / 2.0) {
        surface.fill_path(&circle, paint, FillRule::Winding, Transform::identity(), None);
    }
}

/// Render the committed strokes into a new opaque RGBA8 buffer
pub fn flatten(
    width: u32,
    height: u32,
    background: Option<&BackgroundImage>,
    strokes: &[StrokeRef],
) -> Result<RgbaImage, CanvasError> {
    let mut surface = new_surface(width, height)?;
    compose(&mut surface, background, strokes);
    to_opaque_image(&surface)
}

/// Copy a surface into a straight-alpha buffer with every pixel forced opaque
pub fn to_opaque_image(surface: &Pixmap) -> Result<RgbaImage, CanvasError> {
    let (width, height) = (surface.width(), surface.height());
    let mut raw = Vec::with_capacity(surface.pixels().len() * 4);
    for pixel in surface.pixels() {
        let color = pixel.demultiply();
        raw.extend_from_slice(&[color.red(), color.green(), color.blue(), u8::MAX]);
    }
    RgbaImage::from_raw(width, height, raw).ok_or(CanvasError::InvalidDimensions { width, height })
}

fn to_skia_color(color: Color32) -> Color {
    let [r, g, b, a] = color.to_srgba_unmultiplied();
    Color::from_rgba8(r, g, b, a)
}
