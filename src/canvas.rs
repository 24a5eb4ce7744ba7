use crate::brush::BrushState;
use crate::error::CanvasError;
use crate::history::HistoryStack;
use crate::raster::{self, BackgroundImage};
use crate::stroke::{Point, StrokeRef};
use crate::stroke_builder::StrokeBuilder;
use egui::Color32;
use image::RgbaImage;
use std::sync::Arc;
use tiny_skia::Pixmap;

/// The drawing surface: routes gestures, owns history and renders.
///
/// All methods are expected to run on the host's interaction thread. Work
/// that should leave that thread goes through [`CanvasEngine::flatten_job`].
#[derive(Debug, Default)]
pub struct CanvasEngine {
    brush: BrushState,
    builder: StrokeBuilder,
    history: HistoryStack,
    background: Option<Arc<BackgroundImage>>,
    redraw_requested: bool,
}

impl CanvasEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_pointer_down(&mut self, point: Point) {
        // Attributes are copied so later brush changes don't reach this stroke
        let brush = self.brush;
        if self.builder.begin(point, brush.color(), brush.width()) {
            log::debug!("Stroke started at {:?}", point);
            self.redraw_requested = true;
        }
    }

    pub fn on_pointer_move(&mut self, point: Point) {
        if self.builder.extend(point) {
            self.redraw_requested = true;
        }
    }

    pub fn on_pointer_up(&mut self) {
        let Some(stroke) = self.builder.end() else {
            return;
        };

        let points = stroke.points().len();
        if self.history.commit(Arc::new(stroke)) {
            log::debug!("Committed stroke with {} points ({} total)", points, self.history.len());
        }
        self.redraw_requested = true;
    }

    /// Drop the gesture in flight, e.g. when the pointer is lost
    pub fn cancel_gesture(&mut self) {
        if self.builder.is_drawing() {
            self.builder.cancel();
            self.redraw_requested = true;
        }
    }

    pub fn is_drawing(&self) -> bool {
        self.builder.is_drawing()
    }

    pub fn undo(&mut self) -> bool {
        let changed = self.history.undo();
        if changed {
            log::debug!("Undo ({} strokes visible)", self.history.len());
            self.redraw_requested = true;
        }
        changed
    }

    pub fn redo(&mut self) -> bool {
        let changed = self.history.redo();
        if changed {
            log::debug!("Redo ({} strokes visible)", self.history.len());
            self.redraw_requested = true;
        }
        changed
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Color for strokes started from now on
    pub fn set_brush_color(&mut self, color: Color32) {
        self.brush.set_color(color);
    }

    /// Width for strokes started from now on, clamped to the brush minimum
    pub fn set_brush_width(&mut self, width: f32) {
        self.brush.set_width(width);
    }

    pub fn brush(&self) -> &BrushState {
        &self.brush
    }

    pub fn set_background_image(
        &mut self,
        pixels: &[u8],
        width: u32,
        height: u32,
    ) -> Result<(), CanvasError> {
        let background = BackgroundImage::from_rgba(pixels, width, height)?;
        self.set_background(Arc::new(background));
        Ok(())
    }

    /// Use an already decoded background, shared with whoever supplied it
    pub fn set_background(&mut self, background: Arc<BackgroundImage>) {
        log::info!(
            "Background image set ({}x{})",
            background.width(),
            background.height()
        );
        self.background = Some(background);
        self.redraw_requested = true;
    }

    pub fn clear_background_image(&mut self) {
        if self.background.take().is_some() {
            log::info!("Background image cleared");
            self.redraw_requested = true;
        }
    }

    pub fn has_background(&self) -> bool {
        self.background.is_some()
    }

    /// Committed strokes in drawing order
    pub fn strokes(&self) -> &[StrokeRef] {
        self.history.strokes()
    }

    /// Ask for a redraw, e.g. after the host resized the surface
    pub fn request_redraw(&mut self) {
        self.redraw_requested = true;
    }

    /// Returns whether a redraw was pending and clears the request
    pub fn take_redraw_request(&mut self) -> bool {
        std::mem::take(&mut self.redraw_requested)
    }

    /// Draw the full state, including the stroke in progress, onto `target`
    pub fn render(&self, target: &mut Pixmap) {
        raster::compose(target, self.background.as_deref(), self.history.strokes());

        // The live ink trail follows the brush as it is right now
        if let Some(points) = self.builder.in_progress() {
            raster::paint_stroke(target, points, self.brush.color(), self.brush.width());
        }
    }

    /// Flatten the committed state into an opaque RGBA8 buffer
    pub fn export_flattened(&self, width: u32, height: u32) -> Result<RgbaImage, CanvasError> {
        raster::flatten(
            width,
            height,
            self.background.as_deref(),
            self.history.strokes(),
        )
    }

    /// Capture what an export needs so it can be flattened on another thread
    pub fn flatten_job(&self, width: u32, height: u32) -> Result<FlattenJob, CanvasError> {
        if width == 0 || height == 0 {
            return Err(CanvasError::InvalidDimensions { width, height });
        }
        Ok(FlattenJob {
            width,
            height,
            background: self.background.clone(),
            strokes: self.history.snapshot(),
        })
    }
}

/// An immutable snapshot of the committed canvas, ready to be flattened
#[derive(Debug, Clone)]
pub struct FlattenJob {
    width: u32,
    height: u32,
    background: Option<Arc<BackgroundImage>>,
    strokes: Vec<StrokeRef>,
}

impl FlattenJob {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn stroke_count(&self) -> usize {
        self.strokes.len()
    }

    pub fn run(&self) -> Result<RgbaImage, CanvasError> {
        raster::flatten(self.width, self.height, self.background.as_deref(), &self.strokes)
    }
}
