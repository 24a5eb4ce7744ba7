use egui::{Color32, Pos2};
use std::sync::Arc;

/// A point in surface-local coordinates
pub type Point = Pos2;

// Immutable stroke, shared between history and snapshots
#[derive(Clone, Debug, PartialEq)]
pub struct Stroke {
    points: Vec<Point>,
    color: Color32,
    width: f32,
}

// Mutable stroke for the gesture currently being drawn
#[derive(Clone, Debug)]
pub struct MutableStroke {
    points: Vec<Point>,
    color: Color32,
    width: f32,
}

// Define a reference-counted type alias for Stroke
pub type StrokeRef = Arc<Stroke>;

impl Stroke {
    pub fn new(color: Color32, width: f32, points: Vec<Point>) -> Self {
        Self {
            points,
            color,
            width,
        }
    }

    pub fn new_ref(color: Color32, width: f32, points: Vec<Point>) -> StrokeRef {
        Arc::new(Self::new(color, width, points))
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn color(&self) -> Color32 {
        self.color
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl MutableStroke {
    pub fn new(color: Color32, width: f32) -> Self {
        Self {
            points: Vec::new(),
            color,
            width,
        }
    }

    pub fn add_point(&mut self, point: Point) {
        self.points.push(point);
    }

    /// Freeze into an immutable Stroke, consuming the builder state
    pub fn finish(self) -> Stroke {
        Stroke::new(self.color, self.width, self.points)
    }

    // Live points for the ink trail preview
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn color(&self) -> Color32 {
        self.color
    }

    pub fn width(&self) -> f32 {
        self.width
    }
}
