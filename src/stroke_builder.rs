use crate::stroke::{MutableStroke, Point, Stroke};
use egui::Color32;

/// Turns the pointer events of one gesture into a single [`Stroke`].
///
/// Only one gesture can be in flight at a time. Calls that do not fit the
/// current state are ignored rather than reported.
#[derive(Debug, Default)]
pub struct StrokeBuilder {
    // Transient state: the stroke being drawn (if any)
    current_stroke: Option<MutableStroke>,
}

impl StrokeBuilder {
    pub fn new() -> Self {
        Self { current_stroke: None }
    }

    /// Start a stroke at `point` with fixed attributes.
    ///
    /// Returns `false` without touching the in-progress stroke if a gesture
    /// has not ended yet.
    pub fn begin(&mut self, point: Point, color: Color32, width: f32) -> bool {
        if self.current_stroke.is_some() {
            log::trace!("Ignoring stroke start at {:?}: gesture already in progress", point);
            return false;
        }

        let mut stroke = MutableStroke::new(color, width);
        stroke.add_point(point);
        self.current_stroke = Some(stroke);
        true
    }

    /// Append a point to the in-progress stroke
    pub fn extend(&mut self, point: Point) -> bool {
        match &mut self.current_stroke {
            Some(stroke) => {
                stroke.add_point(point);
                true
            }
            None => {
                log::trace!("Ignoring pointer move at {:?}: no active stroke", point);
                false
            }
        }
    }

    /// Finish the gesture. Yields the stroke only if it recorded any points.
    pub fn end(&mut self) -> Option<Stroke> {
        let stroke = self.current_stroke.take()?;
        if stroke.points().is_empty() {
            log::trace!("Dropping empty stroke");
            return None;
        }
        Some(stroke.finish())
    }

    /// Abandon the in-progress stroke without producing anything
    pub fn cancel(&mut self) {
        if self.current_stroke.take().is_some() {
            log::debug!("Cancelled in-progress stroke");
        }
    }

    pub fn is_drawing(&self) -> bool {
        self.current_stroke.is_some()
    }

    pub fn in_progress(&self) -> Option<&[Point]> {
        self.current_stroke.as_ref().map(|stroke| stroke.points())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::Pos2;

    #[test]
    fn test_begin_while_drawing_is_ignored() {
        let mut builder = StrokeBuilder::new();
        assert!(builder.begin(Pos2::new(1.0, 1.0), Color32::RED, 3.0));
        assert!(!builder.begin(Pos2::new(50.0, 50.0), Color32::BLUE, 9.0));

        let stroke = builder.end().unwrap();
        assert_eq!(stroke.points(), &[Pos2::new(1.0, 1.0)]);
        assert_eq!(stroke.color(), Color32::RED);
        assert_eq!(stroke.width(), 3.0);
    }

    #[test]
    fn test_extend_and_end_without_stroke() {
        let mut builder = StrokeBuilder::new();
        assert!(!builder.extend(Pos2::new(1.0, 1.0)));
        assert!(builder.end().is_none());
        assert!(!builder.is_drawing());
    }

    #[test]
    fn test_duplicate_points_are_kept() {
        let mut builder = StrokeBuilder::new();
        builder.begin(Pos2::new(4.0, 4.0), Color32::BLACK, 1.0);
        builder.extend(Pos2::new(4.0, 4.0));
        builder.extend(Pos2::new(4.0, 4.0));

        assert_eq!(builder.in_progress().map(|p| p.len()), Some(3));
        assert_eq!(builder.end().unwrap().points().len(), 3);
    }

    #[test]
    fn test_cancel_clears_state() {
        let mut builder = StrokeBuilder::new();
        builder.begin(Pos2::new(4.0, 4.0), Color32::BLACK, 1.0);
        builder.cancel();
        assert!(builder.in_progress().is_none());
        assert!(builder.end().is_none());
    }
}
