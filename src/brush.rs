use egui::Color32;

/// Smallest width a stroke can be drawn with
pub const MIN_BRUSH_WIDTH: f32 = 1.0;

pub const DEFAULT_BRUSH_COLOR: Color32 = Color32::BLACK;

/// The color and width copied into every new stroke
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrushState {
    color: Color32,
    width: f32,
}

impl Default for BrushState {
    fn default() -> Self {
        Self {
            color: DEFAULT_BRUSH_COLOR,
            width: MIN_BRUSH_WIDTH,
        }
    }
}

impl BrushState {
    pub fn new(color: Color32, width: f32) -> Self {
        Self {
            color,
            width: clamp_width(width),
        }
    }

    pub fn color(&self) -> Color32 {
        self.color
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn set_color(&mut self, color: Color32) {
        self.color = color;
    }

    /// Non-positive and non-finite widths fall back to [`MIN_BRUSH_WIDTH`]
    pub fn set_width(&mut self, width: f32) {
        let clamped = clamp_width(width);
        if clamped != width {
            log::debug!("Brush width {} clamped to {}", width, clamped);
        }
        self.width = clamped;
    }
}

fn clamp_width(width: f32) -> f32 {
    if !width.is_finite() || width < MIN_BRUSH_WIDTH {
        MIN_BRUSH_WIDTH
    } else {
        width
    }
}

/// Swatches offered by the color picker and which one is selected
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: Vec<Color32>,
    selected: usize,
}

impl Default for Palette {
    fn default() -> Self {
        Self::new(vec![
            Color32::BLACK,
            Color32::from_rgb(0xF4, 0x43, 0x36),
            Color32::from_rgb(0xFF, 0x98, 0x00),
            Color32::from_rgb(0xFF, 0xEB, 0x3B),
            Color32::from_rgb(0x4C, 0xAF, 0x50),
            Color32::from_rgb(0x21, 0x96, 0xF3),
            Color32::from_rgb(0x9C, 0x27, 0xB0),
            Color32::from_rgb(0x79, 0x55, 0x48),
            Color32::WHITE,
        ])
    }
}

impl Palette {
    pub fn new(colors: Vec<Color32>) -> Self {
        let colors = if colors.is_empty() {
            vec![DEFAULT_BRUSH_COLOR]
        } else {
            colors
        };
        Self { colors, selected: 0 }
    }

    pub fn colors(&self) -> &[Color32] {
        &self.colors
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected_color(&self) -> Color32 {
        self.colors
            .get(self.selected)
            .copied()
            .unwrap_or(DEFAULT_BRUSH_COLOR)
    }

    /// Select a swatch, returning its color. Out of range indices change nothing.
    pub fn select(&mut self, index: usize) -> Option<Color32> {
        let color = *self.colors.get(index)?;
        self.selected = index;
        Some(color)
    }
}
