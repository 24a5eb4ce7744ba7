#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod brush;
pub mod canvas;
pub mod config;
pub mod error;
pub mod export;
pub mod file_handler;
pub mod history;
pub mod panels;
pub mod raster;
pub mod stroke;
pub mod stroke_builder;

pub use app::PaintApp;
pub use brush::{BrushState, MIN_BRUSH_WIDTH, Palette};
pub use canvas::{CanvasEngine, FlattenJob};
pub use config::BoardConfig;
pub use error::{CanvasError, ExportError};
pub use export::{ExportSink, FileExportSink};
pub use history::{HistoryStack, SharedHistory};
pub use raster::BackgroundImage;
pub use stroke::{Point, Stroke, StrokeRef};
pub use stroke_builder::StrokeBuilder;
