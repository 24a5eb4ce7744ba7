use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the drawing core.
///
/// Gesture misuse (extending without a stroke, empty strokes, bad brush
/// widths) is absorbed by the engine and never shows up here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CanvasError {
    #[error("invalid surface dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("background buffer of {len} bytes does not match {width}x{height} RGBA")]
    InvalidBackground { width: u32, height: u32, len: usize },
}

/// Errors from the export pipeline (permission gate, worker and sink)
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("storage access has not been granted")]
    PermissionDenied,
    #[error(transparent)]
    Canvas(#[from] CanvasError),
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode image: {0}")]
    Encode(#[from] image::ImageError),
    #[error("export was cancelled before it finished")]
    Cancelled,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum BackgroundLoadError {
    #[error("not a supported image file: {0}")]
    Unsupported(String),
    #[error("no data available for {0}")]
    NoData(String),
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error(transparent)]
    Canvas(#[from] CanvasError),
}
