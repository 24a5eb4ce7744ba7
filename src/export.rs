//! Getting a flattened canvas onto disk.
//!
//! The canvas only produces pixels; this module owns the permission gate,
//! the worker boundary and the file sink.

use crate::canvas::{CanvasEngine, FlattenJob};
use crate::error::ExportError;
use futures::channel::oneshot;
use image::{ImageFormat, RgbaImage};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Receives finished exports and makes them durable
pub trait ExportSink: Send + Sync {
    /// Store the image, returning where it ended up
    fn write(&self, image: &RgbaImage) -> Result<PathBuf, ExportError>;
}

/// Writes PNG files named `<prefix>_<unix seconds>.png` into a directory
#[derive(Debug, Clone)]
pub struct FileExportSink {
    directory: PathBuf,
    prefix: String,
}

impl FileExportSink {
    pub fn new(directory: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            prefix: prefix.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn next_path(&self) -> PathBuf {
        let seconds = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();

        let mut path = self.directory.join(format!("{}_{}.png", self.prefix, seconds));
        // Several exports within one second must not overwrite each other
        let mut n = 1;
        while path.exists() {
            path = self
                .directory
                .join(format!("{}_{}_{}.png", self.prefix, seconds, n));
            n += 1;
        }
        path
    }
}

impl ExportSink for FileExportSink {
    fn write(&self, image: &RgbaImage) -> Result<PathBuf, ExportError> {
        std::fs::create_dir_all(&self.directory).map_err(|source| ExportError::Io {
            path: self.directory.clone(),
            source,
        })?;

        let path = self.next_path();
        image.save_with_format(&path, ImageFormat::Png)?;
        log::info!("Saved {}x{} image to {}", image.width(), image.height(), path.display());
        Ok(path)
    }
}

/// Flatten and write synchronously, but only if storage access was granted
pub fn export_with_permission(
    canvas: &CanvasEngine,
    width: u32,
    height: u32,
    storage_granted: bool,
    sink: &dyn ExportSink,
) -> Result<PathBuf, ExportError> {
    if !storage_granted {
        log::warn!("Export skipped: storage access not granted");
        return Err(ExportError::PermissionDenied);
    }
    let image = canvas.export_flattened(width, height)?;
    sink.write(&image)
}

/// A running background export. Dropping it discards the result.
#[derive(Debug)]
pub struct ExportTask {
    receiver: oneshot::Receiver<Result<PathBuf, ExportError>>,
}

impl ExportTask {
    /// Non-blocking poll: `None` while the worker is still busy
    pub fn poll(&mut self) -> Option<Result<PathBuf, ExportError>> {
        match self.receiver.try_recv() {
            Ok(Some(result)) => Some(result),
            Ok(None) => None,
            Err(oneshot::Canceled) => Some(Err(ExportError::Cancelled)),
        }
    }

    /// Block until the worker finishes
    pub fn wait(self) -> Result<PathBuf, ExportError> {
        futures::executor::block_on(self.receiver).unwrap_or(Err(ExportError::Cancelled))
    }
}

/// Run a flatten job and the sink on a worker thread.
///
/// The job is already a snapshot, so the canvas stays free for input while
/// this runs.
pub fn spawn_export(job: FlattenJob, sink: Arc<dyn ExportSink>) -> ExportTask {
    let (sender, receiver) = oneshot::channel();

    std::thread::spawn(move || {
        log::debug!(
            "Flattening {} strokes at {}x{}",
            job.stroke_count(),
            job.width(),
            job.height()
        );
        let result = job
            .run()
            .map_err(ExportError::from)
            .and_then(|image| sink.write(&image));
        if let Err(err) = &result {
            log::error!("Export failed: {}", err);
        }
        // The receiver may be gone if the caller lost interest
        let _ = sender.send(result);
    });

    ExportTask { receiver }
}

/// Snapshot the canvas and export it in the background, if storage access
/// was granted. Nothing is flattened when the gate is closed.
pub fn start_export(
    canvas: &CanvasEngine,
    width: u32,
    height: u32,
    storage_granted: bool,
    sink: Arc<dyn ExportSink>,
) -> Result<ExportTask, ExportError> {
    if !storage_granted {
        log::warn!("Export skipped: storage access not granted");
        return Err(ExportError::PermissionDenied);
    }
    let job = canvas.flatten_job(width, height)?;
    Ok(spawn_export(job, sink))
}
