use crate::brush::Palette;
use crate::canvas::CanvasEngine;
use crate::config::BoardConfig;
use crate::error::BackgroundLoadError;
use crate::export::{self, ExportSink, ExportTask, FileExportSink};
use crate::file_handler::{self, FileHandler};
use crate::panels::{central_panel, tools_panel};
use crate::raster::{self, BackgroundImage};
use egui::{ColorImage, TextureHandle, TextureOptions};
use std::path::PathBuf;
use std::sync::Arc;
use tiny_skia::Pixmap;

const BRUSH_KEY: &str = "drawing_board_brush";

/// The part of the app state that survives restarts.
/// Strokes are deliberately not part of it.
#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, Copy)]
#[serde(default)] // if we add new fields, give them default values when deserializing old state
struct PersistedBrush {
    width: f32,
    palette_index: usize,
}

impl Default for PersistedBrush {
    fn default() -> Self {
        Self {
            width: BoardConfig::default().initial_brush_width,
            palette_index: 0,
        }
    }
}

pub struct PaintApp {
    canvas: CanvasEngine,
    palette: Palette,
    max_brush_width: f32,
    sink: Arc<dyn ExportSink>,
    /// Desktop platforms have no runtime storage permission; kept as the gate
    /// every export passes through.
    storage_granted: bool,
    file_handler: FileHandler,
    surface: Option<Pixmap>,
    texture: Option<TextureHandle>,
    export_task: Option<ExportTask>,
    status: Option<String>,
}

impl PaintApp {
    /// Called once before the first frame.
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        config: &BoardConfig,
        background: Option<PathBuf>,
    ) -> Self {
        let persisted = cc
            .storage
            .and_then(|storage| eframe::get_value::<PersistedBrush>(storage, BRUSH_KEY))
            .unwrap_or(PersistedBrush {
                width: config.initial_brush_width,
                palette_index: 0,
            });

        let sink = FileExportSink::new(config.export_directory(), config.file_prefix.clone());
        let mut app = Self::with_sink(config, Arc::new(sink));
        app.palette.select(persisted.palette_index);
        app.canvas.set_brush_color(app.palette.selected_color());
        app.set_brush_width(persisted.width);

        if let Some(path) = background {
            match file_handler::load_background(&path) {
                Ok(image) => app.canvas.set_background(Arc::new(image)),
                Err(err) => {
                    app.status = Some(format!("Could not open {}: {}", path.display(), err));
                }
            }
        }

        app
    }

    /// Build without any eframe context, writing exports to `sink`
    pub fn with_sink(config: &BoardConfig, sink: Arc<dyn ExportSink>) -> Self {
        let palette = config.palette();
        let mut canvas = CanvasEngine::new();
        canvas.set_brush_color(palette.selected_color());
        canvas.set_brush_width(config.initial_brush_width);

        Self {
            canvas,
            palette,
            max_brush_width: config.max_brush_width(),
            sink,
            storage_granted: true,
            file_handler: FileHandler::new(),
            surface: None,
            texture: None,
            export_task: None,
            status: None,
        }
    }

    pub fn canvas(&self) -> &CanvasEngine {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut CanvasEngine {
        &mut self.canvas
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn select_color(&mut self, index: usize) {
        if let Some(color) = self.palette.select(index) {
            log::debug!("Palette entry {} selected", index);
            self.canvas.set_brush_color(color);
        }
    }

    pub fn max_brush_width(&self) -> f32 {
        self.max_brush_width
    }

    /// Cap at the slider maximum. Non-finite widths go straight to the
    /// canvas, which treats them as invalid.
    pub fn set_brush_width(&mut self, width: f32) {
        let width = if width.is_finite() {
            width.min(self.max_brush_width)
        } else {
            width
        };
        self.canvas.set_brush_width(width);
    }

    pub fn undo(&mut self) {
        self.canvas.undo();
    }

    pub fn redo(&mut self) {
        self.canvas.redo();
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = Some(status.into());
    }

    pub fn is_exporting(&self) -> bool {
        self.export_task.is_some()
    }

    /// Flatten the canvas at its on-screen size and write it in the background
    pub fn start_export(&mut self) {
        if self.export_task.is_some() {
            return;
        }
        let Some(surface) = &self.surface else {
            self.status = Some("Nothing to save yet".to_owned());
            return;
        };

        match export::start_export(
            &self.canvas,
            surface.width(),
            surface.height(),
            self.storage_granted,
            self.sink.clone(),
        ) {
            Ok(task) => {
                self.status = Some("Saving…".to_owned());
                self.export_task = Some(task);
            }
            Err(err) => self.status = Some(format!("Save failed: {}", err)),
        }
    }

    /// Collect a finished export, if any. Canvas state is never touched here.
    pub fn poll_export(&mut self) {
        let Some(task) = &mut self.export_task else {
            return;
        };
        let Some(result) = task.poll() else {
            return;
        };

        self.export_task = None;
        self.status = Some(match result {
            Ok(path) => format!("File saved successfully: {}", path.display()),
            Err(err) => format!("Something went wrong while saving the file: {}", err),
        });
    }

    pub fn clear_background(&mut self) {
        self.canvas.clear_background_image();
    }

    /// Make sure the raster surface matches `size` and is up to date, then
    /// return the texture showing it.
    pub fn canvas_texture(
        &mut self,
        ctx: &egui::Context,
        size: [u32; 2],
    ) -> Option<&TextureHandle> {
        let [width, height] = size;
        let resized = self
            .surface
            .as_ref()
            .is_none_or(|s| s.width() != width || s.height() != height);
        if resized {
            match raster::new_surface(width, height) {
                Ok(surface) => {
                    log::debug!("Canvas surface resized to {}x{}", width, height);
                    self.surface = Some(surface);
                    self.canvas.request_redraw();
                }
                Err(err) => {
                    log::trace!("Skipping canvas surface: {}", err);
                    return None;
                }
            }
        }

        let redraw = self.canvas.take_redraw_request() || self.texture.is_none();
        if let Some(surface) = &mut self.surface {
            if redraw {
                self.canvas.render(surface);
                let image = ColorImage::from_rgba_premultiplied(
                    [surface.width() as usize, surface.height() as usize],
                    surface.data(),
                );
                match &mut self.texture {
                    Some(texture) => texture.set(image, TextureOptions::NEAREST),
                    None => {
                        let texture = ctx.load_texture("canvas", image, TextureOptions::NEAREST);
                        self.texture = Some(texture);
                    }
                }
            }
        }

        self.texture.as_ref()
    }

    /// Ask the user for an image file and use it as the background
    pub fn open_background_dialog(&mut self) {
        let picked = file_handler::pick_background();
        self.apply_background(picked, "Could not open image");
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        self.file_handler.preview_files_being_dropped(ctx);
        if !self.file_handler.check_for_dropped_files(ctx) {
            return;
        }

        let dropped = self.file_handler.take_background();
        self.apply_background(dropped, "Could not use dropped file");
    }

    fn apply_background(
        &mut self,
        loaded: Option<Result<BackgroundImage, BackgroundLoadError>>,
        failure: &str,
    ) {
        match loaded {
            Some(Ok(image)) => {
                self.canvas.set_background(Arc::new(image));
                self.status = None;
            }
            Some(Err(err)) => self.status = Some(format!("{}: {}", failure, err)),
            None => {}
        }
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        use egui::{Key, KeyboardShortcut, Modifiers};

        let redo = KeyboardShortcut::new(Modifiers::COMMAND | Modifiers::SHIFT, Key::Z);
        let undo = KeyboardShortcut::new(Modifiers::COMMAND, Key::Z);
        let save = KeyboardShortcut::new(Modifiers::COMMAND, Key::S);

        // Redo first: the undo shortcut would also match with shift held
        if ctx.input_mut(|i| i.consume_shortcut(&redo)) {
            self.redo();
        } else if ctx.input_mut(|i| i.consume_shortcut(&undo)) {
            self.undo();
        }
        if ctx.input_mut(|i| i.consume_shortcut(&save)) {
            self.start_export();
        }
    }
}

impl eframe::App for PaintApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        let brush = PersistedBrush {
            width: self.canvas.brush().width(),
            palette_index: self.palette.selected_index(),
        };
        eframe::set_value(storage, BRUSH_KEY, &brush);
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_shortcuts(ctx);
        self.handle_dropped_files(ctx);

        self.poll_export();
        if self.is_exporting() {
            ctx.request_repaint();
        }

        tools_panel(self, ctx);
        central_panel(self, ctx);
    }
}
