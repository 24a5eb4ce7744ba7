use crate::error::BackgroundLoadError;
use crate::raster::BackgroundImage;
use eframe::egui;
use std::path::Path;

/// Supplies background images from dropped or named files
pub struct FileHandler {
    dropped_files: Vec<egui::DroppedFile>,
}

impl Default for FileHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl FileHandler {
    pub fn new() -> Self {
        Self {
            dropped_files: Vec::new(),
        }
    }

    /// Pick up any files dropped onto the window this frame.
    /// Returns true if there is something to process.
    pub fn check_for_dropped_files(&mut self, ctx: &egui::Context) -> bool {
        ctx.input(|i| {
            if !i.raw.dropped_files.is_empty() {
                self.dropped_files = i.raw.dropped_files.clone();
            }
        });
        !self.dropped_files.is_empty()
    }

    /// Decode the first usable dropped image; later images are ignored
    pub fn take_background(&mut self) -> Option<Result<BackgroundImage, BackgroundLoadError>> {
        let files = std::mem::take(&mut self.dropped_files);
        let mut last_error = None;

        for file in &files {
            let name = display_name(file);
            if !is_image_file(file) {
                log::warn!("Dropped file is not a supported type: {}", name);
                last_error = Some(BackgroundLoadError::Unsupported(name));
                continue;
            }

            match load_dropped(file, &name) {
                Ok(image) => return Some(Ok(image)),
                Err(err) => {
                    log::error!("Failed to load {}: {}", name, err);
                    last_error = Some(err);
                }
            }
        }

        last_error.map(Err)
    }

    /// Preview files being dragged over the application
    pub fn preview_files_being_dropped(&self, ctx: &egui::Context) {
        use egui::{Align2, Color32, FontId, Id, LayerId, Order};

        if ctx.input(|i| i.raw.hovered_files.is_empty()) {
            return;
        }

        let layer = LayerId::new(Order::Foreground, Id::new("file_drop_target"));
        let painter = ctx.layer_painter(layer);
        let screen_rect = ctx.screen_rect();
        painter.rect_filled(screen_rect, 0.0, Color32::from_black_alpha(192));
        painter.text(
            screen_rect.center(),
            Align2::CENTER_CENTER,
            "Drop an image to use it as the background",
            FontId::proportional(24.0),
            Color32::WHITE,
        );
    }
}

/// File extensions the background provider can decode
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp"];

/// Show a native file picker and decode the chosen image.
/// Returns `None` if the user cancelled.
pub fn pick_background() -> Option<Result<BackgroundImage, BackgroundLoadError>> {
    let path = rfd::FileDialog::new()
        .set_title("Open background image")
        .add_filter("Images", IMAGE_EXTENSIONS)
        .pick_file()?;
    log::info!("Loading background from picker: {}", path.display());
    Some(load_background(&path))
}

/// Decode an image file from disk
pub fn load_background(path: &Path) -> Result<BackgroundImage, BackgroundLoadError> {
    if !has_image_extension(path) {
        return Err(BackgroundLoadError::Unsupported(path.display().to_string()));
    }
    let bytes = std::fs::read(path).map_err(|source| BackgroundLoadError::Read {
        path: path.to_owned(),
        source,
    })?;
    decode_background(&bytes)
}

/// Decode in-memory image bytes in any supported format
pub fn decode_background(bytes: &[u8]) -> Result<BackgroundImage, BackgroundLoadError> {
    let img = image::load_from_memory(bytes)?;
    log::debug!("Decoded image: {}x{}", img.width(), img.height());
    Ok(BackgroundImage::from_image(&img.to_rgba8())?)
}

fn load_dropped(
    file: &egui::DroppedFile,
    name: &str,
) -> Result<BackgroundImage, BackgroundLoadError> {
    if let Some(bytes) = &file.bytes {
        log::info!("Loading background from memory: {} ({} bytes)", name, bytes.len());
        return decode_background(bytes);
    }
    if let Some(path) = &file.path {
        log::info!("Loading background from path: {}", path.display());
        return load_background(path);
    }
    Err(BackgroundLoadError::NoData(name.to_owned()))
}

fn display_name(file: &egui::DroppedFile) -> String {
    if let Some(path) = &file.path {
        path.display().to_string()
    } else if !file.name.is_empty() {
        file.name.clone()
    } else {
        "unknown".to_owned()
    }
}

/// Check if a file is an image based on MIME type or extension
fn is_image_file(file: &egui::DroppedFile) -> bool {
    if !file.mime.is_empty() {
        file.mime.starts_with("image/")
    } else if let Some(path) = &file.path {
        has_image_extension(path)
    } else {
        has_image_extension(Path::new(&file.name))
    }
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    #[test]
    fn test_decode_png_bytes() {
        let source = RgbaImage::from_pixel(3, 2, Rgba([10, 20, 30, 255]));
        let mut bytes = Vec::new();
        source
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();

        let background = decode_background(&bytes).unwrap();
        assert_eq!((background.width(), background.height()), (3, 2));
    }

    #[test]
    fn test_rejects_unknown_extension() {
        let err = load_background(Path::new("notes.txt")).unwrap_err();
        assert!(matches!(err, BackgroundLoadError::Unsupported(_)));
    }

    #[test]
    fn test_extension_check_ignores_case() {
        assert!(has_image_extension(Path::new("photo.JPG")));
        assert!(has_image_extension(Path::new("dir/scan.webp")));
        assert!(!has_image_extension(Path::new("archive.tar.gz")));
        assert!(!has_image_extension(Path::new("no_extension")));
    }

    #[test]
    fn test_load_background_from_disk() {
        let dir = std::env::temp_dir().join(format!("drawing_board_bg_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("background.png");
        RgbaImage::from_pixel(5, 4, Rgba([1, 2, 3, 255])).save(&path).unwrap();

        let background = load_background(&path).unwrap();
        assert_eq!((background.width(), background.height()), (5, 4));

        let missing = load_background(&dir.join("missing.png")).unwrap_err();
        assert!(matches!(missing, BackgroundLoadError::Read { .. }));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_dropped_file_by_mime() {
        let file = egui::DroppedFile {
            name: "paste".to_owned(),
            mime: "image/png".to_owned(),
            ..Default::default()
        };
        assert!(is_image_file(&file));

        let file = egui::DroppedFile {
            name: "notes.txt".to_owned(),
            ..Default::default()
        };
        assert!(!is_image_file(&file));
    }

    #[test]
    fn test_garbage_bytes() {
        let err = decode_background(b"definitely not an image").unwrap_err();
        assert!(matches!(err, BackgroundLoadError::Decode(_)));
    }
}
