use drawing_board::error::ExportError;
use drawing_board::export::{self, ExportSink, FileExportSink};
use drawing_board::raster;
use drawing_board::{CanvasEngine, CanvasError};
use egui::{Color32, Pos2};
use image::RgbaImage;
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;

fn sketch() -> CanvasEngine {
    let mut canvas = CanvasEngine::new();
    canvas.set_brush_color(Color32::RED);
    canvas.set_brush_width(6.0);
    canvas.on_pointer_down(Pos2::new(10.0, 10.0));
    canvas.on_pointer_move(Pos2::new(60.0, 40.0));
    canvas.on_pointer_move(Pos2::new(20.0, 70.0));
    canvas.on_pointer_up();

    canvas.set_brush_color(Color32::from_rgba_unmultiplied(0, 0, 255, 128));
    canvas.set_brush_width(12.0);
    canvas.on_pointer_down(Pos2::new(80.0, 80.0));
    canvas.on_pointer_up();
    canvas
}

#[test]
fn test_invalid_dimensions() {
    let canvas = CanvasEngine::new();
    assert_eq!(
        canvas.export_flattened(0, 100).unwrap_err(),
        CanvasError::InvalidDimensions { width: 0, height: 100 }
    );
    assert_eq!(
        canvas.export_flattened(100, 0).unwrap_err(),
        CanvasError::InvalidDimensions { width: 100, height: 0 }
    );
}

#[test]
fn test_empty_canvas_is_white() {
    let image = CanvasEngine::new().export_flattened(100, 100).unwrap();
    assert_eq!(image.dimensions(), (100, 100));
    assert!(image.pixels().all(|p| p.0 == [255, 255, 255, 255]));
}

#[test]
fn test_flatten_matches_render() {
    let mut canvas = sketch();
    canvas.set_background_image(&[200, 180, 20, 255].repeat(4 * 3), 4, 3).unwrap();

    let mut surface = raster::new_surface(100, 90).unwrap();
    canvas.render(&mut surface);
    let rendered = raster::to_opaque_image(&surface).unwrap();
    let exported = canvas.export_flattened(100, 90).unwrap();

    assert_eq!(rendered, exported);
    assert!(exported.pixels().all(|p| p.0[3] == 255));
}

#[test]
fn test_in_progress_stroke_is_not_exported() {
    let mut canvas = sketch();
    let before = canvas.export_flattened(100, 100).unwrap();

    canvas.on_pointer_down(Pos2::new(50.0, 5.0));
    canvas.on_pointer_move(Pos2::new(50.0, 95.0));
    let during = canvas.export_flattened(100, 100).unwrap();
    assert_eq!(before, during);

    // ...but it does show up in the live render
    let mut surface = raster::new_surface(100, 100).unwrap();
    canvas.render(&mut surface);
    assert_ne!(raster::to_opaque_image(&surface).unwrap(), before);
}

#[test]
fn test_live_trail_uses_current_brush_on_top() {
    let mut canvas = sketch();
    canvas.set_brush_color(Color32::RED);
    canvas.set_brush_width(4.0);
    canvas.on_pointer_down(Pos2::new(5.0, 50.0));

    canvas.set_brush_color(Color32::BLUE);
    canvas.set_brush_width(10.0);
    // Crosses the committed red segment from (60,40) to (20,70) near x=46
    canvas.on_pointer_move(Pos2::new(95.0, 50.0));
    canvas.on_pointer_move(Pos2::new(95.0, 5.0));

    let mut surface = raster::new_surface(100, 100).unwrap();
    canvas.render(&mut surface);
    let live = raster::to_opaque_image(&surface).unwrap();

    // Drawn after the committed strokes, so it covers them where they cross
    let before = canvas.export_flattened(100, 100).unwrap();
    assert_eq!(before.get_pixel(46, 50).0, [255, 0, 0, 255]);
    assert_eq!(live.get_pixel(46, 50).0, [0, 0, 255, 255]);
    // Width 10 reaches 3 pixels off the line, which the 4 wide brush would not
    assert_eq!(live.get_pixel(70, 53).0, [0, 0, 255, 255]);
    assert_eq!(live.get_pixel(95, 20).0, [0, 0, 255, 255]);

    canvas.on_pointer_up();
    let committed = canvas.strokes().last().unwrap();
    assert_eq!(committed.color(), Color32::RED);
    assert_eq!(committed.width(), 4.0);
    assert_eq!(committed.points().len(), 3);
}

#[test]
fn test_flatten_job_on_worker_matches_direct_export() {
    let canvas = sketch();
    let job = canvas.flatten_job(100, 100).unwrap();
    let from_worker = std::thread::spawn(move || job.run()).join().unwrap().unwrap();
    assert_eq!(from_worker, canvas.export_flattened(100, 100).unwrap());
}

#[derive(Default)]
struct RecordingSink {
    calls: Mutex<usize>,
    fail: bool,
}

impl ExportSink for RecordingSink {
    fn write(&self, _image: &RgbaImage) -> Result<PathBuf, ExportError> {
        *self.calls.lock() += 1;
        if self.fail {
            Err(ExportError::Io {
                path: PathBuf::from("/full/disk.png"),
                source: std::io::Error::other("disk full"),
            })
        } else {
            Ok(PathBuf::from("ok.png"))
        }
    }
}

#[test]
fn test_permission_gate_skips_sink() {
    let canvas = sketch();
    let sink = RecordingSink::default();

    let err = export::export_with_permission(&canvas, 100, 100, false, &sink).unwrap_err();
    assert!(matches!(err, ExportError::PermissionDenied));
    assert_eq!(*sink.calls.lock(), 0);

    let err = export::start_export(&canvas, 100, 100, false, Arc::new(RecordingSink::default()))
        .unwrap_err();
    assert!(matches!(err, ExportError::PermissionDenied));

    export::export_with_permission(&canvas, 100, 100, true, &sink).unwrap();
    assert_eq!(*sink.calls.lock(), 1);
}

#[test]
fn test_sink_failure_leaves_history_alone() {
    let mut canvas = sketch();
    let sink = Arc::new(RecordingSink {
        fail: true,
        ..Default::default()
    });

    let task = export::start_export(&canvas, 100, 100, true, sink.clone()).unwrap();
    assert!(matches!(task.wait(), Err(ExportError::Io { .. })));
    assert_eq!(*sink.calls.lock(), 1);

    assert_eq!(canvas.strokes().len(), 2);
    assert!(canvas.undo());
    assert!(canvas.redo());
}

#[test]
fn test_dropping_task_discards_result() {
    let canvas = sketch();
    let sink = Arc::new(RecordingSink::default());
    let task = export::start_export(&canvas, 50, 50, true, sink).unwrap();
    drop(task);
    // Canvas is still usable and consistent
    assert_eq!(canvas.strokes().len(), 2);
}

#[test]
fn test_bad_dimensions_fail_before_spawning() {
    let canvas = sketch();
    let sink = Arc::new(RecordingSink::default());
    let err = export::start_export(&canvas, 0, 50, true, sink.clone()).unwrap_err();
    assert!(matches!(
        err,
        ExportError::Canvas(CanvasError::InvalidDimensions { .. })
    ));
    assert_eq!(*sink.calls.lock(), 0);
}

#[test]
fn test_file_sink_writes_decodable_png() {
    let dir = std::env::temp_dir().join(format!("drawing_board_export_{}", std::process::id()));
    let sink = FileExportSink::new(dir.join("nested"), "DrawingApp");
    let canvas = sketch();

    let path = export::export_with_permission(&canvas, 100, 100, true, &sink).unwrap();
    assert!(path.starts_with(sink.directory()));
    assert_eq!(path.extension().and_then(|e| e.to_str()), Some("png"));
    let name = path.file_name().and_then(|n| n.to_str()).unwrap();
    assert!(name.starts_with("DrawingApp_"));

    let decoded = image::open(&path).unwrap().to_rgba8();
    assert_eq!(decoded, canvas.export_flattened(100, 100).unwrap());

    std::fs::remove_dir_all(&dir).ok();
}
