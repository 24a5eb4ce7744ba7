use crate::PaintApp;
use egui::{Color32, Pos2, Rect, Vec2};

pub fn central_panel(app: &mut PaintApp, ctx: &egui::Context) {
    egui::CentralPanel::default()
        .frame(egui::Frame::none())
        .show(ctx, |ui| {
            let (response, painter) = ui.allocate_painter(ui.available_size(), egui::Sense::drag());
            let canvas_rect = response.rect;

            // Handle input
            dispatch_pointer(app, ctx, canvas_rect);

            // One surface pixel per point; strokes keep their coordinates on resize
            let size = [
                canvas_rect.width().max(0.0).floor() as u32,
                canvas_rect.height().max(0.0).floor() as u32,
            ];
            if let Some(texture) = app.canvas_texture(ctx, size) {
                let image_rect =
                    Rect::from_min_size(canvas_rect.min, Vec2::new(size[0] as f32, size[1] as f32));
                let uv = Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0));
                painter.image(texture.id(), image_rect, uv, Color32::WHITE);
            }
        });
}

/// Translate this frame's primary pointer activity into canvas gestures
fn dispatch_pointer(app: &mut PaintApp, ctx: &egui::Context, canvas_rect: Rect) {
    let (pressed, down, released, moved, focused, origin, pos) = ctx.input(|i| {
        (
            i.pointer.primary_pressed(),
            i.pointer.primary_down(),
            i.pointer.primary_released(),
            i.pointer.delta() != Vec2::ZERO,
            i.focused,
            i.pointer.press_origin(),
            i.pointer.interact_pos(),
        )
    });
    let to_local = |p: Pos2| (p - canvas_rect.min).to_pos2();
    let canvas = app.canvas_mut();

    if !focused {
        canvas.cancel_gesture();
        return;
    }

    if pressed {
        if let Some(origin) = origin.filter(|o| canvas_rect.contains(*o)) {
            canvas.on_pointer_down(to_local(origin));
        }
    } else if down && moved {
        if let Some(pos) = pos {
            canvas.on_pointer_move(to_local(pos));
        }
    }

    if released {
        canvas.on_pointer_up();
    }
}
