use crate::PaintApp;
use crate::brush::MIN_BRUSH_WIDTH;
use egui::{Color32, Stroke};

pub fn tools_panel(app: &mut PaintApp, ctx: &egui::Context) {
    egui::TopBottomPanel::top("tools_panel").show(ctx, |ui| {
        ui.horizontal_wrapped(|ui| {
            // Color swatches
            let colors = app.palette().colors().to_vec();
            let selected = app.palette().selected_index();
            for (index, color) in colors.into_iter().enumerate() {
                let outline = if index == selected {
                    Stroke::new(3.0, ui.visuals().selection.stroke.color)
                } else {
                    Stroke::new(1.0, Color32::GRAY)
                };
                let swatch = egui::Button::new("")
                    .fill(color)
                    .stroke(outline)
                    .min_size(egui::vec2(24.0, 24.0));
                if ui.add(swatch).clicked() {
                    app.select_color(index);
                }
            }

            ui.separator();

            let mut width = app.canvas().brush().width();
            let slider = egui::Slider::new(&mut width, MIN_BRUSH_WIDTH..=app.max_brush_width())
                .text("Brush size");
            if ui.add(slider).changed() {
                app.set_brush_width(width);
            }

            ui.separator();

            let can_undo = app.canvas().can_undo();
            let can_redo = app.canvas().can_redo();
            if ui.add_enabled(can_undo, egui::Button::new("⟲ Undo")).clicked() {
                app.undo();
            }
            if ui.add_enabled(can_redo, egui::Button::new("⟳ Redo")).clicked() {
                app.redo();
            }

            ui.separator();

            if ui.button("🖼 Open image…").clicked() {
                app.open_background_dialog();
            }
            let has_background = app.canvas().has_background();
            if ui
                .add_enabled(has_background, egui::Button::new("Clear background"))
                .clicked()
            {
                app.clear_background();
            }

            let exporting = app.is_exporting();
            if ui.add_enabled(!exporting, egui::Button::new("💾 Save")).clicked() {
                app.start_export();
            }
            if exporting {
                ui.spinner();
            }
        });

        match app.status() {
            Some(status) => ui.label(status),
            None => ui.weak("Drop an image onto the window to draw over it"),
        };
    });
}
