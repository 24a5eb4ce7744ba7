#![warn(clippy::all, rust_2018_idioms)]

use drawing_board::{BoardConfig, PaintApp};
use std::path::PathBuf;

fn main() -> eframe::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = BoardConfig::from_env();
    // Optional background image passed on the command line
    let background = std::env::args_os().nth(1).map(PathBuf::from);

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.window_size)
            .with_min_inner_size([400.0, 300.0])
            .with_title("Drawing Board"),
        ..Default::default()
    };

    eframe::run_native(
        "Drawing Board",
        native_options,
        Box::new(move |cc| Ok(Box::new(PaintApp::new(cc, &config, background)))),
    )
}
