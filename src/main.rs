#![warn(clippy::all, rust_2018_idioms)]

use eframe_sketch::{Preferences, SketchApp};

/// Overrides where preferences are read from
const PREFERENCES_ENV: &str = "SKETCH_PREFERENCES";
const DEFAULT_PREFERENCES: &str = "sketch-preferences.json";

fn main() -> eframe::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let path = std::env::var(PREFERENCES_ENV).unwrap_or_else(|_| DEFAULT_PREFERENCES.to_owned());
    let preferences = Preferences::load_or_default(&path);

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1000.0, 700.0])
            .with_title("Sketch"),
        ..Default::default()
    };
    eframe::run_native(
        "Sketch",
        native_options,
        Box::new(|cc| Ok(Box::new(SketchApp::new(cc, preferences)))),
    )
}
