mod action_bar;
mod annotation;
mod app;
mod canvas;
mod clipboard;
mod export;
mod fonts;
mod geometry;
mod history;
mod ingest;
mod interaction;
mod prefs;
mod render;
mod state;
mod store;
mod style;
mod theme;
mod toolbar;
mod transform;
mod ui_controls;

use eframe::egui;
use tracing_subscriber::EnvFilter;

fn main() -> eframe::Result<()> {
    init_tracing();

    let viewport = egui::ViewportBuilder::default()
        .with_title("Dimmark")
        .with_inner_size([1180.0, 800.0])
        .with_min_inner_size([640.0, 480.0]);

    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        "Dimmark",
        options,
        Box::new(|cc| Box::new(app::DimMarkApp::new(cc))),
    )
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,dimmark=debug"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
