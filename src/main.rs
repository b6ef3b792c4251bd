#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod io;
mod model;
mod timeline;
mod ui;

use tracing_subscriber::EnvFilter;

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1360.0, 800.0])
            .with_min_inner_size([900.0, 500.0])
            .with_title("Roadmap Planner"),
        ..Default::default()
    };

    eframe::run_native(
        "Roadmap Planner",
        options,
        Box::new(|cc| Ok(Box::new(app::RoadmapApp::new(cc)))),
    )
}
