#![warn(clippy::all, rust_2018_idioms)]
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod config;
mod location;
mod map;
mod maps_api;
mod screen;
mod ui;

use config::Config;

fn main() -> eframe::Result<()> {
    env_logger::init();

    let config = Config::from_env().unwrap_or_else(|e| {
        log::warn!("invalid configuration, using defaults: {}", e);
        Config::default()
    });

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(egui::vec2(1280.0, 800.0))
            .with_min_inner_size(egui::vec2(400.0, 300.0))
            .with_title("Jogja Map")
            .with_resizable(true),
        ..Default::default()
    };

    eframe::run_native(
        "Jogja Map",
        native_options,
        Box::new(move |cc| {
            let app = ui::home::HomeApp::new(cc, config)?;
            Ok(Box::new(app))
        }),
    )
}
