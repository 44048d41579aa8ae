#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

use travel_map_viewer::TravelMapApp;

const APP_NAME: &str = "Travel Map Viewer";

fn main() -> eframe::Result {
    travel_map_viewer::setup_logging();

    // Route files are read on the runtime's blocking pool
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| eframe::Error::AppCreation(Box::new(e)))?;
    let _guard = rt.enter();

    tracing::info!("Starting {} {}", APP_NAME, env!("CARGO_PKG_VERSION"));

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_title(APP_NAME),
        ..Default::default()
    };

    eframe::run_native(
        APP_NAME,
        native_options,
        Box::new(|cc| Ok(Box::new(TravelMapApp::new(cc)))),
    )
}
