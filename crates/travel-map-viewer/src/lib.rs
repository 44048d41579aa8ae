//! Travel Map Viewer - Application Library
//!
//! Shows a trip on a slippy map: one path per transport run with its transport glyph,
//! start/final markers, blog posts, and a spinner while map tiles are loading.

mod app;

pub use app::TravelMapApp;

/// Initialize the `tracing` subscriber, honoring `RUST_LOG` when set
pub fn setup_logging() {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cfg!(debug_assertions) {
            EnvFilter::new("debug,eframe::native=warn,hyper_util=info,walkers=info,egui::context=warn")
        } else {
            EnvFilter::new("info,eframe=warn")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_filter(filter))
        .init();
}
