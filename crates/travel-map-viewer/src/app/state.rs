//! Application state management
//!
//! This module manages the route being shown, UI settings, route file loading and the
//! tile loading state of the map.

use crate::app::plugin::RouteView;
use crate::app::settings::Settings;
use crate::app::tiles::{TileActivityProbe, TilesProvider};
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use tokio::sync::mpsc;
use travel_map_lib::{
    Layer, Map, TileLayer, TileLoadingControl, TravelData, TravelRoute, TravelRouteOptions,
};

/// Main application state
pub struct AppState {
    /// Route shown on the map (shared with the map plugin)
    pub route_view: Arc<RwLock<RouteView>>,

    /// Current UI settings
    pub ui_settings: UiSettings,

    /// Route file loading state
    pub file_loader: FileLoader,

    /// Raster layers mirroring the tile providers, for load tracking
    pub tile_map: Map,

    /// Tile loading readiness across all providers
    pub tile_loading: TileLoadingControl,

    /// One probe per provider, in `TilesProvider::all()` order
    pub tile_probes: Vec<(TilesProvider, TileActivityProbe)>,

    /// Whether the view should be fitted to the route at the next frame
    pub pending_fit_bounds: bool,
}

/// UI-specific settings that can be adjusted at runtime
#[derive(Clone, Debug, PartialEq)]
pub struct UiSettings {
    /// Path line width in pixels
    pub line_width: f64,

    /// A glyph shows once its path is larger than this many glyph sizes
    pub size_factor: f64,

    /// Only show flight glyphs
    pub show_only_flight_icons: bool,

    /// Map tiles provider
    pub tiles_provider: TilesProvider,

    /// Whether sidebar is open
    pub sidebar_open: bool,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            line_width: 3.0,
            size_factor: 2.0,
            show_only_flight_icons: false,
            tiles_provider: TilesProvider::OpenStreetMap,
            sidebar_open: true,
        }
    }
}

impl UiSettings {
    pub fn from_cli(settings: &Settings) -> Self {
        Self {
            line_width: settings.line_width,
            size_factor: settings.size_factor,
            show_only_flight_icons: settings.show_only_flight_icons,
            ..Default::default()
        }
    }

    /// Options used to build the route overlays
    pub fn route_options(&self) -> TravelRouteOptions {
        let mut options = TravelRouteOptions {
            show_only_flight_icons: self.show_only_flight_icons,
            ..Default::default()
        };
        let segment = &mut options.styles.travel_segment;
        segment.weight = self.line_width;
        segment.size_factor = self.size_factor;
        options
    }
}

type LoadResult = (PathBuf, Result<TravelData, String>);

/// Route file loading state and operations
pub struct FileLoader {
    /// File being read in the background
    pub loading_file: Option<PathBuf>,

    /// Route file currently shown
    pub loaded_file: Option<PathBuf>,

    /// Data of the route currently shown, kept to rebuild overlays on settings changes
    pub loaded_data: Option<TravelData>,

    /// Load errors
    pub errors: Vec<(PathBuf, String)>,

    /// Show file picker dialog
    pub show_picker: bool,

    results_tx: mpsc::UnboundedSender<LoadResult>,
    results_rx: mpsc::UnboundedReceiver<LoadResult>,
}

impl FileLoader {
    fn new() -> Self {
        let (results_tx, results_rx) = mpsc::unbounded_channel();
        Self {
            loading_file: None,
            loaded_file: None,
            loaded_data: None,
            errors: Vec::new(),
            show_picker: false,
            results_tx,
            results_rx,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.loading_file.is_some()
    }
}

impl AppState {
    /// Create new application state from UI settings
    pub fn new(ui_settings: UiSettings) -> Self {
        let mut tile_map = Map::default();
        let mut tile_loading = TileLoadingControl::new();
        tile_loading.attach(&mut tile_map);

        // Layers added after the control, so it picks them up through its layer-added hook
        let tile_probes = TilesProvider::all()
            .iter()
            .map(|provider| {
                let layer = tile_map.add_layer(Layer::Tile(TileLayer::new(
                    provider.name(),
                    provider.url(),
                )));
                (*provider, TileActivityProbe::new(layer))
            })
            .collect();

        Self {
            route_view: Arc::new(RwLock::new(RouteView::new())),
            ui_settings,
            file_loader: FileLoader::new(),
            tile_map,
            tile_loading,
            tile_probes,
            pending_fit_bounds: false,
        }
    }

    /// Read a route file on the blocking pool; the result is picked up by
    /// [`AppState::process_load_results`]
    pub fn load_route_file(&mut self, path: PathBuf, ctx: &egui::Context) {
        if self.file_loader.loading_file.as_ref() == Some(&path) {
            return;
        }
        tracing::info!("Loading route from {}", path.display());
        self.file_loader.loading_file = Some(path.clone());

        let tx = self.file_loader.results_tx.clone();
        let ctx = ctx.clone();
        tokio::task::spawn_blocking(move || {
            profiling::scope!("read_route");
            let result = travel_map_lib::read_route(&path).map_err(|e| e.to_string());
            // The receiver lives as long as the app
            let _ = tx.send((path, result));
            ctx.request_repaint();
        });
    }

    /// Show the routes read in the background. Returns whether a new route was shown.
    pub fn process_load_results(&mut self) -> bool {
        let mut shown = false;
        while let Ok((path, result)) = self.file_loader.results_rx.try_recv() {
            if self.file_loader.loading_file.as_ref() == Some(&path) {
                self.file_loader.loading_file = None;
            }
            match result {
                Ok(data) => {
                    self.file_loader.loaded_file = Some(path);
                    self.file_loader.loaded_data = Some(data);
                    self.rebuild_route();
                    self.pending_fit_bounds = true;
                    shown = true;
                }
                Err(e) => {
                    tracing::error!("Failed to load {}: {}", path.display(), e);
                    self.file_loader.errors.push((path, e));
                }
            }
        }
        shown
    }

    /// Rebuild the overlays of the loaded route with the current settings
    pub fn rebuild_route(&mut self) {
        profiling::scope!("rebuild_route");

        let Some(data) = &self.file_loader.loaded_data else {
            return;
        };
        let route = TravelRoute::new(&data.points, &data.posts, &self.ui_settings.route_options());
        match self.route_view.write() {
            Ok(mut view) => view.replace(route),
            Err(_) => tracing::error!("Route view lock poisoned, route not replaced"),
        }
    }

    /// Feed the providers' in-flight request counts to the tile loading control
    pub fn update_tile_activity(&mut self, in_flight: impl Fn(TilesProvider) -> usize) {
        for (provider, probe) in &mut self.tile_probes {
            probe.update(&mut self.tile_map, in_flight(*provider));
        }
    }

    pub fn tiles_ready(&self) -> bool {
        self.tile_loading.element().ready().unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_options_follow_settings() {
        let settings = UiSettings {
            line_width: 5.0,
            size_factor: 3.0,
            show_only_flight_icons: true,
            ..Default::default()
        };
        let options = settings.route_options();
        assert!(options.show_only_flight_icons);
        assert_eq!(options.styles.travel_segment.weight, 5.0);
        assert_eq!(options.styles.travel_segment.size_threshold(), 72.0);
    }

    #[test]
    fn test_tile_layers_are_tracked() {
        let mut state = AppState::new(UiSettings::default());
        assert_eq!(state.tile_loading.subscribed_layers(), TilesProvider::all().len());
        assert!(state.tiles_ready());

        state.update_tile_activity(|provider| match provider {
            TilesProvider::OpenStreetMap => 4,
            TilesProvider::OpenTopoMap => 0,
        });
        assert!(!state.tiles_ready());

        state.update_tile_activity(|_| 0);
        assert!(state.tiles_ready());
    }

    #[test]
    fn test_load_results_show_route() {
        let mut state = AppState::new(UiSettings::default());
        let path = PathBuf::from("trip.json");
        state.file_loader.loading_file = Some(path.clone());
        let data = travel_map_lib::read_route_from_str(
            r#"{ "points": [
                { "lat": 52.52, "lon": 13.40, "transport": "train" },
                { "lat": 48.86, "lon": 2.35, "transport": "train" }
            ] }"#,
            "json",
        )
        .unwrap();
        state
            .file_loader
            .results_tx
            .send((path.clone(), Ok(data)))
            .unwrap();

        assert!(state.process_load_results());
        assert!(!state.file_loader.is_busy());
        assert_eq!(state.file_loader.loaded_file, Some(path));
        assert!(state.pending_fit_bounds);
    }

    #[test]
    fn test_load_errors_are_kept() {
        let mut state = AppState::new(UiSettings::default());
        let path = PathBuf::from("trip.kml");
        state
            .file_loader
            .results_tx
            .send((path, Err("Unsupported route format: trip.kml".to_string())))
            .unwrap();
        assert!(!state.process_load_results());
        assert_eq!(state.file_loader.errors.len(), 1);
    }
}
