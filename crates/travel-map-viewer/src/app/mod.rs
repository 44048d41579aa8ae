//! Application module
//!
//! This module provides the main application structure:
//! - Full-screen map view with the route, its glyphs and posts
//! - Toggleable sidebar with the route's segments and settings
//! - Loading spinner while map tiles are being fetched
//! - Drag-and-drop or file dialog to open a route

mod glyph_paint;
mod plugin;
pub(crate) mod settings;
mod state;
mod tiles;
mod ui_panels;

use crate::app::plugin::RoutePlugin;
use crate::app::settings::Settings;
use crate::app::state::{AppState, UiSettings};
use crate::app::tiles::{OpenTopoMap, TilesProvider};
use eframe::egui;
use geo::Coord;
use std::path::PathBuf;
use travel_map_lib::Viewport;
use walkers::{HttpTiles, Map, MapMemory, sources::OpenStreetMap};

/// Highest zoom used when fitting the view to a route
const FIT_MAX_ZOOM: f64 = 17.0;

/// Persisted settings (lightweight, no route data)
#[derive(serde::Serialize, serde::Deserialize)]
struct PersistedSettings {
    line_width: f64,
    size_factor: f64,
    show_only_flight_icons: bool,
    tiles_provider: TilesProvider,
    sidebar_open: bool,
    /// Route file that was shown (will need to be reloaded)
    route_file: Option<String>,
}

/// Main application structure
pub struct TravelMapApp {
    /// Application state (route, UI settings, etc.)
    state: AppState,

    /// Map tiles provider (OpenStreetMap)
    tiles_osm: HttpTiles,

    /// Map tiles provider (OpenTopoMap)
    tiles_otm: HttpTiles,

    /// Map state (camera position, zoom, etc.)
    map_memory: MapMemory,

    /// Size of the map view at the last frame, used to fit routes
    map_size: egui::Vec2,
}

impl TravelMapApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let cli_args = Settings::from_cli();

        let persisted = if cli_args.ignore_persisted {
            tracing::info!("Ignoring persisted state (--ignore-persisted flag)");
            None
        } else {
            cc.storage.and_then(Self::load_persisted_settings)
        };

        let (ui_settings, persisted_route) = match persisted {
            Some(settings) => (
                UiSettings {
                    line_width: settings.line_width,
                    size_factor: settings.size_factor,
                    show_only_flight_icons: settings.show_only_flight_icons,
                    tiles_provider: settings.tiles_provider,
                    sidebar_open: settings.sidebar_open,
                },
                settings.route_file.map(PathBuf::from),
            ),
            None => (UiSettings::from_cli(&cli_args), None),
        };
        let mut state = AppState::new(ui_settings);

        // The CLI route takes priority over the persisted one
        if let Some(path) = cli_args
            .route
            .or(persisted_route.filter(|path| path.exists()))
        {
            state.load_route_file(path, &cc.egui_ctx);
        }

        Self {
            state,
            tiles_osm: HttpTiles::new(OpenStreetMap, cc.egui_ctx.clone()),
            tiles_otm: HttpTiles::new(OpenTopoMap, cc.egui_ctx.clone()),
            map_memory: MapMemory::default(),
            map_size: egui::vec2(1280.0, 720.0),
        }
    }

    /// Load persisted settings from storage
    fn load_persisted_settings(storage: &dyn eframe::Storage) -> Option<PersistedSettings> {
        let json = storage.get_string("persisted_settings")?;
        match serde_json::from_str(&json) {
            Ok(settings) => {
                tracing::info!("Restored settings");
                Some(settings)
            }
            Err(e) => {
                tracing::warn!("Discarding persisted settings: {}", e);
                None
            }
        }
    }

    /// Fit the map view to the bounding box of the route
    fn fit_to_bounds(&mut self) {
        let bounds = match self.state.route_view.read() {
            Ok(view) => view.route().and_then(|route| route.bounds()),
            Err(_) => None,
        };
        let Some(bounds) = bounds else {
            return;
        };

        let mut viewport = Viewport::new(
            Coord { x: 0.0, y: 0.0 },
            FIT_MAX_ZOOM,
            Coord {
                x: self.map_size.x as f64,
                y: self.map_size.y as f64,
            },
        );
        viewport.fit_bounds(bounds.to_rect(), FIT_MAX_ZOOM);

        self.map_memory
            .center_at(walkers::lat_lon(viewport.center.y, viewport.center.x));
        let _ = self.map_memory.set_zoom(viewport.zoom);

        tracing::debug!(
            "Fitted view to ({:.4}, {:.4}) - ({:.4}, {:.4}), zoom: {:.2}",
            bounds.lat_min,
            bounds.lon_min,
            bounds.lat_max,
            bounds.lon_max,
            viewport.zoom
        );
    }
}

#[profiling::all_functions]
impl eframe::App for TravelMapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Routes read in the background
        if self.state.process_load_results() {
            ctx.request_repaint();
        }

        // Tile activity of every provider, so switching providers keeps counts consistent
        let (osm, otm) = (
            self.tiles_osm.stats().in_progress,
            self.tiles_otm.stats().in_progress,
        );
        self.state.update_tile_activity(|provider| match provider {
            TilesProvider::OpenStreetMap => osm,
            TilesProvider::OpenTopoMap => otm,
        });

        ui_panels::handle_drag_and_drop(ctx, &mut self.state);
        ui_panels::show_file_picker(ctx, &mut self.state);
        ui_panels::render_sidebar(ctx, &mut self.state);

        let route_plugin = RoutePlugin::new(self.state.route_view.clone());
        let tiles_provider = self.state.ui_settings.tiles_provider;

        // Central panel: Map view (full screen)
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                profiling::scope!("map_panel");

                self.map_size = ui.max_rect().size();

                let tiles: &mut HttpTiles = match tiles_provider {
                    TilesProvider::OpenStreetMap => &mut self.tiles_osm,
                    TilesProvider::OpenTopoMap => &mut self.tiles_otm,
                };

                let map = Map::new(
                    Some(tiles),
                    &mut self.map_memory,
                    walkers::lat_lon(48.0, 8.0),
                )
                .with_plugin(route_plugin);

                ui.add(map);

                ui_panels::sidebar_toggle_button(ui, &mut self.state);
                ui_panels::loading_indicator(ui, &self.state);

                let painter = ui.painter();
                let screen_rect = ui.max_rect();
                painter.text(
                    screen_rect.center_bottom() + egui::vec2(0.0, -5.0),
                    egui::Align2::CENTER_BOTTOM,
                    tiles_provider.attribution(),
                    egui::FontId::proportional(10.0),
                    egui::Color32::from_black_alpha(180),
                );
            });

        // Fit once the new route was attached by the plugin
        if self.state.pending_fit_bounds {
            self.state.pending_fit_bounds = false;
            self.fit_to_bounds();
            ctx.request_repaint();
        }

        if !self.state.tiles_ready() || self.state.file_loader.is_busy() {
            ctx.request_repaint();
        }
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        let ui = &self.state.ui_settings;
        let route_file = self
            .state
            .file_loader
            .loading_file
            .as_ref()
            .or(self.state.file_loader.loaded_file.as_ref())
            .map(|path| path.to_string_lossy().to_string());

        let settings = PersistedSettings {
            line_width: ui.line_width,
            size_factor: ui.size_factor,
            show_only_flight_icons: ui.show_only_flight_icons,
            tiles_provider: ui.tiles_provider,
            sidebar_open: ui.sidebar_open,
            route_file,
        };

        if let Ok(json) = serde_json::to_string(&settings) {
            storage.set_string("persisted_settings", json);
            tracing::debug!("Saved settings on exit");
        }
    }
}
