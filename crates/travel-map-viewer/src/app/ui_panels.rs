//! UI panels for the application
//!
//! Sidebar with the route's segments and settings, map overlays and file opening.

use crate::app::state::AppState;
use crate::app::tiles::TilesProvider;
use egui::{Color32, RichText, Ui};
use std::path::Path;
use travel_map_lib::{MarkerVisibility, Transport};

/// Extensions of the route files that can be opened
const ROUTE_EXTENSIONS: [&str; 2] = ["gpx", "json"];

fn is_route_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ROUTE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}

/// Render the sidebar toggle button (overlaid on top-right of map)
pub fn sidebar_toggle_button(ui: &mut Ui, state: &mut AppState) {
    let button_size = egui::vec2(40.0, 40.0);
    let margin = 10.0;

    let rect = ui.max_rect();
    let button_pos = rect.right_top() + egui::vec2(-button_size.x - margin, margin);
    let button_rect = egui::Rect::from_min_size(button_pos, button_size);

    let response = ui.allocate_rect(button_rect, egui::Sense::click());
    if response.clicked() {
        state.ui_settings.sidebar_open = !state.ui_settings.sidebar_open;
    }

    let bg_color = if response.hovered() {
        ui.visuals().widgets.hovered.bg_fill
    } else {
        ui.visuals().widgets.inactive.bg_fill
    };
    ui.painter().rect_filled(button_rect, 5.0, bg_color);

    let icon = if state.ui_settings.sidebar_open {
        "✕"
    } else {
        "☰"
    };
    ui.painter().text(
        button_rect.center(),
        egui::Align2::CENTER_CENTER,
        icon,
        egui::FontId::proportional(20.0),
        ui.visuals().text_color(),
    );
}

/// Spinner in the top-left corner of the map while tiles are loading
pub fn loading_indicator(ui: &mut Ui, state: &AppState) {
    if state.tiles_ready() {
        return;
    }
    let size = 28.0;
    let margin = 10.0;
    let rect = egui::Rect::from_min_size(
        ui.max_rect().left_top() + egui::vec2(margin, margin),
        egui::vec2(size, size),
    );
    ui.painter()
        .rect_filled(rect.expand(4.0), 6.0, Color32::from_black_alpha(140));
    egui::Spinner::new()
        .size(size)
        .color(Color32::WHITE)
        .paint_at(ui, rect);
}

/// Render the sidebar
pub fn render_sidebar(ctx: &egui::Context, state: &mut AppState) {
    if !state.ui_settings.sidebar_open {
        return;
    }

    egui::SidePanel::right("main_sidebar")
        .default_width(300.0)
        .min_width(260.0)
        .max_width(450.0)
        .resizable(true)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    render_route_section(ui, state);
                    ui.add_space(8.0);
                    ui.separator();
                    render_settings_section(ui, state);
                    ui.add_space(8.0);
                    ui.separator();
                    render_tiles_section(ui, state);
                });
        });
}

fn render_route_section(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui| {
        if ui.button("📂 Open route...").clicked() {
            state.file_loader.show_picker = true;
        }
        if ui.button("🎯 Fit to Bounds").clicked() {
            state.pending_fit_bounds = true;
        }
    });
    ui.add_space(8.0);

    if let Some(path) = &state.file_loader.loading_file {
        ui.horizontal(|ui| {
            ui.spinner();
            ui.label(
                RichText::new(format!("Loading {}", file_name(path)))
                    .color(ui.visuals().warn_fg_color),
            );
        });
    } else if let Some(path) = &state.file_loader.loaded_file {
        ui.label(RichText::new(format!("✓ {}", file_name(path))).strong());
    } else {
        ui.label(RichText::new("No route loaded").weak());
    }

    if !state.file_loader.errors.is_empty() {
        ui.add_space(4.0);
        for (file, error) in &state.file_loader.errors {
            ui.label(
                RichText::new(format!("• {}: {}", file_name(file), error))
                    .small()
                    .color(Color32::RED),
            );
        }
        if ui.button("Clear Errors").clicked() {
            state.file_loader.errors.clear();
        }
    }

    let Ok(view) = state.route_view.read() else {
        return;
    };
    let Some(route) = view.route() else {
        return;
    };

    ui.add_space(8.0);
    ui.label(
        RichText::new(format!(
            "🧭 {} segments, {} markers on map",
            route.segments().len(),
            view.markers().len()
        ))
        .strong(),
    );
    ui.add_space(4.0);

    egui::Grid::new("segments_grid")
        .num_columns(3)
        .striped(true)
        .spacing([12.0, 4.0])
        .show(ui, |ui| {
            for segment in route.segments() {
                let label = match segment.transport() {
                    Transport::Unknown => "—".to_string(),
                    transport => transport.label(),
                };
                ui.label(label);
                ui.label(format!("{} pts", segment.points().len()));
                match segment.visibility() {
                    MarkerVisibility::Shown(_) => ui.label("glyph shown"),
                    MarkerVisibility::Hidden => ui.label(RichText::new("hidden").weak()),
                };
                ui.end_row();
            }
        });
}

fn render_settings_section(ui: &mut Ui, state: &mut AppState) {
    ui.label(RichText::new("🎨 Route Appearance").strong());
    ui.add_space(6.0);

    let mut changed = false;
    egui::Grid::new("appearance_grid")
        .num_columns(2)
        .spacing([12.0, 8.0])
        .show(ui, |ui| {
            ui.label("Line Width:");
            changed |= ui
                .add(
                    egui::Slider::new(&mut state.ui_settings.line_width, 1.0..=10.0)
                        .suffix(" px")
                        .step_by(0.5),
                )
                .changed();
            ui.end_row();

            ui.label("Glyph Size Factor:");
            changed |= ui
                .add(egui::Slider::new(&mut state.ui_settings.size_factor, 0.5..=8.0).step_by(0.25))
                .changed();
            ui.end_row();

            ui.label("Glyphs:");
            changed |= ui
                .checkbox(&mut state.ui_settings.show_only_flight_icons, "Flights only")
                .changed();
            ui.end_row();
        });

    if changed {
        state.rebuild_route();
    }
}

fn render_tiles_section(ui: &mut Ui, state: &mut AppState) {
    ui.label(RichText::new("🗺 Map Tiles").strong());
    ui.add_space(6.0);

    ui.horizontal(|ui| {
        for provider in TilesProvider::all() {
            ui.selectable_value(&mut state.ui_settings.tiles_provider, *provider, provider.name());
        }
    });

    let status = if state.tiles_ready() {
        RichText::new("Ready").color(Color32::GREEN)
    } else {
        RichText::new(format!("Loading ({} in flight)", state.tile_loading.counter()))
            .color(ui.visuals().warn_fg_color)
    };
    ui.horizontal(|ui| {
        ui.label("Status:");
        ui.label(status);
    });
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or(path.as_os_str())
        .to_string_lossy()
        .to_string()
}

/// Show the route file dialog when requested
pub fn show_file_picker(ctx: &egui::Context, state: &mut AppState) {
    if !state.file_loader.show_picker {
        return;
    }
    state.file_loader.show_picker = false;

    if let Some(path) = rfd::FileDialog::new()
        .add_filter("Route Files", &ROUTE_EXTENSIONS)
        .set_title("Open Route")
        .pick_file()
    {
        state.load_route_file(path, ctx);
    }
}

/// Handle drag and drop of route files (the last dropped one wins)
pub fn handle_drag_and_drop(ctx: &egui::Context, state: &mut AppState) {
    let hovered_files = ctx.input(|i| !i.raw.hovered_files.is_empty());
    let dropped_files: Vec<_> = ctx.input(|i| i.raw.dropped_files.clone());

    if hovered_files {
        let painter = ctx.layer_painter(egui::LayerId::new(
            egui::Order::Foreground,
            egui::Id::new("drop_preview"),
        ));
        let screen_rect = ctx.content_rect();
        let bg_rect = egui::Rect::from_center_size(screen_rect.center(), egui::vec2(340.0, 80.0));
        painter.rect_filled(bg_rect, 16.0, Color32::from_black_alpha(180));
        painter.text(
            screen_rect.center(),
            egui::Align2::CENTER_CENTER,
            "📂 Drop a route here",
            egui::FontId::proportional(32.0),
            Color32::WHITE,
        );
    }

    if let Some(path) = dropped_files
        .into_iter()
        .filter_map(|file| file.path)
        .filter(|path| is_route_file(path))
        .last()
    {
        state.load_route_file(path, ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_file_extensions() {
        assert!(is_route_file(Path::new("trip.gpx")));
        assert!(is_route_file(Path::new("/data/Trip.JSON")));
        assert!(!is_route_file(Path::new("trip.kml")));
        assert!(!is_route_file(Path::new("trip")));
    }
}
