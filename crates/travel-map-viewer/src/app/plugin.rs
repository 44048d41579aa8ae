//! Walkers plugin drawing a travel route on the map view
//!
//! The route's overlays only know [`MapSurface`]; [`WalkersSurface`] implements it on top
//! of the walkers projector for the current frame, while the markers themselves live in
//! [`RouteView`] across frames.

use crate::app::glyph_paint;
use egui::{Color32, Pos2, Shape, Stroke};
use geo::{Coord, Rect};
use std::sync::{Arc, RwLock};
use travel_map_lib::{
    Marker, MarkerId, MarkerPane, MapLayer, MapSurface, TravelRoute, TravelSegment,
};
use walkers::{Plugin, Projector};

/// Extra area around the map view where overlays are still considered on screen,
/// as a ratio of the view size
const VIEW_PADDING: f32 = 0.1;

/// Width of the dark outline drawn under paths
const OUTLINE_WIDTH: f32 = 2.0;

fn to_screen(projector: &Projector, coord: Coord<f64>) -> Pos2 {
    let screen = projector.project(walkers::lat_lon(coord.y, coord.x));
    Pos2::new(screen.x, screen.y)
}

/// [`MapSurface`] over the walkers projector of one frame
struct WalkersSurface<'a> {
    projector: &'a Projector,
    bounds: Rect<f64>,
    markers: &'a mut MarkerPane,
}

impl<'a> WalkersSurface<'a> {
    fn new(projector: &'a Projector, view: egui::Rect, markers: &'a mut MarkerPane) -> Self {
        let padded = view.expand2(view.size() * VIEW_PADDING);
        let bounds = Rect::new(
            Coord {
                x: padded.min.x as f64,
                y: padded.min.y as f64,
            },
            Coord {
                x: padded.max.x as f64,
                y: padded.max.y as f64,
            },
        );
        Self {
            projector,
            bounds,
            markers,
        }
    }
}

impl MapSurface for WalkersSurface<'_> {
    fn project(&self, coord: Coord<f64>) -> Coord<f64> {
        let screen = to_screen(self.projector, coord);
        Coord {
            x: screen.x as f64,
            y: screen.y as f64,
        }
    }

    fn pixel_bounds(&self) -> Rect<f64> {
        self.bounds
    }

    fn add_marker(&mut self, marker: Marker) -> MarkerId {
        self.markers.add(marker)
    }

    fn remove_marker(&mut self, id: MarkerId) -> Option<Marker> {
        self.markers.remove(id)
    }

    fn marker_mut(&mut self, id: MarkerId) -> Option<&mut Marker> {
        self.markers.get_mut(id)
    }
}

/// The route shown on the map, kept across frames
#[derive(Debug, Default)]
pub struct RouteView {
    route: Option<TravelRoute>,
    /// Route waiting to replace the current one at the next frame
    pending: Option<TravelRoute>,
    markers: MarkerPane,
    attached: bool,
}

impl RouteView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swap in `route` at the next frame; the current one is detached first
    pub fn replace(&mut self, route: TravelRoute) {
        self.pending = Some(route);
    }

    pub fn route(&self) -> Option<&TravelRoute> {
        self.route.as_ref()
    }

    pub fn markers(&self) -> &MarkerPane {
        &self.markers
    }

    /// Apply a pending swap, then attach or redraw the route for this frame
    fn redraw(&mut self, projector: &Projector, view: egui::Rect) {
        profiling::scope!("RouteView::redraw");

        let Self {
            route,
            pending,
            markers,
            attached,
        } = self;
        let mut surface = WalkersSurface::new(projector, view, markers);

        if let Some(next) = pending.take() {
            if *attached && let Some(previous) = route.as_mut() {
                previous.on_detach(&mut surface);
            }
            *route = Some(next);
            *attached = false;
        }

        let Some(route) = route.as_mut() else {
            return;
        };
        if *attached {
            route.on_redraw(&mut surface);
        } else {
            route.on_attach(&mut surface);
            *attached = true;
            tracing::debug!(markers = surface.markers.len(), "Route attached");
        }
    }
}

/// Plugin for rendering the travel route on the map
pub struct RoutePlugin {
    view: Arc<RwLock<RouteView>>,
}

impl RoutePlugin {
    pub fn new(view: Arc<RwLock<RouteView>>) -> Self {
        Self { view }
    }

    fn paint_segment(segment: &TravelSegment, projector: &Projector, painter: &egui::Painter) {
        let points: Vec<Pos2> = segment
            .points()
            .iter()
            .map(|coord| to_screen(projector, *coord))
            .collect();
        if points.len() < 2 {
            return;
        }

        let options = segment.options();
        let color = glyph_paint::parse_color(&options.color)
            .unwrap_or(Color32::WHITE)
            .gamma_multiply(options.opacity as f32);
        let width = options.weight as f32;
        let outline = Stroke::new(width + OUTLINE_WIDTH, Color32::from_black_alpha(120));
        let stroke = Stroke::new(width, color);

        match options.dash_array.as_deref() {
            Some([dash, gap, ..]) => {
                let (dash, gap) = (*dash as f32, *gap as f32);
                let offset = options.dash_offset.unwrap_or_default() as f32;
                painter.extend(Shape::dashed_line_with_offset(
                    &points,
                    outline,
                    &[dash],
                    &[gap],
                    offset,
                ));
                painter.extend(Shape::dashed_line_with_offset(
                    &points,
                    stroke,
                    &[dash],
                    &[gap],
                    offset,
                ));
            }
            _ => {
                painter.add(Shape::line(points.clone(), outline));
                painter.add(Shape::line(points, stroke));
            }
        }
    }
}

impl Plugin for RoutePlugin {
    fn run(
        self: Box<Self>,
        ui: &mut egui::Ui,
        response: &egui::Response,
        projector: &Projector,
        _map_memory: &walkers::MapMemory,
    ) {
        profiling::scope!("RoutePlugin::run");

        let Ok(mut view) = self.view.write() else {
            tracing::error!("Route view lock poisoned, skipping frame");
            return;
        };
        view.redraw(projector, response.rect);

        let painter = ui.painter();
        if let Some(route) = view.route() {
            profiling::scope!("paint_segments");
            for segment in route.segments() {
                Self::paint_segment(segment, projector, painter);
            }
        }

        // Paint order is z-order, so the last marker under the pointer is the topmost one
        let pointer = response.hover_pos();
        let mut hovered: Option<(&Marker, Pos2)> = None;
        {
            profiling::scope!("paint_markers");
            for (_, marker) in view.markers().iter() {
                let rect = glyph_paint::paint_marker(
                    painter,
                    marker,
                    to_screen(projector, marker.position),
                );
                if let Some(pos) = pointer
                    && rect.contains(pos)
                {
                    hovered = Some((marker, pos));
                }
            }
        }

        if let Some((marker, pos)) = hovered
            && let Some(tooltip) = &marker.tooltip
        {
            glyph_paint::paint_tooltip(painter, pos, tooltip);
        }
    }
}
