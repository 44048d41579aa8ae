//! Map host: viewport projection, layers with load events, and markers
//!
//! [`MapSurface`] is the capability set overlays need from whatever engine draws the map.
//! [`Map`] is an in-memory implementation used by headless hosts and tests; a GUI host can
//! implement [`MapSurface`] over its own projector instead.

use crate::events::{Listeners, SubscriptionId};
use crate::glyph::{Marker, MarkerId, MarkerPane};
use crate::utils;
use geo::{Coord, Rect};
use std::collections::BTreeMap;

/// What an overlay needs from the map it is drawn on
pub trait MapSurface {
    /// Project a geographic coordinate (`x` = lon, `y` = lat) to container pixels
    fn project(&self, coord: Coord<f64>) -> Coord<f64>;

    /// Pixel bounds of the area currently rendered, in container pixels
    fn pixel_bounds(&self) -> Rect<f64>;

    fn add_marker(&mut self, marker: Marker) -> MarkerId;

    fn remove_marker(&mut self, id: MarkerId) -> Option<Marker>;

    fn marker_mut(&mut self, id: MarkerId) -> Option<&mut Marker>;
}

/// Lifecycle hooks of something drawn on a map
pub trait MapLayer {
    fn on_attach(&mut self, map: &mut dyn MapSurface);

    /// Must release everything the layer put on the map
    fn on_detach(&mut self, map: &mut dyn MapSurface);

    /// Called whenever the projected geometry is recalculated (pan, zoom, edits)
    fn on_redraw(&mut self, map: &mut dyn MapSurface);
}

/// Visible area of a Web Mercator map
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    /// Geographic center (`x` = lon, `y` = lat)
    pub center: Coord<f64>,
    pub zoom: f64,
    /// Container size in pixels
    pub size: Coord<f64>,
    /// Extra rendered area around the container, as a ratio of its size
    pub padding: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            center: Coord { x: 0.0, y: 0.0 },
            zoom: 2.0,
            size: Coord { x: 1024.0, y: 768.0 },
            padding: 0.1,
        }
    }
}

impl Viewport {
    pub fn new(center: Coord<f64>, zoom: f64, size: Coord<f64>) -> Self {
        Self {
            center,
            zoom,
            size,
            ..Default::default()
        }
    }

    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = padding;
        self
    }

    fn origin_world_px(&self) -> Coord<f64> {
        let center = utils::lon_lat_to_world_px(self.center, self.zoom);
        Coord {
            x: center.x - self.size.x / 2.0,
            y: center.y - self.size.y / 2.0,
        }
    }

    /// Geographic coordinate → container pixels
    pub fn project(&self, coord: Coord<f64>) -> Coord<f64> {
        let px = utils::lon_lat_to_world_px(coord, self.zoom);
        let origin = self.origin_world_px();
        Coord {
            x: px.x - origin.x,
            y: px.y - origin.y,
        }
    }

    /// Container pixels → geographic coordinate
    pub fn unproject(&self, px: Coord<f64>) -> Coord<f64> {
        let origin = self.origin_world_px();
        utils::world_px_to_lon_lat(
            Coord {
                x: px.x + origin.x,
                y: px.y + origin.y,
            },
            self.zoom,
        )
    }

    /// Container bounds grown by `padding` on every side
    pub fn pixel_bounds(&self) -> Rect<f64> {
        let pad = Coord {
            x: self.size.x * self.padding,
            y: self.size.y * self.padding,
        };
        Rect::new(
            Coord {
                x: -pad.x,
                y: -pad.y,
            },
            Coord {
                x: self.size.x + pad.x,
                y: self.size.y + pad.y,
            },
        )
    }

    /// Center on `bounds` (lon/lat) at the highest zoom (within `max_zoom`) that shows all of it
    pub fn fit_bounds(&mut self, bounds: Rect<f64>, max_zoom: f64) {
        let corners = |zoom: f64| {
            let north_west = Coord {
                x: bounds.min().x,
                y: bounds.max().y,
            };
            let south_east = Coord {
                x: bounds.max().x,
                y: bounds.min().y,
            };
            (
                utils::lon_lat_to_world_px(north_west, zoom),
                utils::lon_lat_to_world_px(south_east, zoom),
            )
        };

        let mut zoom = max_zoom.max(0.0);
        while zoom > 0.0 {
            let (min, max) = corners(zoom);
            if max.x - min.x <= self.size.x && max.y - min.y <= self.size.y {
                break;
            }
            zoom = (zoom - 0.25).max(0.0);
        }

        let (min, max) = corners(zoom);
        let middle = Coord {
            x: (min.x + max.x) / 2.0,
            y: (min.y + max.y) / 2.0,
        };
        self.center = utils::world_px_to_lon_lat(middle, zoom);
        self.zoom = zoom;
    }
}

/// Identifier of a layer on a [`Map`]. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(u64);

/// Tile loading events of a raster layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileEvent {
    /// The layer started fetching tiles
    LoadStarted,
    /// A fetch finished
    LoadFinished,
}

/// Raster layer backed by a tile server
pub struct TileLayer {
    pub name: String,
    pub url_template: String,
    listeners: Listeners<dyn FnMut(TileEvent)>,
}

impl std::fmt::Debug for TileLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TileLayer")
            .field("name", &self.name)
            .field("url_template", &self.url_template)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl TileLayer {
    pub fn new(name: impl Into<String>, url_template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url_template: url_template.into(),
            listeners: Listeners::new(),
        }
    }

    pub fn subscribe(&mut self, handler: Box<dyn FnMut(TileEvent)>) -> SubscriptionId {
        self.listeners.subscribe(handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Drop every subscriber
    pub fn clear_listeners(&mut self) {
        self.listeners.clear();
    }

    /// Deliver an event to every subscriber, in subscription order
    pub fn fire(&mut self, event: TileEvent) {
        for handler in self.listeners.handlers_mut() {
            handler(event);
        }
    }
}

/// Non-raster layer (vector overlays, marker groups)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayLayer {
    pub name: String,
}

impl OverlayLayer {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug)]
pub enum Layer {
    Tile(TileLayer),
    Overlay(OverlayLayer),
}

impl Layer {
    pub fn name(&self) -> &str {
        match self {
            Self::Tile(layer) => &layer.name,
            Self::Overlay(layer) => &layer.name,
        }
    }

    pub fn as_tile_mut(&mut self) -> Option<&mut TileLayer> {
        match self {
            Self::Tile(layer) => Some(layer),
            Self::Overlay(_) => None,
        }
    }

    pub fn is_raster(&self) -> bool {
        matches!(self, Self::Tile(_))
    }
}

/// Handler for newly added layers
pub type LayerAddedHandler = dyn FnMut(LayerId, &mut Layer);

/// Handler for layers leaving the map, called while the layer still holds its subscriptions
pub type LayerRemovedHandler = dyn FnMut(LayerId, &mut Layer);

/// In-memory map: viewport, layers and markers
#[derive(Debug, Default)]
pub struct Map {
    viewport: Viewport,
    layers: BTreeMap<LayerId, Layer>,
    next_layer_id: u64,
    layer_added: Listeners<LayerAddedHandler>,
    layer_removed: Listeners<LayerRemovedHandler>,
    markers: MarkerPane,
}

impl Map {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            ..Default::default()
        }
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn set_view(&mut self, center: Coord<f64>, zoom: f64) {
        self.viewport.center = center;
        self.viewport.zoom = zoom;
    }

    /// Add a layer. Layer-added handlers run before this returns.
    pub fn add_layer(&mut self, mut layer: Layer) -> LayerId {
        let id = LayerId(self.next_layer_id);
        self.next_layer_id += 1;
        tracing::debug!(layer = layer.name(), ?id, "Adding layer");
        for handler in self.layer_added.handlers_mut() {
            handler(id, &mut layer);
        }
        self.layers.insert(id, layer);
        id
    }

    /// Remove a layer. Layer-removed handlers run first, then whatever subscriptions are
    /// left on it are dropped, so the returned layer carries no handlers.
    pub fn remove_layer(&mut self, id: LayerId) -> Option<Layer> {
        let mut layer = self.layers.remove(&id)?;
        tracing::debug!(layer = layer.name(), ?id, "Removing layer");
        for handler in self.layer_removed.handlers_mut() {
            handler(id, &mut layer);
        }
        if let Some(tiles) = layer.as_tile_mut() {
            tiles.clear_listeners();
        }
        Some(layer)
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.get(&id)
    }

    pub fn layer_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.get_mut(&id)
    }

    pub fn layers(&self) -> impl Iterator<Item = (LayerId, &Layer)> {
        self.layers.iter().map(|(id, layer)| (*id, layer))
    }

    pub fn layers_mut(&mut self) -> impl Iterator<Item = (LayerId, &mut Layer)> {
        self.layers.iter_mut().map(|(id, layer)| (*id, layer))
    }

    pub fn on_layer_added(&mut self, handler: Box<LayerAddedHandler>) -> SubscriptionId {
        self.layer_added.subscribe(handler)
    }

    pub fn off_layer_added(&mut self, id: SubscriptionId) -> bool {
        self.layer_added.unsubscribe(id)
    }

    pub fn layer_added_listener_count(&self) -> usize {
        self.layer_added.len()
    }

    pub fn on_layer_removed(&mut self, handler: Box<LayerRemovedHandler>) -> SubscriptionId {
        self.layer_removed.subscribe(handler)
    }

    pub fn off_layer_removed(&mut self, id: SubscriptionId) -> bool {
        self.layer_removed.unsubscribe(id)
    }

    pub fn layer_removed_listener_count(&self) -> usize {
        self.layer_removed.len()
    }

    /// Dispatch a tile event on a raster layer. Returns `false` if there is no such layer.
    pub fn fire_tile_event(&mut self, id: LayerId, event: TileEvent) -> bool {
        match self.layers.get_mut(&id).and_then(Layer::as_tile_mut) {
            Some(layer) => {
                layer.fire(event);
                true
            }
            None => false,
        }
    }

    pub fn markers(&self) -> &MarkerPane {
        &self.markers
    }

    pub fn markers_mut(&mut self) -> &mut MarkerPane {
        &mut self.markers
    }
}

impl MapSurface for Map {
    fn project(&self, coord: Coord<f64>) -> Coord<f64> {
        self.viewport.project(coord)
    }

    fn pixel_bounds(&self) -> Rect<f64> {
        self.viewport.pixel_bounds()
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_center_projects_to_container_middle() {
        let viewport = Viewport::new(Coord { x: 13.4, y: 52.5 }, 10.0, Coord { x: 800.0, y: 600.0 });
        let px = viewport.project(viewport.center);
        assert!((px.x - 400.0).abs() < 1e-6);
        assert!((px.y - 300.0).abs() < 1e-6);

        let back = viewport.unproject(Coord { x: 400.0, y: 300.0 });
        assert!((back.x - 13.4).abs() < 1e-9);
        assert!((back.y - 52.5).abs() < 1e-9);
    }

    #[test]
    fn test_pixel_bounds_are_padded() {
        let viewport = Viewport::new(Coord { x: 0.0, y: 0.0 }, 3.0, Coord { x: 100.0, y: 50.0 });
        let bounds = viewport.pixel_bounds();
        assert_eq!(bounds.min(), Coord { x: -10.0, y: -5.0 });
        assert_eq!(bounds.max(), Coord { x: 110.0, y: 55.0 });

        let unpadded = viewport.with_padding(0.0).pixel_bounds();
        assert_eq!(unpadded.width(), 100.0);
    }

    #[test]
    fn test_fit_bounds_keeps_everything_visible() {
        let mut viewport = Viewport::default();
        let bounds = Rect::new(Coord { x: -0.118092, y: 48.864716 }, Coord { x: 13.404954, y: 52.520008 });
        viewport.fit_bounds(bounds, 17.0);
        for corner in [bounds.min(), bounds.max()] {
            let px = viewport.project(corner);
            assert!(px.x >= -1e-6 && px.x <= viewport.size.x + 1e-6);
            assert!(px.y >= -1e-6 && px.y <= viewport.size.y + 1e-6);
        }
        assert!(viewport.zoom < 17.0);
    }

    #[test]
    fn test_layer_added_handlers_see_new_layers() {
        let mut map = Map::default();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        let sub = map.on_layer_added(Box::new(move |id, layer| {
            log.borrow_mut().push((id, layer.is_raster()));
        }));

        let tiles = map.add_layer(Layer::Tile(TileLayer::new("osm", "https://tile.openstreetmap.org/{z}/{x}/{y}.png")));
        let overlay = map.add_layer(Layer::Overlay(OverlayLayer::new("route")));
        assert_eq!(*seen.borrow(), vec![(tiles, true), (overlay, false)]);

        assert!(map.off_layer_added(sub));
        map.add_layer(Layer::Overlay(OverlayLayer::new("posts")));
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn test_fire_tile_event() {
        let mut map = Map::default();
        let tiles = map.add_layer(Layer::Tile(TileLayer::new("osm", "")));
        let overlay = map.add_layer(Layer::Overlay(OverlayLayer::new("route")));

        let events = Rc::new(RefCell::new(Vec::new()));
        let log = events.clone();
        map.layer_mut(tiles)
            .and_then(Layer::as_tile_mut)
            .unwrap()
            .subscribe(Box::new(move |event| log.borrow_mut().push(event)));

        assert!(map.fire_tile_event(tiles, TileEvent::LoadStarted));
        assert!(!map.fire_tile_event(overlay, TileEvent::LoadStarted));
        assert_eq!(*events.borrow(), vec![TileEvent::LoadStarted]);

        assert!(map.remove_layer(tiles).is_some());
        assert!(!map.fire_tile_event(tiles, TileEvent::LoadFinished));
    }

    #[test]
    fn test_removed_layer_carries_no_handlers() {
        let mut map = Map::default();
        let tiles = map.add_layer(Layer::Tile(TileLayer::new("osm", "")));
        map.layer_mut(tiles)
            .and_then(Layer::as_tile_mut)
            .unwrap()
            .subscribe(Box::new(|_| {}));

        let removed = Rc::new(RefCell::new(Vec::new()));
        let log = removed.clone();
        map.on_layer_removed(Box::new(move |id, layer| {
            // Still subscribed when the handler runs
            let listeners = layer.as_tile_mut().map_or(0, |tiles| tiles.listener_count());
            log.borrow_mut().push((id, listeners));
        }));

        let mut layer = map.remove_layer(tiles).unwrap();
        assert_eq!(*removed.borrow(), vec![(tiles, 1)]);
        assert_eq!(layer.as_tile_mut().unwrap().listener_count(), 0);
        assert!(map.remove_layer(tiles).is_none());
        assert_eq!(removed.borrow().len(), 1);
    }
}
