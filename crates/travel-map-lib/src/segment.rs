//! Travel segment: a path drawn with one transport mode, and its transport glyph
//!
//! The glyph is only shown while the path is big enough on screen to host it:
//! on every redraw the path's pixel bounding box is compared to
//! `size_factor × icon size`, and the owned marker is created or destroyed accordingly.

use crate::glyph::{Glyph, GlyphOptions, IconShape, Marker, MarkerId};
use crate::map::{MapLayer, MapSurface};
use crate::transport::{IconDef, Resolution, Transport};
use crate::utils;
use geo::{Centroid, Coord, LineString, Rect};
use serde::{Deserialize, Serialize};

/// Style of the transport glyph of a segment (the glyph itself comes from the transport)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerIconOptions {
    pub shape: IconShape,
    pub size_px: f64,
    pub background_color: String,
    pub border_color: String,
    pub border_width_px: f64,
    pub border_style: String,
    pub foreground_color: String,
    pub font_size_px: f64,
}

impl Default for MarkerIconOptions {
    fn default() -> Self {
        Self {
            shape: IconShape::RoundedSquare,
            size_px: 24.0,
            background_color: "#3388ff".to_string(),
            border_color: "white".to_string(),
            border_width_px: 0.0,
            border_style: "solid".to_string(),
            foreground_color: "white".to_string(),
            font_size_px: 16.0,
        }
    }
}

impl MarkerIconOptions {
    /// Glyph options for `icon` drawn with this style
    pub fn glyph_options(&self, icon: &IconDef) -> GlyphOptions {
        GlyphOptions {
            glyph_id: icon.glyph_id.to_string(),
            glyph_style: icon.glyph_style.to_string(),
            shape: self.shape,
            size_px: self.size_px,
            background_color: self.background_color.clone(),
            border_color: self.border_color.clone(),
            border_width_px: self.border_width_px,
            border_style: self.border_style.clone(),
            foreground_color: self.foreground_color.clone(),
            font_size_px: self.font_size_px,
            ..Default::default()
        }
    }
}

/// Configuration of a travel segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentOptions {
    /// Stroke color of the path
    pub color: String,
    /// Stroke width in pixels
    pub weight: f64,
    pub opacity: f64,
    /// Dash and gap lengths in pixels (solid when unset)
    pub dash_array: Option<Vec<f64>>,
    pub dash_offset: Option<f64>,
    pub icon_options: MarkerIconOptions,
    /// The glyph shows once the path is larger than `size_factor × icon size` on screen
    pub size_factor: f64,
    pub marker_z_index_offset: i32,
}

impl Default for SegmentOptions {
    fn default() -> Self {
        Self {
            color: "white".to_string(),
            weight: 3.0,
            opacity: 1.0,
            dash_array: None,
            dash_offset: None,
            icon_options: MarkerIconOptions::default(),
            size_factor: 2.0,
            marker_z_index_offset: 0,
        }
    }
}

impl SegmentOptions {
    /// Minimum on-screen width or height (exclusive) for the glyph to show
    pub fn size_threshold(&self) -> f64 {
        self.size_factor * self.icon_options.size_px
    }
}

/// Whether a segment currently owns a transport marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerVisibility {
    Hidden,
    Shown(MarkerId),
}

/// A travel path with its transport glyph
#[derive(Debug)]
pub struct TravelSegment {
    /// Geographic points (`x` = lon, `y` = lat)
    points: Vec<Coord<f64>>,
    transport: Transport,
    options: SegmentOptions,
    /// Where the glyph goes; set once attached, follows geometry edits only
    center: Option<Coord<f64>>,
    /// Pixel bounds of the path at the last redraw
    pixel_bounds: Option<Rect<f64>>,
    transport_marker: Option<MarkerId>,
    attached: bool,
}

impl TravelSegment {
    /// Create a segment; `transport` is parsed case-insensitively, `None` meaning unknown
    pub fn new(points: Vec<Coord<f64>>, transport: Option<&str>, options: SegmentOptions) -> Self {
        Self::with_transport(points, Transport::parse(transport), options)
    }

    pub fn with_transport(points: Vec<Coord<f64>>, transport: Transport, options: SegmentOptions) -> Self {
        Self {
            points,
            transport,
            options,
            center: None,
            pixel_bounds: None,
            transport_marker: None,
            attached: false,
        }
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn points(&self) -> &[Coord<f64>] {
        &self.points
    }

    pub fn options(&self) -> &SegmentOptions {
        &self.options
    }

    pub fn center(&self) -> Option<Coord<f64>> {
        self.center
    }

    pub fn pixel_bounds(&self) -> Option<Rect<f64>> {
        self.pixel_bounds
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn visibility(&self) -> MarkerVisibility {
        match self.transport_marker {
            Some(id) => MarkerVisibility::Shown(id),
            None => MarkerVisibility::Hidden,
        }
    }

    /// Replace the geometry. The host is expected to redraw afterwards.
    pub fn set_points(&mut self, points: Vec<Coord<f64>>) {
        self.points = points;
        self.center = if self.attached {
            self.compute_center()
        } else {
            None
        };
    }

    fn compute_center(&self) -> Option<Coord<f64>> {
        LineString::from(self.points.clone())
            .centroid()
            .map(|point| point.0)
    }

    /// Path points projected to container pixels
    pub fn project(&self, map: &dyn MapSurface) -> Vec<Coord<f64>> {
        self.points.iter().map(|p| map.project(*p)).collect()
    }

    fn hide_marker(&mut self, map: &mut dyn MapSurface) {
        if let Some(id) = self.transport_marker.take() {
            map.remove_marker(id);
            tracing::trace!(transport = %self.transport, "Transport marker hidden");
        }
    }

    fn show_marker(&mut self, map: &mut dyn MapSurface, icon: &IconDef, center: Coord<f64>) {
        let glyph = Glyph::icon(self.options.icon_options.glyph_options(icon));
        let marker = Marker::new(center, glyph)
            .with_tooltip(self.transport.label())
            .with_z_index_offset(self.options.marker_z_index_offset);
        self.transport_marker = Some(map.add_marker(marker));
        tracing::trace!(transport = %self.transport, "Transport marker shown");
    }

    /// Whether the glyph fits the path at its current pixel bounds
    fn marker_fits(&self, viewport: &Rect<f64>) -> bool {
        let Some(bounds) = self.pixel_bounds else {
            return false;
        };
        let threshold = self.options.size_threshold();
        utils::rects_intersect(&bounds, viewport)
            && (bounds.width() > threshold || bounds.height() > threshold)
    }
}

impl MapLayer for TravelSegment {
    fn on_attach(&mut self, map: &mut dyn MapSurface) {
        if self.attached {
            return;
        }
        self.attached = true;
        if self.center.is_none() {
            self.center = self.compute_center();
        }
        self.on_redraw(map);
    }

    fn on_detach(&mut self, map: &mut dyn MapSurface) {
        self.hide_marker(map);
        self.attached = false;
    }

    fn on_redraw(&mut self, map: &mut dyn MapSurface) {
        #[cfg(feature = "profiling")]
        profiling::scope!("segment::on_redraw");

        if !self.attached {
            return;
        }
        self.pixel_bounds = utils::pixel_bounds(self.points.iter().map(|p| map.project(*p)));

        let icon = match self.transport.resolve() {
            Resolution::Icon(icon) => Some(icon),
            Resolution::Silent => None,
            Resolution::Missing(name) => {
                tracing::warn!(transport = name, "Missing transport definition");
                None
            }
        };
        let Some(icon) = icon else {
            self.hide_marker(map);
            return;
        };

        let visible = self.marker_fits(&map.pixel_bounds());
        match (self.transport_marker, visible, self.center) {
            (Some(_), false, _) => self.hide_marker(map),
            (None, true, Some(center)) => self.show_marker(map, icon, center),
            (Some(id), true, Some(center)) => {
                if let Some(marker) = map.marker_mut(id)
                    && marker.position != center
                {
                    marker.position = center;
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{Map, Viewport};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    /// Map whose projection is the identity, so points are given in pixels directly
    struct PixelMap {
        size: f64,
        markers: crate::glyph::MarkerPane,
    }

    impl PixelMap {
        fn new(size: f64) -> Self {
            Self {
                size,
                markers: Default::default(),
            }
        }
    }

    impl MapSurface for PixelMap {
        fn project(&self, coord: Coord<f64>) -> Coord<f64> {
            coord
        }

        fn pixel_bounds(&self) -> Rect<f64> {
            Rect::new(Coord { x: 0.0, y: 0.0 }, Coord { x: self.size, y: self.size })
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

    fn assert_near(actual: Coord<f64>, expected: Coord<f64>) {
        assert!(
            (actual.x - expected.x).abs() < 1e-9 && (actual.y - expected.y).abs() < 1e-9,
            "{actual:?} != {expected:?}"
        );
    }

    fn diagonal(width: f64, height: f64) -> Vec<Coord<f64>> {
        vec![Coord { x: 10.0, y: 10.0 }, Coord { x: 10.0 + width, y: 10.0 + height }]
    }

    fn segment(width: f64, height: f64, transport: Option<&str>) -> TravelSegment {
        TravelSegment::new(diagonal(width, height), transport, SegmentOptions::default())
    }

    #[test]
    fn test_threshold_is_strict() {
        let mut map = PixelMap::new(500.0);
        let mut exact = segment(48.0, 48.0, Some("car"));
        exact.on_attach(&mut map);
        assert_eq!(exact.visibility(), MarkerVisibility::Hidden);

        let mut wider = segment(49.0, 30.0, Some("car"));
        wider.on_attach(&mut map);
        assert!(matches!(wider.visibility(), MarkerVisibility::Shown(_)));
        assert_eq!(map.markers.len(), 1);
    }

    #[test]
    fn test_bicycle_marker() {
        let mut map = PixelMap::new(500.0);
        let mut seg = segment(100.0, 100.0, Some("Bicycle"));
        seg.on_attach(&mut map);

        let MarkerVisibility::Shown(id) = seg.visibility() else {
            panic!("marker should be shown");
        };
        let marker = map.markers.get(id).unwrap();
        assert_eq!(marker.tooltip.as_deref(), Some("Bicycle"));
        assert_near(marker.position, Coord { x: 60.0, y: 60.0 });
        match &marker.glyph {
            Glyph::Icon(options) => {
                assert_eq!(options.glyph_id, "person-bicycle");
                assert_eq!(options.glyph_style, "solid");
                assert_eq!(options.shape, IconShape::RoundedSquare);
                assert_eq!(options.size_px, 24.0);
            }
            other => panic!("unexpected glyph: {other:?}"),
        }
    }

    #[test]
    fn test_tuk_tuk_wide_path() {
        let mut map = PixelMap::new(500.0);
        let mut seg = segment(100.0, 10.0, Some("tuk_tuk"));
        seg.on_attach(&mut map);
        let MarkerVisibility::Shown(id) = seg.visibility() else {
            panic!("marker should be shown");
        };
        assert_eq!(map.markers.get(id).unwrap().tooltip.as_deref(), Some("Tuk_tuk"));
    }

    #[test]
    fn test_unknown_and_undefined_never_show() {
        let mut map = PixelMap::new(5000.0);
        for transport in [None, Some("unknown"), Some("UNKNOWN"), Some("teleport")] {
            let mut seg = segment(1000.0, 1000.0, transport);
            seg.on_attach(&mut map);
            seg.on_redraw(&mut map);
            assert_eq!(seg.visibility(), MarkerVisibility::Hidden);
            assert!(seg.pixel_bounds().is_some());
        }
        assert!(map.markers.is_empty());
    }

    /// Counts `WARN` events emitted while it is the default subscriber
    struct WarnCounter(Arc<AtomicUsize>);

    impl<S: tracing::Subscriber> Layer<S> for WarnCounter {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == tracing::Level::WARN {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    fn warnings_while(run: impl FnOnce()) -> usize {
        let warnings = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(WarnCounter(warnings.clone()));
        tracing::subscriber::with_default(subscriber, run);
        warnings.load(Ordering::SeqCst)
    }

    #[test]
    fn test_only_undefined_transport_warns() {
        let mut map = PixelMap::new(5000.0);
        let undefined = warnings_while(|| {
            let mut seg = segment(1000.0, 1000.0, Some("teleport"));
            seg.on_attach(&mut map);
            seg.on_redraw(&mut map);
        });
        // Once per redraw, attach included
        assert_eq!(undefined, 2);

        for transport in [None, Some("unknown"), Some("train")] {
            let silent = warnings_while(|| {
                let mut seg = segment(1000.0, 1000.0, transport);
                seg.on_attach(&mut map);
                seg.on_redraw(&mut map);
                seg.on_detach(&mut map);
            });
            assert_eq!(silent, 0, "{transport:?}");
        }
    }

    #[test]
    fn test_offscreen_path_is_hidden() {
        let mut map = PixelMap::new(100.0);
        let mut seg = TravelSegment::new(
            vec![Coord { x: 200.0, y: 200.0 }, Coord { x: 400.0, y: 400.0 }],
            Some("train"),
            SegmentOptions::default(),
        );
        seg.on_attach(&mut map);
        assert_eq!(seg.visibility(), MarkerVisibility::Hidden);
    }

    #[test]
    fn test_redraw_before_attach_is_noop() {
        let mut map = PixelMap::new(500.0);
        let mut seg = segment(100.0, 100.0, Some("bus"));
        seg.on_redraw(&mut map);
        assert!(seg.pixel_bounds().is_none());
        assert!(seg.center().is_none());
        assert!(map.markers.is_empty());
    }

    #[test]
    fn test_degenerate_geometry_hides_marker() {
        let mut map = PixelMap::new(500.0);
        let mut seg = segment(100.0, 100.0, Some("ferry"));
        seg.on_attach(&mut map);
        assert!(matches!(seg.visibility(), MarkerVisibility::Shown(_)));

        seg.set_points(vec![Coord { x: 42.0, y: 42.0 }]);
        seg.on_redraw(&mut map);
        let bounds = seg.pixel_bounds().unwrap();
        assert_eq!((bounds.width(), bounds.height()), (0.0, 0.0));
        assert_eq!(seg.visibility(), MarkerVisibility::Hidden);
        assert_near(seg.center().unwrap(), Coord { x: 42.0, y: 42.0 });
        assert!(map.markers.is_empty());
    }

    #[test]
    fn test_empty_path_never_shows() {
        let mut map = PixelMap::new(500.0);
        let mut seg = TravelSegment::new(Vec::new(), Some("car"), SegmentOptions::default());
        seg.on_attach(&mut map);
        assert!(seg.center().is_none());
        assert!(seg.pixel_bounds().is_none());
        assert_eq!(seg.visibility(), MarkerVisibility::Hidden);
    }

    #[test]
    fn test_geometry_edit_moves_marker() {
        let mut map = PixelMap::new(500.0);
        let mut seg = segment(100.0, 100.0, Some("car"));
        seg.on_attach(&mut map);
        let MarkerVisibility::Shown(id) = seg.visibility() else {
            panic!("marker should be shown");
        };

        seg.set_points(vec![Coord { x: 100.0, y: 100.0 }, Coord { x: 300.0, y: 100.0 }]);
        seg.on_redraw(&mut map);
        assert_eq!(seg.visibility(), MarkerVisibility::Shown(id));
        assert_near(map.markers.get(id).unwrap().position, Coord { x: 200.0, y: 100.0 });
    }

    #[test]
    fn test_panning_does_not_recenter() {
        let mut map = Map::new(Viewport::new(
            Coord { x: 8.0, y: 50.0 },
            6.0,
            Coord { x: 1024.0, y: 768.0 },
        ));
        let mut seg = TravelSegment::new(
            vec![Coord { x: 2.349014, y: 48.864716 }, Coord { x: 13.404954, y: 52.520008 }],
            Some("flight"),
            SegmentOptions::default(),
        );
        seg.on_attach(&mut map);
        let center = seg.center();
        assert!(center.is_some());
        assert_eq!(map.markers().len(), 1);

        map.set_view(Coord { x: 9.0, y: 51.0 }, 6.0);
        seg.on_redraw(&mut map);
        assert_eq!(seg.center(), center);
        assert_eq!(map.markers().len(), 1);
    }

    #[test]
    fn test_zooming_out_hides_marker() {
        let mut map = Map::new(Viewport::new(
            Coord { x: 8.0, y: 50.0 },
            6.0,
            Coord { x: 1024.0, y: 768.0 },
        ));
        let mut seg = TravelSegment::new(
            vec![Coord { x: 7.0, y: 50.0 }, Coord { x: 9.0, y: 50.5 }],
            Some("train"),
            SegmentOptions::default(),
        );
        seg.on_attach(&mut map);
        assert_eq!(map.markers().len(), 1);

        map.set_view(Coord { x: 8.0, y: 50.0 }, 1.0);
        seg.on_redraw(&mut map);
        assert_eq!(seg.visibility(), MarkerVisibility::Hidden);
        assert!(map.markers().is_empty());

        map.set_view(Coord { x: 8.0, y: 50.0 }, 6.0);
        seg.on_redraw(&mut map);
        assert!(matches!(seg.visibility(), MarkerVisibility::Shown(_)));
    }

    #[test]
    fn test_detach_releases_marker() {
        let mut map = PixelMap::new(500.0);
        let mut seg = segment(100.0, 100.0, Some("sailing"));
        seg.on_attach(&mut map);
        assert_eq!(map.markers.len(), 1);

        seg.on_detach(&mut map);
        assert!(!seg.is_attached());
        assert_eq!(seg.visibility(), MarkerVisibility::Hidden);
        assert!(map.markers.is_empty());

        seg.on_redraw(&mut map);
        assert!(map.markers.is_empty());
    }

    #[test]
    fn test_points_replaced_while_detached_recenters_on_attach() {
        let mut map = PixelMap::new(500.0);
        let mut seg = segment(100.0, 100.0, Some("car"));
        seg.on_attach(&mut map);
        seg.on_detach(&mut map);

        seg.set_points(vec![Coord { x: 0.0, y: 0.0 }, Coord { x: 200.0, y: 0.0 }]);
        assert!(seg.center().is_none());
        seg.on_attach(&mut map);
        assert_near(seg.center().unwrap(), Coord { x: 100.0, y: 0.0 });
    }

    #[test]
    fn test_double_attach_keeps_single_marker() {
        let mut map = PixelMap::new(500.0);
        let mut seg = segment(100.0, 100.0, Some("car"));
        seg.on_attach(&mut map);
        seg.on_attach(&mut map);
        seg.on_redraw(&mut map);
        assert_eq!(map.markers.len(), 1);
    }
}
