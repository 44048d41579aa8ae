//! TravelRoute - the whole trip as map overlays
//!
//! Splits the raw travel points into one [`TravelSegment`] per transport run, and adds
//! start, final and post markers.

use crate::glyph::{Glyph, GlyphOptions, IconShape, Marker, MarkerId, PostIconOptions};
use crate::map::{MapLayer, MapSurface};
use crate::segment::{MarkerIconOptions, SegmentOptions, TravelSegment};
use crate::transport::{Transport, TransportMode};
use crate::units::{mm, to_px};
use geo::{Coord, Rect};
use serde::{Deserialize, Serialize};

/// Dash and gap of flight paths, in multiples of the line weight
const FLIGHT_DASH: (f64, f64) = (4.0, 3.0);

/// Z-index offset of the start and final markers, above transport glyphs
const ENDPOINT_Z_INDEX: i32 = 1500;

/// One recorded location of the trip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
    pub lat: f64,
    pub lon: f64,
    /// Transport used to leave this point
    #[serde(default)]
    pub transport: Option<String>,
}

impl TrackPoint {
    pub fn new(lat: f64, lon: f64, transport: Option<&str>) -> Self {
        Self {
            lat,
            lon,
            transport: transport.map(str::to_string),
        }
    }

    pub fn coord(&self) -> Coord<f64> {
        Coord {
            x: self.lon,
            y: self.lat,
        }
    }
}

/// A blog post pinned on the map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl Post {
    pub fn coord(&self) -> Coord<f64> {
        Coord {
            x: self.lon,
            y: self.lat,
        }
    }
}

/// Latitude/longitude bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub lat_min: f64,
    pub lon_min: f64,
    pub lat_max: f64,
    pub lon_max: f64,
}

impl GeoBounds {
    /// Smallest bounds containing all coordinates (`x` = lon, `y` = lat)
    pub fn from_coords<I: IntoIterator<Item = Coord<f64>>>(coords: I) -> Option<Self> {
        coords.into_iter().fold(None, |bounds, c| {
            Some(match bounds {
                None => Self {
                    lat_min: c.y,
                    lon_min: c.x,
                    lat_max: c.y,
                    lon_max: c.x,
                },
                Some(b) => Self {
                    lat_min: b.lat_min.min(c.y),
                    lon_min: b.lon_min.min(c.x),
                    lat_max: b.lat_max.max(c.y),
                    lon_max: b.lon_max.max(c.x),
                },
            })
        })
    }

    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        (self.lat_min..=self.lat_max).contains(&lat) && (self.lon_min..=self.lon_max).contains(&lon)
    }

    /// As a rectangle with `x` = lon and `y` = lat
    pub fn to_rect(&self) -> Rect<f64> {
        Rect::new(
            Coord {
                x: self.lon_min,
                y: self.lat_min,
            },
            Coord {
                x: self.lon_max,
                y: self.lat_max,
            },
        )
    }
}

/// Styles of every overlay of a route. Missing fields keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapStyles {
    pub start_icon: GlyphOptions,
    pub final_icon: GlyphOptions,
    pub post_icon: PostIconOptions,
    pub travel_segment: SegmentOptions,
}

impl Default for MapStyles {
    fn default() -> Self {
        let endpoint = |glyph_id: &str, background_color: &str, font_size_px: f64| GlyphOptions {
            glyph_id: glyph_id.to_string(),
            shape: IconShape::Circle,
            size_px: 32.0,
            background_color: background_color.to_string(),
            border_color: "unset".to_string(),
            border_width_px: 0.0,
            foreground_color: "white".to_string(),
            font_size_px,
            ..Default::default()
        };
        Self {
            start_icon: endpoint("house", "lime", 16.0),
            final_icon: endpoint("flag-checkered", "indianred", 15.0),
            post_icon: PostIconOptions::default(),
            travel_segment: SegmentOptions {
                icon_options: MarkerIconOptions {
                    border_color: "unset".to_string(),
                    ..Default::default()
                },
                ..Default::default()
            },
        }
    }
}

impl MapStyles {
    /// Styles for a printed map rendered at `dpi`
    pub fn print(dpi: u32) -> Self {
        let mut styles = Self::default();
        for icon in [&mut styles.start_icon, &mut styles.final_icon] {
            icon.size_px = to_px(mm(6.0), dpi);
            icon.font_size_px = 40.0;
        }
        styles.post_icon.size_px = to_px(mm(8.0), dpi);
        styles.post_icon.empty_size_px = to_px(mm(4.0), dpi);
        styles.post_icon.border_width_px = to_px(mm(0.5), dpi);

        let segment = &mut styles.travel_segment;
        segment.icon_options.size_px = to_px(mm(6.0), dpi);
        segment.icon_options.background_color = "goldenrod".to_string();
        segment.icon_options.font_size_px = 50.0;
        segment.weight = to_px(mm(0.75), dpi);
        styles
    }
}

/// How a route is turned into overlays
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TravelRouteOptions {
    /// Keep only flight glyphs (other segments are drawn without one)
    pub show_only_flight_icons: bool,
    pub styles: MapStyles,
}

/// Marker owned by the route, placed while attached
#[derive(Debug)]
struct RouteMarker {
    marker: Marker,
    id: Option<MarkerId>,
}

/// All overlays of a trip
#[derive(Debug)]
pub struct TravelRoute {
    segments: Vec<TravelSegment>,
    markers: Vec<RouteMarker>,
    bounds: Option<GeoBounds>,
}

fn flight_style(base: &SegmentOptions) -> SegmentOptions {
    let weight = base.weight;
    SegmentOptions {
        dash_array: Some(vec![
            (FLIGHT_DASH.0 * weight).floor(),
            (FLIGHT_DASH.1 * weight).floor(),
        ]),
        dash_offset: Some(((FLIGHT_DASH.0 + FLIGHT_DASH.1) * weight / 2.0).floor()),
        ..base.clone()
    }
}

impl TravelRoute {
    pub fn new(points: &[TrackPoint], posts: &[Post], options: &TravelRouteOptions) -> Self {
        let styles = &options.styles;
        let segments = split_segments(points, options);

        let mut markers = Vec::new();
        if let Some(first) = points.first() {
            markers.push(
                Marker::new(first.coord(), Glyph::icon(styles.start_icon.clone()))
                    .with_tooltip("Start point")
                    .with_z_index_offset(ENDPOINT_Z_INDEX),
            );
        }
        if points.len() > 1
            && let Some(last) = points.last()
        {
            markers.push(
                Marker::new(last.coord(), Glyph::icon(styles.final_icon.clone()))
                    .with_tooltip("Final point")
                    .with_z_index_offset(ENDPOINT_Z_INDEX),
            );
        }
        for post in posts {
            let glyph = Glyph::post(PostIconOptions {
                image_url: post.image_url.clone(),
                ..styles.post_icon.clone()
            });
            markers.push(Marker::new(post.coord(), glyph).with_tooltip(post.name.clone()));
        }

        let bounds = GeoBounds::from_coords(points.iter().map(TrackPoint::coord));
        tracing::debug!(
            points = points.len(),
            segments = segments.len(),
            posts = posts.len(),
            "Built travel route"
        );

        Self {
            segments,
            markers: markers
                .into_iter()
                .map(|marker| RouteMarker { marker, id: None })
                .collect(),
            bounds,
        }
    }

    pub fn segments(&self) -> &[TravelSegment] {
        &self.segments
    }

    pub fn segments_mut(&mut self) -> &mut [TravelSegment] {
        &mut self.segments
    }

    /// Start, final and post markers
    pub fn markers(&self) -> impl Iterator<Item = &Marker> {
        self.markers.iter().map(|m| &m.marker)
    }

    /// Bounds of the track points
    pub fn bounds(&self) -> Option<GeoBounds> {
        self.bounds
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty() && self.markers.is_empty()
    }
}

/// Cut the points into runs of the same transport. The point where the transport
/// changes ends one segment and starts the next; a segment uses its first point's transport.
fn split_segments(points: &[TrackPoint], options: &TravelRouteOptions) -> Vec<TravelSegment> {
    let base = &options.styles.travel_segment;
    let mut segments = Vec::new();
    let Some((first, rest)) = points.split_first() else {
        return segments;
    };

    let mut coords = vec![first.coord()];
    let mut transport = Transport::parse(first.transport.as_deref());
    for (i, point) in rest.iter().enumerate() {
        coords.push(point.coord());
        let next = Transport::parse(point.transport.as_deref());
        let is_last = i == rest.len() - 1;
        if next != transport || is_last {
            let is_flight = transport == Transport::Mode(TransportMode::Flight);
            let style = if is_flight {
                flight_style(base)
            } else {
                base.clone()
            };
            let shown = if options.show_only_flight_icons && !is_flight {
                Transport::Unknown
            } else {
                transport
            };
            segments.push(TravelSegment::with_transport(
                std::mem::replace(&mut coords, vec![point.coord()]),
                shown,
                style,
            ));
            transport = next;
        }
    }
    segments
}

impl MapLayer for TravelRoute {
    fn on_attach(&mut self, map: &mut dyn MapSurface) {
        for segment in &mut self.segments {
            segment.on_attach(map);
        }
        for route_marker in &mut self.markers {
            if route_marker.id.is_none() {
                route_marker.id = Some(map.add_marker(route_marker.marker.clone()));
            }
        }
    }

    fn on_detach(&mut self, map: &mut dyn MapSurface) {
        for segment in &mut self.segments {
            segment.on_detach(map);
        }
        for route_marker in &mut self.markers {
            if let Some(id) = route_marker.id.take() {
                map.remove_marker(id);
            }
        }
    }

    fn on_redraw(&mut self, map: &mut dyn MapSurface) {
        #[cfg(feature = "profiling")]
        profiling::scope!("route::on_redraw");

        for segment in &mut self.segments {
            segment.on_redraw(map);
        }
    }
}
