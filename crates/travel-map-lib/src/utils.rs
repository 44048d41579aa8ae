//! Utility functions for the Web Mercator projection and pixel bounds

use geo::{Coord, Point, Rect};

/// Web Mercator bounds in meters (EPSG:3857)
pub const EARTH_MERCATOR_MAX: f64 = 20037508.34;
pub const EARTH_MERCATOR_MIN: f64 = -20037508.34;
pub const EARTH_SIZE_METERS: f64 = EARTH_MERCATOR_MAX - EARTH_MERCATOR_MIN;

/// Maximum latitude that can be represented in Web Mercator
pub const MAX_LATITUDE: f64 = 85.05112878;

/// Side of a map tile in pixels
pub const TILE_SIZE: f64 = 256.0;

/// Precomputed constant: EARTH_MERCATOR_MAX / 180.0
const LON_TO_X_FACTOR: f64 = EARTH_MERCATOR_MAX / 180.0;

/// Precomputed constant: EARTH_MERCATOR_MAX / PI
const Y_FACTOR: f64 = EARTH_MERCATOR_MAX / std::f64::consts::PI;

/// Precomputed constant: 180.0 / EARTH_MERCATOR_MAX
const X_TO_LON_FACTOR: f64 = 180.0 / EARTH_MERCATOR_MAX;

/// Precomputed constant: PI / EARTH_MERCATOR_MAX
const Y_TO_LAT_FACTOR: f64 = std::f64::consts::PI / EARTH_MERCATOR_MAX;

/// Convert WGS84 (lat, lon) to Web Mercator (x, y) in meters
///
/// # Arguments
/// * `lat` - Latitude in degrees (-85.05 to 85.05)
/// * `lon` - Longitude in degrees (-180 to 180)
#[inline(always)]
pub fn wgs84_to_mercator(lat: f64, lon: f64) -> Point<f64> {
    // Clamp latitude to valid Web Mercator range
    let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);

    let x = lon * LON_TO_X_FACTOR;
    let lat_rad = lat.to_radians();
    let y = (lat_rad.tan() + (1.0 / lat_rad.cos())).ln() * Y_FACTOR;

    Point::new(x, y)
}

/// Convert Web Mercator (x, y) in meters to WGS84, returned as (lat, lon)
#[inline(always)]
pub fn mercator_to_wgs84(x: f64, y: f64) -> (f64, f64) {
    let lon = x * X_TO_LON_FACTOR;
    let lat =
        (std::f64::consts::PI / 2.0 - 2.0 * ((-y * Y_TO_LAT_FACTOR).exp()).atan()).to_degrees();
    (lat, lon)
}

/// Size of the whole world in pixels at a (fractional) zoom level
#[inline(always)]
pub fn world_size_px(zoom: f64) -> f64 {
    TILE_SIZE * zoom.exp2()
}

/// Convert a geographic coordinate (`x` = lon, `y` = lat) to world pixels at a zoom level.
/// The origin is the north-west corner of the world, `y` grows southwards.
#[inline(always)]
pub fn lon_lat_to_world_px(coord: Coord<f64>, zoom: f64) -> Coord<f64> {
    let mercator = wgs84_to_mercator(coord.y, coord.x);
    let scale = world_size_px(zoom) / EARTH_SIZE_METERS;
    Coord {
        x: (mercator.x() - EARTH_MERCATOR_MIN) * scale,
        y: (EARTH_MERCATOR_MAX - mercator.y()) * scale,
    }
}

/// Inverse of [`lon_lat_to_world_px`]
#[inline(always)]
pub fn world_px_to_lon_lat(px: Coord<f64>, zoom: f64) -> Coord<f64> {
    let scale = EARTH_SIZE_METERS / world_size_px(zoom);
    let (lat, lon) = mercator_to_wgs84(
        px.x * scale + EARTH_MERCATOR_MIN,
        EARTH_MERCATOR_MAX - px.y * scale,
    );
    Coord { x: lon, y: lat }
}

/// Axis-aligned bounds of a set of pixel coordinates (None if empty)
pub fn pixel_bounds<I: IntoIterator<Item = Coord<f64>>>(points: I) -> Option<Rect<f64>> {
    let mut points = points.into_iter();
    let first = points.next()?;
    let (min, max) = points.fold((first, first), |(min, max), p| {
        (
            Coord {
                x: min.x.min(p.x),
                y: min.y.min(p.y),
            },
            Coord {
                x: max.x.max(p.x),
                y: max.y.max(p.y),
            },
        )
    });
    Some(Rect::new(min, max))
}

/// Whether two pixel rectangles overlap, edges included
#[inline(always)]
pub fn rects_intersect(a: &Rect<f64>, b: &Rect<f64>) -> bool {
    a.max().x >= b.min().x && a.min().x <= b.max().x && a.max().y >= b.min().y && a.min().y <= b.max().y
}
