//! Travel Map Library - Route Overlays for Slippy Maps
//!
//! This library turns a list of travel points into map overlays: one polyline per run of
//! points sharing a transport mode, each carrying a transport glyph that only appears when
//! the path is large enough on screen to host it. It also tracks tile loading across all
//! raster layers of a map to expose a single "map ready" flag.
//!
//! # Architecture
//!
//! - **[`TravelSegment`]**: Path + transport mode, owns at most one transport [`Marker`]
//! - **[`TileLoadingControl`]**: Counts in-flight tile loads, exposes a `data-ready` flag
//! - **[`Map`]**: In-memory map host (viewport, layers, markers) implementing [`MapSurface`]
//! - **[`TravelRoute`]**: Builds segments, start/final and post markers from raw points
//!
//! Everything runs on the host's event loop: no locking, no background work. Handlers
//! never fail; problems degrade to a hidden glyph or a "ready" flag.

mod events;
mod glyph;
mod map;
mod reader;
mod route;
mod segment;
mod tile_loading;
mod transport;
pub mod units;
pub mod utils;

// Public API exports
pub use events::{Listeners, SubscriptionId};
pub use glyph::{
    Border, Glyph, GlyphOptions, IconShape, Marker, MarkerId, MarkerPane, PostIconOptions,
    create_glyph,
};
pub use map::{Layer, LayerId, Map, MapLayer, MapSurface, OverlayLayer, TileEvent, TileLayer, Viewport};
pub use reader::{TravelData, read_route, read_route_from_str};
pub use route::{GeoBounds, MapStyles, Post, TrackPoint, TravelRoute, TravelRouteOptions};
pub use segment::{MarkerIconOptions, MarkerVisibility, SegmentOptions, TravelSegment};
pub use tile_loading::{ControlElement, LoadState, TileLoadingControl};
pub use transport::{
    IconDef, Resolution, TRANSPORT_ICONS, Transport, TransportMode, UnknownTransportMode,
    resolve_icon, title_case,
};

/// Error types for loading travel data
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("GPX parsing error: {0}")]
    GpxParse(#[from] gpx::errors::GpxError),

    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Unsupported route format: {0}")]
    UnsupportedFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_exports() {
        // Verify that all public types are accessible
        let _: fn() -> TileLoadingControl = TileLoadingControl::new;
        let _: fn() -> SegmentOptions = SegmentOptions::default;
        let _: fn(&str) -> String = title_case;
    }

    #[test]
    fn test_error_display() {
        let err = MapError::UnsupportedFormat("kml".to_string());
        assert_eq!(err.to_string(), "Unsupported route format: kml");
    }
}
