//! Map tile providers and their load tracking

use serde::{Deserialize, Serialize};
use travel_map_lib::{LayerId, Map, TileEvent};
use walkers::{
    TileId,
    sources::{Attribution, TileSource},
};

/// Custom OpenTopoMap tile source
pub struct OpenTopoMap;

impl TileSource for OpenTopoMap {
    fn tile_url(&self, tile_id: TileId) -> String {
        format!(
            "https://tile.opentopomap.org/{}/{}/{}.png",
            tile_id.zoom, tile_id.x, tile_id.y
        )
    }

    fn attribution(&self) -> Attribution {
        Attribution {
            text: "© OpenTopoMap (CC-BY-SA)",
            url: "https://opentopomap.org/",
            logo_light: None,
            logo_dark: None,
        }
    }

    fn max_zoom(&self) -> u8 {
        17 // OpenTopoMap has max zoom of 17
    }
}

/// Available map tile providers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TilesProvider {
    #[default]
    OpenStreetMap,
    OpenTopoMap,
}

impl TilesProvider {
    pub fn url(&self) -> &'static str {
        match self {
            Self::OpenStreetMap => "https://tile.openstreetmap.org/{z}/{x}/{y}.png",
            Self::OpenTopoMap => "https://tile.opentopomap.org/{z}/{x}/{y}.png",
        }
    }

    pub fn attribution(&self) -> &'static str {
        match self {
            Self::OpenStreetMap => "© OpenStreetMap contributors",
            Self::OpenTopoMap => "© OpenTopoMap (CC-BY-SA)",
        }
    }

    pub fn all() -> &'static [Self] {
        &[Self::OpenStreetMap, Self::OpenTopoMap]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::OpenStreetMap => "OpenStreetMap",
            Self::OpenTopoMap => "OpenTopoMap",
        }
    }
}

/// Turns the in-flight request count of one tile provider into load events on its
/// raster layer: each new request is a `LoadStarted`, each completed one a `LoadFinished`.
#[derive(Debug)]
pub struct TileActivityProbe {
    layer: LayerId,
    in_flight: usize,
}

impl TileActivityProbe {
    pub fn new(layer: LayerId) -> Self {
        Self {
            layer,
            in_flight: 0,
        }
    }

    /// Report the current in-flight count, firing one event per change on `map`
    pub fn update(&mut self, map: &mut Map, in_flight: usize) {
        let (event, count) = if in_flight >= self.in_flight {
            (TileEvent::LoadStarted, in_flight - self.in_flight)
        } else {
            (TileEvent::LoadFinished, self.in_flight - in_flight)
        };
        for _ in 0..count {
            map.fire_tile_event(self.layer, event);
        }
        self.in_flight = in_flight;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use travel_map_lib::{Layer, TileLayer, TileLoadingControl};

    fn tracked_map() -> (Map, LayerId, TileLoadingControl) {
        let mut map = Map::default();
        let provider = TilesProvider::OpenStreetMap;
        let layer = map.add_layer(Layer::Tile(TileLayer::new(provider.name(), provider.url())));
        let mut control = TileLoadingControl::new();
        control.attach(&mut map);
        (map, layer, control)
    }

    #[test]
    fn test_probe_reports_requests() {
        let (mut map, layer, control) = tracked_map();
        let mut probe = TileActivityProbe::new(layer);

        probe.update(&mut map, 3);
        assert_eq!(control.counter(), 3);
        assert!(!control.is_ready());

        probe.update(&mut map, 1);
        assert_eq!(control.counter(), 1);

        probe.update(&mut map, 0);
        assert!(control.is_ready());
        assert_eq!(control.element().ready(), Some(true));
    }

    #[test]
    fn test_probe_steady_count_is_quiet() {
        let (mut map, layer, control) = tracked_map();
        let mut probe = TileActivityProbe::new(layer);
        probe.update(&mut map, 2);
        probe.update(&mut map, 2);
        assert_eq!(control.counter(), 2);
    }

    #[test]
    fn test_provider_names() {
        let names: Vec<_> = TilesProvider::all().iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["OpenStreetMap", "OpenTopoMap"]);
    }
}
