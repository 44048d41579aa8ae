//! Loading travel data from GPX or JSON files

use crate::route::{Post, TrackPoint};
use crate::{MapError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Raw travel data: the recorded points and the posts written along the way
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TravelData {
    #[serde(default)]
    pub points: Vec<TrackPoint>,
    #[serde(default)]
    pub posts: Vec<Post>,
}

/// Read a route file, dispatching on its extension (`gpx` or `json`)
pub fn read_route(path: impl AsRef<Path>) -> Result<TravelData> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_lowercase();

    if !matches!(extension.as_str(), "gpx" | "json") {
        return Err(MapError::UnsupportedFormat(path.display().to_string()));
    }

    let reader = BufReader::new(File::open(path)?);
    let data = if extension == "gpx" {
        from_gpx(gpx::read(reader)?)
    } else {
        serde_json::from_reader(reader)?
    };
    tracing::info!(
        path = %path.display(),
        points = data.points.len(),
        posts = data.posts.len(),
        "Loaded route"
    );
    Ok(data)
}

/// Parse route contents given the format name (`gpx` or `json`)
pub fn read_route_from_str(contents: &str, format: &str) -> Result<TravelData> {
    match format.to_lowercase().as_str() {
        "gpx" => Ok(from_gpx(gpx::read(contents.as_bytes())?)),
        "json" => Ok(serde_json::from_str(contents)?),
        other => Err(MapError::UnsupportedFormat(other.to_string())),
    }
}

/// Track points keep their `<type>` as transport; waypoints become posts
fn from_gpx(data: gpx::Gpx) -> TravelData {
    let points = data
        .tracks
        .iter()
        .flat_map(|track| &track.segments)
        .flat_map(|segment| &segment.points)
        .map(|waypoint| {
            let point = waypoint.point();
            TrackPoint::new(point.y(), point.x(), waypoint.type_.as_deref())
        })
        .collect();

    let posts = data
        .waypoints
        .iter()
        .map(|waypoint| {
            let point = waypoint.point();
            Post {
                name: waypoint.name.clone().unwrap_or_default(),
                lat: point.y(),
                lon: point.x(),
                image_url: waypoint.links.first().map(|link| link.href.clone()),
            }
        })
        .collect();

    TravelData { points, posts }
}
