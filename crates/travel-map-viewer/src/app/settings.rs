use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
/// Travel Map Viewer - Interactive map of a trip with transport glyphs and posts
pub struct Settings {
    /// Route file to load on startup (.gpx or .json)
    #[clap(short, long, value_name = "FILE")]
    pub route: Option<PathBuf>,

    /// Only show the glyphs of flights
    #[clap(long, default_value = "false")]
    pub show_only_flight_icons: bool,

    /// A transport glyph shows once its path is larger than this many glyph sizes on screen
    #[clap(long, default_value = "2.0")]
    pub size_factor: f64,

    /// Path line width in pixels
    #[clap(long, default_value = "3.0")]
    pub line_width: f64,

    /// Ignore previously persisted state and start fresh
    #[clap(long, default_value = "false")]
    pub ignore_persisted: bool,
}

impl Settings {
    /// Parse the command line, exiting with a usage message on errors
    pub fn from_cli() -> Self {
        match Self::try_parse() {
            Ok(settings) => settings,
            Err(e) => e.exit(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::parse_from(["travel-map-viewer"]);
        assert!(settings.route.is_none());
        assert!(!settings.show_only_flight_icons);
        assert_eq!(settings.size_factor, 2.0);
        assert_eq!(settings.line_width, 3.0);
    }

    #[test]
    fn test_route_and_flags() {
        let settings = Settings::parse_from([
            "travel-map-viewer",
            "--route",
            "trip.gpx",
            "--show-only-flight-icons",
            "--size-factor",
            "3",
        ]);
        assert_eq!(settings.route, Some(PathBuf::from("trip.gpx")));
        assert!(settings.show_only_flight_icons);
        assert_eq!(settings.size_factor, 3.0);
    }
}
