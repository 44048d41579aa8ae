//! Transport modes and their glyph lookup table

use std::fmt;
use std::str::FromStr;

/// Glyph used to represent a transport mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IconDef {
    /// Icon-font glyph name (without the `fa-` prefix)
    pub glyph_id: &'static str,
    /// Icon-font style (without the `fa-` prefix)
    pub glyph_style: &'static str,
}

const fn solid(glyph_id: &'static str) -> IconDef {
    IconDef {
        glyph_id,
        glyph_style: "solid",
    }
}

/// Closed set of transport modes understood by the map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TransportMode {
    Barefoot,
    Walking,
    Hiking,
    Running,
    Bicycle,
    Flight,
    Car,
    Bus,
    Taxi,
    Train,
    Tram,
    Motorbike,
    FourByFour,
    TukTuk,
    Hitchhiking,
    CableCar,
    Ferry,
    Motorboat,
    Sailing,
}

/// Transport mode → glyph table.
///
/// A mode without an entry here is still parsed, but is reported and never gets a glyph.
pub static TRANSPORT_ICONS: &[(TransportMode, IconDef)] = &[
    (TransportMode::Barefoot, solid("shoe-prints")),
    (TransportMode::Walking, solid("person-walking")),
    (TransportMode::Hiking, solid("person-hiking")),
    (TransportMode::Running, solid("person-running")),
    (TransportMode::Bicycle, solid("person-bicycle")),
    (TransportMode::Flight, solid("plane")),
    (TransportMode::Car, solid("car-side")),
    (TransportMode::Bus, solid("bus-simple")),
    (TransportMode::Taxi, solid("taxi")),
    (TransportMode::Train, solid("train")),
    (TransportMode::Tram, solid("tram")),
    (TransportMode::Motorbike, solid("motorcycle")),
    (TransportMode::FourByFour, solid("truck-pickup")),
    // TODO: switch to a dedicated rickshaw glyph once the icon font ships one
    (TransportMode::TukTuk, solid("car")),
    (TransportMode::Hitchhiking, solid("thumbs-up")),
    (TransportMode::CableCar, solid("cable-car")),
    (TransportMode::Ferry, solid("ferry")),
    (TransportMode::Motorboat, solid("ship")),
    (TransportMode::Sailing, solid("sailboat")),
];

impl TransportMode {
    pub const ALL: [TransportMode; 19] = [
        Self::Barefoot,
        Self::Walking,
        Self::Hiking,
        Self::Running,
        Self::Bicycle,
        Self::Flight,
        Self::Car,
        Self::Bus,
        Self::Taxi,
        Self::Train,
        Self::Tram,
        Self::Motorbike,
        Self::FourByFour,
        Self::TukTuk,
        Self::Hitchhiking,
        Self::CableCar,
        Self::Ferry,
        Self::Motorboat,
        Self::Sailing,
    ];

    /// Wire name of the mode, as found in route files
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Barefoot => "barefoot",
            Self::Walking => "walking",
            Self::Hiking => "hiking",
            Self::Running => "running",
            Self::Bicycle => "bicycle",
            Self::Flight => "flight",
            Self::Car => "car",
            Self::Bus => "bus",
            Self::Taxi => "taxi",
            Self::Train => "train",
            Self::Tram => "tram",
            Self::Motorbike => "motorbike",
            Self::FourByFour => "4x4",
            Self::TukTuk => "tuk_tuk",
            Self::Hitchhiking => "hitchhiking",
            Self::CableCar => "cable_car",
            Self::Ferry => "ferry",
            Self::Motorboat => "motorboat",
            Self::Sailing => "sailing",
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A string naming no transport mode
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown transport mode: {0}")]
pub struct UnknownTransportMode(pub String);

impl FromStr for TransportMode {
    type Err = UnknownTransportMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|mode| mode.as_str() == s)
            .ok_or(UnknownTransportMode(s))
    }
}

/// Look up the glyph of a transport mode
pub fn resolve_icon(mode: TransportMode) -> Option<&'static IconDef> {
    TRANSPORT_ICONS
        .iter()
        .find(|(m, _)| *m == mode)
        .map(|(_, icon)| icon)
}

/// Transport of a segment, as parsed from (possibly missing) input
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Transport {
    /// No transport given: the expected default, never reported
    #[default]
    Unknown,
    /// One of the known modes
    Mode(TransportMode),
    /// Input that does not name any known mode (lowercased)
    Undefined(String),
}

/// Outcome of resolving a transport to a glyph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// Nothing to draw and nothing to report
    Silent,
    /// The transport has no table entry and must be reported
    Missing(&'a str),
    /// Glyph to draw
    Icon(&'static IconDef),
}

impl Transport {
    /// The literal used for the sentinel
    pub const UNKNOWN: &'static str = "unknown";

    /// Parse an optional transport string (case-insensitive)
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::Unknown;
        };
        let lowered = raw.to_lowercase();
        if lowered == Self::UNKNOWN {
            return Self::Unknown;
        }
        match lowered.parse::<TransportMode>() {
            Ok(mode) => Self::Mode(mode),
            Err(UnknownTransportMode(name)) => Self::Undefined(name),
        }
    }

    /// Lowercase name of the transport
    pub fn as_str(&self) -> &str {
        match self {
            Self::Unknown => Self::UNKNOWN,
            Self::Mode(mode) => mode.as_str(),
            Self::Undefined(name) => name,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    pub fn resolve(&self) -> Resolution<'_> {
        match self {
            Self::Unknown => Resolution::Silent,
            Self::Mode(mode) => match resolve_icon(*mode) {
                Some(icon) => Resolution::Icon(icon),
                None => Resolution::Missing(mode.as_str()),
            },
            Self::Undefined(name) => Resolution::Missing(name),
        }
    }

    /// Tooltip label of the transport glyph
    pub fn label(&self) -> String {
        title_case(self.as_str())
    }
}

impl From<TransportMode> for Transport {
    fn from(mode: TransportMode) -> Self {
        Self::Mode(mode)
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lowercase the string, then uppercase each word character starting the string or
/// following whitespace. Underscores are word characters, not separators.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if at_word_start && (c.is_alphanumeric() || c == '_') {
            out.extend(c.to_uppercase());
        } else {
            out.extend(c.to_lowercase());
        }
        at_word_start = c.is_whitespace();
    }
    out
}
