//! Glyph descriptions and the marker store
//!
//! A [`Glyph`] is a square visual anchored at its own center: either an icon-font glyph
//! or an image (a "post" picture). The crate never draws glyphs itself, the host does.

use geo::Coord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Outline of a glyph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IconShape {
    #[default]
    Circle,
    RoundedSquare,
    Square,
}

impl IconShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Circle => "circle",
            Self::RoundedSquare => "rounded-square",
            Self::Square => "square",
        }
    }
}

/// Options of an icon-font glyph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlyphOptions {
    pub glyph_id: String,
    pub glyph_style: String,
    /// Extra class for the inner glyph element
    pub glyph_class_name: Option<String>,
    pub shape: IconShape,
    pub size_px: f64,
    pub background_color: String,
    pub border_color: String,
    pub border_width_px: f64,
    pub border_style: String,
    /// Extra class for the glyph container
    pub class_name: Option<String>,
    pub foreground_color: String,
    pub font_size_px: f64,
}

impl Default for GlyphOptions {
    fn default() -> Self {
        Self {
            glyph_id: "leaf".to_string(),
            glyph_style: "solid".to_string(),
            glyph_class_name: None,
            shape: IconShape::Circle,
            size_px: 32.0,
            background_color: "#3388ff".to_string(),
            border_color: "white".to_string(),
            border_width_px: 2.0,
            border_style: "solid".to_string(),
            class_name: None,
            foreground_color: "white".to_string(),
            font_size_px: 18.0,
        }
    }
}

/// Options of an image glyph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostIconOptions {
    pub image_url: Option<String>,
    pub shape: IconShape,
    /// Size when an image is set
    pub size_px: f64,
    /// Size of the plain placeholder when there is no image
    pub empty_size_px: f64,
    pub background_color: String,
    pub border_color: String,
    pub border_width_px: f64,
    pub border_style: String,
    pub class_name: Option<String>,
}

impl Default for PostIconOptions {
    fn default() -> Self {
        Self {
            image_url: None,
            shape: IconShape::Circle,
            size_px: 32.0,
            empty_size_px: 16.0,
            background_color: "#3388ff".to_string(),
            border_color: "white".to_string(),
            border_width_px: 2.0,
            border_style: "solid".to_string(),
            class_name: None,
        }
    }
}

/// Border of a glyph, present only when fully specified
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Border<'a> {
    pub color: &'a str,
    pub style: &'a str,
    pub width_px: f64,
}

/// Visual handle of a marker
#[derive(Debug, Clone, PartialEq)]
pub enum Glyph {
    Icon(GlyphOptions),
    Image(PostIconOptions),
}

/// Create an icon-font glyph
pub fn create_glyph(options: GlyphOptions) -> Glyph {
    Glyph::Icon(options)
}

fn with_prefix(name: &str) -> String {
    if name.starts_with("fa-") {
        name.to_string()
    } else {
        format!("fa-{name}")
    }
}

fn border<'a>(color: &'a str, style: &'a str, width_px: f64) -> Option<Border<'a>> {
    (!color.is_empty() && !style.is_empty() && width_px > 0.0).then_some(Border {
        color,
        style,
        width_px,
    })
}

impl Glyph {
    pub fn icon(options: GlyphOptions) -> Self {
        Self::Icon(options)
    }

    pub fn post(options: PostIconOptions) -> Self {
        Self::Image(options)
    }

    /// Side of the square glyph in pixels
    pub fn size_px(&self) -> f64 {
        match self {
            Self::Icon(options) => options.size_px,
            Self::Image(options) if options.image_url.is_some() => options.size_px,
            Self::Image(options) => options.empty_size_px,
        }
    }

    /// Offset of the anchor from the top-left corner (the center)
    pub fn anchor(&self) -> Coord<f64> {
        let half = self.size_px() / 2.0;
        Coord { x: half, y: half }
    }

    pub fn shape(&self) -> IconShape {
        match self {
            Self::Icon(options) => options.shape,
            Self::Image(options) => options.shape,
        }
    }

    pub fn background_color(&self) -> &str {
        match self {
            Self::Icon(options) => &options.background_color,
            Self::Image(options) => &options.background_color,
        }
    }

    pub fn border(&self) -> Option<Border<'_>> {
        match self {
            Self::Icon(o) => border(&o.border_color, &o.border_style, o.border_width_px),
            Self::Image(o) => border(&o.border_color, &o.border_style, o.border_width_px),
        }
    }

    /// Class list of the glyph container
    pub fn container_classes(&self) -> String {
        let (kind, shape, extra) = match self {
            Self::Icon(o) => ("fa-marker-icon", o.shape, o.class_name.as_deref()),
            Self::Image(o) => ("post-icon", o.shape, o.class_name.as_deref()),
        };
        let mut classes = format!("travel-marker-icon {kind} {}", shape.as_str());
        if let Some(extra) = extra.filter(|c| !c.is_empty()) {
            classes.push(' ');
            classes.push_str(extra);
        }
        classes
    }

    /// Class list of the inner icon-font element (`fa-solid fa-plane`)
    pub fn glyph_classes(&self) -> Option<String> {
        let Self::Icon(options) = self else {
            return None;
        };
        let mut classes = format!(
            "{} {}",
            with_prefix(&options.glyph_style),
            with_prefix(&options.glyph_id)
        );
        if let Some(extra) = options.glyph_class_name.as_deref().filter(|c| !c.is_empty()) {
            classes.push(' ');
            classes.push_str(extra);
        }
        Some(classes)
    }
}

/// Identifier of a marker inside a [`MarkerPane`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerId(u64);

/// A glyph placed at a geographic position (`x` = longitude, `y` = latitude)
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub position: Coord<f64>,
    pub glyph: Glyph,
    pub tooltip: Option<String>,
    pub z_index_offset: i32,
}

impl Marker {
    pub fn new(position: Coord<f64>, glyph: Glyph) -> Self {
        Self {
            position,
            glyph,
            tooltip: None,
            z_index_offset: 0,
        }
    }

    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }

    pub fn with_z_index_offset(mut self, z_index_offset: i32) -> Self {
        self.z_index_offset = z_index_offset;
        self
    }
}

/// Markers currently on a map
#[derive(Debug, Default)]
pub struct MarkerPane {
    next_id: u64,
    markers: BTreeMap<MarkerId, Marker>,
}

impl MarkerPane {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, marker: Marker) -> MarkerId {
        let id = MarkerId(self.next_id);
        self.next_id += 1;
        self.markers.insert(id, marker);
        id
    }

    pub fn remove(&mut self, id: MarkerId) -> Option<Marker> {
        self.markers.remove(&id)
    }

    pub fn get(&self, id: MarkerId) -> Option<&Marker> {
        self.markers.get(&id)
    }

    pub fn get_mut(&mut self, id: MarkerId) -> Option<&mut Marker> {
        self.markers.get_mut(&id)
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Markers in paint order: lowest z-index offset first, then insertion order
    pub fn iter(&self) -> impl Iterator<Item = (MarkerId, &Marker)> {
        let mut markers: Vec<_> = self.markers.iter().map(|(id, m)| (*id, m)).collect();
        markers.sort_by_key(|(id, m)| (m.z_index_offset, *id));
        markers.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_icon_classes() {
        let glyph = Glyph::icon(GlyphOptions {
            glyph_id: "plane".to_string(),
            ..Default::default()
        });
        assert_eq!(glyph.glyph_classes().as_deref(), Some("fa-solid fa-plane"));
        assert_eq!(
            glyph.container_classes(),
            "travel-marker-icon fa-marker-icon circle"
        );
    }

    #[test]
    fn test_prefixed_names_are_kept() {
        let glyph = Glyph::icon(GlyphOptions {
            glyph_id: "fa-house".to_string(),
            glyph_style: "fa-regular".to_string(),
            glyph_class_name: Some("fa-beat".to_string()),
            ..Default::default()
        });
        assert_eq!(
            glyph.glyph_classes().as_deref(),
            Some("fa-regular fa-house fa-beat")
        );
    }

    #[test]
    fn test_post_size_depends_on_image() {
        let empty = Glyph::post(PostIconOptions::default());
        assert_eq!(empty.size_px(), 16.0);
        assert_eq!(empty.anchor(), Coord { x: 8.0, y: 8.0 });
        assert!(empty.glyph_classes().is_none());

        let with_image = Glyph::post(PostIconOptions {
            image_url: Some("berlin.jpg".to_string()),
            ..Default::default()
        });
        assert_eq!(with_image.size_px(), 32.0);
        assert_eq!(with_image.container_classes(), "travel-marker-icon post-icon circle");
    }

    #[test]
    fn test_border_requires_width() {
        let mut options = GlyphOptions::default();
        assert!(Glyph::icon(options.clone()).border().is_some());
        options.border_width_px = 0.0;
        assert!(Glyph::icon(options).border().is_none());
    }

    #[test]
    fn test_shape_serde_names() {
        let shape: IconShape = serde_json::from_str("\"rounded-square\"").unwrap();
        assert_eq!(shape, IconShape::RoundedSquare);
        assert_eq!(shape.as_str(), "rounded-square");
    }

    #[test]
    fn test_marker_pane_paint_order() {
        let mut pane = MarkerPane::new();
        let origin = Coord { x: 0.0, y: 0.0 };
        let top = pane.add(Marker::new(origin, create_glyph(Default::default())).with_z_index_offset(1500));
        let bottom = pane.add(Marker::new(origin, create_glyph(Default::default())));
        let order: Vec<_> = pane.iter().map(|(id, _)| id).collect();
        assert_eq!(order, vec![bottom, top]);

        assert!(pane.remove(top).is_some());
        assert!(pane.remove(top).is_none());
        assert_eq!(pane.len(), 1);
    }
}
