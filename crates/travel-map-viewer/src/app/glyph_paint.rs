//! Painting glyph descriptions with the egui painter
//!
//! Icon-font glyph names are drawn with the closest symbol available in egui's bundled fonts.

use egui::{Align2, Color32, FontId, Painter, Pos2, Rect, Stroke, StrokeKind, Vec2};
use travel_map_lib::{Glyph, IconShape, Marker};

/// Corner radius of rounded squares, relative to their side
const ROUNDED_CORNER_RATIO: f32 = 0.2;

/// Parse a CSS color (`#rgb`, `#rrggbb`, `#rrggbbaa` or a common color name).
/// `unset`, `none` and `transparent` mean "do not paint".
pub fn parse_color(css: &str) -> Option<Color32> {
    let css = css.trim().to_lowercase();
    if let Some(hex) = css.strip_prefix('#') {
        return parse_hex(hex);
    }
    let rgb = match css.as_str() {
        "white" => (255, 255, 255),
        "black" => (0, 0, 0),
        "red" => (255, 0, 0),
        "green" => (0, 128, 0),
        "lime" => (0, 255, 0),
        "blue" => (0, 0, 255),
        "navy" => (0, 0, 128),
        "yellow" => (255, 255, 0),
        "orange" => (255, 165, 0),
        "purple" => (128, 0, 128),
        "gray" | "grey" => (128, 128, 128),
        "indianred" => (205, 92, 92),
        "goldenrod" => (218, 165, 32),
        "steelblue" => (70, 130, 180),
        _ => return None,
    };
    Some(Color32::from_rgb(rgb.0, rgb.1, rgb.2))
}

fn parse_hex(hex: &str) -> Option<Color32> {
    let channel = |i: usize, len: usize| u8::from_str_radix(hex.get(i..i + len)?, 16).ok();
    match hex.len() {
        3 => {
            let [r, g, b] = [0, 1, 2].map(|i| channel(i, 1).map(|v| v * 17));
            Some(Color32::from_rgb(r?, g?, b?))
        }
        6 => Some(Color32::from_rgb(channel(0, 2)?, channel(2, 2)?, channel(4, 2)?)),
        8 => Some(Color32::from_rgba_unmultiplied(
            channel(0, 2)?,
            channel(2, 2)?,
            channel(4, 2)?,
            channel(6, 2)?,
        )),
        _ => None,
    }
}

/// Closest bundled symbol for an icon-font glyph name
fn glyph_symbol(glyph_id: &str) -> &'static str {
    match glyph_id.trim_start_matches("fa-") {
        "plane" => "✈",
        "car" | "car-side" => "🚗",
        "bus" | "bus-simple" => "🚌",
        "taxi" => "🚕",
        "train" => "🚆",
        "tram" => "🚋",
        "motorcycle" => "🏍",
        "truck-pickup" => "🚙",
        "thumbs-up" => "👍",
        "cable-car" => "🚡",
        "ferry" | "ship" => "🚢",
        "sailboat" => "⛵",
        "person-bicycle" => "🚲",
        "person-walking" | "person-hiking" => "🚶",
        "person-running" => "🏃",
        "shoe-prints" => "👣",
        "house" => "🏠",
        "flag-checkered" => "🏁",
        _ => "●",
    }
}

/// Screen rectangle of a marker anchored at `anchor_pos`
pub fn marker_rect(marker: &Marker, anchor_pos: Pos2) -> Rect {
    let anchor = marker.glyph.anchor();
    let size = marker.glyph.size_px() as f32;
    Rect::from_min_size(
        anchor_pos - Vec2::new(anchor.x as f32, anchor.y as f32),
        Vec2::splat(size),
    )
}

/// Paint a marker's glyph at `anchor_pos`, returning the painted rectangle
pub fn paint_marker(painter: &Painter, marker: &Marker, anchor_pos: Pos2) -> Rect {
    let rect = marker_rect(marker, anchor_pos);
    let glyph = &marker.glyph;
    let fill = parse_color(glyph.background_color()).unwrap_or(Color32::TRANSPARENT);
    let stroke = glyph
        .border()
        .and_then(|border| Some(Stroke::new(border.width_px as f32, parse_color(border.color)?)))
        .unwrap_or(Stroke::NONE);

    match glyph.shape() {
        IconShape::Circle => {
            let radius = rect.width() / 2.0;
            painter.circle(rect.center(), radius, fill, stroke);
        }
        shape => {
            let corner = if shape == IconShape::RoundedSquare {
                rect.width() * ROUNDED_CORNER_RATIO
            } else {
                0.0
            };
            painter.rect_filled(rect, corner, fill);
            painter.rect_stroke(rect, corner, stroke, StrokeKind::Inside);
        }
    }

    let symbol = match glyph {
        Glyph::Icon(options) => Some((
            glyph_symbol(&options.glyph_id),
            options.font_size_px as f32,
            parse_color(&options.foreground_color).unwrap_or(Color32::WHITE),
        )),
        Glyph::Image(options) if options.image_url.is_some() => {
            Some(("📷", rect.width() * 0.5, Color32::WHITE))
        }
        Glyph::Image(_) => None,
    };
    if let Some((text, font_size, color)) = symbol {
        painter.text(
            rect.center(),
            Align2::CENTER_CENTER,
            text,
            FontId::proportional(font_size.min(rect.width() * 0.75)),
            color,
        );
    }
    rect
}

/// Paint a small tooltip box next to the pointer
pub fn paint_tooltip(painter: &Painter, pointer: Pos2, text: &str) {
    let galley = painter.layout_no_wrap(
        text.to_string(),
        FontId::proportional(13.0),
        Color32::from_gray(230),
    );
    let padding = Vec2::new(6.0, 4.0);
    let rect = Rect::from_min_size(
        pointer + Vec2::new(12.0, 12.0),
        galley.size() + 2.0 * padding,
    );
    painter.rect_filled(rect, 4.0, Color32::from_black_alpha(200));
    painter.galley(rect.min + padding, galley, Color32::from_gray(230));
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Coord;
    use travel_map_lib::{GlyphOptions, PostIconOptions};

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("#3388ff"), Some(Color32::from_rgb(0x33, 0x88, 0xff)));
        assert_eq!(parse_color("#fff"), Some(Color32::WHITE));
        assert_eq!(parse_color(" IndianRed "), Some(Color32::from_rgb(205, 92, 92)));
        assert_eq!(parse_color("unset"), None);
        assert_eq!(parse_color("#12"), None);
        assert_eq!(parse_color("#zzzzzz"), None);
    }

    #[test]
    fn test_glyph_symbols() {
        assert_eq!(glyph_symbol("plane"), "✈");
        assert_eq!(glyph_symbol("fa-house"), "🏠");
        assert_eq!(glyph_symbol("unheard-of"), "●");
    }

    #[test]
    fn test_marker_rect_is_centered() {
        let origin = Coord { x: 0.0, y: 0.0 };
        let icon = Marker::new(origin, Glyph::icon(GlyphOptions::default()));
        let rect = marker_rect(&icon, Pos2::new(100.0, 50.0));
        assert_eq!(rect.center(), Pos2::new(100.0, 50.0));
        assert_eq!(rect.width(), 32.0);

        let empty_post = Marker::new(origin, Glyph::post(PostIconOptions::default()));
        assert_eq!(marker_rect(&empty_post, Pos2::ZERO).width(), 16.0);
    }
}
