//! Print units. The base unit is the typographic point (1/72 inch).

pub const PT: f64 = 1.0;

/// Points per inch
pub const INCH: f64 = 72.0 * PT;

/// Points per millimeter
pub const MM: f64 = INCH / 25.4;

/// Points per centimeter
pub const CM: f64 = 10.0 * MM;

/// Convert `size` millimeters to points
pub fn mm(size: f64) -> f64 {
    size * MM
}

/// Convert a size in points to whole pixels at the given resolution
pub fn to_px(size: f64, dpi: u32) -> f64 {
    (f64::from(dpi) / INCH * size).round()
}
