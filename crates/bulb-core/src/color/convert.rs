//! Numeric color conversion: device HSV → RGB → Pd signed color.

/// Maximum hue the device reports; hue is normalised by this, not by 360.
pub const DEVICE_HUE_MAX: f64 = 359.0;

/// Maximum saturation and value the device reports.
pub const DEVICE_PERCENT_MAX: f64 = 100.0;

/// An 8-bit-per-channel RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Converts a device HSV color to RGB.
///
/// `h` is in `0..=359`, `s` and `v` in `0..=100`.  Each is normalised to the
/// unit range, run through the standard hexcone HSV → RGB conversion, and
/// every channel is scaled by 255 and **truncated** (not rounded).
///
/// # Example
///
/// ```rust
/// use bulb_core::color::{device_hsv_to_rgb, Rgb};
///
/// assert_eq!(device_hsv_to_rgb(0.0, 0.0, 100.0), Rgb::new(255, 255, 255));
/// ```
pub fn device_hsv_to_rgb(h: f64, s: f64, v: f64) -> Rgb {
    let (r, g, b) = hsv_to_rgb_unit(h / DEVICE_HUE_MAX, s / DEVICE_PERCENT_MAX, v / DEVICE_PERCENT_MAX);
    Rgb::new(to_channel(r), to_channel(g), to_channel(b))
}

/// Packs an RGB color into Pure Data's signed color integer.
///
/// The encoding is `-(r*65536 + g*256 + b) - 1`: black maps to `-1` and
/// white to `-16777216`.  The `- 1` bias keeps black distinct from `0`.
pub fn rgb_to_signed_color(rgb: Rgb) -> i32 {
    let packed = i32::from(rgb.r) * 65536 + i32::from(rgb.g) * 256 + i32::from(rgb.b);
    -packed - 1
}

/// Hexcone HSV → RGB on the unit cube.  Hue is cyclic; `h == 1.0` is red.
fn hsv_to_rgb_unit(h: f64, s: f64, v: f64) -> (f64, f64, f64) {
    if s == 0.0 {
        return (v, v, v);
    }
    let scaled = h * 6.0;
    let sector = scaled.trunc();
    let f = scaled - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    match (sector as i64).rem_euclid(6) {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    }
}

/// Scales a unit channel to `0..=255`, truncating toward zero.
///
/// Components outside the device ranges (hue above 359, sat or val outside
/// `0..=100`) can push a channel past the bounds.  Such channels saturate at
/// 0 or 255 instead of wrapping or going negative, so the packed signed color
/// always stays a valid 24-bit Pd color.
fn to_channel(unit: f64) -> u8 {
    (unit * 255.0) as u8
}
