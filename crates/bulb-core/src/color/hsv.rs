//! The device's HSV triple string encoding.

use std::fmt;

use super::{device_hsv_to_rgb, ColorError, Rgb};

/// Separator between the components of the device's HSV string.
pub const COMPONENT_SEPARATOR: char = ';';

/// An HSV triple exactly as the device reports it.
///
/// Components are kept as the device's own text so that a value written back
/// (for example after changing only the hue) is byte-identical to what was
/// read.  Use [`HsvTriple::to_rgb`] for the numeric interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HsvTriple {
    /// Hue, `0..=359` on the device.
    pub hue: String,
    /// Saturation, `0..=100` on the device.
    pub sat: String,
    /// Value (brightness), `0..=100` on the device.
    pub val: String,
}

impl HsvTriple {
    /// Creates a triple from its three components.
    pub fn new(hue: impl Into<String>, sat: impl Into<String>, val: impl Into<String>) -> Self {
        Self {
            hue: hue.into(),
            sat: sat.into(),
            val: val.into(),
        }
    }

    /// Converts the triple to RGB using the device's value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ColorError::NotANumber`] if any component is not a decimal
    /// number.
    pub fn to_rgb(&self) -> Result<Rgb, ColorError> {
        let h = parse_component("hue", &self.hue)?;
        let s = parse_component("sat", &self.sat)?;
        let v = parse_component("val", &self.val)?;
        Ok(device_hsv_to_rgb(h, s, v))
    }
}

impl fmt::Display for HsvTriple {
    /// Formats the fully specified three-component form, `"h;s;v"`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{sep}{}{sep}{}",
            self.hue,
            self.sat,
            self.val,
            sep = COMPONENT_SEPARATOR
        )
    }
}

/// Splits a device color string into its hue, saturation and value.
///
/// - `"h;s;v"` → all three components as given.
/// - `"s;v"` → hue defaults to `"0"`.  The device reports white light this
///   way (low saturation, no hue).
/// - anything else → `"0"` for every component.
///
/// # Example
///
/// ```rust
/// use bulb_core::split_color;
///
/// let white = split_color("2;100");
/// assert_eq!((white.hue.as_str(), white.sat.as_str(), white.val.as_str()), ("0", "2", "100"));
/// ```
pub fn split_color(color: &str) -> HsvTriple {
    let parts: Vec<&str> = color.split(COMPONENT_SEPARATOR).collect();
    match parts.as_slice() {
        [h, s, v] => HsvTriple::new(*h, *s, *v),
        [s, v] => HsvTriple::new("0", *s, *v),
        _ => HsvTriple::new("0", "0", "0"),
    }
}

fn parse_component(component: &'static str, value: &str) -> Result<f64, ColorError> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| ColorError::NotANumber {
            component,
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_color_three_components() {
        let hsv = split_color("123;45;6");
        assert_eq!(hsv, HsvTriple::new("123", "45", "6"));
    }

    #[test]
    fn test_split_color_two_components_defaults_hue_to_zero() {
        let hsv = split_color("2;100");
        assert_eq!(hsv, HsvTriple::new("0", "2", "100"));
    }

    #[test]
    fn test_split_color_single_component_is_all_zero() {
        assert_eq!(split_color("42"), HsvTriple::new("0", "0", "0"));
    }

    #[test]
    fn test_split_color_four_components_is_all_zero() {
        assert_eq!(split_color("1;2;3;4"), HsvTriple::new("0", "0", "0"));
    }

    #[test]
    fn test_display_joins_with_semicolons() {
        let hsv = HsvTriple::new("99", "34", "56");
        assert_eq!(hsv.to_string(), "99;34;56");
    }

    #[test]
    fn test_display_of_two_component_form_is_expanded() {
        // White written back always carries an explicit hue.
        assert_eq!(split_color("2;100").to_string(), "0;2;100");
    }

    #[test]
    fn test_to_rgb_white() {
        let rgb = split_color("0;0;100").to_rgb().unwrap();
        assert_eq!(rgb, Rgb::new(255, 255, 255));
    }

    #[test]
    fn test_to_rgb_rejects_non_numeric_component() {
        let err = HsvTriple::new("x", "1", "2").to_rgb().unwrap_err();
        assert_eq!(
            err,
            ColorError::NotANumber {
                component: "hue",
                value: "x".to_string()
            }
        );
    }

    #[test]
    fn test_to_rgb_accepts_decimal_components() {
        let rgb = HsvTriple::new("0.0", "0.0", "100.0").to_rgb().unwrap();
        assert_eq!(rgb, Rgb::new(255, 255, 255));
    }
}
