//! Color handling for the bulb bridge.
//!
//! Two color encodings meet here:
//!
//! - **Device side**: an HSV triple string such as `"90;80;70"` with hue in
//!   `0..=359` and saturation/value in `0..=100`.  White light is reported in
//!   the two-component form `"<sat>;<val>"` without a hue.
//! - **Pd side**: a single packed integer, `-(r*65536 + g*256 + b) - 1`, the
//!   convention Pure Data uses for the color inlets of its GUI objects.

pub mod convert;
pub mod hsv;

use thiserror::Error;

pub use convert::{device_hsv_to_rgb, rgb_to_signed_color, Rgb};
pub use hsv::{split_color, HsvTriple};

/// Errors produced while interpreting an HSV triple.
#[derive(Debug, Error, PartialEq)]
pub enum ColorError {
    /// A component of the triple is not a decimal number.
    #[error("HSV component {component} is not a number: {value:?}")]
    NotANumber {
        /// Which component failed (`"hue"`, `"sat"` or `"val"`).
        component: &'static str,
        /// The offending text.
        value: String,
    },
}
