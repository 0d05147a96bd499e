//! Reply encoding: device state → FUDI block for Pd's `[netreceive]`.

use crate::color::{rgb_to_signed_color, ColorError};
use crate::device::DeviceState;

/// Sentinel closing every reply block.
pub const END_OF_REPLY: &str = "eof";

/// Encodes a device state snapshot as a FUDI reply block.
///
/// The block alternates key and value lines in a fixed order and ends with
/// `eof;`.  Every line is terminated by `;` and a line break:
///
/// ```text
/// bulb;
/// <device>;
/// on;
/// <0|1>;
/// hue;
/// <h>;
/// sat;
/// <s>;
/// val;
/// <v>;
/// rgb;
/// <signed color>;
/// eof;
/// ```
///
/// The Pd patch routes on the key lines, so the order and spelling are part
/// of the wire format.
///
/// # Errors
///
/// Returns [`ColorError`] if the state's color has a non-numeric component.
pub fn encode_reply(device: &str, state: &DeviceState) -> Result<String, ColorError> {
    let hsv = state.hsv();
    let rgb = rgb_to_signed_color(hsv.to_rgb()?).to_string();
    let on = if state.on { "1" } else { "0" };

    let fields: [(&str, &str); 6] = [
        ("bulb", device),
        ("on", on),
        ("hue", &hsv.hue),
        ("sat", &hsv.sat),
        ("val", &hsv.val),
        ("rgb", &rgb),
    ];

    let mut block = String::with_capacity(128);
    for (key, value) in fields {
        block.push_str(&format!("{key};\n{value};\n"));
    }
    block.push_str(END_OF_REPLY);
    block.push_str(";\n");
    Ok(block)
}
