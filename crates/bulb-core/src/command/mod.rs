//! Command translation: FUDI command + cached state → device request payload.
//!
//! Pd sends commands of the form `<device> <symbol> <arg>`, for example
//! `mitte hue 42`.  The symbol is resolved once into a [`Command`]; the
//! command is then turned into a [`RequestPayload`] for the device's REST
//! endpoint.  Color commands change a single HSV component, so they need the
//! device's last-known color to fill in the other two.

pub mod payload;

use thiserror::Error;
use tracing::debug;

use crate::color::HsvTriple;
use crate::device::DeviceState;

pub use payload::RequestPayload;

/// Errors produced while translating a command.
#[derive(Debug, Error, PartialEq)]
pub enum TranslateError {
    /// A color command arrived for a device with no cached state.
    #[error("no known state for device {0:?}; poll it first")]
    UnknownDevice(String),

    /// The command symbol is not one of `on`, `hue`, `sat`, `val`.
    #[error("unknown command {0:?}")]
    UnknownCommand(String),

    /// `on` was given something other than 0 or 1.
    #[error("unknown value for on: {0}")]
    UnknownOnValue(i64),

    /// The argument is not a decimal number.
    #[error("argument is not a number: {0:?}")]
    InvalidArgument(String),
}

/// A command resolved from its FUDI symbol.
///
/// Color components carry the integer the device should receive.  No range
/// check is applied; the device rejects values it cannot use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `on 0` / `on 1`.
    On(bool),
    /// Replace the hue component.
    Hue(i64),
    /// Replace the saturation component.
    Sat(i64),
    /// Replace the value component.
    Val(i64),
}

impl Command {
    /// Resolves a command symbol and its raw argument.
    ///
    /// The argument is parsed as a decimal number and truncated toward zero,
    /// so Pd float atoms such as `42.0` or `0.9` are accepted.
    ///
    /// # Errors
    ///
    /// - [`TranslateError::InvalidArgument`] if `raw_arg` is not a number.
    /// - [`TranslateError::UnknownCommand`] for an unrecognised symbol.
    /// - [`TranslateError::UnknownOnValue`] if `on` is given neither 0 nor 1.
    pub fn parse(symbol: &str, raw_arg: &str) -> Result<Self, TranslateError> {
        let x = parse_integer(raw_arg)?;
        match symbol {
            "on" => match x {
                0 => Ok(Command::On(false)),
                1 => Ok(Command::On(true)),
                other => Err(TranslateError::UnknownOnValue(other)),
            },
            "hue" => Ok(Command::Hue(x)),
            "sat" => Ok(Command::Sat(x)),
            "val" => Ok(Command::Val(x)),
            other => Err(TranslateError::UnknownCommand(other.to_string())),
        }
    }

    /// Builds the request payload for `device` given its cached state.
    ///
    /// # Errors
    ///
    /// Returns [`TranslateError::UnknownDevice`] if this is a color command
    /// and `cached` is `None`.
    pub fn to_payload(
        &self,
        device: &str,
        cached: Option<&DeviceState>,
    ) -> Result<RequestPayload, TranslateError> {
        match *self {
            Command::On(on) => Ok(RequestPayload::action(on)),
            Command::Hue(x) => recolor(device, cached, |hsv| hsv.hue = x.to_string()),
            Command::Sat(x) => recolor(device, cached, |hsv| hsv.sat = x.to_string()),
            Command::Val(x) => recolor(device, cached, |hsv| hsv.val = x.to_string()),
        }
    }
}

/// Translates one FUDI command into a device request payload.
///
/// Convenience wrapper around [`Command::parse`] and [`Command::to_payload`].
///
/// # Example
///
/// ```rust
/// use bulb_core::{translate, DeviceState};
///
/// let cached = DeviceState::new(true, "12;34;56");
/// let payload = translate("mitte", "hue", "99", Some(&cached)).unwrap();
/// assert_eq!(payload.get("color"), Some("99;34;56"));
/// ```
pub fn translate(
    device: &str,
    symbol: &str,
    raw_arg: &str,
    cached: Option<&DeviceState>,
) -> Result<RequestPayload, TranslateError> {
    let command = Command::parse(symbol, raw_arg)?;
    let payload = command.to_payload(device, cached)?;
    debug!("translated {device} {symbol} {raw_arg} → {payload}");
    Ok(payload)
}

/// `int(float(x))`: parse a decimal, truncate toward zero.
fn parse_integer(raw: &str) -> Result<i64, TranslateError> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| TranslateError::InvalidArgument(raw.to_string()))?;
    if !value.is_finite() {
        return Err(TranslateError::InvalidArgument(raw.to_string()));
    }
    Ok(value.trunc() as i64)
}

/// Applies `edit` to the cached color of `device`.
fn recolor(
    device: &str,
    cached: Option<&DeviceState>,
    edit: impl FnOnce(&mut HsvTriple),
) -> Result<RequestPayload, TranslateError> {
    let mut hsv = cached
        .map(DeviceState::hsv)
        .ok_or_else(|| TranslateError::UnknownDevice(device.to_string()))?;
    edit(&mut hsv);
    Ok(RequestPayload::color(&hsv))
}
