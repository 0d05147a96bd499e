//! Device state snapshots and response unwrapping.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::color::{split_color, HsvTriple};

/// Errors produced while unwrapping a device's JSON response.
#[derive(Debug, Error)]
pub enum ResponseError {
    /// The body is not valid JSON.
    #[error("response is not valid JSON: {0}")]
    Json(#[source] serde_json::Error),

    /// The body is JSON but not an object.
    #[error("response is not a JSON object")]
    NotAnObject,

    /// The object has no entry for the device's hardware id.
    #[error("response has no entry for hardware id {0}")]
    MissingKey(String),

    /// The state map lacks a required field or a field has the wrong type.
    #[error("malformed state map: {0}")]
    InvalidState(#[source] serde_json::Error),
}

/// Last-observed state of one device.
///
/// `on` and `color` are present in every response the device sends (both
/// to `GET` and `POST`).  `power` and `reachable` only appear in full state
/// dumps.  Every other field is carried through unchanged in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceState {
    /// Whether the bulb is switched on.
    pub on: bool,
    /// HSV triple string, see [`split_color`].
    pub color: String,
    /// Current power draw in watts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power: Option<f64>,
    /// Whether the bulb is reachable from its mesh root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reachable: Option<bool>,
    /// Remaining fields (`mode`, `ramp`, `fw_version`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DeviceState {
    /// Creates a snapshot with only the required fields set.
    pub fn new(on: bool, color: impl Into<String>) -> Self {
        Self {
            on,
            color: color.into(),
            power: None,
            reachable: None,
            extra: Map::new(),
        }
    }

    /// The color split into its components.
    pub fn hsv(&self) -> HsvTriple {
        split_color(&self.color)
    }
}

/// Unwraps a device response body into the state of `hardware_id`.
///
/// The device answers every request with a single-entry object keyed by its
/// own hardware id:
///
/// ```json
/// { "5CCF7FA0CA06": { "on": true, "color": "90;80;70", "mode": "hsv" } }
/// ```
///
/// # Errors
///
/// Returns [`ResponseError`] if the body is not JSON, is not an object, has no
/// entry for `hardware_id`, or the entry is not a valid state map.
pub fn parse_response(body: &str, hardware_id: &str) -> Result<DeviceState, ResponseError> {
    let value: Value = serde_json::from_str(body).map_err(ResponseError::Json)?;
    let mut envelope = match value {
        Value::Object(map) => map,
        _ => return Err(ResponseError::NotAnObject),
    };
    let state = envelope
        .remove(hardware_id)
        .ok_or_else(|| ResponseError::MissingKey(hardware_id.to_string()))?;
    serde_json::from_value(state).map_err(ResponseError::InvalidState)
}
