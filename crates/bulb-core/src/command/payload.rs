//! Device request payloads and their form encoding.

use std::fmt;

use url::form_urlencoded::byte_serialize;

use crate::color::HsvTriple;

/// Character the device expects verbatim in a form body.
const UNESCAPED: &str = ";";

/// An ordered set of form fields sent in a device `POST`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestPayload {
    fields: Vec<(String, String)>,
}

impl RequestPayload {
    /// `action=on` or `action=off`.
    pub fn action(on: bool) -> Self {
        Self::single("action", if on { "on" } else { "off" })
    }

    /// `color=<h;s;v>`.
    pub fn color(hsv: &HsvTriple) -> Self {
        Self::single("color", hsv.to_string())
    }

    fn single(key: &str, value: impl Into<String>) -> Self {
        Self {
            fields: vec![(key.to_string(), value.into())],
        }
    }

    /// Returns the value of field `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Encodes the payload as `application/x-www-form-urlencoded`.
    ///
    /// Every field is percent-encoded except `;`, which the device's HSV
    /// parser requires literally: `color=90;80;70`, not `color=90%3B80%3B70`.
    pub fn to_form_body(&self) -> String {
        self.fields
            .iter()
            .map(|(k, v)| format!("{}={}", encode_keep_semicolons(k), encode_keep_semicolons(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl fmt::Display for RequestPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (k, v)) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{k}: {v}")?;
        }
        f.write_str("}")
    }
}

fn encode_keep_semicolons(text: &str) -> String {
    text.split(UNESCAPED)
        .map(|segment| byte_serialize(segment.as_bytes()).collect::<String>())
        .collect::<Vec<_>>()
        .join(UNESCAPED)
}
