//! # bulb-core
//!
//! Pure translation logic for the bulb bridge: everything that turns a FUDI
//! statement from Pure Data into a device REST payload, and a device JSON
//! reply back into FUDI lines.
//!
//! This crate performs no I/O and has no async runtime dependency.  The
//! `bulb-bridge` crate owns the sockets, the HTTP client and the shared
//! device-state cache; it calls into this crate for every conversion.
//!
//! # Modules
//!
//! - **`color`** – HSV triple parsing and the HSV → RGB → Pd signed color
//!   conversion.
//! - **`device`** – the static device registry, the device state snapshot and
//!   unwrapping of the device's JSON response envelope.
//! - **`command`** – the `on`/`hue`/`sat`/`val` commands and their translation
//!   into form-encoded request payloads.
//! - **`protocol`** – the FUDI side: splitting inbound payloads into
//!   statements, and encoding replies and control messages.

pub mod color;
pub mod command;
pub mod device;
pub mod protocol;

pub use color::{device_hsv_to_rgb, rgb_to_signed_color, split_color, HsvTriple};
pub use command::{translate, Command, RequestPayload, TranslateError};
pub use device::{DeviceRegistry, DeviceState, ResponseError};
pub use protocol::{encode_reply, parse_payload, Statement};
