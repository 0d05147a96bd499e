//! Device-side domain types.
//!
//! - [`DeviceRegistry`]: the static name → hardware id table from
//!   configuration.
//! - [`DeviceState`]: the last-observed state snapshot of one bulb.
//! - [`parse_response`]: unwraps the `{ "<hardware id>": { ...state... } }`
//!   envelope every device REST response arrives in.

pub mod registry;
pub mod state;

pub use registry::DeviceRegistry;
pub use state::{parse_response, DeviceState, ResponseError};
