//! Domain layer for bulb-bridge.
//!
//! Plain configuration types with no I/O.  The FUDI and device types live
//! in `bulb-core`; this layer only adds what the running bridge needs to know
//! about its own deployment.

pub mod config;

pub use config::{BridgeConfig, MockConfig, PeerConfig};
