//! Application layer for bulb-bridge.
//!
//! The application layer knows *what* happens to a FUDI statement; it
//! delegates *how* bytes reach a device or a peer to the port traits in
//! [`ports`], which the infrastructure layer implements.
//!
//! # Responsibilities
//!
//! - Holding the last-known state of every device ([`DeviceClient`])
//! - Dispatching statements in payload order ([`BridgeService`])
//! - Running the `peer_ip` handshake and its fallback ([`announce_peer`])
//!
//! # What does NOT belong here?
//!
//! - Opening sockets, serving HTTP, admission control (infrastructure)
//! - Color math and wire encoding (`bulb-core`)

pub mod bridge_service;
pub mod device_client;
pub mod handshake;
pub mod ports;

pub use bridge_service::{BridgeService, DispatchError, Dispatched, PeerRouting};
pub use device_client::DeviceClient;
pub use handshake::{announce_peer, HandshakeOutcome};
pub use ports::{DeviceError, DeviceTarget, DeviceTransport, NotifyError, PeerNotifier, PeerTarget};
