//! Infrastructure layer for bulb-bridge.
//!
//! The infrastructure layer handles all I/O: the inbound FUDI listener, the
//! device HTTP calls and the outbound peer connections.
//!
//! # Responsibilities
//!
//! - Binding the inbound listener and spawning per-connection tasks
//! - Admission control and load shedding
//! - Implementing [`DeviceTransport`](crate::application::DeviceTransport)
//!   over `reqwest` and as a canned mock
//! - Implementing [`PeerNotifier`](crate::application::PeerNotifier) over TCP
//! - Reading the TOML configuration file
//!
//! # What does NOT belong here?
//!
//! - Statement dispatch and the handshake sequence (application layer)
//! - Color math and wire formats (`bulb-core`)

pub mod admission;
pub mod config_file;
pub mod http_transport;
pub mod mock_transport;
pub mod peer_notifier;
pub mod tcp_server;

pub use admission::{Admission, AdmissionError, Permit};
pub use http_transport::HttpTransport;
pub use mock_transport::MockTransport;
pub use peer_notifier::TcpPeerNotifier;
pub use tcp_server::BridgeServer;
