//! bulb-bridge library crate.
//!
//! A bidirectional bridge between a Pure Data patch and REST-controlled smart
//! bulbs.  Pd sends FUDI statements over TCP; the bridge turns them into
//! device REST calls and pushes each device's new state back to Pd as a FUDI
//! block on a separate outbound connection.
//!
//! # Architecture
//!
//! ```text
//! Pd [netsend]  (FUDI over TCP, port 8081)
//!         ↓
//! [bulb-bridge]
//!   ├── domain/           BridgeConfig
//!   ├── application/      DeviceClient + state cache, statement dispatch,
//!   │                     peer_ip handshake, port traits
//!   └── infrastructure/
//!         ├── tcp_server/     accept loop, admission control
//!         ├── http_transport/ reqwest device transport
//!         ├── mock_transport/ canned-snapshot device transport
//!         ├── peer_notifier/  one TCP connection per outbound message
//!         └── config_file/    TOML configuration
//!         ↓                       ↑
//! bulbs (HTTP REST)      Pd [netreceive]  (FUDI over TCP)
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no I/O.
//! - `application` depends on `domain`, `bulb-core` and its own port traits.
//! - `infrastructure` implements the ports with `tokio` and `reqwest`.

/// Domain layer: configuration types (no I/O).
pub mod domain;

/// Application layer: device cache, dispatch and handshake logic.
pub mod application;

/// Infrastructure layer: sockets, HTTP and configuration files.
pub mod infrastructure;
