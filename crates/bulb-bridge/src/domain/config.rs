//! Bridge configuration types.
//!
//! [`BridgeConfig`] is the single source of truth for all runtime settings.
//! `main.rs` builds it once from defaults, the optional TOML file and the CLI,
//! then shares it behind an `Arc`.  Nothing is reconfigured at runtime.

use std::net::SocketAddr;
use std::time::Duration;

use bulb_core::DeviceRegistry;

/// Default inbound FUDI listener port.
pub const DEFAULT_LISTEN_PORT: u16 = 8081;
/// Default port of the Pd `[netreceive]` that receives device replies.
pub const DEFAULT_PEER_PORT: u16 = 8082;
/// Default port of the Pd `[netreceive]` that receives handshake messages.
pub const DEFAULT_CONTROL_PORT: u16 = 8083;
/// Default admission ceiling.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 8;

/// Returns the two bulbs of the reference installation.
pub fn default_registry() -> DeviceRegistry {
    DeviceRegistry::from_iter([("eingang", "5CCF7FA0C8B4"), ("mitte", "5CCF7FA0CA06")])
}

/// Mock-mode settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockConfig {
    /// Replace every device round trip with a canned snapshot.
    pub enabled: bool,
    /// How long each mocked round trip sleeps.
    pub delay: Duration,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            delay: Duration::from_millis(1000),
        }
    }
}

/// The Pd host that receives device replies and handshake messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerConfig {
    /// Host name or IP of the primary Pd host.
    pub host: String,
    /// Reply port.  Replies go to `(<requester IP>, port)`.
    pub port: u16,
    /// Control port of the primary host for the `peer_ip` handshake.
    pub control_port: u16,
}

impl Default for PeerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PEER_PORT,
            control_port: DEFAULT_CONTROL_PORT,
        }
    }
}

/// All runtime configuration for the bridge.
///
/// # Example
///
/// ```rust
/// use bulb_bridge::domain::BridgeConfig;
///
/// let cfg = BridgeConfig::default();
/// assert_eq!(cfg.listen_addr.port(), 8081);
/// assert!(!cfg.mock.enabled);
/// ```
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Address the inbound FUDI listener binds to.
    pub listen_addr: SocketAddr,
    /// Reply and control targets.
    pub peer: PeerConfig,
    /// Connections admitted concurrently before load shedding starts.
    pub max_in_flight: usize,
    /// Timeout of one device HTTP round trip.
    pub device_timeout: Duration,
    /// Mock device transport settings.
    pub mock: MockConfig,
    /// Debug-level logging unless `RUST_LOG` says otherwise.
    pub verbose: bool,
    /// Query every device once before serving.
    pub startup_poll: bool,
    /// Device name → hardware id.
    pub registry: DeviceRegistry,
}

impl Default for BridgeConfig {
    /// | Field          | Default                  |
    /// |----------------|--------------------------|
    /// | listen_addr    | `0.0.0.0:8081`           |
    /// | peer           | `127.0.0.1`, 8082 / 8083 |
    /// | max_in_flight  | 8                        |
    /// | device_timeout | 5 seconds                |
    /// | mock           | disabled, 1 s delay      |
    /// | registry       | `eingang`, `mitte`       |
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_LISTEN_PORT)),
            peer: PeerConfig::default(),
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
            device_timeout: Duration::from_secs(5),
            mock: MockConfig::default(),
            verbose: false,
            startup_poll: true,
            registry: default_registry(),
        }
    }
}
