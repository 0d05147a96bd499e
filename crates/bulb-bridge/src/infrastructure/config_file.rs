//! TOML configuration file for the bridge.
//!
//! The file is optional.  Every field has a serde default, so a file only
//! needs to name what it changes:
//!
//! ```toml
//! [listener]
//! bind_address = "0.0.0.0"
//! port = 8081
//! max_in_flight = 8
//!
//! [peer]
//! host = "192.168.1.20"
//! port = 8082
//! control_port = 8083
//!
//! [device]
//! timeout_ms = 5000
//!
//! [mock]
//! enabled = false
//! delay_ms = 1000
//!
//! [logging]
//! verbose = false
//!
//! [devices]
//! eingang = "5CCF7FA0C8B4"
//! mitte = "5CCF7FA0CA06"
//! ```
//!
//! A non-empty `[devices]` table replaces the built-in registry entirely.

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use bulb_core::DeviceRegistry;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::config::{
    default_registry, BridgeConfig, MockConfig, PeerConfig, DEFAULT_CONTROL_PORT,
    DEFAULT_LISTEN_PORT, DEFAULT_MAX_IN_FLIGHT, DEFAULT_PEER_PORT,
};

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// `listener.bind_address` is not an IP address.
    #[error("invalid bind address {0:?}")]
    InvalidBindAddress(String),

    /// `listener.max_in_flight` is zero.
    #[error("max_in_flight must be at least 1")]
    ZeroCeiling,
}

// ── Config schema types ───────────────────────────────────────────────────────

/// On-disk configuration.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct FileConfig {
    #[serde(default)]
    pub listener: ListenerSection,
    #[serde(default)]
    pub peer: PeerSection,
    #[serde(default)]
    pub device: DeviceSection,
    #[serde(default)]
    pub mock: MockSection,
    #[serde(default)]
    pub logging: LoggingSection,
    /// Device name → hardware id.
    #[serde(default)]
    pub devices: DeviceRegistry,
}

/// Inbound FUDI listener.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ListenerSection {
    /// IP address to bind to.  `"0.0.0.0"` binds all interfaces.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_listen_port")]
    pub port: u16,
    /// Admission ceiling.
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,
}

/// Pd host for replies and handshake messages.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PeerSection {
    #[serde(default = "default_peer_host")]
    pub host: String,
    #[serde(default = "default_peer_port")]
    pub port: u16,
    #[serde(default = "default_control_port")]
    pub control_port: u16,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DeviceSection {
    /// HTTP round-trip timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MockSection {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_mock_delay_ms")]
    pub delay_ms: u64,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct LoggingSection {
    #[serde(default)]
    pub verbose: bool,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}
fn default_listen_port() -> u16 {
    DEFAULT_LISTEN_PORT
}
fn default_max_in_flight() -> usize {
    DEFAULT_MAX_IN_FLIGHT
}
fn default_peer_host() -> String {
    "127.0.0.1".to_string()
}
fn default_peer_port() -> u16 {
    DEFAULT_PEER_PORT
}
fn default_control_port() -> u16 {
    DEFAULT_CONTROL_PORT
}
fn default_timeout_ms() -> u64 {
    5000
}
fn default_mock_delay_ms() -> u64 {
    1000
}

impl Default for ListenerSection {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_listen_port(),
            max_in_flight: default_max_in_flight(),
        }
    }
}

impl Default for PeerSection {
    fn default() -> Self {
        Self {
            host: default_peer_host(),
            port: default_peer_port(),
            control_port: default_control_port(),
        }
    }
}

impl Default for DeviceSection {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for MockSection {
    fn default() -> Self {
        Self {
            enabled: false,
            delay_ms: default_mock_delay_ms(),
        }
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

impl FileConfig {
    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the TOML is malformed or a field has
    /// the wrong type.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Validates the file into a [`BridgeConfig`].
    ///
    /// `startup_poll` is not a file setting and keeps its default.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBindAddress`] or
    /// [`ConfigError::ZeroCeiling`].
    pub fn into_bridge_config(self) -> Result<BridgeConfig, ConfigError> {
        let ip: IpAddr = self
            .listener
            .bind_address
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddress(self.listener.bind_address.clone()))?;
        if self.listener.max_in_flight == 0 {
            return Err(ConfigError::ZeroCeiling);
        }

        let registry = if self.devices.is_empty() {
            default_registry()
        } else {
            self.devices
        };

        Ok(BridgeConfig {
            listen_addr: SocketAddr::new(ip, self.listener.port),
            peer: PeerConfig {
                host: self.peer.host,
                port: self.peer.port,
                control_port: self.peer.control_port,
            },
            max_in_flight: self.listener.max_in_flight,
            device_timeout: Duration::from_millis(self.device.timeout_ms),
            mock: MockConfig {
                enabled: self.mock.enabled,
                delay: Duration::from_millis(self.mock.delay_ms),
            },
            verbose: self.logging.verbose,
            registry,
            ..BridgeConfig::default()
        })
    }
}

/// Loads a [`FileConfig`] from `path`.
///
/// Unlike the built-in defaults, an explicitly named file must exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read and
/// [`ConfigError::Parse`] if the TOML is malformed.
pub fn load(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    FileConfig::from_toml_str(&content)
}
