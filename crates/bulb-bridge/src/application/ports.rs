//! Port traits the application layer drives, and their error types.
//!
//! Infrastructure implementations use `reqwest` and `tokio::net`; tests use
//! recording doubles.

use std::fmt;
use std::io;

use async_trait::async_trait;
use bulb_core::{DeviceState, RequestPayload, ResponseError};
use thiserror::Error;

/// Everything a transport needs to reach one device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceTarget {
    /// Logical device name (also its DNS host name).
    pub name: String,
    /// Hardware id; the key of the device's response envelope.
    pub hardware_id: String,
    /// Full REST endpoint URL.
    pub endpoint: String,
}

/// Errors from a device round trip.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// The device name is not in the registry.
    #[error("device {0:?} is not registered")]
    UnregisteredDevice(String),

    /// The request could not be sent or the response not read (network
    /// failure, DNS failure, timeout).
    #[error("device {device} unreachable: {message}")]
    Unreachable { device: String, message: String },

    /// The device answered with a non-success HTTP status.
    #[error("device {device} rejected the request with HTTP {status}")]
    Rejected { device: String, status: u16 },

    /// The device answered with a body that is not a valid state envelope.
    #[error("device {device} sent a malformed response: {source}")]
    Protocol {
        device: String,
        #[source]
        source: ResponseError,
    },
}

/// Performs one request/response cycle against a device.
///
/// `payload == None` is a state poll (`GET`); `Some` is a state change
/// (`POST` with a form body).  Implementations must be callable from many
/// connection tasks at once.
#[async_trait]
pub trait DeviceTransport: Send + Sync {
    async fn exchange(
        &self,
        target: &DeviceTarget,
        payload: Option<&RequestPayload>,
    ) -> Result<DeviceState, DeviceError>;

    /// Whether names missing from the registry are still passed to
    /// [`exchange`](DeviceTransport::exchange), with an empty hardware id and
    /// endpoint.
    fn serves_unregistered(&self) -> bool {
        false
    }
}

/// A Pd `[netreceive]` endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerTarget {
    pub host: String,
    pub port: u16,
}

impl PeerTarget {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for PeerTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Errors from delivering a message to a peer.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The peer actively refused the connection: nothing is listening.
    #[error("peer {0} refused the connection")]
    PeerUnreachable(PeerTarget),

    /// Any other connect or write failure.
    #[error("failed to deliver to peer {target}: {source}")]
    Io {
        target: PeerTarget,
        #[source]
        source: io::Error,
    },
}

/// Delivers one complete payload to a peer on a fresh connection.
#[async_trait]
pub trait PeerNotifier: Send + Sync {
    async fn notify(&self, target: &PeerTarget, payload: &str) -> Result<(), NotifyError>;
}
