//! DeviceClient: device round trips plus the shared last-known-state cache.
//!
//! Every successful round trip, poll or change, replaces the device's cache
//! entry with the state the device reported.  Color commands read that entry
//! to fill in the components they do not change.
//!
//! No lock is held across a read-translate-send cycle: two connections
//! changing the same device concurrently may both translate against the same
//! cached color, and whichever response arrives last wins the cache.

use std::collections::HashMap;
use std::sync::Arc;

use bulb_core::{DeviceRegistry, DeviceState, RequestPayload};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::ports::{DeviceError, DeviceTarget, DeviceTransport};

/// Talks to registered devices through a [`DeviceTransport`] and caches
/// their state.
pub struct DeviceClient {
    registry: DeviceRegistry,
    transport: Arc<dyn DeviceTransport>,
    states: RwLock<HashMap<String, DeviceState>>,
}

impl DeviceClient {
    /// Creates a client with an empty cache.
    pub fn new(registry: DeviceRegistry, transport: Arc<dyn DeviceTransport>) -> Self {
        Self {
            registry,
            transport,
            states: RwLock::new(HashMap::new()),
        }
    }

    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    /// Polls the current state of `device` and caches it.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError`] if the device is not registered (and the
    /// transport does not serve unregistered names) or the round trip fails.  The cache is left untouched on error.
    pub async fn query(&self, device: &str) -> Result<DeviceState, DeviceError> {
        self.round_trip(device, None).await
    }

    /// Sends `payload` to `device` and caches the state it answers with.
    ///
    /// # Errors
    ///
    /// As for [`DeviceClient::query`].
    pub async fn send(
        &self,
        device: &str,
        payload: &RequestPayload,
    ) -> Result<DeviceState, DeviceError> {
        self.round_trip(device, Some(payload)).await
    }

    /// The last state `device` reported, if any round trip has succeeded.
    pub async fn cached(&self, device: &str) -> Option<DeviceState> {
        self.states.read().await.get(device).cloned()
    }

    /// Polls every registered device once, in name order.
    ///
    /// Failures are logged and skipped.  Returns the number of devices that
    /// answered.
    pub async fn poll_all(&self) -> usize {
        let mut answered = 0;
        for device in self.registry.names() {
            match self.query(device).await {
                Ok(state) => {
                    info!("device {device}: on={} color={}", state.on, state.color);
                    answered += 1;
                }
                Err(e) => warn!("device {device}: initial poll failed: {e}"),
            }
        }
        answered
    }

    fn target(&self, device: &str) -> Result<DeviceTarget, DeviceError> {
        match (self.registry.hardware_id(device), self.registry.endpoint(device)) {
            (Some(hardware_id), Some(endpoint)) => Ok(DeviceTarget {
                name: device.to_string(),
                hardware_id: hardware_id.to_string(),
                endpoint,
            }),
            _ if self.transport.serves_unregistered() => Ok(DeviceTarget {
                name: device.to_string(),
                hardware_id: String::new(),
                endpoint: String::new(),
            }),
            _ => Err(DeviceError::UnregisteredDevice(device.to_string())),
        }
    }

    async fn round_trip(
        &self,
        device: &str,
        payload: Option<&RequestPayload>,
    ) -> Result<DeviceState, DeviceError> {
        let target = self.target(device)?;
        match payload {
            Some(p) => debug!("device {device}: POST {} {p}", target.endpoint),
            None => debug!("device {device}: GET {}", target.endpoint),
        }

        let state = self.transport.exchange(&target, payload).await?;
        debug!("device {device}: reply {state:?}");

        self.states
            .write()
            .await
            .insert(device.to_string(), state.clone());
        Ok(state)
    }
}
