//! Mock device transport for running the bridge without bulbs.
//!
//! Every round trip sleeps for the configured delay and answers with the same
//! canned state, whatever was asked for.  The delay makes admission control
//! and cross-connection interleaving observable on a desk.

use std::time::Duration;

use async_trait::async_trait;
use bulb_core::{DeviceState, RequestPayload};
use serde_json::json;
use tracing::debug;

use crate::application::ports::{DeviceError, DeviceTarget, DeviceTransport};

/// [`DeviceTransport`] that never touches the network.
#[derive(Debug, Clone)]
pub struct MockTransport {
    delay: Duration,
    snapshot: DeviceState,
}

impl MockTransport {
    /// A transport answering with [`MockTransport::canned_state`].
    pub fn new(delay: Duration) -> Self {
        Self::with_snapshot(delay, Self::canned_state())
    }

    pub fn with_snapshot(delay: Duration, snapshot: DeviceState) -> Self {
        Self { delay, snapshot }
    }

    /// The state every mocked device reports: on, `90;80;70`.
    pub fn canned_state() -> DeviceState {
        let mut state = DeviceState::new(true, "90;80;70");
        state.extra.insert("mode".to_string(), json!("hsv"));
        state.extra.insert("ramp".to_string(), json!(100));
        state.extra.insert("notifyurl".to_string(), json!(""));
        state
    }
}

#[async_trait]
impl DeviceTransport for MockTransport {
    async fn exchange(
        &self,
        target: &DeviceTarget,
        payload: Option<&RequestPayload>,
    ) -> Result<DeviceState, DeviceError> {
        debug!(
            "mock device {}: {} (sleeping {:?})",
            target.name,
            payload.map_or_else(|| "poll".to_string(), ToString::to_string),
            self.delay
        );
        tokio::time::sleep(self.delay).await;
        Ok(self.snapshot.clone())
    }

    /// Any name gets the canned state.
    fn serves_unregistered(&self) -> bool {
        true
    }
}
