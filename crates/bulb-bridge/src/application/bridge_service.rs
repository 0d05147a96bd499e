//! Statement dispatch: the per-statement half of the connection handler.
//!
//! The infrastructure layer reads and splits an inbound payload, closes the
//! inbound connection, and hands the statements to [`BridgeService`].  For
//! each statement, in payload order, the service either runs the `peer_ip`
//! handshake or performs the device round trip and pushes the reply block to
//! the requester's reply port.
//!
//! ```text
//! Statement::PeerIp                 → announce_peer()
//! Statement::Poll    { device }     → DeviceClient::query → encode_reply → notify
//! Statement::Command { device, .. } → translate → DeviceClient::send → encode_reply → notify
//! Statement::Malformed              → dropped
//! ```

use std::net::IpAddr;
use std::sync::Arc;

use bulb_core::color::ColorError;
use bulb_core::{encode_reply, translate, DeviceState, Statement, TranslateError};
use thiserror::Error;
use tracing::{debug, warn};

use super::device_client::DeviceClient;
use super::handshake::{announce_peer, HandshakeOutcome};
use super::ports::{DeviceError, DeviceTransport, NotifyError, PeerNotifier, PeerTarget};
use crate::domain::BridgeConfig;

/// Why one statement produced no reply.
///
/// None of these reach the requester: the inbound connection is already
/// closed when they occur.  They are logged by [`BridgeService::dispatch_all`].
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Wrong number of atoms.
    #[error("malformed statement {0:?}")]
    Malformed(String),

    /// The command could not be translated.
    #[error(transparent)]
    Translate(#[from] TranslateError),

    /// The device round trip failed.
    #[error(transparent)]
    Device(#[from] DeviceError),

    /// The device reported a color that cannot be encoded.
    #[error("cannot encode reply: {0}")]
    Encode(#[from] ColorError),

    /// The reply could not be delivered.
    #[error(transparent)]
    Notify(#[from] NotifyError),
}

/// What a successfully dispatched statement did.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatched {
    /// The handshake ran.
    Handshake(HandshakeOutcome),
    /// The device answered and the reply was delivered.
    Replied { device: String, state: DeviceState },
}

/// Where replies and handshake messages go.
#[derive(Debug, Clone)]
pub struct PeerRouting {
    /// Control port of the primary Pd host.
    pub primary: PeerTarget,
    /// Reply port, on whatever address a request came from.
    pub reply_port: u16,
}

impl PeerRouting {
    pub fn from_config(config: &BridgeConfig) -> Self {
        Self {
            primary: PeerTarget::new(config.peer.host.clone(), config.peer.control_port),
            reply_port: config.peer.port,
        }
    }

    /// The reply target of a request from `requester_ip`.
    pub fn reply_target(&self, requester_ip: IpAddr) -> PeerTarget {
        PeerTarget::new(requester_ip.to_string(), self.reply_port)
    }
}

/// Dispatches statements to devices and peers.
pub struct BridgeService {
    devices: DeviceClient,
    notifier: Arc<dyn PeerNotifier>,
    routing: PeerRouting,
}

impl BridgeService {
    pub fn new(devices: DeviceClient, notifier: Arc<dyn PeerNotifier>, routing: PeerRouting) -> Self {
        Self {
            devices,
            notifier,
            routing,
        }
    }

    /// Builds the service from configuration and the two port implementations.
    pub fn from_config(
        config: &BridgeConfig,
        transport: Arc<dyn DeviceTransport>,
        notifier: Arc<dyn PeerNotifier>,
    ) -> Self {
        let devices = DeviceClient::new(config.registry.clone(), transport);
        Self::new(devices, notifier, PeerRouting::from_config(config))
    }

    pub fn devices(&self) -> &DeviceClient {
        &self.devices
    }

    /// Dispatches one statement from `requester_ip`.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] describing why no reply was sent.  The
    /// handshake never fails here; its outcome is reported in
    /// [`Dispatched::Handshake`].
    pub async fn dispatch(
        &self,
        statement: &Statement,
        requester_ip: IpAddr,
    ) -> Result<Dispatched, DispatchError> {
        let (device, state) = match statement {
            Statement::PeerIp => {
                let requester = self.routing.reply_target(requester_ip);
                let outcome =
                    announce_peer(self.notifier.as_ref(), requester_ip, &self.routing.primary, &requester)
                        .await;
                return Ok(Dispatched::Handshake(outcome));
            }
            Statement::Poll { device } => (device, self.devices.query(device).await?),
            Statement::Command {
                device,
                symbol,
                arg,
            } => {
                let cached = self.devices.cached(device).await;
                let payload = translate(device, symbol, arg, cached.as_ref())?;
                (device, self.devices.send(device, &payload).await?)
            }
            Statement::Malformed { text } => return Err(DispatchError::Malformed(text.clone())),
        };

        let block = encode_reply(device, &state)?;
        let target = self.routing.reply_target(requester_ip);
        debug!("reply for {device} → {target}");
        self.notifier.notify(&target, &block).await?;

        Ok(Dispatched::Replied {
            device: device.clone(),
            state,
        })
    }

    /// Dispatches `statements` sequentially in payload order.
    ///
    /// A failing statement is logged and does not stop the ones after it.
    /// Returns the number of statements dispatched successfully.
    pub async fn dispatch_all(&self, statements: &[Statement], requester_ip: IpAddr) -> usize {
        let mut succeeded = 0;
        for statement in statements {
            match self.dispatch(statement, requester_ip).await {
                Ok(_) => succeeded += 1,
                Err(e) => warn!("{requester_ip}: statement dropped: {e}"),
            }
        }
        succeeded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bulb_core::{DeviceRegistry, RequestPayload};
    use std::sync::Mutex;

    use crate::application::ports::DeviceTarget;

    // ── Test doubles ──────────────────────────────────────────────────────────

    /// Answers every request with the color it was asked to set, or with the
    /// configured state for polls.
    struct EchoTransport {
        poll_state: DeviceState,
        requests: Mutex<Vec<(String, Option<String>)>>,
    }

    impl EchoTransport {
        fn new(poll_color: &str) -> Self {
            Self {
                poll_state: DeviceState::new(true, poll_color),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl DeviceTransport for EchoTransport {
        async fn exchange(
            &self,
            target: &DeviceTarget,
            payload: Option<&RequestPayload>,
        ) -> Result<DeviceState, DeviceError> {
            self.requests
                .lock()
                .unwrap()
                .push((target.name.clone(), payload.map(RequestPayload::to_form_body)));
            let mut state = self.poll_state.clone();
            if let Some(color) = payload.and_then(|p| p.get("color")) {
                state.color = color.to_string();
            }
            if let Some(action) = payload.and_then(|p| p.get("action")) {
                state.on = action == "on";
            }
            Ok(state)
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<(PeerTarget, String)>>,
    }

    #[async_trait]
    impl PeerNotifier for RecordingNotifier {
        async fn notify(&self, target: &PeerTarget, payload: &str) -> Result<(), NotifyError> {
            self.sent
                .lock()
                .unwrap()
                .push((target.clone(), payload.to_string()));
            Ok(())
        }
    }

    fn service(
        transport: Arc<EchoTransport>,
        notifier: Arc<RecordingNotifier>,
    ) -> BridgeService {
        let registry =
            DeviceRegistry::from_iter([("eingang", "5CCF7FA0C8B4"), ("mitte", "5CCF7FA0CA06")]);
        let routing = PeerRouting {
            primary: PeerTarget::new("pd-host", 8083),
            reply_port: 8082,
        };
        BridgeService::new(DeviceClient::new(registry, transport), notifier, routing)
    }

    fn requester() -> IpAddr {
        "10.0.0.7".parse().unwrap()
    }

    #[tokio::test]
    async fn test_poll_replies_to_requester_reply_port() {
        let notifier = Arc::new(RecordingNotifier::default());
        let svc = service(Arc::new(EchoTransport::new("90;80;70")), Arc::clone(&notifier));

        let poll = Statement::Poll {
            device: "mitte".to_string(),
        };
        svc.dispatch(&poll, requester()).await.unwrap();

        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, PeerTarget::new("10.0.0.7", 8082));
        assert_eq!(
            sent[0].1,
            "bulb;\nmitte;\non;\n1;\nhue;\n90;\nsat;\n80;\nval;\n70;\nrgb;\n-6992420;\neof;\n"
        );
    }

    #[tokio::test]
    async fn test_color_command_uses_cached_state() {
        let transport = Arc::new(EchoTransport::new("12;34;56"));
        let notifier = Arc::new(RecordingNotifier::default());
        let svc = service(Arc::clone(&transport), Arc::clone(&notifier));

        let statements = bulb_core::parse_payload("mitte;mitte hue 99;");
        let succeeded = svc.dispatch_all(&statements, requester()).await;

        assert_eq!(succeeded, 2);
        let requests = transport.requests.lock().unwrap();
        assert_eq!(requests[1], ("mitte".to_string(), Some("color=99;34;56".to_string())));
        assert_eq!(notifier.sent.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_color_command_without_cache_is_dropped() {
        let transport = Arc::new(EchoTransport::new("12;34;56"));
        let notifier = Arc::new(RecordingNotifier::default());
        let svc = service(Arc::clone(&transport), Arc::clone(&notifier));

        let command = Statement::Command {
            device: "mitte".to_string(),
            symbol: "sat".to_string(),
            arg: "10".to_string(),
        };
        let err = svc.dispatch(&command, requester()).await.unwrap_err();

        assert!(matches!(err, DispatchError::Translate(TranslateError::UnknownDevice(_))));
        assert!(transport.requests.lock().unwrap().is_empty());
        assert!(notifier.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_on_command_needs_no_cache() {
        let transport = Arc::new(EchoTransport::new("1;2;3"));
        let notifier = Arc::new(RecordingNotifier::default());
        let svc = service(Arc::clone(&transport), Arc::clone(&notifier));

        let command = Statement::Command {
            device: "eingang".to_string(),
            symbol: "on".to_string(),
            arg: "0".to_string(),
        };
        let dispatched = svc.dispatch(&command, requester()).await.unwrap();

        assert!(matches!(dispatched, Dispatched::Replied { ref state, .. } if !state.on));
        assert_eq!(
            transport.requests.lock().unwrap()[0].1.as_deref(),
            Some("action=off")
        );
    }

    #[tokio::test]
    async fn test_malformed_statement_makes_no_calls() {
        let transport = Arc::new(EchoTransport::new("1;2;3"));
        let notifier = Arc::new(RecordingNotifier::default());
        let svc = service(Arc::clone(&transport), Arc::clone(&notifier));

        let statements = bulb_core::parse_payload("mitte on;mitte a b c;");
        let succeeded = svc.dispatch_all(&statements, requester()).await;

        assert_eq!(succeeded, 0);
        assert!(transport.requests.lock().unwrap().is_empty());
        assert!(notifier.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_statement_does_not_stop_the_batch() {
        let transport = Arc::new(EchoTransport::new("1;2;3"));
        let notifier = Arc::new(RecordingNotifier::default());
        let svc = service(Arc::clone(&transport), Arc::clone(&notifier));

        let statements = bulb_core::parse_payload("keller;mitte blink 1;eingang;");
        let succeeded = svc.dispatch_all(&statements, requester()).await;

        assert_eq!(succeeded, 1);
        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].1.starts_with("bulb;\neingang;\n"));
    }

    #[tokio::test]
    async fn test_peer_ip_runs_handshake_without_device_calls() {
        let transport = Arc::new(EchoTransport::new("1;2;3"));
        let notifier = Arc::new(RecordingNotifier::default());
        let svc = service(Arc::clone(&transport), Arc::clone(&notifier));

        let dispatched = svc.dispatch(&Statement::PeerIp, requester()).await.unwrap();

        assert_eq!(dispatched, Dispatched::Handshake(HandshakeOutcome::Announced));
        assert!(transport.requests.lock().unwrap().is_empty());
        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 5);
        assert_eq!(sent[0], (PeerTarget::new("pd-host", 8083), "peer_ip 10.0.0.7;\n".to_string()));
    }
}
