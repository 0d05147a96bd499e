//! The `peer_ip` handshake: hand control of the bulbs to a remote Pd client.
//!
//! A remote patch (for example on a phone) sends `peer_ip;` when it wants to
//! take over.  The bridge then tells both sides who is in charge:
//!
//! ```text
//! Bridge                     primary Pd host (control port)   requester (reply port)
//! ──────                     ──────────────────────────────   ──────────────────────
//! peer_ip <requester IP>; →
//! localcontrol 1;         →
//! localgui 0;             →
//! localcontrol 0;         ────────────────────────────────→
//! localgui 1;             ────────────────────────────────→
//! ```
//!
//! If any of these deliveries is refused (nothing listening), the requester
//! instead receives `localcontrol 1;` and `localgui 1;` so it runs stand-alone.
//! Each message travels on its own connection.  Failures beyond the fallback
//! are logged and dropped.

use std::net::IpAddr;

use bulb_core::protocol::ControlMessage;
use tracing::{debug, info, warn};

use super::ports::{NotifyError, PeerNotifier, PeerTarget};

/// Runs the handshake for `requester_ip`.
///
/// - `primary`   – control port of the primary Pd host.
/// - `requester` – reply port on the requester's own address.
///
/// Returns the outcome for logging and tests; callers are not expected to act
/// on it.
pub async fn announce_peer(
    notifier: &dyn PeerNotifier,
    requester_ip: IpAddr,
    primary: &PeerTarget,
    requester: &PeerTarget,
) -> HandshakeOutcome {
    match primary_sequence(notifier, requester_ip, primary, requester).await {
        Ok(()) => {
            info!("peer_ip: {requester_ip} now in control via {primary}");
            HandshakeOutcome::Announced
        }
        Err(NotifyError::PeerUnreachable(refused)) => {
            info!("peer_ip: {refused} refused the connection; {requester} runs stand-alone");
            match fallback_sequence(notifier, requester).await {
                Ok(()) => HandshakeOutcome::FellBack,
                Err(e) => {
                    warn!("peer_ip: fallback to {requester} failed: {e}");
                    HandshakeOutcome::Failed
                }
            }
        }
        Err(e) => {
            warn!("peer_ip: handshake for {requester_ip} failed: {e}");
            HandshakeOutcome::Failed
        }
    }
}

/// How a handshake ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeOutcome {
    /// All five messages were delivered.
    Announced,
    /// A delivery was refused and the fallback pair reached the requester.
    FellBack,
    /// Delivery failed and no fallback applied or it failed too.
    Failed,
}

async fn primary_sequence(
    notifier: &dyn PeerNotifier,
    requester_ip: IpAddr,
    primary: &PeerTarget,
    requester: &PeerTarget,
) -> Result<(), NotifyError> {
    send(notifier, primary, ControlMessage::PeerIp(requester_ip)).await?;
    send(notifier, primary, ControlMessage::LocalControl(true)).await?;
    send(notifier, primary, ControlMessage::LocalGui(false)).await?;
    send(notifier, requester, ControlMessage::LocalControl(false)).await?;
    send(notifier, requester, ControlMessage::LocalGui(true)).await
}

async fn fallback_sequence(
    notifier: &dyn PeerNotifier,
    requester: &PeerTarget,
) -> Result<(), NotifyError> {
    send(notifier, requester, ControlMessage::LocalControl(true)).await?;
    send(notifier, requester, ControlMessage::LocalGui(true)).await
}

async fn send(
    notifier: &dyn PeerNotifier,
    target: &PeerTarget,
    message: ControlMessage,
) -> Result<(), NotifyError> {
    debug!("peer_ip: {message} → {target}");
    notifier.notify(target, &message.encode()).await
}
