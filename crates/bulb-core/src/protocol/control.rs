//! Session-control messages of the `peer_ip` handshake.

use std::fmt;
use std::net::IpAddr;

/// A one-line control message for a Pd `[netreceive]`.
///
/// Each message is delivered on its own connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlMessage {
    /// `peer_ip <addr>;` – which remote client is now in control.
    PeerIp(IpAddr),
    /// `localcontrol <0|1>;` – whether the receiving patch drives the bulbs.
    LocalControl(bool),
    /// `localgui <0|1>;` – whether the receiving patch shows its GUI.
    LocalGui(bool),
}

impl ControlMessage {
    /// Encodes the message as a terminated FUDI line.
    pub fn encode(&self) -> String {
        format!("{self};\n")
    }
}

impl fmt::Display for ControlMessage {
    /// Formats the message atoms without the terminator.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlMessage::PeerIp(addr) => write!(f, "peer_ip {addr}"),
            ControlMessage::LocalControl(on) => write!(f, "localcontrol {}", u8::from(*on)),
            ControlMessage::LocalGui(on) => write!(f, "localgui {}", u8::from(*on)),
        }
    }
}
