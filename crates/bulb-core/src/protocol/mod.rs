//! The FUDI side of the bridge.
//!
//! FUDI is Pure Data's line protocol: whitespace-separated atoms, each
//! message terminated by `;`.  `[netsend]` objects in the Pd patch send
//! commands to the bridge; `[netreceive]` objects receive replies and
//! control messages from it.
//!
//! - [`inbound`]: splitting a received payload into [`Statement`]s.
//! - [`reply`]: the multi-line device state block sent back to Pd.
//! - [`control`]: the one-line session-control messages of the
//!   `peer_ip` handshake.

pub mod control;
pub mod inbound;
pub mod reply;

pub use control::ControlMessage;
pub use inbound::{parse_payload, Statement, PEER_IP_SENTINEL};
pub use reply::encode_reply;

/// Terminator of every FUDI message.
pub const STATEMENT_TERMINATOR: char = ';';
