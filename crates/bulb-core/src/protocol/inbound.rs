//! Inbound payload parsing.

use tracing::debug;

use super::STATEMENT_TERMINATOR;

/// First atom of the statement a Pd client sends to announce itself.
pub const PEER_IP_SENTINEL: &str = "peer_ip";

/// One statement of an inbound payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// `peer_ip;` – the sender takes over control; run the handshake.
    PeerIp,
    /// `<device>;` – poll the device's state (a Pd "bang").
    Poll {
        device: String,
    },
    /// `<device> <symbol> <arg>;` – change the device's state.
    Command {
        device: String,
        symbol: String,
        arg: String,
    },
    /// Any other atom count.  Dropped without a reply.
    Malformed {
        text: String,
    },
}

impl Statement {
    /// Classifies one `;`-free statement by its atoms.
    ///
    /// Returns `None` for an empty (whitespace-only) statement.
    pub fn parse(text: &str) -> Option<Self> {
        let atoms: Vec<&str> = text.split_whitespace().collect();
        let statement = match atoms.as_slice() {
            [] => return None,
            [PEER_IP_SENTINEL] => Statement::PeerIp,
            [device] => Statement::Poll {
                device: device.to_string(),
            },
            [device, symbol, arg] => Statement::Command {
                device: device.to_string(),
                symbol: symbol.to_string(),
                arg: arg.to_string(),
            },
            _ => Statement::Malformed {
                text: text.trim().to_string(),
            },
        };
        Some(statement)
    }
}

/// Splits an inbound payload into its statements, in payload order.
///
/// Trailing whitespace is stripped first; empty fragments produced by a
/// trailing or doubled `;` are discarded.
///
/// # Example
///
/// ```rust
/// use bulb_core::{parse_payload, Statement};
///
/// let statements = parse_payload("mitte;\neingang on 1;\n");
/// assert_eq!(statements.len(), 2);
/// assert_eq!(statements[0], Statement::Poll { device: "mitte".into() });
/// ```
pub fn parse_payload(payload: &str) -> Vec<Statement> {
    let statements: Vec<Statement> = payload
        .trim_end()
        .split(STATEMENT_TERMINATOR)
        .filter_map(Statement::parse)
        .collect();
    debug!("parsed {} statement(s) from {payload:?}", statements.len());
    statements
}
