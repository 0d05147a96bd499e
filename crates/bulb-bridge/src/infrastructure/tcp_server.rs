//! FUDI TCP server: accept loop and per-connection handling.
//!
//! This module is responsible for:
//!
//! 1. Binding the inbound listener on the configured address.
//! 2. Admitting or refusing each accepted connection (see [`Admission`]).
//! 3. Spawning one task per admitted connection, which
//!    - reads a single payload of at most [`READ_BUDGET`] bytes,
//!    - splits it into statements,
//!    - closes the inbound connection,
//!    - dispatches the statements in order through [`BridgeService`].
//! 4. Returning when the shutdown token is cancelled.
//!
//! Replies never travel on the inbound connection.  They are delivered by the
//! peer notifier on fresh outbound connections, so a slow device only delays
//! its own connection task.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use bulb_core::parse_payload;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::admission::{Admission, Permit};
use crate::application::BridgeService;
use crate::domain::BridgeConfig;

/// Maximum bytes read from one inbound connection.
pub const READ_BUDGET: usize = 4096;

/// The inbound side of the bridge.
pub struct BridgeServer {
    config: Arc<BridgeConfig>,
    service: Arc<BridgeService>,
    admission: Arc<Admission>,
}

impl BridgeServer {
    pub fn new(config: Arc<BridgeConfig>, service: Arc<BridgeService>) -> Self {
        let admission = Arc::new(Admission::new(config.max_in_flight));
        Self {
            config,
            service,
            admission,
        }
    }

    pub fn admission(&self) -> &Admission {
        &self.admission
    }

    /// Binds `config.listen_addr` and serves until `shutdown` is cancelled.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn run(&self, shutdown: CancellationToken) -> anyhow::Result<()> {
        let listener = TcpListener::bind(self.config.listen_addr)
            .await
            .with_context(|| format!("failed to bind FUDI listener on {}", self.config.listen_addr))?;
        self.serve(listener, shutdown).await;
        Ok(())
    }

    /// Serves on an already bound listener until `shutdown` is cancelled.
    ///
    /// Connection tasks still running at shutdown are left to finish.
    pub async fn serve(&self, listener: TcpListener, shutdown: CancellationToken) {
        match listener.local_addr() {
            Ok(addr) => info!(
                "bulb bridge listening on {addr} (max {} in flight)",
                self.admission.ceiling()
            ),
            Err(e) => warn!("listener address unavailable: {e}"),
        }

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("shutdown requested; stopping accept loop");
                    break;
                }
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer_addr)) => self.on_accept(stream, peer_addr),
                    // Transient accept error (e.g. too many open file descriptors).
                    Err(e) => error!("accept error: {e}"),
                },
            }
        }
    }

    fn on_accept(&self, stream: TcpStream, peer_addr: SocketAddr) {
        debug!("connection from {peer_addr}");
        let permit = match self.admission.admit() {
            Ok(permit) => permit,
            Err(e) => {
                warn!("refusing {peer_addr}: {e}; cancelled all in-flight handlers");
                // Dropping the stream closes it unread.
                return;
            }
        };

        let service = Arc::clone(&self.service);
        tokio::spawn(async move {
            handle_connection(stream, peer_addr, service, permit).await;
        });
    }
}

// ── Per-connection handler ────────────────────────────────────────────────────

/// Runs one connection until it is done or its permit's generation is
/// cancelled.  The permit is released when this function returns.
async fn handle_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    service: Arc<BridgeService>,
    permit: Permit,
) {
    tokio::select! {
        _ = permit.token().cancelled() => {
            warn!("{peer_addr}: handler cancelled by load shedding");
        }
        result = run_connection(stream, peer_addr, &service) => match result {
            Ok(0) => debug!("{peer_addr}: nothing dispatched"),
            Ok(n) => debug!("{peer_addr}: {n} statement(s) dispatched"),
            Err(e) => warn!("{peer_addr}: connection failed: {e:#}"),
        },
    }
}

/// Reads, closes, and dispatches.  Returns the number of statements that
/// succeeded.
async fn run_connection(
    mut stream: TcpStream,
    peer_addr: SocketAddr,
    service: &BridgeService,
) -> anyhow::Result<usize> {
    let mut buf = vec![0u8; READ_BUDGET];
    let n = stream
        .read(&mut buf)
        .await
        .with_context(|| format!("read from {peer_addr} failed"))?;
    let text = String::from_utf8_lossy(&buf[..n]);
    debug!("{peer_addr}: payload {:?}", text.trim_end());

    let statements = parse_payload(&text);

    // The inbound connection is finished before any device is contacted.
    if let Err(e) = stream.shutdown().await {
        debug!("{peer_addr}: shutdown of inbound connection failed: {e}");
    }
    drop(stream);

    Ok(service.dispatch_all(&statements, peer_addr.ip()).await)
}
