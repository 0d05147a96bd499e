//! TCP peer notifier: one short-lived connection per outbound message.
//!
//! Pd's `[netreceive]` treats each connection as a stream of FUDI
//! statements, so a reply block or a control line is delivered by connecting,
//! writing the whole payload, and closing the write side.

use std::io;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

use crate::application::ports::{NotifyError, PeerNotifier, PeerTarget};

/// How long to wait for a peer to accept a connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// [`PeerNotifier`] over plain TCP.
#[derive(Debug, Clone)]
pub struct TcpPeerNotifier {
    connect_timeout: Duration,
}

impl TcpPeerNotifier {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

impl Default for TcpPeerNotifier {
    fn default() -> Self {
        Self::new(DEFAULT_CONNECT_TIMEOUT)
    }
}

#[async_trait]
impl PeerNotifier for TcpPeerNotifier {
    async fn notify(&self, target: &PeerTarget, payload: &str) -> Result<(), NotifyError> {
        let io_error = |source: io::Error| NotifyError::Io {
            target: target.clone(),
            source,
        };

        let connect = TcpStream::connect((target.host.as_str(), target.port));
        let mut stream = match timeout(self.connect_timeout, connect).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) if e.kind() == io::ErrorKind::ConnectionRefused => {
                return Err(NotifyError::PeerUnreachable(target.clone()));
            }
            Ok(Err(e)) => return Err(io_error(e)),
            Err(_) => {
                return Err(io_error(io::Error::new(
                    io::ErrorKind::TimedOut,
                    "connect timed out",
                )))
            }
        };

        stream.write_all(payload.as_bytes()).await.map_err(io_error)?;
        stream.shutdown().await.map_err(io_error)?;
        debug!("delivered {} bytes to {target}", payload.len());
        Ok(())
    }
}
