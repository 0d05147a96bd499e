//! reqwest-based device transport.
//!
//! A poll is a `GET` on the device endpoint; a change is a `POST` with a
//! form-encoded body.  Both answer with the device's state envelope, which is
//! unwrapped with [`bulb_core::device::parse_response`].
//!
//! Connection pooling is disabled: the bulbs serve one connection at a time
//! and drop idle keep-alive sockets without notice.

use std::time::Duration;

use async_trait::async_trait;
use bulb_core::device::parse_response;
use bulb_core::{DeviceState, RequestPayload};
use reqwest::header::CONTENT_TYPE;
use tracing::debug;

use crate::application::ports::{DeviceError, DeviceTarget, DeviceTransport};

/// Content type of a state change request.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded;charset=utf-8";

/// [`DeviceTransport`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Builds a transport whose requests time out after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns the `reqwest` error if the client cannot be constructed.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(0)
            .user_agent(concat!("bulb-bridge/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl DeviceTransport for HttpTransport {
    async fn exchange(
        &self,
        target: &DeviceTarget,
        payload: Option<&RequestPayload>,
    ) -> Result<DeviceState, DeviceError> {
        let request = match payload {
            None => self.client.get(&target.endpoint),
            Some(p) => self
                .client
                .post(&target.endpoint)
                .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
                .body(p.to_form_body()),
        };

        let unreachable = |e: reqwest::Error| DeviceError::Unreachable {
            device: target.name.clone(),
            message: e.to_string(),
        };

        let response = request.send().await.map_err(unreachable)?;
        let status = response.status();
        if !status.is_success() {
            return Err(DeviceError::Rejected {
                device: target.name.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(unreachable)?;
        debug!("device {}: HTTP {status} {body}", target.name);

        parse_response(&body, &target.hardware_id).map_err(|source| DeviceError::Protocol {
            device: target.name.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    const ID: &str = "5CCF7FA0CA06";

    // ── Test HTTP responder ───────────────────────────────────────────────────

    /// Serves one HTTP exchange with a fixed response and hands back the raw
    /// request it received.
    async fn serve_once(status_line: &'static str, body: String) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            request
        });

        (format!("http://{addr}/api/v1/device/{ID}"), handle)
    }

    /// Reads headers plus a `Content-Length` body.
    async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
        let mut raw = Vec::new();
        let mut buf = [0u8; 1024];
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&raw);
            if let Some(end) = text.find("\r\n\r\n") {
                let length = text[..end]
                    .lines()
                    .find_map(|l| {
                        let (name, value) = l.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if raw.len() >= end + 4 + length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&raw).into_owned()
    }

    fn target(endpoint: String) -> DeviceTarget {
        DeviceTarget {
            name: "mitte".to_string(),
            hardware_id: ID.to_string(),
            endpoint,
        }
    }

    fn envelope(on: bool, color: &str) -> String {
        format!(r#"{{"{ID}":{{"on":{on},"color":"{color}","mode":"hsv"}}}}"#)
    }

    // ── Tests ─────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_poll_is_a_get_and_unwraps_envelope() {
        // Arrange
        let (endpoint, server) = serve_once("200 OK", envelope(true, "90;80;70")).await;
        let transport = HttpTransport::new(Duration::from_secs(2)).unwrap();

        // Act
        let state = transport.exchange(&target(endpoint), None).await.unwrap();

        // Assert
        let request = server.await.unwrap();
        assert!(request.starts_with(&format!("GET /api/v1/device/{ID} HTTP/1.1")));
        assert!(state.on);
        assert_eq!(state.color, "90;80;70");
        assert_eq!(state.extra["mode"], "hsv");
    }

    #[tokio::test]
    async fn test_change_is_a_form_post() {
        let (endpoint, server) = serve_once("200 OK", envelope(true, "99;34;56")).await;
        let transport = HttpTransport::new(Duration::from_secs(2)).unwrap();
        let payload = bulb_core::translate(
            "mitte",
            "hue",
            "99",
            Some(&DeviceState::new(true, "12;34;56")),
        )
        .unwrap();

        let state = transport
            .exchange(&target(endpoint), Some(&payload))
            .await
            .unwrap();

        let request = server.await.unwrap();
        assert!(request.starts_with(&format!("POST /api/v1/device/{ID} HTTP/1.1")));
        assert!(request
            .to_ascii_lowercase()
            .contains("content-type: application/x-www-form-urlencoded;charset=utf-8"));
        assert!(request.ends_with("\r\n\r\ncolor=99;34;56"));
        assert_eq!(state.color, "99;34;56");
    }

    #[tokio::test]
    async fn test_error_status_is_rejected() {
        let (endpoint, server) = serve_once("404 Not Found", String::new()).await;
        let transport = HttpTransport::new(Duration::from_secs(2)).unwrap();

        let err = transport.exchange(&target(endpoint), None).await.unwrap_err();

        server.await.unwrap();
        assert!(matches!(err, DeviceError::Rejected { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_envelope_for_other_device_is_protocol_error() {
        let body = r#"{"000000000000":{"on":true,"color":"1;2;3"}}"#.to_string();
        let (endpoint, server) = serve_once("200 OK", body).await;
        let transport = HttpTransport::new(Duration::from_secs(2)).unwrap();

        let err = transport.exchange(&target(endpoint), None).await.unwrap_err();

        server.await.unwrap();
        assert!(matches!(err, DeviceError::Protocol { .. }));
    }

    #[tokio::test]
    async fn test_closed_port_is_unreachable() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };
        let transport = HttpTransport::new(Duration::from_secs(2)).unwrap();

        let endpoint = format!("http://127.0.0.1:{port}/api/v1/device/{ID}");
        let err = transport.exchange(&target(endpoint), None).await.unwrap_err();

        assert!(matches!(err, DeviceError::Unreachable { .. }));
    }
}
