//! Bulb bridge: entry point.
//!
//! Accepts FUDI statements from Pure Data over TCP, drives the smart bulbs'
//! REST API, and pushes each bulb's new state back to Pd's `[netreceive]`.
//!
//! # Usage
//!
//! ```text
//! bulb-bridge [OPTIONS]
//!
//! Options:
//!   --config <PATH>            TOML configuration file
//!   --port <PORT>              FUDI listener port [default: 8081]
//!   --bind <IP>                FUDI listener address [default: 0.0.0.0]
//!   --peer-host <HOST>         primary Pd host [default: 127.0.0.1]
//!   --peer-port <PORT>         Pd reply port [default: 8082]
//!   --control-port <PORT>      Pd control port [default: 8083]
//!   --max-in-flight <N>        admission ceiling [default: 8]
//!   --device-timeout-ms <MS>   device HTTP timeout [default: 5000]
//!   --mock                     answer from a canned snapshot
//!   --mock-delay-ms <MS>       mocked round-trip delay [default: 1000]
//!   --no-startup-poll          skip the initial poll of every bulb
//!   -v, --verbose              debug logging
//! ```
//!
//! # Precedence
//!
//! Command-line flags (or their `BULB_*` environment variables) override the
//! configuration file, which overrides the built-in defaults.  `RUST_LOG`
//! overrides the verbose toggle.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use bulb_bridge::application::{BridgeService, DeviceTransport};
use bulb_bridge::domain::BridgeConfig;
use bulb_bridge::infrastructure::config_file::{self, FileConfig};
use bulb_bridge::infrastructure::{BridgeServer, HttpTransport, MockTransport, TcpPeerNotifier};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// FUDI-to-REST bridge between Pure Data and networked smart bulbs.
#[derive(Debug, Parser)]
#[command(
    name = "bulb-bridge",
    about = "FUDI-to-REST bridge between Pure Data patches and smart bulbs",
    version
)]
struct Cli {
    /// TOML configuration file.
    #[arg(long, env = "BULB_CONFIG")]
    config: Option<PathBuf>,

    /// TCP port for inbound FUDI statements.
    #[arg(long, env = "BULB_PORT")]
    port: Option<u16>,

    /// IP address to bind the FUDI listener to.
    #[arg(long, env = "BULB_BIND")]
    bind: Option<String>,

    /// Host name or IP of the primary Pd host (handshake messages).
    #[arg(long, env = "BULB_PEER_HOST")]
    peer_host: Option<String>,

    /// Pd reply port; replies go to this port on the requester's address.
    #[arg(long, env = "BULB_PEER_PORT")]
    peer_port: Option<u16>,

    /// Pd control port on the primary host.
    #[arg(long, env = "BULB_CONTROL_PORT")]
    control_port: Option<u16>,

    /// Connections handled concurrently before load shedding.
    #[arg(long, env = "BULB_MAX_IN_FLIGHT")]
    max_in_flight: Option<usize>,

    /// Device HTTP round-trip timeout in milliseconds.
    #[arg(long, env = "BULB_DEVICE_TIMEOUT_MS")]
    device_timeout_ms: Option<u64>,

    /// Do not contact any bulb; answer every request with a canned state.
    #[arg(long, env = "BULB_MOCK")]
    mock: bool,

    /// Delay of each mocked round trip in milliseconds.
    #[arg(long, env = "BULB_MOCK_DELAY_MS")]
    mock_delay_ms: Option<u64>,

    /// Skip polling every bulb before serving.
    #[arg(long, env = "BULB_NO_STARTUP_POLL")]
    no_startup_poll: bool,

    /// Log requests, device replies and payloads at debug level.
    #[arg(short, long, env = "BULB_VERBOSE")]
    verbose: bool,
}

impl Cli {
    /// Layers the CLI flags over `file` (or the built-in defaults).
    ///
    /// # Errors
    ///
    /// Returns an error if the file is invalid, `--bind` is not an IP
    /// address, or `--max-in-flight` is zero.
    fn into_bridge_config(self, file: Option<FileConfig>) -> anyhow::Result<BridgeConfig> {
        let mut config = match file {
            Some(file) => file
                .into_bridge_config()
                .context("invalid configuration file")?,
            None => BridgeConfig::default(),
        };

        let bind_ip: IpAddr = match &self.bind {
            Some(bind) => bind
                .parse()
                .with_context(|| format!("invalid bind address: '{bind}'"))?,
            None => config.listen_addr.ip(),
        };
        let port = self.port.unwrap_or(config.listen_addr.port());
        config.listen_addr = SocketAddr::new(bind_ip, port);

        if let Some(host) = self.peer_host {
            config.peer.host = host;
        }
        if let Some(port) = self.peer_port {
            config.peer.port = port;
        }
        if let Some(port) = self.control_port {
            config.peer.control_port = port;
        }
        if let Some(n) = self.max_in_flight {
            anyhow::ensure!(n > 0, "--max-in-flight must be at least 1");
            config.max_in_flight = n;
        }
        if let Some(ms) = self.device_timeout_ms {
            config.device_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = self.mock_delay_ms {
            config.mock.delay = Duration::from_millis(ms);
        }
        config.mock.enabled |= self.mock;
        config.verbose |= self.verbose;
        config.startup_poll &= !self.no_startup_poll;

        Ok(config)
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let file = match &cli.config {
        Some(path) => Some(
            config_file::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
        ),
        None => None,
    };
    let config = Arc::new(cli.into_bridge_config(file)?);

    // ── Logging setup ─────────────────────────────────────────────────────────
    let default_level = if config.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    info!(
        "bulb bridge starting: listen={}, peer={} (reply {}, control {}), {} device(s){}",
        config.listen_addr,
        config.peer.host,
        config.peer.port,
        config.peer.control_port,
        config.registry.len(),
        if config.mock.enabled { ", MOCK" } else { "" }
    );

    // ── Ports ─────────────────────────────────────────────────────────────────
    let transport: Arc<dyn DeviceTransport> = if config.mock.enabled {
        Arc::new(MockTransport::new(config.mock.delay))
    } else {
        Arc::new(HttpTransport::new(config.device_timeout).context("failed to build HTTP client")?)
    };
    let notifier = Arc::new(TcpPeerNotifier::default());
    let service = Arc::new(BridgeService::from_config(&config, transport, notifier));

    if config.startup_poll {
        let devices = service.devices();
        let answered = devices.poll_all().await;
        info!("startup poll: {answered}/{} device(s) answered", devices.registry().len());
    }

    // ── Graceful shutdown ─────────────────────────────────────────────────────
    let shutdown = CancellationToken::new();
    let on_ctrl_c = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C; initiating graceful shutdown");
                on_ctrl_c.cancel();
            }
            Err(e) => tracing::error!("failed to listen for Ctrl+C signal: {e}"),
        }
    });

    BridgeServer::new(Arc::clone(&config), service)
        .run(shutdown)
        .await?;

    info!("bulb bridge stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
