use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

use lanprobe_common::config::Config;

/// Outcome of probing one `(host, port)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortResult {
    pub port: u16,
    pub open: bool,
    /// Bytes the service sent on its own right after the handshake.
    pub banner: Option<Vec<u8>>,
}

impl PortResult {
    pub fn open(port: u16) -> Self {
        Self {
            port,
            open: true,
            banner: None,
        }
    }

    pub fn closed(port: u16) -> Self {
        Self {
            port,
            open: false,
            banner: None,
        }
    }

    pub fn with_banner(mut self, banner: Vec<u8>) -> Self {
        self.banner = Some(banner);
        self
    }

    pub fn banner_text(&self) -> Option<String> {
        self.banner
            .as_deref()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }
}

/// Opens TCP connections to single ports.
///
/// Every call makes exactly one connection and the stream is dropped before
/// returning. A failed connect is a closed port, not an error.
#[async_trait]
pub trait PortProber: Send + Sync {
    /// Open/closed only. The stream is closed as soon as the handshake completes.
    async fn probe(&self, addr: SocketAddr) -> PortResult;

    /// Connects and waits briefly for whatever the service sends first.
    async fn grab_banner(&self, addr: SocketAddr) -> PortResult;
}

#[derive(Debug, Clone)]
pub struct TcpProbe {
    connect_timeout: Duration,
    banner_timeout: Duration,
    banner_size: usize,
}

impl TcpProbe {
    pub fn new(connect_timeout: Duration, banner_timeout: Duration, banner_size: usize) -> Self {
        Self {
            connect_timeout,
            banner_timeout,
            banner_size,
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(cfg.connect_timeout, cfg.banner_timeout, cfg.banner_size)
    }

    async fn connect(&self, addr: SocketAddr) -> Option<TcpStream> {
        match timeout(self.connect_timeout, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => Some(stream),
            Ok(Err(_)) | Err(_) => None,
        }
    }
}

#[async_trait]
impl PortProber for TcpProbe {
    async fn probe(&self, addr: SocketAddr) -> PortResult {
        match self.connect(addr).await {
            Some(_stream) => PortResult::open(addr.port()),
            None => PortResult::closed(addr.port()),
        }
    }

    async fn grab_banner(&self, addr: SocketAddr) -> PortResult {
        let Some(mut stream) = self.connect(addr).await else {
            return PortResult::closed(addr.port());
        };

        let mut buffer: Vec<u8> = vec![0u8; self.banner_size];
        let result = PortResult::open(addr.port());

        match timeout(self.banner_timeout, stream.read(&mut buffer)).await {
            Ok(Ok(0)) | Err(_) => result,
            Ok(Ok(n)) => {
                buffer.truncate(n);
                result.with_banner(buffer)
            }
            Ok(Err(e)) => {
                debug!(%addr, error = %e, "banner read failed");
                result
            }
        }
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
