use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use lanprobe_common::network::host::HostRecord;
use lanprobe_core::discovery::{DiscoveryError, HostDiscovery};
use lanprobe_core::interact::ssh::{SshError, SshSession};
use lanprobe_core::interact::{CredentialAttempt, HttpOutcome, HttpProbe, ProtocolInteractor, SshConnector, SshProbe};
use lanprobe_core::network::tcp::{PortProber, PortResult};

/// Reports a fixed set of ports open on every host and never sends a banner.
pub struct FixedPorts {
    open: HashSet<u16>,
    pub probed: Mutex<usize>,
}

impl FixedPorts {
    pub fn new(open: &[u16]) -> Arc<Self> {
        Arc::new(Self {
            open: open.iter().copied().collect(),
            probed: Mutex::new(0),
        })
    }
}

#[async_trait]
impl PortProber for FixedPorts {
    async fn probe(&self, addr: SocketAddr) -> PortResult {
        *self.probed.lock().unwrap() += 1;
        if self.open.contains(&addr.port()) {
            PortResult::open(addr.port())
        } else {
            PortResult::closed(addr.port())
        }
    }

    async fn grab_banner(&self, addr: SocketAddr) -> PortResult {
        self.probe(addr).await
    }
}

/// Sends HTTP to a local server instead of the scanned address.
pub struct LocalHttp {
    pub http: HttpProbe,
    pub server: SocketAddr,
    pub ssh: SshProbe,
}

#[async_trait]
impl ProtocolInteractor for LocalHttp {
    async fn http(&self, _addr: SocketAddr) -> HttpOutcome {
        self.http.fetch(self.server).await
    }

    async fn ssh(&self, addr: SocketAddr) -> Vec<CredentialAttempt> {
        self.ssh.spray(addr).await
    }
}

/// SSH server that accepts a single password and answers `whoami`.
pub struct SinglePasswordServer {
    pub accepted: &'static str,
    pub identity: &'static str,
    pub tried: Arc<Mutex<Vec<String>>>,
}

struct FixedIdentity(&'static str);

#[async_trait]
impl SshConnector for SinglePasswordServer {
    async fn connect(
        &self,
        _addr: SocketAddr,
        _user: &str,
        password: &str,
    ) -> Result<Box<dyn SshSession>, SshError> {
        self.tried.lock().unwrap().push(password.to_string());
        if password == self.accepted {
            Ok(Box::new(FixedIdentity(self.identity)))
        } else {
            Err(SshError::Rejected)
        }
    }
}

#[async_trait]
impl SshSession for FixedIdentity {
    async fn exec(&mut self, _command: &str) -> Result<String, SshError> {
        Ok(format!("{}\n", self.0))
    }

    async fn close(self: Box<Self>) {}
}

/// Hands out a fixed list of hosts, or fails the way a silent network does.
pub struct StaticDiscovery {
    pub hosts: Vec<HostRecord>,
    pub silent: bool,
}

#[async_trait]
impl HostDiscovery for StaticDiscovery {
    async fn discover(&self, tx: mpsc::Sender<HostRecord>) -> Result<(), DiscoveryError> {
        if self.silent {
            return Err(DiscoveryError::NoResponders(std::time::Duration::from_millis(10)));
        }
        for host in &self.hosts {
            if tx.send(host.clone()).await.is_err() {
                break;
            }
        }
        Ok(())
    }
}

/// Serves `body` with status 200 to every request.
pub async fn http_server(body: String) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let body = body.clone();
            tokio::spawn(async move {
                let mut request = [0u8; 2048];
                let _ = socket.read(&mut request).await;
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
            });
        }
    });
    addr
}

/// Accepts connections forever and greets each one with `banner`.
pub async fn banner_server(banner: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let _ = socket.write_all(banner.as_bytes()).await;
        }
    });
    addr
}
