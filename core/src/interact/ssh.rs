//! SSH credential spray.
//!
//! Every candidate password gets its own connection. Host keys are accepted
//! unconditionally: the goal is to learn what the device allows, not to trust
//! the channel.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use russh::client::{self, Handle};
use russh::{ChannelMsg, Disconnect};
use russh_keys::key::PublicKey;
use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, info, warn};

const WHOAMI: &str = "whoami";
const ROOT_IDENTITY: &str = "root";
const COMMAND_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum SshError {
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("authentication rejected")]
    Rejected,
    #[error("session failed: {0}")]
    Session(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptResult {
    /// TCP connect or SSH handshake failed.
    Unreachable(String),
    Rejected,
    /// Logged in, but running the identity check failed.
    SessionFailed(String),
    Authenticated { identity: String, is_root: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialAttempt {
    pub password: String,
    pub result: AttemptResult,
}

impl CredentialAttempt {
    pub fn resolves_to_root(&self) -> bool {
        matches!(self.result, AttemptResult::Authenticated { is_root: true, .. })
    }
}

/// Opens authenticated SSH sessions.
#[async_trait]
pub trait SshConnector: Send + Sync {
    /// Connects and authenticates. A wrong password is [`SshError::Rejected`].
    async fn connect(
        &self,
        addr: SocketAddr,
        user: &str,
        password: &str,
    ) -> Result<Box<dyn SshSession>, SshError>;
}

#[async_trait]
pub trait SshSession: Send {
    /// Runs one command and returns its standard output.
    async fn exec(&mut self, command: &str) -> Result<String, SshError>;

    async fn close(self: Box<Self>);
}

pub struct SshProbe {
    connector: Box<dyn SshConnector>,
    user: String,
    passwords: Vec<String>,
}

impl SshProbe {
    pub fn new(connector: Box<dyn SshConnector>, user: String, passwords: Vec<String>) -> Self {
        Self {
            connector,
            user,
            passwords,
        }
    }

    /// Tries every password in order and records one outcome per password.
    pub async fn spray(&self, addr: SocketAddr) -> Vec<CredentialAttempt> {
        let mut attempts: Vec<CredentialAttempt> = Vec::with_capacity(self.passwords.len());

        for password in &self.passwords {
            let result = self.attempt(addr, password).await;

            match &result {
                AttemptResult::Authenticated { is_root: true, .. } => {
                    info!(%addr, user = %self.user, %password, "SSH server responds to root");
                }
                AttemptResult::Authenticated { identity, .. } => {
                    info!(%addr, user = %self.user, %password, %identity, "SSH login does not resolve to root");
                }
                AttemptResult::Rejected => {
                    debug!(%addr, user = %self.user, %password, "SSH password rejected");
                }
                AttemptResult::Unreachable(reason) | AttemptResult::SessionFailed(reason) => {
                    debug!(%addr, %password, %reason, "SSH attempt failed");
                }
            }

            attempts.push(CredentialAttempt {
                password: password.clone(),
                result,
            });
        }

        attempts
    }

    async fn attempt(&self, addr: SocketAddr, password: &str) -> AttemptResult {
        let mut session = match self.connector.connect(addr, &self.user, password).await {
            Ok(session) => session,
            Err(SshError::Rejected) => return AttemptResult::Rejected,
            Err(e) => return AttemptResult::Unreachable(e.to_string()),
        };

        let result = match session.exec(WHOAMI).await {
            Ok(output) => {
                let identity = output.trim().to_string();
                AttemptResult::Authenticated {
                    is_root: identity == ROOT_IDENTITY,
                    identity,
                }
            }
            Err(e) => AttemptResult::SessionFailed(e.to_string()),
        };

        session.close().await;
        result
    }
}

struct AcceptAnyHostKey;

#[async_trait]
impl client::Handler for AcceptAnyHostKey {
    type Error = russh::Error;

    async fn check_server_key(&mut self, _server_public_key: &PublicKey) -> Result<bool, Self::Error> {
        Ok(true)
    }
}

/// [`SshConnector`] backed by `russh`.
pub struct RusshConnector {
    config: Arc<client::Config>,
    connect_timeout: Duration,
}

impl RusshConnector {
    pub fn new(connect_timeout: Duration) -> Self {
        let config = client::Config {
            inactivity_timeout: Some(COMMAND_TIMEOUT),
            ..Default::default()
        };
        Self {
            config: Arc::new(config),
            connect_timeout,
        }
    }
}

#[async_trait]
impl SshConnector for RusshConnector {
    async fn connect(
        &self,
        addr: SocketAddr,
        user: &str,
        password: &str,
    ) -> Result<Box<dyn SshSession>, SshError> {
        let mut handle = timeout(
            self.connect_timeout,
            client::connect(self.config.clone(), addr, AcceptAnyHostKey),
        )
        .await
        .map_err(|_| SshError::Timeout(self.connect_timeout))?
        .map_err(|e| SshError::Connect(e.to_string()))?;

        let authenticated = timeout(self.connect_timeout, handle.authenticate_password(user, password))
            .await
            .map_err(|_| SshError::Timeout(self.connect_timeout))?
            .map_err(|e| SshError::Connect(e.to_string()))?;

        if !authenticated {
            disconnect(&handle).await;
            return Err(SshError::Rejected);
        }

        Ok(Box::new(RusshSession { handle }))
    }
}

struct RusshSession {
    handle: Handle<AcceptAnyHostKey>,
}

#[async_trait]
impl SshSession for RusshSession {
    async fn exec(&mut self, command: &str) -> Result<String, SshError> {
        let run = async {
            let mut channel = self.handle.channel_open_session().await?;
            channel.exec(true, command).await?;

            let mut stdout: Vec<u8> = Vec::new();
            while let Some(msg) = channel.wait().await {
                if let ChannelMsg::Data { ref data } = msg {
                    stdout.extend_from_slice(&data[..]);
                }
            }
            Ok::<_, russh::Error>(stdout)
        };

        let stdout = timeout(COMMAND_TIMEOUT, run)
            .await
            .map_err(|_| SshError::Timeout(COMMAND_TIMEOUT))?
            .map_err(|e| SshError::Session(e.to_string()))?;

        Ok(String::from_utf8_lossy(&stdout).into_owned())
    }

    async fn close(self: Box<Self>) {
        disconnect(&self.handle).await;
    }
}

async fn disconnect(handle: &Handle<AcceptAnyHostKey>) {
    if let Err(e) = handle
        .disconnect(Disconnect::ByApplication, "", "English")
        .await
    {
        warn!(error = %e, "SSH disconnect failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};
    use std::sync::Mutex;

    /// Accepts one password and answers `whoami` with a fixed identity.
    struct FakeServer {
        accepted: &'static str,
        identity: &'static str,
        tried: Arc<Mutex<Vec<String>>>,
        closed: Arc<Mutex<usize>>,
    }

    struct FakeSession {
        identity: &'static str,
        closed: Arc<Mutex<usize>>,
    }

    #[async_trait]
    impl SshConnector for FakeServer {
        async fn connect(
            &self,
            _addr: SocketAddr,
            user: &str,
            password: &str,
        ) -> Result<Box<dyn SshSession>, SshError> {
            assert_eq!(user, "root");
            self.tried.lock().unwrap().push(password.to_string());
            if password == self.accepted {
                Ok(Box::new(FakeSession {
                    identity: self.identity,
                    closed: self.closed.clone(),
                }))
            } else {
                Err(SshError::Rejected)
            }
        }
    }

    #[async_trait]
    impl SshSession for FakeSession {
        async fn exec(&mut self, command: &str) -> Result<String, SshError> {
            assert_eq!(command, "whoami");
            Ok(format!("{}\n", self.identity))
        }

        async fn close(self: Box<Self>) {
            *self.closed.lock().unwrap() += 1;
        }
    }

    struct Unreachable;

    #[async_trait]
    impl SshConnector for Unreachable {
        async fn connect(
            &self,
            _addr: SocketAddr,
            _user: &str,
            _password: &str,
        ) -> Result<Box<dyn SshSession>, SshError> {
            Err(SshError::Connect("connection refused".into()))
        }
    }

    fn passwords() -> Vec<String> {
        ["password", "admin", "administrator", "root", ""]
            .iter()
            .map(|p| p.to_string())
            .collect()
    }

    fn target() -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 10)), 22)
    }

    #[tokio::test]
    async fn every_password_is_tried_in_order() {
        let tried = Arc::new(Mutex::new(Vec::new()));
        let closed = Arc::new(Mutex::new(0));
        let server = FakeServer {
            accepted: "admin",
            identity: "root",
            tried: tried.clone(),
            closed: closed.clone(),
        };
        let sprayer = SshProbe::new(Box::new(server), "root".into(), passwords());

        let attempts = sprayer.spray(target()).await;

        assert_eq!(*tried.lock().unwrap(), passwords());
        assert_eq!(attempts.len(), 5);
        assert_eq!(*closed.lock().unwrap(), 1);

        let rooted: Vec<&str> = attempts
            .iter()
            .filter(|a| a.resolves_to_root())
            .map(|a| a.password.as_str())
            .collect();
        assert_eq!(rooted, vec!["admin"]);
        assert_eq!(attempts[0].result, AttemptResult::Rejected);
    }

    #[tokio::test]
    async fn non_root_identity_is_reported() {
        let server = FakeServer {
            accepted: "",
            identity: "pi",
            tried: Arc::new(Mutex::new(Vec::new())),
            closed: Arc::new(Mutex::new(0)),
        };
        let sprayer = SshProbe::new(Box::new(server), "root".into(), passwords());

        let attempts = sprayer.spray(target()).await;

        assert_eq!(
            attempts[4].result,
            AttemptResult::Authenticated {
                identity: "pi".into(),
                is_root: false
            }
        );
        assert!(attempts.iter().all(|a| !a.resolves_to_root()));
    }

    #[tokio::test]
    async fn unreachable_server_still_records_each_candidate() {
        let sprayer = SshProbe::new(Box::new(Unreachable), "root".into(), passwords());

        let attempts = sprayer.spray(target()).await;

        assert_eq!(attempts.len(), 5);
        assert!(
            attempts
                .iter()
                .all(|a| matches!(a.result, AttemptResult::Unreachable(_)))
        );
    }

    /// Loopback SSH server: accepts only `admin` and answers every exec with `root`.
    #[derive(Clone)]
    struct AdminOnly;

    #[async_trait]
    impl russh::server::Handler for AdminOnly {
        type Error = russh::Error;

        async fn auth_password(&mut self, _user: &str, password: &str) -> Result<russh::server::Auth, Self::Error> {
            if password == "admin" {
                Ok(russh::server::Auth::Accept)
            } else {
                Ok(russh::server::Auth::Reject {
                    proceed_with_methods: None,
                })
            }
        }

        async fn channel_open_session(
            &mut self,
            _channel: russh::Channel<russh::server::Msg>,
            _session: &mut russh::server::Session,
        ) -> Result<bool, Self::Error> {
            Ok(true)
        }

        async fn exec_request(
            &mut self,
            channel: russh::ChannelId,
            _data: &[u8],
            session: &mut russh::server::Session,
        ) -> Result<(), Self::Error> {
            let _ = session.data(channel, russh::CryptoVec::from_slice(b"root\n"));
            let _ = session.exit_status_request(channel, 0);
            let _ = session.eof(channel);
            let _ = session.close(channel);
            Ok(())
        }
    }

    async fn spawn_admin_only_server() -> SocketAddr {
        let key: Option<russh_keys::key::KeyPair> = Option::from(russh_keys::key::KeyPair::generate_ed25519());
        let config = Arc::new(russh::server::Config {
            keys: key.into_iter().collect(),
            auth_rejection_time: Duration::from_millis(10),
            ..Default::default()
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                let config = config.clone();
                tokio::spawn(async move {
                    if let Ok(session) = russh::server::run_stream(config, socket, AdminOnly).await {
                        let _ = session.await;
                    }
                });
            }
        });
        addr
    }

    #[tokio::test]
    async fn russh_spray_against_loopback_server() {
        let addr = spawn_admin_only_server().await;
        let sprayer = SshProbe::new(
            Box::new(RusshConnector::new(Duration::from_secs(3))),
            "root".into(),
            passwords(),
        );

        let attempts = sprayer.spray(addr).await;

        let passwords_tried: Vec<&str> = attempts.iter().map(|a| a.password.as_str()).collect();
        assert_eq!(passwords_tried, vec!["password", "admin", "administrator", "root", ""]);
        assert_eq!(
            attempts[1].result,
            AttemptResult::Authenticated {
                identity: "root".into(),
                is_root: true
            }
        );
        for idx in [0, 2, 3, 4] {
            assert_eq!(attempts[idx].result, AttemptResult::Rejected, "password {:?}", attempts[idx].password);
        }
    }

    #[tokio::test]
    async fn russh_connector_maps_wrong_password_to_rejected() {
        let addr = spawn_admin_only_server().await;
        let connector = RusshConnector::new(Duration::from_secs(3));

        let result = connector.connect(addr, "root", "letmein").await;

        assert!(matches!(result, Err(SshError::Rejected)));
    }

    #[tokio::test]
    async fn russh_connector_reports_refused_port_as_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let connector = RusshConnector::new(Duration::from_secs(1));
        let result = connector.connect(addr, "root", "root").await;

        assert!(matches!(result, Err(SshError::Connect(_)) | Err(SshError::Timeout(_))));
    }
}
