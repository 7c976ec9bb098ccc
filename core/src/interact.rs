//! Active, protocol-specific exchanges with services the catalog recognises.
//!
//! Only HTTP and SSH get an interaction. Each call is one-shot and keeps no
//! state between invocations.

pub mod http;
pub mod ssh;

use std::net::SocketAddr;

use async_trait::async_trait;

use lanprobe_common::config::Config;
use lanprobe_common::service::ServiceLabel;

pub use http::{HttpOutcome, HttpProbe};
pub use ssh::{AttemptResult, CredentialAttempt, RusshConnector, SshConnector, SshProbe};

/// What an interaction observed on one open port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interaction {
    Http(HttpOutcome),
    /// One entry per candidate password, in the order they were tried.
    Ssh(Vec<CredentialAttempt>),
}

#[async_trait]
pub trait ProtocolInteractor: Send + Sync {
    async fn http(&self, addr: SocketAddr) -> HttpOutcome;
    async fn ssh(&self, addr: SocketAddr) -> Vec<CredentialAttempt>;

    /// Dispatches on the port's label. `None` for labels that get no interaction.
    async fn interact(&self, label: ServiceLabel, addr: SocketAddr) -> Option<Interaction> {
        match label {
            ServiceLabel::Http => Some(Interaction::Http(self.http(addr).await)),
            ServiceLabel::Ssh => Some(Interaction::Ssh(self.ssh(addr).await)),
            _ => None,
        }
    }
}

/// The production interactor: `reqwest` for HTTP, `russh` for SSH.
pub struct Interactor {
    http: HttpProbe,
    ssh: SshProbe,
}

impl Interactor {
    pub fn new(http: HttpProbe, ssh: SshProbe) -> Self {
        Self { http, ssh }
    }

    pub fn from_config(cfg: &Config) -> anyhow::Result<Self> {
        let http = HttpProbe::new(cfg.http_timeout, cfg.http_body_limit)?;
        let ssh = SshProbe::new(
            Box::new(RusshConnector::new(cfg.connect_timeout)),
            cfg.ssh_user.clone(),
            cfg.ssh_passwords.clone(),
        );
        Ok(Self::new(http, ssh))
    }
}

#[async_trait]
impl ProtocolInteractor for Interactor {
    async fn http(&self, addr: SocketAddr) -> HttpOutcome {
        self.http.fetch(addr).await
    }

    async fn ssh(&self, addr: SocketAddr) -> Vec<CredentialAttempt> {
        self.ssh.spray(addr).await
    }
}
