use std::time::Duration;

use thiserror::Error;

use crate::network::range::PortRange;

pub const DEFAULT_SSH_USER: &str = "root";
pub const DEFAULT_SSH_PASSWORDS: [&str; 5] = ["password", "admin", "administrator", "root", ""];

/// Tunables for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Ports scanned on every host, in ascending order.
    pub ports: PortRange,
    /// Upper bound for every TCP connect, including the SSH handshake.
    pub connect_timeout: Duration,
    /// How long the banner grab waits for the first bytes.
    pub banner_timeout: Duration,
    /// Maximum number of banner bytes kept.
    pub banner_size: usize,
    /// Upper bound for the whole HTTP exchange.
    pub http_timeout: Duration,
    /// Characters of the HTTP body kept before truncation.
    pub http_body_limit: usize,
    pub ssh_user: String,
    /// Tried in order, every one of them, against each SSH port.
    pub ssh_passwords: Vec<String>,
    /// How long the mDNS browser listens for answers.
    pub browse_timeout: Duration,
    /// Number of connect probes in flight per host. `1` scans strictly one port at a time.
    pub scan_concurrency: usize,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("port range {0} must start at 1 or above")]
    ZeroPort(PortRange),
    #[error("port range {0} is empty")]
    EmptyRange(PortRange),
    #[error("{0} timeout must be greater than zero")]
    ZeroTimeout(&'static str),
    #[error("scan concurrency must be at least 1")]
    ZeroConcurrency,
    #[error("banner size must be at least 1 byte")]
    ZeroBannerSize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ports: PortRange::default(),
            connect_timeout: Duration::from_secs(3),
            banner_timeout: Duration::from_secs(2),
            banner_size: 1024,
            http_timeout: Duration::from_secs(10),
            http_body_limit: 100,
            ssh_user: DEFAULT_SSH_USER.to_string(),
            ssh_passwords: DEFAULT_SSH_PASSWORDS.iter().map(|p| p.to_string()).collect(),
            browse_timeout: Duration::from_secs(5),
            scan_concurrency: 1,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ports.is_empty() {
            return Err(ConfigError::EmptyRange(self.ports));
        }
        if self.ports.start_port == 0 {
            return Err(ConfigError::ZeroPort(self.ports));
        }

        let timeouts = [
            ("connect", self.connect_timeout),
            ("banner", self.banner_timeout),
            ("http", self.http_timeout),
            ("browse", self.browse_timeout),
        ];
        if let Some((name, _)) = timeouts.iter().find(|(_, t)| t.is_zero()) {
            return Err(ConfigError::ZeroTimeout(name));
        }

        if self.scan_concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        if self.banner_size == 0 {
            return Err(ConfigError::ZeroBannerSize);
        }
        Ok(())
    }
}
