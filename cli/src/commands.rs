pub mod run;
pub mod scan;
pub mod services;

use std::net::IpAddr;
use std::time::Duration;

use clap::{ArgAction, Parser, Subcommand};
use lanprobe_common::config::Config;
use lanprobe_common::network::range::PortRange;

#[derive(Parser)]
#[command(name = "lanprobe")]
#[command(version, about = "Finds devices announced over mDNS and probes their open services.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Ports to scan on every host, e.g. `1-10000` or `22`
    #[arg(long, global = true)]
    pub ports: Option<PortRange>,

    /// Seconds to wait for a TCP connect
    #[arg(long, global = true, value_parser = parse_secs)]
    pub connect_timeout: Option<Duration>,

    /// Seconds to wait for a service banner
    #[arg(long, global = true, value_parser = parse_secs)]
    pub banner_timeout: Option<Duration>,

    /// Seconds allowed for one HTTP request
    #[arg(long, global = true, value_parser = parse_secs)]
    pub http_timeout: Option<Duration>,

    /// Seconds to listen for mDNS answers
    #[arg(long, global = true, value_parser = parse_secs)]
    pub browse_timeout: Option<Duration>,

    /// User for the SSH password attempts
    #[arg(long, global = true)]
    pub user: Option<String>,

    /// SSH password to try; repeat to build a list that replaces the defaults
    #[arg(long = "password", global = true)]
    pub passwords: Vec<String>,

    /// Number of ports probed at once per host
    #[arg(long, global = true)]
    pub concurrency: Option<usize>,

    /// Exit right after the report instead of waiting for Ctrl-C
    #[arg(long, global = true)]
    pub no_wait: bool,

    #[arg(short, long, global = true, action = ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub quiet: u8,
}

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Discover hosts over mDNS and scan every one of them
    #[command(alias = "r")]
    Run,
    /// Scan a single address without discovery
    #[command(alias = "s")]
    Scan { target: IpAddr },
    /// List the ports the service catalog recognises
    #[command(alias = "ls")]
    Services,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Applies the flags that were given on top of [`Config::default`].
    pub fn to_config(&self) -> Config {
        let mut cfg = Config::default();

        if let Some(ports) = self.ports {
            cfg.ports = ports;
        }
        if let Some(timeout) = self.connect_timeout {
            cfg.connect_timeout = timeout;
        }
        if let Some(timeout) = self.banner_timeout {
            cfg.banner_timeout = timeout;
        }
        if let Some(timeout) = self.http_timeout {
            cfg.http_timeout = timeout;
        }
        if let Some(timeout) = self.browse_timeout {
            cfg.browse_timeout = timeout;
        }
        if let Some(user) = &self.user {
            cfg.ssh_user = user.clone();
        }
        if !self.passwords.is_empty() {
            cfg.ssh_passwords = self.passwords.clone();
        }
        if let Some(concurrency) = self.concurrency {
            cfg.scan_concurrency = concurrency;
        }

        cfg
    }
}

fn parse_secs(s: &str) -> Result<Duration, String> {
    let secs: f64 = s.parse().map_err(|_| format!("'{s}' is not a number of seconds"))?;
    Duration::try_from_secs_f64(secs).map_err(|e| format!("'{s}': {e}"))
}
