//! Per-host port scanning.
//!
//! [`HostScanner`] walks the configured port range of one host in ascending
//! order. For every open port it classifies the service, grabs a banner over a
//! second connection and, for HTTP and SSH, runs the matching interaction.
//! The whole range is always scanned.
//!
//! The prober and the interactor are trait objects so the orchestration can be
//! exercised against fakes without touching the network.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use lanprobe_common::config::Config;
use lanprobe_common::network::host::HostRecord;
use lanprobe_common::network::range::PortRange;
use lanprobe_common::service::{self, ServiceLabel};
use lanprobe_common::stats::ScanStatistics;

use crate::interact::{Interaction, ProtocolInteractor};
use crate::network::tcp::{PortProber, PortResult};

/// Progress of the scan of one host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanProgress {
    pub port: u16,
    /// Ports finished so far, including `port`.
    pub scanned: usize,
    pub total: usize,
}

pub type ProgressCallback = Arc<dyn Fn(ScanProgress) + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenPort {
    pub port: u16,
    pub label: ServiceLabel,
    pub banner: Option<String>,
    pub interaction: Option<Interaction>,
}

#[derive(Debug, Clone)]
pub struct HostReport {
    pub host: HostRecord,
    /// `None` when the record carried no usable address.
    pub target: Option<IpAddr>,
    /// Ascending by port.
    pub open_ports: Vec<OpenPort>,
    pub stats: ScanStatistics,
}

impl HostReport {
    pub fn interactions(&self) -> impl Iterator<Item = &Interaction> {
        self.open_ports.iter().filter_map(|p| p.interaction.as_ref())
    }
}

pub struct HostScanner {
    ports: PortRange,
    concurrency: usize,
    prober: Arc<dyn PortProber>,
    interactor: Arc<dyn ProtocolInteractor>,
    on_progress: Option<ProgressCallback>,
}

impl HostScanner {
    pub fn new(cfg: &Config, prober: Arc<dyn PortProber>, interactor: Arc<dyn ProtocolInteractor>) -> Self {
        Self {
            ports: cfg.ports,
            concurrency: cfg.scan_concurrency.max(1),
            prober,
            interactor,
            on_progress: None,
        }
    }

    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.on_progress = Some(callback);
        self
    }

    /// Scans one host and returns its report. The record's statistics count it as one host.
    pub async fn scan(&self, host: HostRecord) -> HostReport {
        let mut stats = ScanStatistics::new();
        stats.record_host();

        let Some(target) = host.scan_target() else {
            warn!(name = %host.name, "host has no routable address, skipping port scan");
            return HostReport {
                host,
                target: None,
                open_ports: Vec::new(),
                stats,
            };
        };

        info!(%target, ports = %self.ports, "scanning ports");
        let total: usize = self.ports.len();
        let mut open_ports: Vec<OpenPort> = Vec::new();

        // `buffered` yields in input order, so results stay ascending whatever the concurrency.
        let mut results = stream::iter(self.ports.to_iter())
            .map(|port| self.prober.probe(SocketAddr::new(target, port)))
            .buffered(self.concurrency);

        let mut scanned: usize = 0;
        while let Some(result) = results.next().await {
            scanned += 1;
            if let Some(callback) = &self.on_progress {
                callback(ScanProgress {
                    port: result.port,
                    scanned,
                    total,
                });
            }

            if !result.open {
                continue;
            }

            let open_port = self.inspect(target, result.port).await;
            stats.record_open_port(open_port.label);
            open_ports.push(open_port);
        }

        info!(%target, open = stats.open_ports, "host scan complete");
        HostReport {
            host,
            target: Some(target),
            open_ports,
            stats,
        }
    }

    async fn inspect(&self, target: IpAddr, port: u16) -> OpenPort {
        let addr = SocketAddr::new(target, port);
        info!(port, "port is open");

        let label: ServiceLabel = service::classify(port);

        let banner: PortResult = self.prober.grab_banner(addr).await;
        let banner: Option<String> = banner.banner_text().filter(|text| !text.is_empty());
        if let Some(text) = &banner {
            info!(port, "service message: {}", text.trim_end());
        }

        let mut interaction: Option<Interaction> = None;
        if label.is_known() {
            info!(port, service = %label, "port is likely associated with {label}");
            interaction = self.interactor.interact(label, addr).await;
        }

        OpenPort {
            port,
            label,
            banner,
            interaction,
        }
    }
}
