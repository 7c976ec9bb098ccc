//! # Discovery Service
//!
//! Implements the "discover, then scan everything found" use case.
//!
//! A [`HostDiscovery`] implementation produces host records into a bounded
//! channel while [`DiscoveryService`] consumes them, one full scan pass per
//! host, and folds the per-host statistics into a single [`RunReport`].

use std::io;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{info, warn};

use lanprobe_common::network::host::HostRecord;
use lanprobe_common::stats::ScanStatistics;

use crate::scanner::{HostReport, HostScanner};

/// Depth of the queue between discovery and scanning.
pub const DISCOVERY_QUEUE_DEPTH: usize = 4;

#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Nobody answered. Treated as an empty result, not a failure.
    #[error("no mDNS responders answered within {0:?}")]
    NoResponders(Duration),
    #[error("failed to open mDNS socket")]
    Socket(#[source] io::Error),
    #[error("failed to send mDNS query")]
    Query(#[source] anyhow::Error),
}

impl DiscoveryError {
    pub fn is_empty_result(&self) -> bool {
        matches!(self, DiscoveryError::NoResponders(_))
    }
}

/// Source of discovered hosts.
///
/// Implementations send records in whatever order they resolve and return
/// when done; dropping `tx` closes the stream for the consumer.
#[async_trait]
pub trait HostDiscovery: Send + Sync {
    async fn discover(&self, tx: mpsc::Sender<HostRecord>) -> Result<(), DiscoveryError>;
}

/// Aggregated outcome of a whole run.
#[derive(Debug, Default)]
pub struct RunReport {
    pub stats: ScanStatistics,
    /// In arrival order.
    pub hosts: Vec<HostReport>,
}

impl RunReport {
    pub fn record(&mut self, host: HostReport) {
        self.stats.merge(&host.stats);
        self.hosts.push(host);
    }
}

/// Orchestrates a run by:
/// 1. letting the [`HostDiscovery`] collaborator find hosts.
/// 2. driving one [`HostScanner`] pass per host as records arrive.
pub struct DiscoveryService {
    discovery: Box<dyn HostDiscovery>,
    scanner: HostScanner,
}

impl DiscoveryService {
    pub fn new(discovery: Box<dyn HostDiscovery>, scanner: HostScanner) -> Self {
        Self { discovery, scanner }
    }

    /// Runs discovery and scanning side by side until discovery closes the stream.
    ///
    /// "No responders" yields an empty report. Any other discovery error is
    /// returned; it occurs before any record is produced, so nothing has been
    /// scanned by then.
    pub async fn perform(&self) -> Result<RunReport, DiscoveryError> {
        let (tx, rx) = mpsc::channel::<HostRecord>(DISCOVERY_QUEUE_DEPTH);

        let (discovered, report) = tokio::join!(self.discovery.discover(tx), self.consume(rx));

        match discovered {
            Ok(()) => Ok(report),
            Err(e) if e.is_empty_result() => {
                warn!("{e}");
                Ok(report)
            }
            Err(e) => Err(e),
        }
    }

    /// Scans every host received on `rx`, one at a time, until the channel closes.
    pub async fn consume(&self, mut rx: mpsc::Receiver<HostRecord>) -> RunReport {
        let mut report = RunReport::default();

        while let Some(host) = rx.recv().await {
            info!(
                name = %host.name,
                host = %host.hostname,
                ipv4 = ?host.ipv4,
                ipv6 = ?host.ipv6,
                port = host.port,
                "found entry"
            );
            for (key, value) in &host.metadata {
                info!("  {key}: {value}");
            }

            report.record(self.scanner.scan(host).await);
        }

        info!(
            hosts = report.stats.hosts,
            open_ports = report.stats.open_ports,
            "scan finished"
        );
        report
    }
}
