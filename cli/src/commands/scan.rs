use std::net::IpAddr;
use std::sync::Arc;
use std::time::Instant;

use lanprobe_common::config::Config;
use lanprobe_common::network::host::HostRecord;
use lanprobe_core::interact::Interactor;
use lanprobe_core::network::tcp::TcpProbe;
use lanprobe_core::scanner::{HostReport, HostScanner};

use crate::terminal::{progress, report};

/// Scans one address directly, without asking the network who is there.
pub async fn scan(target: IpAddr, cfg: &Config, q_level: u8) -> anyhow::Result<HostReport> {
    let scanner = HostScanner::new(
        cfg,
        Arc::new(TcpProbe::from_config(cfg)),
        Arc::new(Interactor::from_config(cfg)?),
    )
    .with_progress(progress::scan_callback());

    progress::start(&format!("Scanning {target}..."));
    let start_time: Instant = Instant::now();
    let host_report: HostReport = scanner.scan(HostRecord::from_ip(target)).await;
    progress::finish();

    report::hosts(std::slice::from_ref(&host_report), q_level);
    report::summary(&host_report.stats, start_time.elapsed(), q_level);
    Ok(host_report)
}
