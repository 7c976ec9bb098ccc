use std::sync::Arc;
use std::time::{Duration, Instant};

use lanprobe_common::config::Config;
use lanprobe_core::discovery::{DiscoveryService, RunReport};
use lanprobe_core::interact::Interactor;
use lanprobe_core::network::mdns::MdnsBrowser;
use lanprobe_core::network::tcp::TcpProbe;
use lanprobe_core::scanner::HostScanner;

use crate::terminal::{progress, report};

/// Discovers hosts over mDNS and scans each one as it resolves.
pub async fn run(cfg: &Config, q_level: u8) -> anyhow::Result<RunReport> {
    let scanner = HostScanner::new(
        cfg,
        Arc::new(TcpProbe::from_config(cfg)),
        Arc::new(Interactor::from_config(cfg)?),
    )
    .with_progress(progress::scan_callback());
    let service = DiscoveryService::new(Box::new(MdnsBrowser::new(cfg.browse_timeout)), scanner);

    progress::start("Listening for mDNS responders...");
    let start_time: Instant = Instant::now();
    let outcome = service.perform().await;
    progress::finish();

    let run_report: RunReport = outcome?;
    print_report(&run_report, start_time.elapsed(), q_level);
    Ok(run_report)
}

fn print_report(run_report: &RunReport, total_time: Duration, q_level: u8) {
    report::hosts(&run_report.hosts, q_level);
    report::summary(&run_report.stats, total_time, q_level);
}
