use std::net::{Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use lanprobe_common::config::{Config, DEFAULT_SSH_PASSWORDS};
use lanprobe_common::network::host::HostRecord;
use lanprobe_common::network::range::PortRange;
use lanprobe_common::service::ServiceLabel;
use lanprobe_core::discovery::DiscoveryService;
use lanprobe_core::interact::{AttemptResult, HttpOutcome, HttpProbe, Interaction, Interactor, SshProbe};
use lanprobe_core::network::tcp::TcpProbe;
use lanprobe_core::scanner::HostScanner;

use crate::support::{FixedPorts, LocalHttp, SinglePasswordServer, StaticDiscovery, banner_server, http_server};

fn device(last_octet: u8) -> HostRecord {
    HostRecord::new(format!("device-{last_octet}._http._tcp.local"), format!("device-{last_octet}.local"))
        .with_ipv4(Ipv4Addr::new(192, 168, 1, last_octet))
}

fn passwords() -> Vec<String> {
    DEFAULT_SSH_PASSWORDS.iter().map(|p| p.to_string()).collect()
}

fn ssh_probe(accepted: &'static str, tried: Arc<Mutex<Vec<String>>>) -> SshProbe {
    let server = SinglePasswordServer {
        accepted,
        identity: "root",
        tried,
    };
    SshProbe::new(Box::new(server), "root".into(), passwords())
}

#[tokio::test]
async fn host_without_open_ports_reports_nothing() {
    let cfg = Config::default();
    let prober = FixedPorts::new(&[]);
    let scanner = HostScanner::new(&cfg, prober.clone(), Arc::new(Interactor::from_config(&cfg).unwrap()));

    let report = scanner.scan(device(10)).await;

    assert_eq!(*prober.probed.lock().unwrap(), 10_000);
    assert_eq!(report.stats.hosts, 1);
    assert_eq!(report.stats.open_ports, 0);
    assert!(report.stats.services.is_empty());
    assert!(report.open_ports.is_empty());
    assert_eq!(report.interactions().count(), 0);
}

#[tokio::test]
async fn web_server_body_is_captured_and_truncated() {
    let cfg = Config::default();
    let server: SocketAddr = http_server("a".repeat(250)).await;
    let interactor = LocalHttp {
        http: HttpProbe::new(Duration::from_secs(5), cfg.http_body_limit).unwrap(),
        server,
        ssh: ssh_probe("admin", Arc::default()),
    };
    let scanner = HostScanner::new(&cfg, FixedPorts::new(&[80]), Arc::new(interactor));

    let report = scanner.scan(device(11)).await;

    assert_eq!(report.stats.open_ports, 1);
    assert_eq!(report.stats.service_count(ServiceLabel::Http), 1);
    assert_eq!(report.stats.services.len(), 1);

    let interactions: Vec<&Interaction> = report.interactions().collect();
    assert_eq!(interactions.len(), 1);
    match interactions[0] {
        Interaction::Http(HttpOutcome::Response {
            status,
            body,
            truncated,
            ..
        }) => {
            assert_eq!(*status, 200);
            assert!(*truncated);
            assert_eq!(body, &format!("{}...", "a".repeat(100)));
        }
        other => panic!("unexpected interaction: {other:?}"),
    }
}

#[tokio::test]
async fn ssh_spray_finds_the_root_password() {
    let cfg = Config::default();
    let tried: Arc<Mutex<Vec<String>>> = Arc::default();
    let interactor = Interactor::new(
        HttpProbe::new(cfg.http_timeout, cfg.http_body_limit).unwrap(),
        ssh_probe("admin", tried.clone()),
    );
    let scanner = HostScanner::new(&cfg, FixedPorts::new(&[22]), Arc::new(interactor));

    let report = scanner.scan(device(12)).await;

    assert_eq!(report.stats.open_ports, 1);
    assert_eq!(report.stats.service_count(ServiceLabel::Ssh), 1);
    assert_eq!(*tried.lock().unwrap(), passwords());

    let Some(Interaction::Ssh(attempts)) = report.open_ports[0].interaction.as_ref() else {
        panic!("SSH port was not interacted with");
    };
    assert_eq!(attempts.len(), 5);
    for attempt in attempts {
        if attempt.password == "admin" {
            assert!(attempt.resolves_to_root());
        } else {
            assert_eq!(attempt.result, AttemptResult::Rejected);
        }
    }
}

#[tokio::test]
async fn zero_discovered_hosts_is_an_empty_run() {
    let cfg = Config::default();
    let scanner = HostScanner::new(&cfg, FixedPorts::new(&[22]), Arc::new(Interactor::from_config(&cfg).unwrap()));
    let discovery = StaticDiscovery {
        hosts: Vec::new(),
        silent: false,
    };

    let report = DiscoveryService::new(Box::new(discovery), scanner).perform().await.unwrap();

    assert!(report.hosts.is_empty());
    assert_eq!(report.stats.hosts, 0);
    assert_eq!(report.stats.open_ports, 0);
    assert!(report.stats.services.is_empty());
}

#[tokio::test]
async fn silent_network_is_not_an_error() {
    let cfg = Config::default();
    let scanner = HostScanner::new(&cfg, FixedPorts::new(&[]), Arc::new(Interactor::from_config(&cfg).unwrap()));
    let discovery = StaticDiscovery {
        hosts: vec![device(13)],
        silent: true,
    };

    let report = DiscoveryService::new(Box::new(discovery), scanner).perform().await.unwrap();

    assert!(report.hosts.is_empty());
    assert!(report.stats.is_empty());
}

#[tokio::test]
async fn discovered_loopback_hosts_are_scanned_with_real_sockets() {
    let first: SocketAddr = banner_server("HELLO lanprobe\r\n").await;
    let second: SocketAddr = banner_server("").await;
    let low = first.port().min(second.port());
    let high = first.port().max(second.port());

    let cfg = Config {
        ports: PortRange::new(low, high),
        connect_timeout: Duration::from_millis(500),
        banner_timeout: Duration::from_millis(200),
        scan_concurrency: 64,
        ..Config::default()
    };
    let scanner = HostScanner::new(
        &cfg,
        Arc::new(TcpProbe::from_config(&cfg)),
        Arc::new(Interactor::from_config(&cfg).unwrap()),
    );
    let loopback = HostRecord::new("loopback._test._tcp.local", "localhost.local").with_ipv4(Ipv4Addr::LOCALHOST);
    let discovery = StaticDiscovery {
        hosts: vec![loopback.clone(), loopback.with_port(9)],
        silent: false,
    };

    let report = DiscoveryService::new(Box::new(discovery), scanner).perform().await.unwrap();

    assert_eq!(report.stats.hosts, 2);
    assert_eq!(report.hosts.len(), 2);
    assert_eq!(report.hosts[1].host.port, 9);

    for host in &report.hosts {
        let ports: Vec<u16> = host.open_ports.iter().map(|p| p.port).collect();
        assert!(ports.contains(&first.port()));
        assert!(ports.contains(&second.port()));
        assert!(ports.windows(2).all(|w| w[0] < w[1]));

        let greeted = host.open_ports.iter().find(|p| p.port == first.port()).unwrap();
        assert_eq!(greeted.banner.as_deref(), Some("HELLO lanprobe\r\n"));
        let silent = host.open_ports.iter().find(|p| p.port == second.port()).unwrap();
        assert_eq!(silent.banner, None);
    }
    assert_eq!(report.stats.open_ports, report.hosts.iter().map(|h| h.stats.open_ports).sum::<u64>());
}
