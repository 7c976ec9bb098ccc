use std::time::Duration;

use colored::*;

use lanprobe_common::network::host::HostRecord;
use lanprobe_common::stats::ScanStatistics;
use lanprobe_core::interact::{AttemptResult, CredentialAttempt, HttpOutcome, Interaction};
use lanprobe_core::scanner::{HostReport, OpenPort};

use crate::mprint;
use crate::terminal::{colors, print};

type Detail = (String, ColoredString);

const BANNER_PREVIEW: usize = 48;

pub fn hosts(hosts: &[HostReport], q_level: u8) {
    if hosts.is_empty() {
        print::header("zero hosts detected", q_level);
        if q_level == 0 {
            print::no_results();
        }
        return;
    }

    print::header("scan results", q_level);
    if q_level > 1 {
        return;
    }

    for (idx, host) in hosts.iter().enumerate() {
        host_tree(host, idx);
        if idx + 1 != hosts.len() {
            mprint!();
        }
    }
}

pub fn summary(stats: &ScanStatistics, total_time: Duration, q_level: u8) {
    let hosts: ColoredString = format!("{} hosts", stats.hosts).bold().green();
    let ports: ColoredString = format!("{} open ports", stats.open_ports).bold().green();
    let total_time: ColoredString = format!("{:.2}s", total_time.as_secs_f64()).bold().yellow();
    let output: String = format!("Scan Complete: {ports} on {hosts} in {total_time}");

    print::fat_separator();
    print::centerln(&output);

    if q_level > 0 || stats.services.is_empty() {
        return;
    }

    mprint!();
    let key_width: usize = stats
        .services
        .keys()
        .map(|label| label.as_str().chars().count())
        .max()
        .unwrap_or(0);
    for (label, count) in &stats.services {
        print::aligned_line(label.as_str(), count.to_string().normal(), key_width);
    }
}

fn host_tree(report: &HostReport, idx: usize) {
    print::host_heading(idx, display_name(&report.host));

    let mut details: Vec<Detail> = address_details(&report.host);
    if report.target.is_none() {
        details.push(("Scan".to_string(), "skipped, no routable address".yellow()));
    } else if report.open_ports.is_empty() {
        details.push(("Ports".to_string(), "none open".normal()));
    }

    for open in &report.open_ports {
        details.push(port_detail(open));
        if let Some(interaction) = &open.interaction {
            details.push(interaction_detail(interaction));
        }
    }

    print::host_details(&details);
}

fn display_name(host: &HostRecord) -> &str {
    if host.hostname.is_empty() {
        &host.name
    } else {
        &host.hostname
    }
}

fn address_details(host: &HostRecord) -> Vec<Detail> {
    let mut details: Vec<Detail> = Vec::new();
    if host.name != host.hostname {
        details.push(("Service".to_string(), host.name.normal()));
    }
    if let Some(ipv4) = host.ipv4 {
        details.push(("IPv4".to_string(), ipv4.to_string().color(colors::IPV4_ADDR)));
    }
    if let Some(ipv6) = host.ipv6 {
        details.push(("IPv6".to_string(), ipv6.to_string().color(colors::IPV6_ADDR)));
    }
    details
}

fn port_detail(open: &OpenPort) -> Detail {
    let mut value: String = open.label.to_string();
    if let Some(banner) = open.banner.as_deref().and_then(first_line) {
        value = format!("{value} \"{banner}\"");
    }
    (format!("{}/tcp", open.port), value.color(colors::SERVICE))
}

fn first_line(banner: &str) -> Option<String> {
    let line: &str = banner.lines().map(str::trim).find(|line| !line.is_empty())?;
    let preview: String = line.chars().take(BANNER_PREVIEW).collect();
    Some(preview)
}

fn interaction_detail(interaction: &Interaction) -> Detail {
    match interaction {
        Interaction::Http(outcome) => ("http".to_string(), http_summary(outcome)),
        Interaction::Ssh(attempts) => ("ssh".to_string(), ssh_summary(attempts)),
    }
}

fn http_summary(outcome: &HttpOutcome) -> ColoredString {
    match outcome {
        HttpOutcome::Response { body, .. } => {
            let status: String = outcome.status_line().unwrap_or_default();
            let body: String = body.split_whitespace().collect::<Vec<&str>>().join(" ");
            format!("{status} {body}").trim_end().normal()
        }
        HttpOutcome::Failed { error, .. } => format!("failed: {error}").dimmed(),
    }
}

fn ssh_summary(attempts: &[CredentialAttempt]) -> ColoredString {
    let rooted: Vec<String> = attempts
        .iter()
        .filter(|attempt| attempt.resolves_to_root())
        .map(|attempt| format!("'{}'", attempt.password))
        .collect();

    if !rooted.is_empty() {
        return format!("root login with {}", rooted.join(", "))
            .color(colors::ROOT_LOGIN)
            .bold();
    }

    let other: Option<&String> = attempts.iter().find_map(|attempt| match &attempt.result {
        AttemptResult::Authenticated { identity, .. } => Some(identity),
        _ => None,
    });
    match other {
        Some(identity) => format!("login as '{identity}', not root").yellow(),
        None => format!("no login, {} tried", attempts.len()).normal(),
    }
}
