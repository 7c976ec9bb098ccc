use std::collections::BTreeMap;

use crate::service::ServiceLabel;

/// Counters accumulated while scanning.
///
/// A value is created per host by the scanner and merged into the run-wide
/// value by the consumer. Counters only ever grow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanStatistics {
    pub hosts: u64,
    pub open_ports: u64,
    /// Only known labels are counted here.
    pub services: BTreeMap<ServiceLabel, u64>,
}

impl ScanStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_host(&mut self) {
        self.hosts += 1;
    }

    /// Counts one open port. `Unknown` labels only bump `open_ports`.
    pub fn record_open_port(&mut self, label: ServiceLabel) {
        self.open_ports += 1;
        if label.is_known() {
            *self.services.entry(label).or_insert(0) += 1;
        }
    }

    pub fn merge(&mut self, other: &ScanStatistics) {
        self.hosts += other.hosts;
        self.open_ports += other.open_ports;
        for (label, count) in &other.services {
            *self.services.entry(*label).or_insert(0) += count;
        }
    }

    pub fn service_count(&self, label: ServiceLabel) -> u64 {
        self.services.get(&label).copied().unwrap_or(0)
    }

    pub fn labelled_ports(&self) -> u64 {
        self.services.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts == 0 && self.open_ports == 0 && self.services.is_empty()
    }
}
