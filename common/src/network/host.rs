use std::collections::BTreeMap;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// A device announced through DNS-SD.
///
/// Produced once by the discovery side and handed to the scanner by value.
/// Nothing mutates it after it has been assembled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostRecord {
    /// Service instance name, e.g. `Living Room._googlecast._tcp.local`.
    pub name: String,
    /// Target of the SRV record, e.g. `chromecast-1234.local`.
    pub hostname: String,
    pub ipv4: Option<Ipv4Addr>,
    pub ipv6: Option<Ipv6Addr>,
    /// Port advertised in the SRV record. Unrelated to what gets scanned.
    pub port: u16,
    /// TXT record entries. Entries without `=` are stored with an empty value.
    pub metadata: BTreeMap<String, String>,
}

impl HostRecord {
    pub fn new(name: impl Into<String>, hostname: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hostname: hostname.into(),
            ipv4: None,
            ipv6: None,
            port: 0,
            metadata: BTreeMap::new(),
        }
    }

    /// A record for an address that was not discovered but given directly.
    pub fn from_ip(ip: IpAddr) -> Self {
        let record = Self::new(ip.to_string(), ip.to_string());
        match ip {
            IpAddr::V4(v4) => record.with_ipv4(v4),
            IpAddr::V6(v6) => record.with_ipv6(v6),
        }
    }

    pub fn with_ipv4(mut self, addr: Ipv4Addr) -> Self {
        self.ipv4 = Some(addr);
        self
    }

    pub fn with_ipv6(mut self, addr: Ipv6Addr) -> Self {
        self.ipv6 = Some(addr);
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Address the port scan is aimed at.
    ///
    /// IPv4 is preferred. Unspecified addresses (`0.0.0.0`, `::`) count as absent,
    /// and so do link-local IPv6 ones (`fe80::/10`): without the interface scope
    /// they cannot be connected to.
    pub fn scan_target(&self) -> Option<IpAddr> {
        self.ipv4
            .filter(|v4| !v4.is_unspecified())
            .map(IpAddr::V4)
            .or_else(|| {
                self.ipv6
                    .filter(|v6| !v6.is_unspecified() && !v6.is_unicast_link_local())
                    .map(IpAddr::V6)
            })
    }

    /// Parses one TXT string (`key=value`) into the metadata map.
    pub fn insert_txt(&mut self, entry: &str) {
        if entry.is_empty() {
            return;
        }
        match entry.split_once('=') {
            Some((key, value)) => self.metadata.insert(key.to_string(), value.to_string()),
            None => self.metadata.insert(entry.to_string(), String::new()),
        };
    }
}
