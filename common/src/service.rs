//! # Service Catalog
//!
//! Static port → service table used to label open ports.
//!
//! The label depends on the port number and nothing else, so the same port
//! always yields the same label. Adding a mapping is a change to [`classify`]
//! and [`CATALOG`] only.

use std::fmt;

/// Well-known services that can be recognised from a port number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ServiceLabel {
    Ssh,
    Http,
    Rtsp,
    Mdns,
    GoogleCast,
    Dlna,
    Ntp,
    Ssdp,
    Upnp,
    BonjourSleepProxy,
    AirPlay,
    AirTunes,
    PlayStation,
    PlexMediaServer,
    Itunes,
    WebServicesForDevices,
    WindowsRemoteManagement,
    SynologyDiskStation,
    UpnpIgd,
    RokuMediaServer,
    /// The port is not in the table.
    Unknown,
}

/// Every `(port, label)` pair known to [`classify`], sorted by port.
pub const CATALOG: &[(u16, ServiceLabel)] = &[
    (22, ServiceLabel::Ssh),
    (80, ServiceLabel::Http),
    (123, ServiceLabel::Ntp),
    (443, ServiceLabel::Http),
    (554, ServiceLabel::Rtsp),
    (1900, ServiceLabel::Ssdp),
    (1901, ServiceLabel::PlayStation),
    (2869, ServiceLabel::Upnp),
    (3689, ServiceLabel::Itunes),
    (5000, ServiceLabel::SynologyDiskStation),
    (5350, ServiceLabel::BonjourSleepProxy),
    (5351, ServiceLabel::BonjourSleepProxy),
    (5353, ServiceLabel::Mdns),
    (5357, ServiceLabel::WebServicesForDevices),
    (5431, ServiceLabel::UpnpIgd),
    (8008, ServiceLabel::GoogleCast),
    (8009, ServiceLabel::GoogleCast),
    (9000, ServiceLabel::Dlna),
    (9090, ServiceLabel::AirPlay),
    (9091, ServiceLabel::AirTunes),
    (10243, ServiceLabel::WindowsRemoteManagement),
    (32400, ServiceLabel::PlexMediaServer),
    (32469, ServiceLabel::RokuMediaServer),
];

/// Maps a TCP port to its service label.
pub fn classify(port: u16) -> ServiceLabel {
    match port {
        22 => ServiceLabel::Ssh,
        80 | 443 => ServiceLabel::Http,
        554 => ServiceLabel::Rtsp,
        5353 => ServiceLabel::Mdns,
        8008 | 8009 => ServiceLabel::GoogleCast,
        9000 => ServiceLabel::Dlna,
        123 => ServiceLabel::Ntp,
        1900 => ServiceLabel::Ssdp,
        2869 => ServiceLabel::Upnp,
        5350 | 5351 => ServiceLabel::BonjourSleepProxy,
        9090 => ServiceLabel::AirPlay,
        9091 => ServiceLabel::AirTunes,
        1901 => ServiceLabel::PlayStation,
        32400 => ServiceLabel::PlexMediaServer,
        3689 => ServiceLabel::Itunes,
        5357 => ServiceLabel::WebServicesForDevices,
        10243 => ServiceLabel::WindowsRemoteManagement,
        5000 => ServiceLabel::SynologyDiskStation,
        5431 => ServiceLabel::UpnpIgd,
        32469 => ServiceLabel::RokuMediaServer,
        _ => ServiceLabel::Unknown,
    }
}

impl ServiceLabel {
    pub fn is_known(self) -> bool {
        self != ServiceLabel::Unknown
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ServiceLabel::Ssh => "SSH",
            ServiceLabel::Http => "HTTP",
            ServiceLabel::Rtsp => "RTSP",
            ServiceLabel::Mdns => "mDNS",
            ServiceLabel::GoogleCast => "Google Cast",
            ServiceLabel::Dlna => "DLNA",
            ServiceLabel::Ntp => "NTP",
            ServiceLabel::Ssdp => "SSDP",
            ServiceLabel::Upnp => "UPnP",
            ServiceLabel::BonjourSleepProxy => "Bonjour Sleep Proxy",
            ServiceLabel::AirPlay => "AirPlay",
            ServiceLabel::AirTunes => "AirTunes",
            ServiceLabel::PlayStation => "PlayStation",
            ServiceLabel::PlexMediaServer => "Plex Media Server",
            ServiceLabel::Itunes => "iTunes",
            ServiceLabel::WebServicesForDevices => "Web Services for Devices",
            ServiceLabel::WindowsRemoteManagement => "Windows Remote Management",
            ServiceLabel::SynologyDiskStation => "Synology DiskStation Manager",
            ServiceLabel::UpnpIgd => "UPnP IGD",
            ServiceLabel::RokuMediaServer => "Roku Media Server",
            ServiceLabel::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ServiceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
