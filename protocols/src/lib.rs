//! Wire formats spoken during discovery.
//!
//! * [`dns`]: building DNS-SD questions.
//! * [`mdns`]: pulling typed resource records out of mDNS answers.
//! * [`dnssd`]: folding those records into [`HostRecord`](lanprobe_common::network::host::HostRecord)s.

pub mod dns;
pub mod dnssd;
pub mod mdns;
