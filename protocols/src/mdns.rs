use std::net::{Ipv4Addr, Ipv6Addr};

use anyhow::{Context, Result};
use simple_dns::rdata::RData;
use simple_dns::{Packet, PacketFlag};

/// The subset of DNS-SD records the browser cares about.
///
/// Names keep their original case; only the trailing root dot is removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    Ptr { name: String, target: String },
    Srv { name: String, target: String, port: u16 },
    Txt { name: String, entries: Vec<String> },
    A { name: String, addr: Ipv4Addr },
    Aaaa { name: String, addr: Ipv6Addr },
}

/// Extracts every supported record from an mDNS response.
///
/// Answers, authority and additional sections are all read, since responders
/// commonly put SRV/TXT/A records in the additional section. Queries yield an
/// empty list. Labels are UTF-8, so instance names like `John’s MacBook` parse.
pub fn extract_resources(data: &[u8]) -> Result<Vec<Resource>> {
    let packet = Packet::parse(data).context("failed to parse mDNS packet")?;
    if !packet.has_flags(PacketFlag::RESPONSE) {
        return Ok(Vec::new());
    }

    let mut resources: Vec<Resource> = Vec::new();

    for record in packet
        .answers
        .iter()
        .chain(packet.name_servers.iter())
        .chain(packet.additional_records.iter())
    {
        let name: String = strip_root(&record.name.to_string());

        let resource = match &record.rdata {
            RData::PTR(ptr) => Resource::Ptr {
                name,
                target: strip_root(&ptr.0.to_string()),
            },

            RData::SRV(srv) => Resource::Srv {
                name,
                target: strip_root(&srv.target.to_string()),
                port: srv.port,
            },

            RData::TXT(txt) => {
                let mut entries: Vec<String> = txt
                    .attributes()
                    .into_iter()
                    .map(|(key, value)| match value {
                        Some(value) => format!("{key}={value}"),
                        None => key,
                    })
                    .collect();
                entries.sort();
                Resource::Txt { name, entries }
            }

            RData::A(a) => Resource::A {
                name,
                addr: Ipv4Addr::from(a.address),
            },

            RData::AAAA(aaaa) => Resource::Aaaa {
                name,
                addr: Ipv6Addr::from(aaaa.address),
            },

            _ => continue,
        };

        resources.push(resource);
    }

    Ok(resources)
}

fn strip_root(name: &str) -> String {
    name.trim_end_matches('.').to_string()
}
