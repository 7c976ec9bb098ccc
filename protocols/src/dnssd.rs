//! # DNS-SD Assembly
//!
//! mDNS answers arrive piecemeal: a PTR names an instance, an SRV points the
//! instance at a host, TXT carries metadata, A/AAAA give the host addresses.
//! [`ServiceAssembler`] folds records in whatever order they show up and hands
//! out each instance as a [`HostRecord`] once it is usable.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::net::{Ipv4Addr, Ipv6Addr};

use lanprobe_common::network::host::HostRecord;
use tracing::debug;

use crate::dns::{SERVICE_TYPE_ENUMERATION, normalize_name};
use crate::mdns::Resource;

#[derive(Debug, Default)]
struct Instance {
    name: String,
    hostname: Option<String>,
    port: u16,
    txt: Vec<String>,
}

#[derive(Debug, Default)]
struct Addresses {
    ipv4: Option<Ipv4Addr>,
    ipv6: Option<Ipv6Addr>,
}

#[derive(Debug, Default)]
pub struct ServiceAssembler {
    /// Service types already known, keyed by normalized name.
    service_types: HashSet<String>,
    /// Service types learned but not yet handed out through [`Self::take_new_service_types`].
    pending_types: Vec<String>,
    instances: BTreeMap<String, Instance>,
    addresses: HashMap<String, Addresses>,
    emitted: HashSet<String>,
}

impl ServiceAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ingest(&mut self, resources: impl IntoIterator<Item = Resource>) {
        for resource in resources {
            self.ingest_one(resource);
        }
    }

    fn ingest_one(&mut self, resource: Resource) {
        match resource {
            Resource::Ptr { name, target } => {
                if normalize_name(&name) == SERVICE_TYPE_ENUMERATION {
                    self.learn_service_type(target);
                } else {
                    self.service_types.insert(normalize_name(&name));
                    self.instance_mut(&target);
                }
            }

            Resource::Srv { name, target, port } => {
                let instance = self.instance_mut(&name);
                instance.hostname = Some(target);
                instance.port = port;
            }

            Resource::Txt { name, entries } => {
                self.instance_mut(&name).txt = entries;
            }

            Resource::A { name, addr } => {
                let entry = self.addresses.entry(normalize_name(&name)).or_default();
                entry.ipv4.get_or_insert(addr);
            }

            Resource::Aaaa { name, addr } => {
                let entry = self.addresses.entry(normalize_name(&name)).or_default();
                entry.ipv6.get_or_insert(addr);
            }
        }
    }

    fn learn_service_type(&mut self, service_type: String) {
        if self.service_types.insert(normalize_name(&service_type)) {
            debug!(service_type = %service_type, "learned DNS-SD service type");
            self.pending_types.push(service_type);
        }
    }

    fn instance_mut(&mut self, name: &str) -> &mut Instance {
        self.instances
            .entry(normalize_name(name))
            .or_insert_with(|| Instance {
                name: name.to_string(),
                ..Instance::default()
            })
    }

    /// Service types that still need their own PTR query.
    pub fn take_new_service_types(&mut self) -> Vec<String> {
        std::mem::take(&mut self.pending_types)
    }

    /// Instances that have a host and an address and were not handed out before.
    pub fn take_ready(&mut self) -> Vec<HostRecord> {
        let mut ready: Vec<HostRecord> = Vec::new();

        for (key, instance) in &self.instances {
            if self.emitted.contains(key) {
                continue;
            }
            let Some(hostname) = instance.hostname.as_deref() else {
                continue;
            };
            let Some(addresses) = self.addresses.get(&normalize_name(hostname)) else {
                continue;
            };

            let mut record = HostRecord::new(instance.name.clone(), hostname).with_port(instance.port);
            record.ipv4 = addresses.ipv4;
            record.ipv6 = addresses.ipv6;
            for entry in &instance.txt {
                record.insert_txt(entry);
            }
            ready.push(record);
        }

        for record in &ready {
            self.emitted.insert(normalize_name(&record.name));
        }
        ready
    }

    pub fn emitted_count(&self) -> usize {
        self.emitted.len()
    }
}
