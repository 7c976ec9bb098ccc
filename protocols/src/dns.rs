use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

use dns_parser::{Builder, QueryClass, QueryType};

pub const MDNS_PORT: u16 = 5353;
pub const MDNS_GROUP_V4: Ipv4Addr = Ipv4Addr::new(224, 0, 0, 251);
pub const MDNS_SOCKET_V4: SocketAddr = SocketAddr::V4(SocketAddrV4::new(MDNS_GROUP_V4, MDNS_PORT));

/// Meta-query name listing every service type announced on the link.
pub const SERVICE_TYPE_ENUMERATION: &str = "_services._dns-sd._udp.local";

/// Builds a single-question PTR query for `name`.
///
/// `unicast_response` sets the QU bit so responders may answer the sender
/// directly instead of the multicast group.
pub fn create_ptr_packet(name: &str, id: u16, unicast_response: bool) -> anyhow::Result<Vec<u8>> {
    let qname: String = normalize_name(name);
    let mut builder = Builder::new_query(id, false);
    builder.add_question(&qname, unicast_response, QueryType::PTR, QueryClass::IN);

    builder
        .build()
        .map_err(|_| anyhow::anyhow!("DNS query for {qname} does not fit in one packet"))
}

/// Lowercases and strips the trailing root dot so names can be compared.
pub fn normalize_name(name: &str) -> String {
    name.trim_end_matches('.').to_ascii_lowercase()
}
