//! A DNS-SD browser speaking multicast DNS on the local segment.
//!
//! Asks for every advertised service type, then for the instances of each
//! type, and forwards every fully resolved instance as a [`HostRecord`].

use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use async_trait::async_trait;
use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use lanprobe_common::network::host::HostRecord;
use lanprobe_protocols::dns::{self, MDNS_GROUP_V4, MDNS_PORT, MDNS_SOCKET_V4, SERVICE_TYPE_ENUMERATION};
use lanprobe_protocols::dnssd::ServiceAssembler;
use lanprobe_protocols::mdns;

use crate::discovery::{DiscoveryError, HostDiscovery};

const RECV_BUFFER_SIZE: usize = 9000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QueryMode {
    /// Bound to 5353 and joined to the group; answers arrive by multicast.
    Multicast,
    /// Ephemeral port; responders answer the sender directly.
    LegacyUnicast,
}

pub struct MdnsBrowser {
    browse_timeout: Duration,
}

impl MdnsBrowser {
    pub fn new(browse_timeout: Duration) -> Self {
        Self { browse_timeout }
    }
}

#[async_trait]
impl HostDiscovery for MdnsBrowser {
    async fn discover(&self, tx: mpsc::Sender<HostRecord>) -> Result<(), DiscoveryError> {
        let (socket, mode) = open_socket().map_err(DiscoveryError::Socket)?;
        debug!(?mode, "mDNS socket ready");

        send_query(&socket, SERVICE_TYPE_ENUMERATION, mode)
            .await
            .map_err(DiscoveryError::Query)?;

        let mut assembler = ServiceAssembler::new();
        let mut responses: usize = 0;
        let mut buffer: Vec<u8> = vec![0u8; RECV_BUFFER_SIZE];

        let deadline = tokio::time::sleep(self.browse_timeout);
        tokio::pin!(deadline);

        loop {
            let (len, source) = tokio::select! {
                received = socket.recv_from(&mut buffer) => match received {
                    Ok(received) => received,
                    Err(e) => {
                        warn!(error = %e, "mDNS receive failed, ending browse early");
                        break;
                    }
                },

                _ = &mut deadline => break,
            };

            let resources = match mdns::extract_resources(&buffer[..len]) {
                Ok(resources) if !resources.is_empty() => resources,
                Ok(_) => continue,
                Err(e) => {
                    debug!(%source, error = %e, "ignoring malformed mDNS packet");
                    continue;
                }
            };

            responses += 1;
            assembler.ingest(resources);

            for service_type in assembler.take_new_service_types() {
                if let Err(e) = send_query(&socket, &service_type, mode).await {
                    warn!(service_type = %service_type, error = %e, "failed to query service type");
                }
            }

            for host in assembler.take_ready() {
                info!(name = %host.name, host = %host.hostname, "discovered host");
                if tx.send(host).await.is_err() {
                    return Ok(());
                }
            }
        }

        if responses == 0 {
            return Err(DiscoveryError::NoResponders(self.browse_timeout));
        }

        info!(responses, hosts = assembler.emitted_count(), "mDNS browse finished");
        Ok(())
    }
}

fn open_socket() -> io::Result<(UdpSocket, QueryMode)> {
    match bind_multicast() {
        Ok(socket) => Ok((socket, QueryMode::Multicast)),
        Err(e) => {
            warn!(error = %e, "cannot join the mDNS group, falling back to unicast queries");
            Ok((bind_unicast()?, QueryMode::LegacyUnicast))
        }
    }
}

fn bind_multicast() -> io::Result<UdpSocket> {
    let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
    socket.set_reuse_address(true)?;
    #[cfg(not(windows))]
    socket.set_reuse_port(true)?;

    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, MDNS_PORT));
    socket.bind(&addr.into())?;
    socket.join_multicast_v4(&MDNS_GROUP_V4, &Ipv4Addr::UNSPECIFIED)?;
    socket.set_multicast_loop_v4(true)?;
    socket.set_nonblocking(true)?;

    UdpSocket::from_std(socket.into())
}

fn bind_unicast() -> io::Result<UdpSocket> {
    let socket = std::net::UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;
    socket.set_nonblocking(true)?;
    UdpSocket::from_std(socket)
}

async fn send_query(socket: &UdpSocket, name: &str, mode: QueryMode) -> anyhow::Result<()> {
    let packet: Vec<u8> = match mode {
        QueryMode::Multicast => dns::create_ptr_packet(name, 0, false)?,
        QueryMode::LegacyUnicast => dns::create_ptr_packet(name, rand::random::<u16>(), true)?,
    };
    socket.send_to(&packet, MDNS_SOCKET_V4).await?;
    debug!(name, "sent mDNS query");
    Ok(())
}
