//! Endpoint drivers.
//!
//! Every configured endpoint gets one spawned task that owns its socket or
//! UART. Drivers never parse: received bytes are forwarded to the router
//! tagged with the endpoint key, and pre-framed packets arrive on a bounded
//! write queue. On transport failure a driver keeps its key and retries
//! indefinitely with a fixed pause, dropping queued frames while the link
//! is down.

mod direct_serial;
mod tcp;
mod udp;

use std::net::SocketAddr;
use std::time::Duration;

use log::debug;
use tokio::sync::mpsc;

use crate::connectable::EndpointAddress;
use crate::router::EndpointKey;

/// Delay between reconnection attempts for a failed endpoint.
pub(crate) const RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// Depth of the per-driver outbound frame queue; the router awaits free
/// space, so this bounds how far it can run ahead of a slow link.
pub(crate) const WRITE_QUEUE_DEPTH: usize = 64;

/// Read chunk size for stream transports.
pub(crate) const READ_CHUNK_SIZE: usize = 1024;

/// Datagram receive buffer, one MTU.
pub(crate) const MTU_SIZE: usize = 1500;

/// Raw bytes received by a driver, tagged with the endpoint they came from.
#[derive(Debug)]
pub(crate) struct Inbound {
    pub key: EndpointKey,
    pub bytes: Vec<u8>,
}

/// A pre-framed MAVLink packet for a driver to put on the wire.
#[derive(Debug)]
pub(crate) struct Outbound {
    pub bytes: Vec<u8>,
    /// Destination peer for UDP-in sockets; `None` everywhere else.
    pub dest: Option<SocketAddr>,
}

/// What the router keeps per configured link.
pub(crate) struct Link {
    pub writer: mpsc::Sender<Outbound>,
    pub stream: bool,
}

/// Spawn the driver task for one endpoint and return its link handle.
pub(crate) fn spawn(
    index: usize,
    address: &EndpointAddress,
    inbound: mpsc::Sender<Inbound>,
) -> Link {
    let (write_tx, write_rx) = mpsc::channel(WRITE_QUEUE_DEPTH);
    let stream = address.is_stream();
    match address.clone() {
        EndpointAddress::UdpIn { address } => udp::spawn_udp_in(index, address, inbound, write_rx),
        EndpointAddress::UdpOut { address } => {
            udp::spawn_udp_out(index, address, inbound, write_rx)
        }
        EndpointAddress::TcpOut { address } => {
            tcp::spawn_tcp_out(index, address, inbound, write_rx)
        }
        EndpointAddress::Serial { path, baud } => {
            direct_serial::spawn_serial(index, path, baud, inbound, write_rx)
        }
    }
    Link {
        writer: write_tx,
        stream,
    }
}

/// Wait out the reconnect delay, discarding frames queued for the dead
/// link so the router never blocks on it. Returns `false` when the router
/// side is gone and the driver should exit.
pub(crate) async fn reconnect_pause(
    write_rx: &mut mpsc::Receiver<Outbound>,
    link: &str,
) -> bool {
    let pause = tokio::time::sleep(RECONNECT_DELAY);
    tokio::pin!(pause);
    loop {
        tokio::select! {
            _ = &mut pause => return true,
            command = write_rx.recv() => match command {
                Some(_) => debug!("{link}: link down, dropping outbound frame"),
                None => return false,
            },
        }
    }
}
