//! UDP endpoint drivers.

use std::net::SocketAddr;

use log::{debug, info, warn};
use tokio::net::UdpSocket;
use tokio::sync::mpsc;

use super::{reconnect_pause, Inbound, Outbound, MTU_SIZE};
use crate::router::EndpointKey;

/// UDP server. Peers multiplex on the bound socket; each datagram is
/// forwarded with the sender's address in the endpoint key so the router
/// can learn peers on first receive.
pub(crate) fn spawn_udp_in(
    index: usize,
    address: SocketAddr,
    inbound: mpsc::Sender<Inbound>,
    mut write_rx: mpsc::Receiver<Outbound>,
) {
    tokio::spawn(async move {
        loop {
            let socket = match UdpSocket::bind(address).await {
                Ok(socket) => socket,
                Err(e) => {
                    warn!("udpin:{address}: bind failed: {e}");
                    if !reconnect_pause(&mut write_rx, "udpin").await {
                        return;
                    }
                    continue;
                }
            };
            let local = socket.local_addr().ok();
            info!("udpin:{address}: listening");
            let mut buf = [0u8; MTU_SIZE];
            loop {
                tokio::select! {
                    received = socket.recv_from(&mut buf) => match received {
                        Ok((n, src)) => {
                            // A datagram from the binding's own address would
                            // have the socket routing to itself.
                            if local == Some(src) {
                                continue;
                            }
                            let event = Inbound {
                                key: EndpointKey::UdpPeer(index, src),
                                bytes: buf[..n].to_vec(),
                            };
                            if inbound.send(event).await.is_err() {
                                return;
                            }
                        }
                        Err(e) => {
                            warn!("udpin:{address}: recv failed: {e}");
                            break;
                        }
                    },
                    command = write_rx.recv() => match command {
                        Some(out) => {
                            let Some(dest) = out.dest else { continue };
                            if let Err(e) = socket.send_to(&out.bytes, dest).await {
                                debug!("udpin:{address}: write to {dest} failed: {e}");
                            }
                        }
                        None => return,
                    },
                }
            }
            if !reconnect_pause(&mut write_rx, "udpin").await {
                return;
            }
        }
    });
}

/// UDP client towards a fixed peer. The socket is bidirectional: datagrams
/// received on it are framed and routed like UDP-in traffic.
pub(crate) fn spawn_udp_out(
    index: usize,
    address: SocketAddr,
    inbound: mpsc::Sender<Inbound>,
    mut write_rx: mpsc::Receiver<Outbound>,
) {
    tokio::spawn(async move {
        loop {
            let socket = match UdpSocket::bind("0.0.0.0:0").await {
                Ok(socket) => socket,
                Err(e) => {
                    warn!("udpout:{address}: bind failed: {e}");
                    if !reconnect_pause(&mut write_rx, "udpout").await {
                        return;
                    }
                    continue;
                }
            };
            info!("udpout:{address}: ready");
            let mut buf = [0u8; MTU_SIZE];
            loop {
                tokio::select! {
                    received = socket.recv_from(&mut buf) => match received {
                        Ok((n, _src)) => {
                            let event = Inbound {
                                key: EndpointKey::Link(index),
                                bytes: buf[..n].to_vec(),
                            };
                            if inbound.send(event).await.is_err() {
                                return;
                            }
                        }
                        Err(e) => {
                            warn!("udpout:{address}: recv failed: {e}");
                            break;
                        }
                    },
                    command = write_rx.recv() => match command {
                        Some(out) => {
                            if let Err(e) = socket.send_to(&out.bytes, address).await {
                                debug!("udpout:{address}: write failed: {e}");
                            }
                        }
                        None => return,
                    },
                }
            }
            if !reconnect_pause(&mut write_rx, "udpout").await {
                return;
            }
        }
    });
}
