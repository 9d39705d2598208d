//! TCP client endpoint driver.

use std::net::SocketAddr;

use log::{debug, info, warn};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;

use super::{reconnect_pause, Inbound, Outbound, READ_CHUNK_SIZE};
use crate::router::EndpointKey;

/// TCP client towards a remote server. Received chunks are forwarded as-is;
/// the router reassembles frames from the per-endpoint buffer. The key
/// stays stable across reconnects.
pub(crate) fn spawn_tcp_out(
    index: usize,
    address: SocketAddr,
    inbound: mpsc::Sender<Inbound>,
    mut write_rx: mpsc::Receiver<Outbound>,
) {
    tokio::spawn(async move {
        loop {
            let stream = match TcpStream::connect(address).await {
                Ok(stream) => stream,
                Err(e) => {
                    warn!("tcpout:{address}: connect failed: {e}");
                    if !reconnect_pause(&mut write_rx, "tcpout").await {
                        return;
                    }
                    continue;
                }
            };
            info!("tcpout:{address}: connected");
            let (mut reader, mut writer) = stream.into_split();
            let mut buf = [0u8; READ_CHUNK_SIZE];
            loop {
                tokio::select! {
                    read = reader.read(&mut buf) => match read {
                        Ok(0) => {
                            warn!("tcpout:{address}: connection closed by peer");
                            break;
                        }
                        Ok(n) => {
                            let event = Inbound {
                                key: EndpointKey::Link(index),
                                bytes: buf[..n].to_vec(),
                            };
                            if inbound.send(event).await.is_err() {
                                return;
                            }
                        }
                        Err(e) => {
                            warn!("tcpout:{address}: read failed: {e}");
                            break;
                        }
                    },
                    command = write_rx.recv() => match command {
                        Some(out) => {
                            if let Err(e) = writer.write_all(&out.bytes).await {
                                debug!("tcpout:{address}: write failed: {e}");
                                break;
                            }
                        }
                        None => return,
                    },
                }
            }
            if !reconnect_pause(&mut write_rx, "tcpout").await {
                return;
            }
        }
    });
}
