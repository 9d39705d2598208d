//! Serial endpoint driver.

use log::{debug, info, warn};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio_serial::{SerialPort, SerialPortBuilderExt, SerialStream};

use super::{reconnect_pause, Inbound, Outbound, READ_CHUNK_SIZE};
use crate::router::EndpointKey;

fn open(path: &str, baud: u32) -> tokio_serial::Result<SerialStream> {
    let mut port = tokio_serial::new(path, baud).open_native_async()?;
    port.set_data_bits(tokio_serial::DataBits::Eight)?;
    port.set_parity(tokio_serial::Parity::None)?;
    port.set_stop_bits(tokio_serial::StopBits::One)?;
    port.set_flow_control(tokio_serial::FlowControl::None)?;
    Ok(port)
}

/// UART endpoint. Same buffer-and-drain discipline as TCP: chunks go to
/// the router, frames come back pre-packed.
pub(crate) fn spawn_serial(
    index: usize,
    path: String,
    baud: u32,
    inbound: mpsc::Sender<Inbound>,
    mut write_rx: mpsc::Receiver<Outbound>,
) {
    tokio::spawn(async move {
        loop {
            let port = match open(&path, baud) {
                Ok(port) => port,
                Err(e) => {
                    warn!("serial:{path}: open failed: {e}");
                    if !reconnect_pause(&mut write_rx, "serial").await {
                        return;
                    }
                    continue;
                }
            };
            info!("serial:{path}: open at {baud} baud");
            let (mut reader, mut writer) = tokio::io::split(port);
            let mut buf = [0u8; READ_CHUNK_SIZE];
            loop {
                tokio::select! {
                    read = reader.read(&mut buf) => match read {
                        Ok(0) => {
                            warn!("serial:{path}: port closed");
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
                            warn!("serial:{path}: read failed: {e}");
                            break;
                        }
                    },
                    command = write_rx.recv() => match command {
                        Some(out) => {
                            if let Err(e) = writer.write_all(&out.bytes).await {
                                debug!("serial:{path}: write failed: {e}");
                                break;
                            }
                        }
                        None => return,
                    },
                }
            }
            if !reconnect_pause(&mut write_rx, "serial").await {
                return;
            }
        }
    });
}
