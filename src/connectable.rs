//! Endpoint connection strings.

use core::fmt::Display;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

use crate::error::RouterError;

/// A validated endpoint address.
///
/// Parsed from the colon-delimited connection strings the router is
/// configured with:
///
///  * `udpin:<ip>:<port>` binds a UDP server socket and learns peers from
///    incoming datagrams
///  * `udpout:<ip>:<port>` opens a UDP client socket towards a fixed peer
///  * `tcpout:<ip>:<port>` connects a TCP client
///  * `serial:<device>:<baud>` opens a UART
///
/// IPs are dotted-quad, ports are restricted to 1024..=65535, baud rates
/// must be positive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndpointAddress {
    UdpIn { address: SocketAddr },
    UdpOut { address: SocketAddr },
    TcpOut { address: SocketAddr },
    Serial { path: String, baud: u32 },
}

fn invalid(address: &str, reason: impl Into<String>) -> RouterError {
    RouterError::InvalidConnectionString {
        address: address.to_string(),
        reason: reason.into(),
    }
}

fn parse_socket_addr(full: &str, spec: &str) -> Result<SocketAddr, RouterError> {
    let (ip, port) = spec
        .split_once(':')
        .ok_or_else(|| invalid(full, "expected <ip>:<port>"))?;
    let ip: Ipv4Addr = ip
        .parse()
        .map_err(|_| invalid(full, "IP is not a dotted quad"))?;
    let port: u16 = port
        .parse()
        .map_err(|_| invalid(full, "port is not a number"))?;
    if port < 1024 {
        return Err(invalid(full, "port must be in 1024..=65535"));
    }
    Ok(SocketAddr::V4(SocketAddrV4::new(ip, port)))
}

impl EndpointAddress {
    /// Parse and validate a connection string. Any failure aborts router
    /// startup with [`RouterError::InvalidConnectionString`].
    pub fn parse(address: &str) -> Result<Self, RouterError> {
        let (protocol, rest) = address
            .split_once(':')
            .ok_or_else(|| invalid(address, "missing protocol prefix"))?;
        match protocol {
            "udpin" => Ok(Self::UdpIn {
                address: parse_socket_addr(address, rest)?,
            }),
            "udpout" => Ok(Self::UdpOut {
                address: parse_socket_addr(address, rest)?,
            }),
            "tcpout" => Ok(Self::TcpOut {
                address: parse_socket_addr(address, rest)?,
            }),
            "serial" => {
                let (path, baud) = rest
                    .split_once(':')
                    .ok_or_else(|| invalid(address, "expected <device>:<baud>"))?;
                if path.is_empty() {
                    return Err(invalid(address, "empty device path"));
                }
                let baud: u32 = baud
                    .parse()
                    .map_err(|_| invalid(address, "baud rate is not a number"))?;
                if baud == 0 {
                    return Err(invalid(address, "baud rate must be positive"));
                }
                Ok(Self::Serial {
                    path: path.to_string(),
                    baud,
                })
            }
            _ => Err(invalid(address, "unsupported protocol")),
        }
    }

    /// Whether this transport carries a byte stream (and therefore needs a
    /// reassembly buffer) rather than datagrams.
    pub fn is_stream(&self) -> bool {
        matches!(self, Self::TcpOut { .. } | Self::Serial { .. })
    }
}

impl Display for EndpointAddress {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::UdpIn { address } => write!(f, "udpin:{address}"),
            Self::UdpOut { address } => write!(f, "udpout:{address}"),
            Self::TcpOut { address } => write!(f, "tcpout:{address}"),
            Self::Serial { path, baud } => write!(f, "serial:{path}:{baud}"),
        }
    }
}
