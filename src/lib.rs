//! A MAVLink v1/v2 message router.
//!
//! # Overview
//! `mavrouter` multiplexes MAVLink traffic between heterogeneous transport
//! endpoints (UDP server, UDP client, TCP client, serial) and in-process
//! subscribers that exchange strongly-typed messages. A single router task
//! owns all routing state; per-transport driver tasks own their sockets and
//! feed the router raw byte chunks over a channel.
//!
//! # Dialects and the `Message` trait
//! Messages are represented by a dialect enum (one variant per message id)
//! implementing the [`Message`] trait. The trait carries everything the
//! router needs at runtime: payload pack/unpack, the per-message
//! [`MessageSpec`] (CRC_EXTRA seed, full payload length, targeting kind) and
//! the target id accessors used to resolve where a message is addressed.
//! Dialect modules are normally produced by a code generator from the MAVLink
//! XML definitions; [`dialect::common`] bundles the subset of the `common`
//! dialect this crate is tested against.
//!
//! # Quick start
//! ```no_run
//! use mavrouter::dialect::common::{MavMessage, HEARTBEAT_DATA};
//! use mavrouter::{Router, RouterConfig, SubscriptionQuery};
//!
//! # async fn run() -> Result<(), mavrouter::RouterError> {
//! let handle = Router::<MavMessage>::start(RouterConfig {
//!     system_id: 245,
//!     component_id: 1,
//!     connections: vec!["udpin:0.0.0.0:14550".into(), "tcpout:127.0.0.1:5760".into()],
//! })?;
//!
//! let mut sub = handle
//!     .subscribe(SubscriptionQuery {
//!         message: Some("HEARTBEAT".into()),
//!         ..Default::default()
//!     })
//!     .await?;
//!
//! handle.send(MavMessage::HEARTBEAT(HEARTBEAT_DATA::default())).await?;
//! # Ok(())
//! # }
//! ```

#![deny(clippy::all)]
#![warn(clippy::use_self)]

use crc_any::CRCu16;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub mod bytes;
pub mod bytes_mut;
pub mod codec;
mod connectable;
mod connection;
pub mod dialect;
pub mod error;
mod frame;
mod router;
mod subscription;
pub mod utils;

pub use connectable::EndpointAddress;
pub use error::{FrameError, ParserError, RouterError};
pub use frame::RawFrame;
pub use router::{EndpointKey, Router, RouterConfig, RouterHandle};
pub use subscription::{Delivery, Subscriber, SubscriptionCache, SubscriptionId, SubscriptionQuery};

/// Message framing marker for mavlink v1
pub const MAV_STX: u8 = 0xFE;

/// Message framing marker for mavlink v2
pub const MAV_STX_V2: u8 = 0xFD;

/// Maximum size of any MAVLink frame in bytes.
pub const MAX_FRAME_SIZE: usize = 280;

/// Versions of the Mavlink protocol that we support
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "type"))]
pub enum MavlinkVersion {
    V1,
    V2,
}

/// Metadata from a MAVLink packet header
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MavHeader {
    pub system_id: u8,
    pub component_id: u8,
    pub sequence: u8,
}

/// Return a default GCS header, seq is replaced by the router
/// so it can be ignored. Set `component_id` to your desired component ID.
impl Default for MavHeader {
    fn default() -> Self {
        Self {
            system_id: 255,
            component_id: 0,
            sequence: 0,
        }
    }
}

/// How a message addresses its recipients.
///
/// Derived by the code generator from the presence of `target_system` /
/// `target_component` fields in the message definition.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TargetKind {
    /// No target fields; every system and component is a recipient.
    Broadcast,
    /// Only `target_system` is present.
    System,
    /// Both `target_system` and `target_component` are present.
    SystemComponent,
    /// Only `target_component` is present.
    Component,
}

/// Per-message attributes from the dialect table.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MessageSpec {
    /// CRC_EXTRA seed mixed into the frame checksum.
    pub extra_crc: u8,
    /// Full (untruncated) payload length in bytes.
    pub encoded_len: usize,
    /// Targeting kind used by the routing policy.
    pub target: TargetKind,
}

/// A dialect message set.
///
/// Implemented by the `MavMessage` enum of a generated dialect module. All
/// lookups are total over the ids the dialect knows and return `None`
/// outside of them.
pub trait Message: Sized + Clone + Send + Sync + 'static {
    fn message_id(&self) -> u32;
    fn message_name(&self) -> &'static str;

    /// Serialize **Message** into byte slice and return count of bytes written
    fn ser(&self, version: MavlinkVersion, bytes: &mut [u8]) -> usize;

    fn parse(
        version: MavlinkVersion,
        msgid: u32,
        payload: &[u8],
    ) -> Result<Self, error::ParserError>;

    fn message_id_from_name(name: &str) -> Option<u32>;

    /// Dialect-table attributes for `id`, `None` for unknown ids.
    fn spec(id: u32) -> Option<MessageSpec>;

    fn target_system_id(&self) -> Option<u8>;
    fn target_component_id(&self) -> Option<u8>;

    /// Resolve the `(target_system, target_component)` pair this message
    /// addresses; `0` means "all".
    fn target(&self) -> (u8, u8) {
        let kind = match Self::spec(self.message_id()) {
            Some(spec) => spec.target,
            None => TargetKind::Broadcast,
        };
        match kind {
            TargetKind::Broadcast => (0, 0),
            TargetKind::System => (self.target_system_id().unwrap_or(0), 0),
            TargetKind::SystemComponent => (
                self.target_system_id().unwrap_or(0),
                self.target_component_id().unwrap_or(0),
            ),
            TargetKind::Component => (0, self.target_component_id().unwrap_or(0)),
        }
    }
}

/// A single message body within a dialect.
pub trait MessageData: Sized {
    type Message: Message;

    const ID: u32;
    const NAME: &'static str;
    const EXTRA_CRC: u8;
    const ENCODED_LEN: usize;
    const TARGET: TargetKind;

    fn ser(&self, version: MavlinkVersion, payload: &mut [u8]) -> usize;
    fn deser(version: MavlinkVersion, payload: &[u8]) -> Result<Self, error::ParserError>;
}

/// x25 checksum over `data` with the per-message CRC_EXTRA folded in.
pub fn calculate_crc(data: &[u8], extra_crc: u8) -> u16 {
    let mut crc_calculator = CRCu16::crc16mcrf4cc();
    crc_calculator.digest(data);

    crc_calculator.digest(&[extra_crc]);
    crc_calculator.get_crc()
}
