//! In-flight MAVLink PDUs.

use crate::error::ParserError;
use crate::{calculate_crc, MavHeader, MavlinkVersion, Message, MAV_STX, MAV_STX_V2};

/// A complete MAVLink frame, either protocol version, owning its on-wire
/// bytes so it can be forwarded verbatim.
///
/// Follow protocol definition: `<https://mavlink.io/en/guide/serialization.html>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    version: MavlinkVersion,
    data: Vec<u8>,
}

impl RawFrame {
    pub(crate) const V1_HEADER_SIZE: usize = 5;
    pub(crate) const V2_HEADER_SIZE: usize = 9;

    /// Wrap bytes already known to hold exactly one complete frame,
    /// STX first, checksum last.
    pub(crate) fn from_wire(version: MavlinkVersion, data: Vec<u8>) -> Self {
        debug_assert!(data.len() >= 1 + Self::V1_HEADER_SIZE + 2);
        Self { version, data }
    }

    #[inline]
    pub fn version(&self) -> MavlinkVersion {
        self.version
    }

    #[inline]
    fn header_size(&self) -> usize {
        match self.version {
            MavlinkVersion::V1 => Self::V1_HEADER_SIZE,
            MavlinkVersion::V2 => Self::V2_HEADER_SIZE,
        }
    }

    #[inline]
    pub fn payload_length(&self) -> u8 {
        self.data[1]
    }

    /// v2 incompatibility flags; zero on v1 frames.
    #[inline]
    pub fn incompatibility_flags(&self) -> u8 {
        match self.version {
            MavlinkVersion::V1 => 0,
            MavlinkVersion::V2 => self.data[2],
        }
    }

    /// v2 compatibility flags; zero on v1 frames.
    #[inline]
    pub fn compatibility_flags(&self) -> u8 {
        match self.version {
            MavlinkVersion::V1 => 0,
            MavlinkVersion::V2 => self.data[3],
        }
    }

    #[inline]
    pub fn sequence(&self) -> u8 {
        match self.version {
            MavlinkVersion::V1 => self.data[2],
            MavlinkVersion::V2 => self.data[4],
        }
    }

    #[inline]
    pub fn system_id(&self) -> u8 {
        match self.version {
            MavlinkVersion::V1 => self.data[3],
            MavlinkVersion::V2 => self.data[5],
        }
    }

    #[inline]
    pub fn component_id(&self) -> u8 {
        match self.version {
            MavlinkVersion::V1 => self.data[4],
            MavlinkVersion::V2 => self.data[6],
        }
    }

    #[inline]
    pub fn message_id(&self) -> u32 {
        match self.version {
            MavlinkVersion::V1 => self.data[5].into(),
            MavlinkVersion::V2 => u32::from_le_bytes([self.data[7], self.data[8], self.data[9], 0]),
        }
    }

    #[inline]
    pub fn payload(&self) -> &[u8] {
        let payload_start = 1 + self.header_size();
        &self.data[payload_start..payload_start + self.payload_length() as usize]
    }

    #[inline]
    pub fn checksum(&self) -> u16 {
        let crc_start = 1 + self.header_size() + self.payload_length() as usize;
        u16::from_le_bytes([self.data[crc_start], self.data[crc_start + 1]])
    }

    /// Header metadata of the frame's source.
    pub fn header(&self) -> MavHeader {
        MavHeader {
            system_id: self.system_id(),
            component_id: self.component_id(),
            sequence: self.sequence(),
        }
    }

    /// The complete on-wire bytes, STX through checksum.
    pub fn raw_bytes(&self) -> &[u8] {
        &self.data
    }

    /// The byte range the x25 checksum runs over (everything between the
    /// STX and the trailer).
    #[inline]
    pub(crate) fn crc_region(&self) -> &[u8] {
        &self.data[1..1 + self.header_size() + self.payload_length() as usize]
    }

    /// Whether the trailer checksum matches the given CRC_EXTRA seed.
    pub fn check_crc(&self, extra_crc: u8) -> bool {
        self.checksum() == calculate_crc(self.crc_region(), extra_crc)
    }

    /// Decode the payload into a typed message. Truncated v2 payloads are
    /// zero-padded back to the full encoded length by the dialect decoder.
    pub fn decode<M: Message>(&self) -> Result<M, ParserError> {
        M::parse(self.version, self.message_id(), self.payload())
    }

    /// Assemble a frame from a typed message.
    ///
    /// The payload is serialized in wire order; for v2 trailing zero bytes
    /// are truncated down to at least one byte before the checksum is
    /// computed.
    pub fn pack<M: Message>(version: MavlinkVersion, header: MavHeader, message: &M) -> Self {
        let mut payload_buf = [0u8; 255];
        let payload_length = message.ser(version, &mut payload_buf);

        let message_id = message.message_id();
        let extra_crc = M::spec(message_id).map_or(0, |spec| spec.extra_crc);

        let header_size = match version {
            MavlinkVersion::V1 => Self::V1_HEADER_SIZE,
            MavlinkVersion::V2 => Self::V2_HEADER_SIZE,
        };
        let mut data = Vec::with_capacity(1 + header_size + payload_length + 2);
        match version {
            MavlinkVersion::V1 => {
                data.extend_from_slice(&[
                    MAV_STX,
                    payload_length as u8,
                    header.sequence,
                    header.system_id,
                    header.component_id,
                    message_id as u8,
                ]);
            }
            MavlinkVersion::V2 => {
                let msgid_bytes = message_id.to_le_bytes();
                data.extend_from_slice(&[
                    MAV_STX_V2,
                    payload_length as u8,
                    0, // incompat_flags
                    0, // compat_flags
                    header.sequence,
                    header.system_id,
                    header.component_id,
                    msgid_bytes[0],
                    msgid_bytes[1],
                    msgid_bytes[2],
                ]);
            }
        }
        data.extend_from_slice(&payload_buf[..payload_length]);

        let crc = calculate_crc(&data[1..], extra_crc);
        data.extend_from_slice(&crc.to_le_bytes());

        Self { version, data }
    }
}
