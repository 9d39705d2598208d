//! Subset of the MAVLink `common` dialect.
//!
//! Structs and trait impls follow the shape of generator output: fields are
//! declared in wire order (non-extension fields sorted by primitive size,
//! extension fields appended in declaration order), `EXTRA_CRC` is seeded
//! from the message name and the non-extension field signature, and v2
//! serialization truncates trailing zero bytes.

#![allow(non_camel_case_types)]

use crate::bytes::Bytes;
use crate::bytes_mut::BytesMut;
use crate::error::ParserError;
use crate::utils::remove_trailing_zeroes;
use crate::{MavlinkVersion, Message, MessageData, MessageSpec, TargetKind};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Minor protocol version advertised in `HEARTBEAT.mavlink_version`.
pub const MINOR_MAVLINK_VERSION: u8 = 3;

pub const fn all_ids() -> &'static [u32] {
    &[0, 4, 11, 20, 76, 77, 253]
}

fn check_len(id: u32, payload: &[u8], max: usize) -> Result<(), ParserError> {
    if payload.len() > max {
        return Err(ParserError::InvalidPayloadLength {
            id,
            len: payload.len(),
            max,
        });
    }
    Ok(())
}

/// The heartbeat message shows that a system or component is present and
/// responding.
///
/// ID: 0
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HEARTBEAT_DATA {
    /// A bitfield for use for autopilot-specific flags.
    pub custom_mode: u32,
    /// Vehicle or component type.
    pub mavtype: u8,
    /// Autopilot type / class.
    pub autopilot: u8,
    /// System mode bitmap.
    pub base_mode: u8,
    /// System status flag.
    pub system_status: u8,
    /// MAVLink version, set automatically.
    pub mavlink_version: u8,
}

impl HEARTBEAT_DATA {
    pub const DEFAULT: Self = Self {
        custom_mode: 0,
        mavtype: 0,
        autopilot: 0,
        base_mode: 0,
        system_status: 0,
        mavlink_version: MINOR_MAVLINK_VERSION,
    };
}

impl Default for HEARTBEAT_DATA {
    fn default() -> Self {
        Self::DEFAULT.clone()
    }
}

impl MessageData for HEARTBEAT_DATA {
    type Message = MavMessage;

    const ID: u32 = 0;
    const NAME: &'static str = "HEARTBEAT";
    const EXTRA_CRC: u8 = 50;
    const ENCODED_LEN: usize = 9;
    const TARGET: TargetKind = TargetKind::Broadcast;

    fn ser(&self, version: MavlinkVersion, payload: &mut [u8]) -> usize {
        let mut __tmp = BytesMut::new(payload);
        __tmp.put_u32_le(self.custom_mode);
        __tmp.put_u8(self.mavtype);
        __tmp.put_u8(self.autopilot);
        __tmp.put_u8(self.base_mode);
        __tmp.put_u8(self.system_status);
        __tmp.put_u8(self.mavlink_version);
        if matches!(version, MavlinkVersion::V2) {
            let len = __tmp.len();
            remove_trailing_zeroes(&payload[..len])
        } else {
            __tmp.len()
        }
    }

    fn deser(_version: MavlinkVersion, __input: &[u8]) -> Result<Self, ParserError> {
        check_len(Self::ID, __input, Self::ENCODED_LEN)?;
        let mut payload_buf = [0; Self::ENCODED_LEN];
        payload_buf[..__input.len()].copy_from_slice(__input);
        let mut buf = Bytes::new(&payload_buf);

        Ok(Self {
            custom_mode: buf.get_u32_le()?,
            mavtype: buf.get_u8()?,
            autopilot: buf.get_u8()?,
            base_mode: buf.get_u8()?,
            system_status: buf.get_u8()?,
            mavlink_version: buf.get_u8()?,
        })
    }
}

/// A ping message either requesting or responding to a ping.
///
/// ID: 4
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PING_DATA {
    /// Timestamp (UNIX Epoch time or time since system boot).
    pub time_usec: u64,
    /// PING sequence.
    pub seq: u32,
    /// 0: request ping from all receiving systems.
    pub target_system: u8,
    /// 0: request ping from all receiving components.
    pub target_component: u8,
}

impl PING_DATA {
    pub const DEFAULT: Self = Self {
        time_usec: 0,
        seq: 0,
        target_system: 0,
        target_component: 0,
    };
}

impl MessageData for PING_DATA {
    type Message = MavMessage;

    const ID: u32 = 4;
    const NAME: &'static str = "PING";
    const EXTRA_CRC: u8 = 237;
    const ENCODED_LEN: usize = 14;
    const TARGET: TargetKind = TargetKind::SystemComponent;

    fn ser(&self, version: MavlinkVersion, payload: &mut [u8]) -> usize {
        let mut __tmp = BytesMut::new(payload);
        __tmp.put_u64_le(self.time_usec);
        __tmp.put_u32_le(self.seq);
        __tmp.put_u8(self.target_system);
        __tmp.put_u8(self.target_component);
        if matches!(version, MavlinkVersion::V2) {
            let len = __tmp.len();
            remove_trailing_zeroes(&payload[..len])
        } else {
            __tmp.len()
        }
    }

    fn deser(_version: MavlinkVersion, __input: &[u8]) -> Result<Self, ParserError> {
        check_len(Self::ID, __input, Self::ENCODED_LEN)?;
        let mut payload_buf = [0; Self::ENCODED_LEN];
        payload_buf[..__input.len()].copy_from_slice(__input);
        let mut buf = Bytes::new(&payload_buf);

        Ok(Self {
            time_usec: buf.get_u64_le()?,
            seq: buf.get_u32_le()?,
            target_system: buf.get_u8()?,
            target_component: buf.get_u8()?,
        })
    }
}

/// Set the system mode, as defined by enum MAV_MODE.
///
/// ID: 11
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SET_MODE_DATA {
    /// The new autopilot-specific mode.
    pub custom_mode: u32,
    /// The system setting the mode.
    pub target_system: u8,
    /// The new base mode.
    pub base_mode: u8,
}

impl SET_MODE_DATA {
    pub const DEFAULT: Self = Self {
        custom_mode: 0,
        target_system: 0,
        base_mode: 0,
    };
}

impl MessageData for SET_MODE_DATA {
    type Message = MavMessage;

    const ID: u32 = 11;
    const NAME: &'static str = "SET_MODE";
    const EXTRA_CRC: u8 = 89;
    const ENCODED_LEN: usize = 6;
    const TARGET: TargetKind = TargetKind::System;

    fn ser(&self, version: MavlinkVersion, payload: &mut [u8]) -> usize {
        let mut __tmp = BytesMut::new(payload);
        __tmp.put_u32_le(self.custom_mode);
        __tmp.put_u8(self.target_system);
        __tmp.put_u8(self.base_mode);
        if matches!(version, MavlinkVersion::V2) {
            let len = __tmp.len();
            remove_trailing_zeroes(&payload[..len])
        } else {
            __tmp.len()
        }
    }

    fn deser(_version: MavlinkVersion, __input: &[u8]) -> Result<Self, ParserError> {
        check_len(Self::ID, __input, Self::ENCODED_LEN)?;
        let mut payload_buf = [0; Self::ENCODED_LEN];
        payload_buf[..__input.len()].copy_from_slice(__input);
        let mut buf = Bytes::new(&payload_buf);

        Ok(Self {
            custom_mode: buf.get_u32_le()?,
            target_system: buf.get_u8()?,
            base_mode: buf.get_u8()?,
        })
    }
}

/// Request to read the onboard parameter with the param_id string id.
///
/// ID: 20
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PARAM_REQUEST_READ_DATA {
    /// Parameter index. Send -1 to use the param_id field as identifier.
    pub param_index: i16,
    /// System ID.
    pub target_system: u8,
    /// Component ID.
    pub target_component: u8,
    /// Onboard parameter id, null-terminated if shorter than 16 chars.
    pub param_id: [u8; 16],
}

impl PARAM_REQUEST_READ_DATA {
    pub const DEFAULT: Self = Self {
        param_index: 0,
        target_system: 0,
        target_component: 0,
        param_id: [0; 16],
    };
}

impl MessageData for PARAM_REQUEST_READ_DATA {
    type Message = MavMessage;

    const ID: u32 = 20;
    const NAME: &'static str = "PARAM_REQUEST_READ";
    const EXTRA_CRC: u8 = 214;
    const ENCODED_LEN: usize = 20;
    const TARGET: TargetKind = TargetKind::SystemComponent;

    fn ser(&self, version: MavlinkVersion, payload: &mut [u8]) -> usize {
        let mut __tmp = BytesMut::new(payload);
        __tmp.put_i16_le(self.param_index);
        __tmp.put_u8(self.target_system);
        __tmp.put_u8(self.target_component);
        __tmp.put_slice(&self.param_id);
        if matches!(version, MavlinkVersion::V2) {
            let len = __tmp.len();
            remove_trailing_zeroes(&payload[..len])
        } else {
            __tmp.len()
        }
    }

    fn deser(_version: MavlinkVersion, __input: &[u8]) -> Result<Self, ParserError> {
        check_len(Self::ID, __input, Self::ENCODED_LEN)?;
        let mut payload_buf = [0; Self::ENCODED_LEN];
        payload_buf[..__input.len()].copy_from_slice(__input);
        let mut buf = Bytes::new(&payload_buf);

        Ok(Self {
            param_index: buf.get_i16_le()?,
            target_system: buf.get_u8()?,
            target_component: buf.get_u8()?,
            param_id: buf.get_array()?,
        })
    }
}

/// Send a command with up to seven parameters to the MAV.
///
/// ID: 76
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct COMMAND_LONG_DATA {
    pub param1: f32,
    pub param2: f32,
    pub param3: f32,
    pub param4: f32,
    pub param5: f32,
    pub param6: f32,
    pub param7: f32,
    /// Command ID (of command to send).
    pub command: u16,
    /// System which should execute the command.
    pub target_system: u8,
    /// Component which should execute the command, 0 for all components.
    pub target_component: u8,
    /// 0: First transmission of this command.
    pub confirmation: u8,
}

impl COMMAND_LONG_DATA {
    pub const DEFAULT: Self = Self {
        param1: 0.0,
        param2: 0.0,
        param3: 0.0,
        param4: 0.0,
        param5: 0.0,
        param6: 0.0,
        param7: 0.0,
        command: 0,
        target_system: 0,
        target_component: 0,
        confirmation: 0,
    };
}

impl MessageData for COMMAND_LONG_DATA {
    type Message = MavMessage;

    const ID: u32 = 76;
    const NAME: &'static str = "COMMAND_LONG";
    const EXTRA_CRC: u8 = 152;
    const ENCODED_LEN: usize = 33;
    const TARGET: TargetKind = TargetKind::SystemComponent;

    fn ser(&self, version: MavlinkVersion, payload: &mut [u8]) -> usize {
        let mut __tmp = BytesMut::new(payload);
        __tmp.put_f32_le(self.param1);
        __tmp.put_f32_le(self.param2);
        __tmp.put_f32_le(self.param3);
        __tmp.put_f32_le(self.param4);
        __tmp.put_f32_le(self.param5);
        __tmp.put_f32_le(self.param6);
        __tmp.put_f32_le(self.param7);
        __tmp.put_u16_le(self.command);
        __tmp.put_u8(self.target_system);
        __tmp.put_u8(self.target_component);
        __tmp.put_u8(self.confirmation);
        if matches!(version, MavlinkVersion::V2) {
            let len = __tmp.len();
            remove_trailing_zeroes(&payload[..len])
        } else {
            __tmp.len()
        }
    }

    fn deser(_version: MavlinkVersion, __input: &[u8]) -> Result<Self, ParserError> {
        check_len(Self::ID, __input, Self::ENCODED_LEN)?;
        let mut payload_buf = [0; Self::ENCODED_LEN];
        payload_buf[..__input.len()].copy_from_slice(__input);
        let mut buf = Bytes::new(&payload_buf);

        Ok(Self {
            param1: buf.get_f32_le()?,
            param2: buf.get_f32_le()?,
            param3: buf.get_f32_le()?,
            param4: buf.get_f32_le()?,
            param5: buf.get_f32_le()?,
            param6: buf.get_f32_le()?,
            param7: buf.get_f32_le()?,
            command: buf.get_u16_le()?,
            target_system: buf.get_u8()?,
            target_component: buf.get_u8()?,
            confirmation: buf.get_u8()?,
        })
    }
}

/// Report status of a command. Includes feedback whether the command was
/// executed. The target fields are v2 extensions; implementations without
/// them appear as zero (all systems / all components).
///
/// ID: 77
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct COMMAND_ACK_DATA {
    /// Command ID (of acknowledged command).
    pub command: u16,
    /// Result of command.
    pub result: u8,
    /// Progress of the operation in percent, when result is IN_PROGRESS.
    #[cfg_attr(feature = "serde", serde(default))]
    pub progress: u8,
    /// Additional result information.
    #[cfg_attr(feature = "serde", serde(default))]
    pub result_param2: i32,
    /// System ID of the command sender.
    #[cfg_attr(feature = "serde", serde(default))]
    pub target_system: u8,
    /// Component ID of the command sender.
    #[cfg_attr(feature = "serde", serde(default))]
    pub target_component: u8,
}

impl COMMAND_ACK_DATA {
    pub const DEFAULT: Self = Self {
        command: 0,
        result: 0,
        progress: 0,
        result_param2: 0,
        target_system: 0,
        target_component: 0,
    };
}

impl MessageData for COMMAND_ACK_DATA {
    type Message = MavMessage;

    const ID: u32 = 77;
    const NAME: &'static str = "COMMAND_ACK";
    const EXTRA_CRC: u8 = 143;
    const ENCODED_LEN: usize = 10;
    const TARGET: TargetKind = TargetKind::SystemComponent;

    fn ser(&self, version: MavlinkVersion, payload: &mut [u8]) -> usize {
        let mut __tmp = BytesMut::new(payload);
        __tmp.put_u16_le(self.command);
        __tmp.put_u8(self.result);
        if matches!(version, MavlinkVersion::V2) {
            __tmp.put_u8(self.progress);
            __tmp.put_i32_le(self.result_param2);
            __tmp.put_u8(self.target_system);
            __tmp.put_u8(self.target_component);
            let len = __tmp.len();
            remove_trailing_zeroes(&payload[..len])
        } else {
            __tmp.len()
        }
    }

    fn deser(_version: MavlinkVersion, __input: &[u8]) -> Result<Self, ParserError> {
        check_len(Self::ID, __input, Self::ENCODED_LEN)?;
        let mut payload_buf = [0; Self::ENCODED_LEN];
        payload_buf[..__input.len()].copy_from_slice(__input);
        let mut buf = Bytes::new(&payload_buf);

        Ok(Self {
            command: buf.get_u16_le()?,
            result: buf.get_u8()?,
            progress: buf.get_u8()?,
            result_param2: buf.get_i32_le()?,
            target_system: buf.get_u8()?,
            target_component: buf.get_u8()?,
        })
    }
}

/// Status text message. Severity values follow RFC-5424.
///
/// ID: 253
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct STATUSTEXT_DATA {
    /// Severity of status.
    pub severity: u8,
    /// Status text message, null-terminated if shorter than 50 chars.
    #[cfg_attr(feature = "serde", serde(with = "serde_arrays"))]
    pub text: [u8; 50],
}

impl STATUSTEXT_DATA {
    pub const DEFAULT: Self = Self {
        severity: 0,
        text: [0; 50],
    };
}

impl Default for STATUSTEXT_DATA {
    fn default() -> Self {
        Self::DEFAULT.clone()
    }
}

impl MessageData for STATUSTEXT_DATA {
    type Message = MavMessage;

    const ID: u32 = 253;
    const NAME: &'static str = "STATUSTEXT";
    const EXTRA_CRC: u8 = 83;
    const ENCODED_LEN: usize = 51;
    const TARGET: TargetKind = TargetKind::Broadcast;

    fn ser(&self, version: MavlinkVersion, payload: &mut [u8]) -> usize {
        let mut __tmp = BytesMut::new(payload);
        __tmp.put_u8(self.severity);
        __tmp.put_slice(&self.text);
        if matches!(version, MavlinkVersion::V2) {
            let len = __tmp.len();
            remove_trailing_zeroes(&payload[..len])
        } else {
            __tmp.len()
        }
    }

    fn deser(_version: MavlinkVersion, __input: &[u8]) -> Result<Self, ParserError> {
        check_len(Self::ID, __input, Self::ENCODED_LEN)?;
        let mut payload_buf = [0; Self::ENCODED_LEN];
        payload_buf[..__input.len()].copy_from_slice(__input);
        let mut buf = Bytes::new(&payload_buf);

        Ok(Self {
            severity: buf.get_u8()?,
            text: buf.get_array()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type"))]
pub enum MavMessage {
    HEARTBEAT(HEARTBEAT_DATA),
    PING(PING_DATA),
    SET_MODE(SET_MODE_DATA),
    PARAM_REQUEST_READ(PARAM_REQUEST_READ_DATA),
    COMMAND_LONG(COMMAND_LONG_DATA),
    COMMAND_ACK(COMMAND_ACK_DATA),
    STATUSTEXT(STATUSTEXT_DATA),
}

impl Message for MavMessage {
    fn message_id(&self) -> u32 {
        match self {
            Self::HEARTBEAT(..) => HEARTBEAT_DATA::ID,
            Self::PING(..) => PING_DATA::ID,
            Self::SET_MODE(..) => SET_MODE_DATA::ID,
            Self::PARAM_REQUEST_READ(..) => PARAM_REQUEST_READ_DATA::ID,
            Self::COMMAND_LONG(..) => COMMAND_LONG_DATA::ID,
            Self::COMMAND_ACK(..) => COMMAND_ACK_DATA::ID,
            Self::STATUSTEXT(..) => STATUSTEXT_DATA::ID,
        }
    }

    fn message_name(&self) -> &'static str {
        match self {
            Self::HEARTBEAT(..) => HEARTBEAT_DATA::NAME,
            Self::PING(..) => PING_DATA::NAME,
            Self::SET_MODE(..) => SET_MODE_DATA::NAME,
            Self::PARAM_REQUEST_READ(..) => PARAM_REQUEST_READ_DATA::NAME,
            Self::COMMAND_LONG(..) => COMMAND_LONG_DATA::NAME,
            Self::COMMAND_ACK(..) => COMMAND_ACK_DATA::NAME,
            Self::STATUSTEXT(..) => STATUSTEXT_DATA::NAME,
        }
    }

    fn ser(&self, version: MavlinkVersion, bytes: &mut [u8]) -> usize {
        match self {
            Self::HEARTBEAT(body) => body.ser(version, bytes),
            Self::PING(body) => body.ser(version, bytes),
            Self::SET_MODE(body) => body.ser(version, bytes),
            Self::PARAM_REQUEST_READ(body) => body.ser(version, bytes),
            Self::COMMAND_LONG(body) => body.ser(version, bytes),
            Self::COMMAND_ACK(body) => body.ser(version, bytes),
            Self::STATUSTEXT(body) => body.ser(version, bytes),
        }
    }

    fn parse(version: MavlinkVersion, msgid: u32, payload: &[u8]) -> Result<Self, ParserError> {
        match msgid {
            HEARTBEAT_DATA::ID => HEARTBEAT_DATA::deser(version, payload).map(Self::HEARTBEAT),
            PING_DATA::ID => PING_DATA::deser(version, payload).map(Self::PING),
            SET_MODE_DATA::ID => SET_MODE_DATA::deser(version, payload).map(Self::SET_MODE),
            PARAM_REQUEST_READ_DATA::ID => {
                PARAM_REQUEST_READ_DATA::deser(version, payload).map(Self::PARAM_REQUEST_READ)
            }
            COMMAND_LONG_DATA::ID => {
                COMMAND_LONG_DATA::deser(version, payload).map(Self::COMMAND_LONG)
            }
            COMMAND_ACK_DATA::ID => COMMAND_ACK_DATA::deser(version, payload).map(Self::COMMAND_ACK),
            STATUSTEXT_DATA::ID => STATUSTEXT_DATA::deser(version, payload).map(Self::STATUSTEXT),
            _ => Err(ParserError::UnknownMessage { id: msgid }),
        }
    }

    fn message_id_from_name(name: &str) -> Option<u32> {
        match name {
            HEARTBEAT_DATA::NAME => Some(HEARTBEAT_DATA::ID),
            PING_DATA::NAME => Some(PING_DATA::ID),
            SET_MODE_DATA::NAME => Some(SET_MODE_DATA::ID),
            PARAM_REQUEST_READ_DATA::NAME => Some(PARAM_REQUEST_READ_DATA::ID),
            COMMAND_LONG_DATA::NAME => Some(COMMAND_LONG_DATA::ID),
            COMMAND_ACK_DATA::NAME => Some(COMMAND_ACK_DATA::ID),
            STATUSTEXT_DATA::NAME => Some(STATUSTEXT_DATA::ID),
            _ => None,
        }
    }

    fn spec(id: u32) -> Option<MessageSpec> {
        macro_rules! spec_of {
            ($data:ty) => {
                MessageSpec {
                    extra_crc: <$data>::EXTRA_CRC,
                    encoded_len: <$data>::ENCODED_LEN,
                    target: <$data>::TARGET,
                }
            };
        }
        match id {
            HEARTBEAT_DATA::ID => Some(spec_of!(HEARTBEAT_DATA)),
            PING_DATA::ID => Some(spec_of!(PING_DATA)),
            SET_MODE_DATA::ID => Some(spec_of!(SET_MODE_DATA)),
            PARAM_REQUEST_READ_DATA::ID => Some(spec_of!(PARAM_REQUEST_READ_DATA)),
            COMMAND_LONG_DATA::ID => Some(spec_of!(COMMAND_LONG_DATA)),
            COMMAND_ACK_DATA::ID => Some(spec_of!(COMMAND_ACK_DATA)),
            STATUSTEXT_DATA::ID => Some(spec_of!(STATUSTEXT_DATA)),
            _ => None,
        }
    }

    fn target_system_id(&self) -> Option<u8> {
        match self {
            Self::PING(inner) => Some(inner.target_system),
            Self::SET_MODE(inner) => Some(inner.target_system),
            Self::PARAM_REQUEST_READ(inner) => Some(inner.target_system),
            Self::COMMAND_LONG(inner) => Some(inner.target_system),
            Self::COMMAND_ACK(inner) => Some(inner.target_system),
            _ => None,
        }
    }

    fn target_component_id(&self) -> Option<u8> {
        match self {
            Self::PING(inner) => Some(inner.target_component),
            Self::PARAM_REQUEST_READ(inner) => Some(inner.target_component),
            Self::COMMAND_LONG(inner) => Some(inner.target_component),
            Self::COMMAND_ACK(inner) => Some(inner.target_component),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crc_any::CRCu16;

    // Mirrors the generator's seed computation: message name, a space, then
    // "type name " for every non-extension field in wire order, with the
    // array length byte appended for array fields.
    fn seed(signature: &[&str], array_lens: &[u8]) -> u8 {
        let mut crc = CRCu16::crc16mcrf4cc();
        for part in signature {
            crc.digest(part.as_bytes());
            crc.digest(b" ");
        }
        for len in array_lens {
            crc.digest(&[*len]);
        }
        let crcval = crc.get_crc();
        ((crcval & 0xFF) ^ (crcval >> 8)) as u8
    }

    #[test]
    fn heartbeat_seed_is_50() {
        let computed = seed(
            &[
                "HEARTBEAT",
                "uint32_t",
                "custom_mode",
                "uint8_t",
                "type",
                "uint8_t",
                "autopilot",
                "uint8_t",
                "base_mode",
                "uint8_t",
                "system_status",
                "uint8_t",
                "mavlink_version",
            ],
            &[],
        );
        assert_eq!(computed, 50);
        assert_eq!(computed, HEARTBEAT_DATA::EXTRA_CRC);
    }

    #[test]
    fn ping_seed_matches_table() {
        let computed = seed(
            &[
                "PING",
                "uint64_t",
                "time_usec",
                "uint32_t",
                "seq",
                "uint8_t",
                "target_system",
                "uint8_t",
                "target_component",
            ],
            &[],
        );
        assert_eq!(computed, PING_DATA::EXTRA_CRC);
    }

    #[test]
    fn set_mode_seed_matches_table() {
        let computed = seed(
            &[
                "SET_MODE",
                "uint32_t",
                "custom_mode",
                "uint8_t",
                "target_system",
                "uint8_t",
                "base_mode",
            ],
            &[],
        );
        assert_eq!(computed, SET_MODE_DATA::EXTRA_CRC);
    }

    #[test]
    fn param_request_read_seed_includes_array_length() {
        let computed = seed(
            &[
                "PARAM_REQUEST_READ",
                "int16_t",
                "param_index",
                "uint8_t",
                "target_system",
                "uint8_t",
                "target_component",
                "char",
                "param_id",
            ],
            &[16],
        );
        assert_eq!(computed, PARAM_REQUEST_READ_DATA::EXTRA_CRC);
    }

    #[test]
    fn command_long_seed_matches_table() {
        let computed = seed(
            &[
                "COMMAND_LONG",
                "float",
                "param1",
                "float",
                "param2",
                "float",
                "param3",
                "float",
                "param4",
                "float",
                "param5",
                "float",
                "param6",
                "float",
                "param7",
                "uint16_t",
                "command",
                "uint8_t",
                "target_system",
                "uint8_t",
                "target_component",
                "uint8_t",
                "confirmation",
            ],
            &[],
        );
        assert_eq!(computed, COMMAND_LONG_DATA::EXTRA_CRC);
    }

    #[test]
    fn statustext_seed_matches_table() {
        let computed = seed(
            &["STATUSTEXT", "uint8_t", "severity", "char", "text"],
            &[50],
        );
        assert_eq!(computed, STATUSTEXT_DATA::EXTRA_CRC);
    }

    #[test]
    fn command_ack_seed_ignores_extensions() {
        let computed = seed(
            &["COMMAND_ACK", "uint16_t", "command", "uint8_t", "result"],
            &[],
        );
        assert_eq!(computed, COMMAND_ACK_DATA::EXTRA_CRC);
    }

    #[test]
    fn command_ack_v1_omits_extensions() {
        let ack = COMMAND_ACK_DATA {
            command: 400,
            result: 1,
            progress: 55,
            result_param2: -3,
            target_system: 9,
            target_component: 2,
        };

        let mut payload = [0u8; COMMAND_ACK_DATA::ENCODED_LEN];
        let v1_len = ack.ser(MavlinkVersion::V1, &mut payload);
        assert_eq!(v1_len, 3);

        let decoded = COMMAND_ACK_DATA::deser(MavlinkVersion::V1, &payload[..v1_len]).unwrap();
        assert_eq!(decoded.command, 400);
        assert_eq!(decoded.result, 1);
        // extensions come back zeroed
        assert_eq!(decoded.progress, 0);
        assert_eq!(decoded.result_param2, 0);
        assert_eq!(decoded.target_system, 0);
        assert_eq!(decoded.target_component, 0);
    }

    #[test]
    fn command_ack_v2_round_trips_extensions() {
        let ack = COMMAND_ACK_DATA {
            command: 400,
            result: 1,
            progress: 55,
            result_param2: -3,
            target_system: 9,
            target_component: 2,
        };

        let mut payload = [0u8; COMMAND_ACK_DATA::ENCODED_LEN];
        let len = ack.ser(MavlinkVersion::V2, &mut payload);
        let decoded = COMMAND_ACK_DATA::deser(MavlinkVersion::V2, &payload[..len]).unwrap();
        assert_eq!(decoded, ack);
    }

    #[test]
    fn statustext_pads_text_to_declared_length() {
        let mut text = [0u8; 50];
        text[..11].copy_from_slice(b"hello world");
        let msg = STATUSTEXT_DATA { severity: 6, text };

        let mut payload = [0u8; STATUSTEXT_DATA::ENCODED_LEN];
        let v1_len = msg.ser(MavlinkVersion::V1, &mut payload);
        assert_eq!(v1_len, STATUSTEXT_DATA::ENCODED_LEN);

        let v2_len = msg.ser(MavlinkVersion::V2, &mut payload);
        assert_eq!(v2_len, 12);
        let decoded = STATUSTEXT_DATA::deser(MavlinkVersion::V2, &payload[..v2_len]).unwrap();
        assert_eq!(decoded, msg);
    }

    #[test]
    fn oversized_payload_is_rejected() {
        let payload = [0u8; 15];
        assert!(matches!(
            SET_MODE_DATA::deser(MavlinkVersion::V2, &payload),
            Err(ParserError::InvalidPayloadLength { id: 11, .. })
        ));
    }

    #[test]
    fn spec_lookup_is_total_over_known_ids() {
        for &id in all_ids() {
            let spec = MavMessage::spec(id).expect("known id");
            assert!(spec.encoded_len > 0);
        }
        assert!(MavMessage::spec(26).is_none());
    }

    #[test]
    fn name_lookup_round_trips() {
        assert_eq!(MavMessage::message_id_from_name("HEARTBEAT"), Some(0));
        assert_eq!(MavMessage::message_id_from_name("COMMAND_LONG"), Some(76));
        assert_eq!(MavMessage::message_id_from_name("NO_SUCH_MESSAGE"), None);
    }
}
