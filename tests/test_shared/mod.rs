#![allow(unused)]

use std::time::Duration;

use mavrouter::dialect::common::{
    MavMessage, COMMAND_ACK_DATA, COMMAND_LONG_DATA, HEARTBEAT_DATA, PARAM_REQUEST_READ_DATA,
    PING_DATA, SET_MODE_DATA, STATUSTEXT_DATA,
};
use mavrouter::{MavHeader, MavlinkVersion, RawFrame};
use tokio::net::UdpSocket;
use tokio::time::timeout;

pub const RECV_TIMEOUT: Duration = Duration::from_secs(2);
pub const SILENCE: Duration = Duration::from_millis(300);

pub fn header(system_id: u8, component_id: u8, sequence: u8) -> MavHeader {
    MavHeader {
        system_id,
        component_id,
        sequence,
    }
}

pub fn heartbeat_frame(version: MavlinkVersion, system_id: u8, component_id: u8) -> RawFrame {
    let msg = MavMessage::HEARTBEAT(HEARTBEAT_DATA {
        custom_mode: 1,
        ..Default::default()
    });
    RawFrame::pack(version, header(system_id, component_id, 0), &msg)
}

pub fn ping_frame(
    version: MavlinkVersion,
    source: (u8, u8),
    target: (u8, u8),
    seq: u32,
) -> RawFrame {
    let msg = MavMessage::PING(PING_DATA {
        time_usec: 1_234_567,
        seq,
        target_system: target.0,
        target_component: target.1,
    });
    RawFrame::pack(version, header(source.0, source.1, 0), &msg)
}

pub fn get_heartbeat_msg() -> HEARTBEAT_DATA {
    HEARTBEAT_DATA {
        custom_mode: 5,
        mavtype: 2,
        autopilot: 3,
        base_mode: 81,
        system_status: 4,
        mavlink_version: 3,
    }
}

pub fn get_ping_msg() -> PING_DATA {
    PING_DATA {
        time_usec: 1_234_567_890,
        seq: 42,
        target_system: 7,
        target_component: 1,
    }
}

pub fn get_set_mode_msg() -> SET_MODE_DATA {
    SET_MODE_DATA {
        custom_mode: 17,
        target_system: 3,
        base_mode: 1,
    }
}

pub fn get_param_request_read_msg() -> PARAM_REQUEST_READ_DATA {
    let mut param_id = [0u8; 16];
    param_id[..8].copy_from_slice(b"RATE_MAX");
    PARAM_REQUEST_READ_DATA {
        param_index: -1,
        target_system: 1,
        target_component: 1,
        param_id,
    }
}

pub fn get_command_long_msg() -> COMMAND_LONG_DATA {
    COMMAND_LONG_DATA {
        param1: 1.0,
        param2: 2.0,
        param3: 3.0,
        param4: 4.0,
        param5: 5.0,
        param6: 6.0,
        param7: 7.0,
        command: 511,
        target_system: 42,
        target_component: 84,
        confirmation: 1,
    }
}

pub fn get_command_ack_msg() -> COMMAND_ACK_DATA {
    COMMAND_ACK_DATA {
        command: 511,
        result: 0,
        progress: 100,
        result_param2: -2,
        target_system: 255,
        target_component: 190,
    }
}

pub fn get_statustext_msg() -> STATUSTEXT_DATA {
    let mut text = [0u8; 50];
    text[..13].copy_from_slice(b"failsafe: RTL");
    STATUSTEXT_DATA { severity: 4, text }
}

/// Every bundled message with non-trivial field values.
pub fn all_sample_messages() -> Vec<MavMessage> {
    vec![
        MavMessage::HEARTBEAT(get_heartbeat_msg()),
        MavMessage::PING(get_ping_msg()),
        MavMessage::SET_MODE(get_set_mode_msg()),
        MavMessage::PARAM_REQUEST_READ(get_param_request_read_msg()),
        MavMessage::COMMAND_LONG(get_command_long_msg()),
        MavMessage::COMMAND_ACK(get_command_ack_msg()),
        MavMessage::STATUSTEXT(get_statustext_msg()),
    ]
}

/// Receive one datagram or panic after the shared timeout.
pub async fn recv_datagram(socket: &UdpSocket) -> Vec<u8> {
    let mut buf = [0u8; 512];
    let n = timeout(RECV_TIMEOUT, socket.recv(&mut buf))
        .await
        .expect("timed out waiting for datagram")
        .expect("recv failed");
    buf[..n].to_vec()
}

/// Assert nothing arrives on the socket for a while.
pub async fn assert_silent(socket: &UdpSocket) {
    let mut buf = [0u8; 512];
    assert!(
        timeout(SILENCE, socket.recv(&mut buf)).await.is_err(),
        "unexpected datagram received"
    );
}
