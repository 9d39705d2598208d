mod test_shared;

use std::time::Duration;

use mavrouter::dialect::common::MavMessage;
use mavrouter::{MavlinkVersion, Router, RouterConfig};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, UdpSocket};
use tokio::time::{sleep, timeout};

use crate::test_shared::{heartbeat_frame, recv_datagram, RECV_TIMEOUT};

#[tokio::test]
async fn tcp_stream_is_reassembled_across_split_writes() {
    let tcp_port = 15760;
    let udp_port = 14660;

    let listener = TcpListener::bind(("127.0.0.1", tcp_port)).await.unwrap();
    let _router = Router::<MavMessage>::start(RouterConfig {
        system_id: 245,
        component_id: 190,
        connections: vec![
            format!("tcpout:127.0.0.1:{tcp_port}"),
            format!("udpin:127.0.0.1:{udp_port}"),
        ],
    })
    .unwrap();

    let (mut server, _) = timeout(RECV_TIMEOUT, listener.accept())
        .await
        .expect("router did not connect")
        .unwrap();

    // register a UDP peer to observe forwarded traffic
    let peer = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    peer.connect(("127.0.0.1", udp_port)).await.unwrap();
    peer.send(heartbeat_frame(MavlinkVersion::V2, 11, 1).raw_bytes())
        .await
        .unwrap();
    sleep(Duration::from_millis(150)).await;
    // the registration heartbeat is broadcast out the TCP link
    let mut buf = [0u8; 64];
    timeout(RECV_TIMEOUT, server.read(&mut buf))
        .await
        .expect("no forwarded frame on tcp")
        .unwrap();

    // garbage, then a frame split mid-header across two writes
    let frame = heartbeat_frame(MavlinkVersion::V2, 77, 1);
    let bytes = frame.raw_bytes();
    server.write_all(&[0x13, 0x37]).await.unwrap();
    server.write_all(&bytes[..5]).await.unwrap();
    server.flush().await.unwrap();
    sleep(Duration::from_millis(100)).await;
    server.write_all(&bytes[5..]).await.unwrap();
    server.flush().await.unwrap();

    assert_eq!(recv_datagram(&peer).await, bytes);
}

#[tokio::test]
async fn multiple_frames_in_one_chunk_all_drain() {
    let tcp_port = 15761;
    let udp_port = 14661;

    let listener = TcpListener::bind(("127.0.0.1", tcp_port)).await.unwrap();
    let _router = Router::<MavMessage>::start(RouterConfig {
        system_id: 245,
        component_id: 190,
        connections: vec![
            format!("tcpout:127.0.0.1:{tcp_port}"),
            format!("udpin:127.0.0.1:{udp_port}"),
        ],
    })
    .unwrap();

    let (mut server, _) = timeout(RECV_TIMEOUT, listener.accept())
        .await
        .expect("router did not connect")
        .unwrap();

    let peer = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    peer.connect(("127.0.0.1", udp_port)).await.unwrap();
    peer.send(heartbeat_frame(MavlinkVersion::V2, 11, 1).raw_bytes())
        .await
        .unwrap();
    sleep(Duration::from_millis(150)).await;
    let mut buf = [0u8; 64];
    timeout(RECV_TIMEOUT, server.read(&mut buf))
        .await
        .expect("no forwarded frame on tcp")
        .unwrap();

    let first = heartbeat_frame(MavlinkVersion::V1, 21, 1);
    let second = heartbeat_frame(MavlinkVersion::V2, 22, 1);
    let mut chunk = first.raw_bytes().to_vec();
    chunk.extend_from_slice(second.raw_bytes());
    server.write_all(&chunk).await.unwrap();
    server.flush().await.unwrap();

    assert_eq!(recv_datagram(&peer).await, first.raw_bytes());
    assert_eq!(recv_datagram(&peer).await, second.raw_bytes());
}
