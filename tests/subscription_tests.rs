mod test_shared;

use std::time::Duration;

use mavrouter::dialect::common::{MavMessage, PING_DATA};
use mavrouter::{
    calculate_crc, Delivery, MavlinkVersion, Router, RouterConfig, RouterError, SubscriptionCache,
    SubscriptionQuery,
};
use tokio::net::UdpSocket;
use tokio::time::{sleep, timeout};

use crate::test_shared::{heartbeat_frame, ping_frame, RECV_TIMEOUT};

fn config(port: u16) -> RouterConfig {
    RouterConfig {
        system_id: 245,
        component_id: 190,
        connections: vec![format!("udpin:127.0.0.1:{port}")],
    }
}

async fn client(router_port: u16) -> UdpSocket {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    socket.connect(("127.0.0.1", router_port)).await.unwrap();
    socket
}

async fn next_delivery(sub: &mut mavrouter::Subscriber<MavMessage>) -> Delivery<MavMessage> {
    timeout(RECV_TIMEOUT, sub.recv())
        .await
        .expect("timed out waiting for delivery")
        .expect("subscription closed")
}

#[tokio::test]
async fn message_type_filter_selects_deliveries() {
    let port = 14670;
    let handle = Router::<MavMessage>::start(config(port)).unwrap();
    let peer = client(port).await;

    let mut sub = handle
        .subscribe(SubscriptionQuery {
            message: Some("PING".into()),
            ..Default::default()
        })
        .await
        .unwrap();

    // a heartbeat must be skipped, the ping delivered
    peer.send(heartbeat_frame(MavlinkVersion::V2, 11, 1).raw_bytes())
        .await
        .unwrap();
    peer.send(ping_frame(MavlinkVersion::V2, (11, 1), (0, 0), 7).raw_bytes())
        .await
        .unwrap();

    match next_delivery(&mut sub).await {
        Delivery::Message(MavMessage::PING(ping)) => assert_eq!(ping.seq, 7),
        other => panic!("expected a PING message, got {other:?}"),
    }
}

#[tokio::test]
async fn unknown_message_names_are_rejected() {
    let port = 14671;
    let handle = Router::<MavMessage>::start(config(port)).unwrap();

    let result = handle
        .subscribe(SubscriptionQuery {
            message: Some("GLOBAL_POSITION_INT".into()),
            ..Default::default()
        })
        .await;
    assert!(matches!(result, Err(RouterError::InvalidMessage { name }) if name == "GLOBAL_POSITION_INT"));
}

#[tokio::test]
async fn target_predicates_skip_broadcast_frames() {
    let port = 14672;
    let handle = Router::<MavMessage>::start(config(port)).unwrap();
    let peer = client(port).await;

    let mut sub = handle
        .subscribe(SubscriptionQuery {
            target_system: 5,
            ..Default::default()
        })
        .await
        .unwrap();

    // broadcast, targeted elsewhere, then targeted at system 5
    peer.send(heartbeat_frame(MavlinkVersion::V2, 11, 1).raw_bytes())
        .await
        .unwrap();
    peer.send(ping_frame(MavlinkVersion::V2, (11, 1), (6, 1), 1).raw_bytes())
        .await
        .unwrap();
    peer.send(ping_frame(MavlinkVersion::V2, (11, 1), (5, 1), 2).raw_bytes())
        .await
        .unwrap();

    match next_delivery(&mut sub).await {
        Delivery::Message(MavMessage::PING(ping)) => {
            assert_eq!(ping.seq, 2);
            assert_eq!(ping.target_system, 5);
        }
        other => panic!("expected the targeted PING, got {other:?}"),
    }
}

#[tokio::test]
async fn frame_subscribers_receive_raw_frames_and_unknown_traffic() {
    let port = 14673;
    let handle = Router::<MavMessage>::start(config(port)).unwrap();
    let peer = client(port).await;

    let mut sub = handle
        .subscribe(SubscriptionQuery {
            as_frame: true,
            ..Default::default()
        })
        .await
        .unwrap();

    let known = heartbeat_frame(MavlinkVersion::V2, 11, 1);
    peer.send(known.raw_bytes()).await.unwrap();
    match next_delivery(&mut sub).await {
        Delivery::Frame(frame) => assert_eq!(frame.raw_bytes(), known.raw_bytes()),
        other => panic!("expected a frame delivery, got {other:?}"),
    }

    // an id outside the dialect still reaches wildcard frame subscribers
    let mut unknown = vec![0xFE, 0x02, 0x00, 0x0B, 0x01, 150, 0xAA, 0xBB];
    let crc = calculate_crc(&unknown[1..], 0);
    unknown.extend_from_slice(&crc.to_le_bytes());
    peer.send(&unknown).await.unwrap();

    match next_delivery(&mut sub).await {
        Delivery::Frame(frame) => assert_eq!(frame.raw_bytes(), unknown),
        other => panic!("expected the unknown frame, got {other:?}"),
    }
}

#[tokio::test]
async fn locally_sent_messages_fan_out_to_subscribers() {
    let port = 14674;
    let handle = Router::<MavMessage>::start(config(port)).unwrap();

    let mut sub = handle
        .subscribe(SubscriptionQuery {
            message: Some("PING".into()),
            ..Default::default()
        })
        .await
        .unwrap();

    handle
        .send(MavMessage::PING(PING_DATA {
            seq: 99,
            ..Default::default()
        }))
        .await
        .unwrap();

    match next_delivery(&mut sub).await {
        Delivery::Message(MavMessage::PING(ping)) => assert_eq!(ping.seq, 99),
        other => panic!("expected the local PING, got {other:?}"),
    }
}

#[tokio::test]
async fn unsubscribe_removes_the_handle() {
    let port = 14675;
    let handle = Router::<MavMessage>::start(config(port)).unwrap();
    let peer = client(port).await;

    let mut sub = handle
        .subscribe(SubscriptionQuery::default())
        .await
        .unwrap();
    handle.unsubscribe(sub.id()).await.unwrap();
    sleep(Duration::from_millis(100)).await;

    peer.send(heartbeat_frame(MavlinkVersion::V2, 11, 1).raw_bytes())
        .await
        .unwrap();

    // the delivery channel is closed once the registry lets go of it
    assert!(timeout(RECV_TIMEOUT, sub.recv()).await.unwrap().is_none());
}

#[tokio::test]
async fn subscriptions_survive_router_restart() {
    let port = 14676;
    let cache = SubscriptionCache::<MavMessage>::spawn();

    let handle = Router::start_with_cache(config(port), cache.clone()).unwrap();
    let mut sub = handle
        .subscribe(SubscriptionQuery {
            message: Some("HEARTBEAT".into()),
            ..Default::default()
        })
        .await
        .unwrap();

    handle.shutdown().await;
    sleep(Duration::from_millis(300)).await;

    // a new router on the same cache serves the old subscriber
    let _handle = Router::start_with_cache(config(port), cache).unwrap();

    // keep knocking until the rebound socket is up and the delivery lands
    let peer = client(port).await;
    for _ in 0..20 {
        peer.send(heartbeat_frame(MavlinkVersion::V2, 11, 1).raw_bytes())
            .await
            .unwrap();
        match timeout(Duration::from_millis(200), sub.recv()).await {
            Ok(Some(Delivery::Message(MavMessage::HEARTBEAT(_)))) => return,
            Ok(Some(other)) => panic!("expected a HEARTBEAT after restart, got {other:?}"),
            Ok(None) => panic!("subscription closed across restart"),
            Err(_) => continue,
        }
    }
    panic!("no delivery after router restart");
}
