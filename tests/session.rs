//! End-to-end tests of a listener session over loopback UDP.

use std::{
    net::{Ipv6Addr, SocketAddr, UdpSocket as StdUdpSocket},
    time::Duration,
};

use mavsniff::{
    ListenerSession,
    Record,
    SessionConfig,
    SessionError,
    SessionState,
    session::{ANNOUNCE_DATAGRAM, Announced},
};
use mavsniff_testing::{
    FakeVehicle,
    fake_vehicle,
    global_position_frame,
    heartbeat_frame,
    loopback_addr,
};
use rstest::rstest;
use tokio::{
    sync::mpsc,
    time::{Instant, timeout},
};

const READ_DEADLINE: Duration = Duration::from_millis(200);
const PATIENCE: Duration = Duration::from_secs(2);

fn config_for(vehicle: &FakeVehicle) -> SessionConfig {
    SessionConfig {
        listen_addr: loopback_addr(),
        remote_addr: vehicle.addr(),
        read_deadline: READ_DEADLINE,
        ..SessionConfig::default()
    }
}

fn channel_sink() -> (mpsc::UnboundedReceiver<Record>, impl FnMut(Record) + Send + 'static) {
    let (tx, rx) = mpsc::unbounded_channel();
    let sink = move |record: Record| {
        let _ = tx.send(record);
    };
    (rx, sink)
}

/// Bind and announce, returning the session and the address the vehicle saw
/// the announce come from.
async fn announced(vehicle: &FakeVehicle) -> (ListenerSession<Announced>, SocketAddr) {
    let session = ListenerSession::new(config_for(vehicle))
        .bind()
        .expect("bind loopback")
        .announce()
        .await
        .expect("announce");
    let (datagram, from) = vehicle
        .recv_within(PATIENCE)
        .await
        .expect("announce datagram");
    assert_eq!(datagram, ANNOUNCE_DATAGRAM);
    (session, from)
}

#[rstest]
#[tokio::test]
async fn announce_comes_from_the_listen_socket(#[future] fake_vehicle: FakeVehicle) {
    let vehicle = fake_vehicle.await;
    let (session, from) = announced(&vehicle).await;
    assert_eq!(session.local_addr(), Some(from));
    assert_eq!(session.state(), SessionState::Announced);
}

#[tokio::test]
async fn records_flow_from_vehicle_to_sink() {
    let vehicle = FakeVehicle::bind().await.expect("vehicle");
    let (session, listener) = announced(&vehicle).await;
    let (mut records, sink) = channel_sink();
    let mut handle = session.start(sink);
    assert_eq!(handle.state(), SessionState::Receiving);

    vehicle
        .send(listener, &heartbeat_frame(4, 0x81))
        .await
        .expect("send heartbeat");
    vehicle
        .send(listener, &[0xFD, 0x00])
        .await
        .expect("send runt");
    vehicle
        .send(listener, &global_position_frame(-338_688_000, 1_512_093_000, 58_000))
        .await
        .expect("send position");

    let first = timeout(PATIENCE, records.recv()).await.expect("heartbeat");
    assert!(matches!(first, Some(Record::Heartbeat(hb)) if hb.armed && hb.custom_mode == 4));
    let second = timeout(PATIENCE, records.recv()).await.expect("position");
    let Some(Record::GlobalPosition(position)) = second else {
        panic!("expected position, got {second:?}");
    };
    assert!((position.latitude_deg + 33.868_8).abs() < 1e-9);
    assert!((position.altitude_m - 58.0).abs() < f64::EPSILON);

    let stats = handle.shutdown().await;
    assert_eq!(stats.records, 2);
    assert_eq!(stats.rejected, 1);
    assert_eq!(handle.state(), SessionState::Closed);
}

#[tokio::test]
async fn cancel_and_close_stops_promptly() {
    let vehicle = FakeVehicle::bind().await.expect("vehicle");
    let (session, listener) = announced(&vehicle).await;
    let (mut records, sink) = channel_sink();
    let mut handle = session.start(sink);
    let states = handle.subscribe();

    let started = Instant::now();
    handle.cancel();
    assert_eq!(*states.borrow(), SessionState::ShuttingDown);
    handle.close_socket();
    timeout(READ_DEADLINE * 2, handle.wait())
        .await
        .expect("receive loop did not exit");
    assert!(started.elapsed() < READ_DEADLINE * 2);

    vehicle
        .send(listener, &heartbeat_frame(0, 0))
        .await
        .expect("send after close");
    tokio::time::sleep(READ_DEADLINE / 4).await;
    assert!(records.try_recv().is_err());
    assert_eq!(*states.borrow(), SessionState::Closed);
}

#[tokio::test]
async fn cancel_alone_stops_within_one_deadline() {
    let vehicle = FakeVehicle::bind().await.expect("vehicle");
    let (session, _) = announced(&vehicle).await;
    let mut handle = session.start(|_: Record| {});

    handle.cancel();
    let stats = timeout(READ_DEADLINE * 3, handle.wait())
        .await
        .expect("cancellation was not observed within the read deadline");
    assert_eq!(stats.records, 0);
    assert!(stats.idle_polls >= 1);
}

#[tokio::test]
async fn close_without_cancel_keeps_retrying() {
    let vehicle = FakeVehicle::bind().await.expect("vehicle");
    let (session, _) = announced(&vehicle).await;
    let mut handle = session.start(|_: Record| {});

    handle.close_socket();
    tokio::time::sleep(READ_DEADLINE / 2).await;
    assert_eq!(handle.state(), SessionState::Receiving);

    handle.cancel();
    let stats = timeout(READ_DEADLINE * 2, handle.wait())
        .await
        .expect("cancel did not end the retry loop");
    assert!(stats.receive_errors >= 1);
}

#[tokio::test]
async fn closed_session_releases_its_port() {
    let vehicle = FakeVehicle::bind().await.expect("vehicle");
    let (session, listener) = announced(&vehicle).await;
    let mut handle = session.start(|_: Record| {});
    assert_eq!(handle.local_addr(), Some(listener));

    handle.shutdown().await;

    assert_eq!(handle.state(), SessionState::Closed);
    assert_eq!(handle.local_addr(), None);
    let rebound = StdUdpSocket::bind(listener).expect("port still held after close");
    assert_eq!(rebound.local_addr().expect("address"), listener);
}

#[tokio::test]
async fn wait_is_idempotent() {
    let vehicle = FakeVehicle::bind().await.expect("vehicle");
    let (session, _) = announced(&vehicle).await;
    let mut handle = session.start(|_: Record| {});

    let first = handle.shutdown().await;
    let second = timeout(PATIENCE, handle.wait()).await.expect("second wait");
    assert_eq!(first, second);
}

#[tokio::test]
async fn announce_failure_is_reported() {
    let config = SessionConfig {
        listen_addr: loopback_addr(),
        remote_addr: SocketAddr::from((Ipv6Addr::LOCALHOST, 14_540)),
        ..SessionConfig::default()
    };
    let err = ListenerSession::new(config)
        .bind()
        .expect("bind loopback")
        .announce()
        .await
        .expect_err("IPv4 socket cannot reach an IPv6 remote");
    assert!(matches!(err, SessionError::Announce { remote, .. } if remote.is_ipv6()));
}
