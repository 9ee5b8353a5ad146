//! Headless follower shutdown behaviour.

mod common;

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;

use ofsbook::headless;
use ofsbook::websocket::{ConnectionState, TransportEvent};

use common::{open, snapshot_frame, test_client};

#[tokio::test]
async fn test_shutdown_observed_under_steady_traffic() {
    let mut client = test_client();
    let attempt = open(&mut client);
    let (tx, mut rx) = mpsc::unbounded_channel();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();

    tx.send(TransportEvent::Frame(attempt, snapshot_frame(&[1, 2])))
        .unwrap();
    let feeder = tokio::spawn(async move {
        loop {
            let ping = TransportEvent::Frame(attempt, r#"{"type":"ping"}"#.to_string());
            if tx.send(ping).is_err() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    });

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        let _ = stop_tx.send(());
    });

    timeout(
        Duration::from_secs(5),
        headless::follow(&mut client, &mut rx, stop_rx),
    )
    .await
    .expect("follower should stop once shutdown fires");

    assert_eq!(client.store().message_count(), 1);
    assert_eq!(client.store().connection_state(), ConnectionState::Disconnected);
    assert!(client.transport().open_sockets.is_empty());
    feeder.abort();
}

#[tokio::test]
async fn test_shutdown_already_fired_stops_immediately() {
    let mut client = test_client();
    open(&mut client);
    let (_tx, mut rx) = mpsc::unbounded_channel::<TransportEvent>();

    timeout(
        Duration::from_secs(1),
        headless::follow(&mut client, &mut rx, std::future::ready(())),
    )
    .await
    .expect("ready shutdown should end the loop");

    assert_eq!(client.store().connection_state(), ConnectionState::Disconnected);
}
