//! End-to-end tests against a local mock feed.

mod common;

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;

use ofsbook::websocket::{
    ConnectionState, FeedClient, ReconnectPolicy, TokioTransport, TransportEvent,
};

use common::{MockFeedServer, snapshot_frame};

const DEADLINE: Duration = Duration::from_secs(5);

type LiveClient = FeedClient<TokioTransport<TransportEvent>>;

fn live_client(
    url: String,
    delay_ms: u64,
) -> (LiveClient, mpsc::UnboundedReceiver<TransportEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let transport = TokioTransport::new(url, tx);
    let client = FeedClient::new(
        transport,
        ReconnectPolicy::fixed(Duration::from_millis(delay_ms)),
    );
    (client, rx)
}

/// Pumps events into `client` until `done` holds.
async fn pump_until<F>(
    client: &mut LiveClient,
    rx: &mut mpsc::UnboundedReceiver<TransportEvent>,
    mut done: F,
) where
    F: FnMut(&LiveClient) -> bool,
{
    timeout(DEADLINE, async {
        while !done(client) {
            let event = rx.recv().await.expect("transport channel closed");
            client.handle_transport_event(event);
        }
    })
    .await
    .expect("condition not reached before deadline");
}

#[tokio::test]
async fn test_snapshots_deduplicated_over_the_wire() {
    let frame = snapshot_frame(&[10, 20, 30]);
    let script = vec![
        frame.clone(),
        r#"{"type":"ping"}"#.to_string(),
        frame,
        snapshot_frame(&[10, 20, 31]),
    ];
    let mut server = MockFeedServer::start(script).await;
    let (mut client, mut rx) = live_client(server.url(), 50);

    client.connect();
    pump_until(&mut client, &mut rx, |c| c.store().message_count() == 2).await;
    assert!(server.connections.recv().await.is_some());
    assert_eq!(client.store().rows()[2].qty, 31);

    client.disconnect();
}

#[tokio::test]
async fn test_reconnects_after_server_close() {
    let mut server = MockFeedServer::start(vec![snapshot_frame(&[1])]).await;
    let (mut client, mut rx) = live_client(server.url(), 50);

    client.connect();
    pump_until(&mut client, &mut rx, |c| c.connection().attempts() >= 3).await;

    assert!(server.connections.recv().await.is_some());
    assert!(server.connections.recv().await.is_some());
    // Identical snapshot on every connection is accepted only once.
    assert_eq!(client.store().message_count(), 1);

    client.disconnect();
    assert_eq!(client.store().connection_state(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn test_unreachable_endpoint_surfaces_error() {
    // Bind then drop to get a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let (mut client, mut rx) = live_client(format!("ws://{addr}/ws/nse"), 50);
    client.connect();
    pump_until(&mut client, &mut rx, |c| c.connection().attempts() >= 2).await;

    assert!(client.store().last_error().is_some_and(|e| e.contains("failed")));
    assert_eq!(client.store().message_count(), 0);
    client.disconnect();
}

#[tokio::test]
async fn test_no_events_honoured_after_teardown() {
    let server = MockFeedServer::start(vec![snapshot_frame(&[1, 2])]).await;
    let (mut client, mut rx) = live_client(server.url(), 50);

    client.connect();
    pump_until(&mut client, &mut rx, |c| {
        c.store().connection_state() == ConnectionState::Connected
    })
    .await;
    client.disconnect();
    let count = client.store().message_count();
    let attempts = client.connection().attempts();

    // Drain whatever the cancelled socket still reports.
    tokio::time::sleep(Duration::from_millis(200)).await;
    while let Ok(event) = rx.try_recv() {
        assert!(!client.handle_transport_event(event));
    }

    assert_eq!(client.store().message_count(), count);
    assert_eq!(client.connection().attempts(), attempts);
    assert_eq!(client.store().connection_state(), ConnectionState::Disconnected);
}
