//! Shared test utilities: a recording transport, frame builders, and a
//! mock feed server.
#![allow(dead_code)]

use std::collections::BTreeSet;
use std::net::SocketAddr;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tungstenite::Message;

use ofsbook::websocket::{
    AttemptId, FeedClient, ReconnectPolicy, TimerId, Transport, TransportEvent,
};

/// One call made on a [`RecordingTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Open(AttemptId),
    Close(AttemptId),
    Schedule(TimerId, Duration),
    Cancel(TimerId),
}

/// A transport that records every call and tracks which sockets and
/// timers would still be live.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    pub calls: Vec<Call>,
    pub open_sockets: BTreeSet<AttemptId>,
    pub pending_timers: BTreeSet<TimerId>,
}

impl RecordingTransport {
    pub fn opens(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, Call::Open(_)))
            .count()
    }
}

impl Transport for RecordingTransport {
    fn open(&mut self, attempt: AttemptId) {
        self.calls.push(Call::Open(attempt));
        self.open_sockets.insert(attempt);
    }

    fn close(&mut self, attempt: AttemptId) {
        self.calls.push(Call::Close(attempt));
        self.open_sockets.remove(&attempt);
    }

    fn schedule_reconnect(&mut self, timer: TimerId, delay: Duration) {
        self.calls.push(Call::Schedule(timer, delay));
        self.pending_timers.insert(timer);
    }

    fn cancel_reconnect(&mut self, timer: TimerId) {
        self.calls.push(Call::Cancel(timer));
        self.pending_timers.remove(&timer);
    }
}

pub type TestClient = FeedClient<RecordingTransport>;

/// A client with the default 3 s policy, not yet connected.
pub fn test_client() -> TestClient {
    FeedClient::new(RecordingTransport::default(), ReconnectPolicy::default())
}

/// Connects `client` and delivers the open event. Returns the attempt.
pub fn open(client: &mut TestClient) -> AttemptId {
    client.connect();
    let attempt = client
        .connection()
        .active_attempt()
        .expect("connect should start an attempt");
    client.handle_transport_event(TransportEvent::Opened(attempt));
    attempt
}

/// A variant-A snapshot frame with one row per quantity.
pub fn snapshot_frame(qtys: &[u64]) -> String {
    let mut cumulative = 0;
    let rows: Vec<serde_json::Value> = qtys
        .iter()
        .enumerate()
        .map(|(i, qty)| {
            cumulative += qty;
            serde_json::json!({
                "price": format!("{}.00", 500 - i),
                "qty": qty,
                "cumulative_qty": cumulative,
            })
        })
        .collect();

    serde_json::json!({
        "data": rows,
        "meta": {
            "subscription_pct": 42.5,
            "issue_size": 1_000_000,
            "nse_last_updated_ts": 1718000000,
        }
    })
    .to_string()
}

/// A mock feed that sends a fixed script of text frames to each
/// connection, then closes it.
pub struct MockFeedServer {
    pub addr: SocketAddr,
    /// Receives one unit per accepted connection.
    pub connections: mpsc::UnboundedReceiver<()>,
}

impl MockFeedServer {
    pub async fn start(script: Vec<String>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, connections) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let script = script.clone();
                let tx = tx.clone();
                tokio::spawn(async move {
                    let Ok(mut ws) = tokio_tungstenite::accept_async(stream).await else {
                        return;
                    };
                    let _ = tx.send(());
                    for frame in script {
                        if ws.send(Message::Text(frame.into())).await.is_err() {
                            return;
                        }
                    }
                    let _ = ws.close(None).await;
                    // Drain until the client acknowledges the close.
                    while let Some(Ok(_)) = ws.next().await {}
                });
            }
        });

        Self { addr, connections }
    }

    pub fn url(&self) -> String {
        format!("ws://{}/ws/nse", self.addr)
    }
}
