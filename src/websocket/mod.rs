//! Live synchronization with the order-book feed.
//!
//! This module is organized by concern:
//! - [`connection`] - Pure connection lifecycle state machine
//! - [`transport`] - Tokio tasks that execute the state machine's effects
//! - [`client`] - Owned client wiring lifecycle, dedup, and store together

pub mod client;
pub mod connection;
pub mod transport;

use futures_util::StreamExt;
use futures_util::stream::{SplitSink, SplitStream};
use tokio::net::TcpStream;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::info;
use tungstenite::Message;

use crate::Result;

pub use client::FeedClient;
pub use connection::{
    AttemptId, CloseInfo, ConnectionEvent, ConnectionManager, ConnectionState, Effect,
    ReconnectPolicy, TimerId,
};
pub use transport::{TokioTransport, Transport, TransportEvent};

/// Write half of a feed WebSocket connection.
pub type WsWriter = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

/// Read half of a feed WebSocket connection.
pub type WsReader = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

/// Establishes a WebSocket connection to the given URL.
///
/// No connect timeout is applied; an unreachable endpoint fails when the
/// underlying TCP/TLS stack gives up.
///
/// # Errors
///
/// Returns an [`OfsError`](crate::OfsError) if the connection or handshake fails.
pub async fn connect(url: &str) -> Result<(WsWriter, WsReader)> {
    let (ws_stream, _) = connect_async(url).await?;
    info!(url, "WebSocket handshake completed");

    Ok(ws_stream.split())
}
