//! Terminal-less feed follower that logs each accepted snapshot.

use std::future::Future;

use tokio::sync::mpsc;
use tracing::info;

use crate::view;
use crate::websocket::{FeedClient, Transport, TransportEvent};

/// Pumps transport events into `client` until `shutdown` resolves, then
/// disconnects.
///
/// `shutdown` is polled in place across iterations, so a signal raised
/// while an event is being handled is still observed.
pub async fn follow<T, F>(
    client: &mut FeedClient<T>,
    rx: &mut mpsc::UnboundedReceiver<TransportEvent>,
    shutdown: F,
) where
    T: Transport,
    F: Future,
{
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            Some(event) = rx.recv() => {
                let before = client.store().message_count();
                client.handle_transport_event(event);
                let store = client.store();
                if store.message_count() != before {
                    let meta = store.meta();
                    info!(
                        rows = store.rows().len(),
                        subscription = %view::format_pct(meta.and_then(|m| m.subscription_pct)),
                        remaining = %view::format_qty(meta.and_then(|m| m.remaining_qty)),
                        message_count = store.message_count(),
                        "Order book updated"
                    );
                }
            }
            _ = &mut shutdown => {
                info!("Shutting down");
                client.disconnect();
                return;
            }
        }
    }
}
