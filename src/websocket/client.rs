//! The owned feed client.
//!
//! [`FeedClient`] bundles the connection manager, the deduplicator, the
//! store, and a [`Transport`] into one struct that the view layer holds.
//! All mutation happens through `&mut self` on a single task, in the
//! order events arrive.

use tracing::{debug, info, warn};

use super::connection::{
    AttemptId, ConnectionEvent, ConnectionManager, ConnectionState, Effect, ReconnectPolicy,
};
use super::transport::{Transport, TransportEvent};
use crate::dedup::{Deduplicator, Verdict};
use crate::models::{InboundFrame, parse_frame};
use crate::store::OrderBookStore;

/// Live synchronization client for a single feed endpoint.
///
/// Dropping the client tears down its socket and timer.
pub struct FeedClient<T: Transport> {
    manager: ConnectionManager,
    dedup: Deduplicator,
    store: OrderBookStore,
    transport: T,
}

impl<T: Transport> FeedClient<T> {
    /// Creates a disconnected client. Call [`connect`](Self::connect) to start.
    #[must_use]
    pub fn new(transport: T, policy: ReconnectPolicy) -> Self {
        Self {
            manager: ConnectionManager::new(policy),
            dedup: Deduplicator::new(),
            store: OrderBookStore::new(),
            transport,
        }
    }

    /// Starts connecting unless an attempt is already live.
    pub fn connect(&mut self) {
        self.dispatch(ConnectionEvent::Connect);
    }

    /// Forces a fresh connection attempt from any state.
    pub fn retry(&mut self) {
        self.dispatch(ConnectionEvent::Retry);
    }

    /// Closes the socket, cancels any pending reconnect, and stops retrying.
    pub fn disconnect(&mut self) {
        self.dispatch(ConnectionEvent::Disconnect);
    }

    pub fn store(&self) -> &OrderBookStore {
        &self.store
    }

    pub fn connection(&self) -> &ConnectionManager {
        &self.manager
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Applies an event reported by the transport.
    ///
    /// Returns `true` if the store changed and the view should re-render.
    pub fn handle_transport_event(&mut self, event: TransportEvent) -> bool {
        match event {
            TransportEvent::Frame(attempt, text) => self.handle_frame(attempt, &text),
            TransportEvent::Opened(attempt) => self.dispatch(ConnectionEvent::Opened(attempt)),
            TransportEvent::Failed(attempt, message) => {
                self.dispatch(ConnectionEvent::Failed(attempt, message))
            }
            TransportEvent::Closed(attempt, close) => {
                self.dispatch(ConnectionEvent::Closed(attempt, close))
            }
            TransportEvent::ReconnectDue(timer) => {
                self.dispatch(ConnectionEvent::ReconnectDue(timer))
            }
        }
    }

    /// Runs `event` through the manager, executes its effects, and mirrors
    /// the resulting status into the store.
    fn dispatch(&mut self, event: ConnectionEvent) -> bool {
        let before = self.manager.state();
        let reports_error = match &event {
            ConnectionEvent::Failed(attempt, _) => self.manager.is_current(*attempt),
            _ => false,
        };

        for effect in self.manager.handle(event) {
            match effect {
                Effect::Open(attempt) => self.transport.open(attempt),
                Effect::Close(attempt) => self.transport.close(attempt),
                Effect::ScheduleReconnect(timer, delay) => {
                    self.transport.schedule_reconnect(timer, delay);
                }
                Effect::CancelReconnect(timer) => self.transport.cancel_reconnect(timer),
            }
        }

        let after = self.manager.state();
        let mut changed = false;

        if after != before {
            debug!(from = ?before, to = ?after, "Connection state changed");
            self.store.set_connection_state(after);
            changed = true;
        }

        if reports_error && let Some(message) = self.manager.last_error() {
            self.store.record_error(message);
            changed = true;
        }

        if before == ConnectionState::Connecting && after == ConnectionState::Connected {
            self.store.clear_error();
        }

        changed
    }

    fn handle_frame(&mut self, attempt: AttemptId, text: &str) -> bool {
        if !self.manager.is_current(attempt) {
            debug!(attempt = attempt.0, "Dropping frame from stale attempt");
            return false;
        }

        match parse_frame(text) {
            Ok(InboundFrame::Heartbeat) => {
                debug!("Heartbeat");
                false
            }
            Ok(InboundFrame::Snapshot(candidate)) => match self.dedup.check(candidate) {
                Verdict::Accept(snapshot) => {
                    if !snapshot.cumulative_is_monotonic() {
                        warn!("Cumulative quantity decreases down the book");
                    }
                    self.store.apply(snapshot);
                    info!(
                        rows = self.store.rows().len(),
                        message_count = self.store.message_count(),
                        "Snapshot accepted"
                    );
                    true
                }
                Verdict::Unchanged => {
                    debug!("Snapshot unchanged");
                    false
                }
            },
            Err(e) => {
                warn!("Discarding frame: {e}");
                self.store.record_error(e.to_string());
                true
            }
        }
    }
}

impl<T: Transport> Drop for FeedClient<T> {
    fn drop(&mut self) {
        self.disconnect();
    }
}
