//! Order-book state store.
//!
//! Holds the single authoritative snapshot plus session counters and the
//! connection status shown to the view. Snapshots are swapped as whole
//! `Arc`s, so a reader never observes a half-applied update.

use std::sync::Arc;

use chrono::{DateTime, Local};

use crate::models::book::{BookMeta, ClientSnapshot, OrderBookRow};
use crate::websocket::ConnectionState;

/// Counters that live for the whole session, across reconnects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionCounters {
    /// Accepted snapshots since start-up.
    pub message_count: u64,
    /// Most recent error; newer errors overwrite older ones.
    pub last_error: Option<String>,
}

/// Current state exposed to the view layer.
#[derive(Debug, Default)]
pub struct OrderBookStore {
    snapshot: Option<Arc<ClientSnapshot>>,
    counters: SessionCounters,
    connection_state: ConnectionState,
    last_update: Option<DateTime<Local>>,
}

impl OrderBookStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last accepted snapshot, if any.
    pub fn snapshot(&self) -> Option<&Arc<ClientSnapshot>> {
        self.snapshot.as_ref()
    }

    /// Rows of the current snapshot; empty before the first update.
    pub fn rows(&self) -> &[OrderBookRow] {
        match self.snapshot.as_deref() {
            Some(snapshot) => &snapshot.rows,
            None => &[],
        }
    }

    pub fn meta(&self) -> Option<&BookMeta> {
        self.snapshot.as_deref().map(|s| &s.meta)
    }

    pub fn counters(&self) -> &SessionCounters {
        &self.counters
    }

    pub fn message_count(&self) -> u64 {
        self.counters.message_count
    }

    pub fn last_error(&self) -> Option<&str> {
        self.counters.last_error.as_deref()
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.connection_state
    }

    /// Wall-clock time of the last accepted snapshot.
    pub fn last_update(&self) -> Option<DateTime<Local>> {
        self.last_update
    }

    /// Replaces the snapshot wholesale and counts the message.
    pub fn apply(&mut self, snapshot: Arc<ClientSnapshot>) {
        self.snapshot = Some(snapshot);
        self.counters.message_count += 1;
        self.last_update = Some(Local::now());
    }

    /// Surfaces `message`, replacing any previous error.
    pub fn record_error(&mut self, message: impl Into<String>) {
        self.counters.last_error = Some(message.into());
    }

    pub fn clear_error(&mut self) {
        self.counters.last_error = None;
    }

    pub fn set_connection_state(&mut self, state: ConnectionState) {
        self.connection_state = state;
    }
}
