//! WebSocket connection lifecycle management.
//!
//! [`ConnectionManager`] is a pure state machine: it consumes
//! [`ConnectionEvent`]s and returns the [`Effect`]s a transport must carry
//! out (open a socket, close one, arm or disarm the reconnect timer). It
//! never touches the network itself, so tests can drive it directly.
//!
//! Every socket and timer is identified by a fresh id. Events tagged
//! with an id the manager no longer owns come from a superseded or
//! torn-down resource and are ignored.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::DEFAULT_RECONNECT_DELAY;

/// Feed connection status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Error,
}

impl ConnectionState {
    /// Returns a display string for the status.
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "DISCONNECTED",
            ConnectionState::Connecting => "CONNECTING",
            ConnectionState::Connected => "CONNECTED",
            ConnectionState::Error => "ERROR",
        }
    }
}

/// Identifies one connection attempt (one socket).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttemptId(pub u64);

/// Identifies one scheduled reconnect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

/// Details of a socket close. Informational only.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CloseInfo {
    pub code: Option<u16>,
    pub reason: String,
    pub clean: bool,
}

impl CloseInfo {
    /// A close with no handshake (stream ended, transport failure).
    pub fn abnormal(reason: impl Into<String>) -> Self {
        Self {
            code: None,
            reason: reason.into(),
            clean: false,
        }
    }
}

/// Inputs to the state machine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// Start connecting if not already connecting or connected.
    Connect,
    /// Start a fresh attempt regardless of the current state.
    Retry,
    /// Tear everything down and stop reconnecting.
    Disconnect,
    /// The socket finished its handshake.
    Opened(AttemptId),
    /// The socket reported a transport-level error.
    Failed(AttemptId, String),
    /// The socket closed, cleanly or not.
    Closed(AttemptId, CloseInfo),
    /// The reconnect timer fired.
    ReconnectDue(TimerId),
}

/// Side effects requested by the state machine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    Open(AttemptId),
    Close(AttemptId),
    ScheduleReconnect(TimerId, Duration),
    CancelReconnect(TimerId),
}

/// Flat reconnect delay: no backoff, no jitter, no attempt limit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReconnectPolicy {
    delay: Duration,
}

impl ReconnectPolicy {
    /// Creates a policy that always waits `delay` before reconnecting.
    pub fn fixed(delay: Duration) -> Self {
        Self { delay }
    }

    /// Delay before the next attempt.
    pub fn next_delay(&self) -> Duration {
        self.delay
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::fixed(DEFAULT_RECONNECT_DELAY)
    }
}

/// Owns the connection lifecycle: current state, the live socket id, the
/// pending timer id, and the last transport error.
#[derive(Debug)]
pub struct ConnectionManager {
    state: ConnectionState,
    last_error: Option<String>,
    socket: Option<AttemptId>,
    timer: Option<TimerId>,
    policy: ReconnectPolicy,
    next_id: u64,
    attempts: u64,
}

impl ConnectionManager {
    /// Creates a manager in the `Disconnected` state.
    #[must_use]
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            last_error: None,
            socket: None,
            timer: None,
            policy,
            next_id: 0,
            attempts: 0,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// The socket currently owned by the manager, if any.
    pub fn active_attempt(&self) -> Option<AttemptId> {
        self.socket
    }

    /// The reconnect timer currently armed, if any.
    pub fn pending_timer(&self) -> Option<TimerId> {
        self.timer
    }

    /// Total connection attempts started so far.
    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    /// Returns `true` if events from `attempt` should still be honoured.
    pub fn is_current(&self, attempt: AttemptId) -> bool {
        self.socket == Some(attempt)
    }

    /// Applies `event` and returns the effects to execute, in order.
    pub fn handle(&mut self, event: ConnectionEvent) -> Vec<Effect> {
        let mut effects = Vec::new();

        match event {
            ConnectionEvent::Connect => match self.state {
                ConnectionState::Disconnected | ConnectionState::Error => {
                    self.begin_attempt(&mut effects);
                }
                ConnectionState::Connecting | ConnectionState::Connected => {
                    debug!(state = ?self.state, "Connect ignored, attempt already live");
                }
            },
            ConnectionEvent::Retry => self.begin_attempt(&mut effects),
            ConnectionEvent::Disconnect => {
                self.teardown(&mut effects);
                self.state = ConnectionState::Disconnected;
                info!("Connection torn down, reconnects stopped");
            }
            ConnectionEvent::Opened(id) => {
                if self.is_current(id) && self.state == ConnectionState::Connecting {
                    self.state = ConnectionState::Connected;
                    self.last_error = None;
                    info!(attempt = id.0, "Feed connected");
                } else {
                    debug!(attempt = id.0, "Ignoring open from stale attempt");
                }
            }
            ConnectionEvent::Failed(id, message) => {
                if self.is_current(id) {
                    warn!(attempt = id.0, error = %message, "Transport error");
                    self.state = ConnectionState::Error;
                    self.last_error = Some(message);
                    // The socket stays owned until its close event arrives.
                    effects.push(Effect::Close(id));
                } else {
                    debug!(attempt = id.0, "Ignoring error from stale attempt");
                }
            }
            ConnectionEvent::Closed(id, close) => {
                if self.is_current(id) {
                    self.socket = None;
                    self.state = ConnectionState::Disconnected;
                    if let Some(previous) = self.timer.take() {
                        effects.push(Effect::CancelReconnect(previous));
                    }
                    let timer = self.allocate_timer();
                    let delay = self.policy.next_delay();
                    self.timer = Some(timer);
                    effects.push(Effect::ScheduleReconnect(timer, delay));
                    info!(
                        attempt = id.0,
                        code = ?close.code,
                        clean = close.clean,
                        reason = %close.reason,
                        delay_ms = delay.as_millis() as u64,
                        "Connection closed, reconnect scheduled"
                    );
                } else {
                    debug!(attempt = id.0, "Ignoring close from stale attempt");
                }
            }
            ConnectionEvent::ReconnectDue(timer) => {
                if self.timer == Some(timer) {
                    self.timer = None;
                    self.begin_attempt(&mut effects);
                } else {
                    debug!(timer = timer.0, "Ignoring cancelled reconnect timer");
                }
            }
        }

        effects
    }

    /// Releases any live socket and timer, then opens a fresh socket.
    fn begin_attempt(&mut self, effects: &mut Vec<Effect>) {
        self.teardown(effects);
        let id = AttemptId(self.allocate_id());
        self.socket = Some(id);
        self.state = ConnectionState::Connecting;
        self.attempts += 1;
        effects.push(Effect::Open(id));
        info!(attempt = id.0, "Connecting to feed");
    }

    /// Cancels the pending timer and closes the live socket. Idempotent.
    fn teardown(&mut self, effects: &mut Vec<Effect>) {
        if let Some(timer) = self.timer.take() {
            effects.push(Effect::CancelReconnect(timer));
        }
        if let Some(socket) = self.socket.take() {
            effects.push(Effect::Close(socket));
        }
    }

    fn allocate_timer(&mut self) -> TimerId {
        TimerId(self.allocate_id())
    }

    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new(ReconnectPolicy::default())
    }
}
