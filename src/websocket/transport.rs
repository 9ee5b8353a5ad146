//! Execution of connection effects on the tokio runtime.
//!
//! [`TokioTransport`] spawns one task per socket and one per pending
//! reconnect timer. Tasks report back by sending [`TransportEvent`]s
//! into the owner's channel; they never touch client state directly.

use std::fmt;
use std::time::Duration;

use futures_util::{Sink, SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use tungstenite::Message as WsMessage;

use super::connect;
use super::connection::{AttemptId, CloseInfo, TimerId};

/// Upper bound on the client-side close handshake.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(2);

/// Executes the effects emitted by the
/// [`ConnectionManager`](super::ConnectionManager).
pub trait Transport {
    /// Opens a new socket for `attempt`.
    fn open(&mut self, attempt: AttemptId);

    /// Closes the socket for `attempt`, if it is still live.
    fn close(&mut self, attempt: AttemptId);

    /// Arms a timer that reports [`TransportEvent::ReconnectDue`] after `delay`.
    fn schedule_reconnect(&mut self, timer: TimerId, delay: Duration);

    /// Disarms `timer`, if it has not fired.
    fn cancel_reconnect(&mut self, timer: TimerId);
}

/// Events reported by sockets and timers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportEvent {
    Opened(AttemptId),
    /// A text frame, undecoded.
    Frame(AttemptId, String),
    Failed(AttemptId, String),
    Closed(AttemptId, CloseInfo),
    ReconnectDue(TimerId),
}

struct SocketTask {
    attempt: AttemptId,
    cancel: CancellationToken,
    _handle: JoinHandle<()>,
}

struct TimerTask {
    timer: TimerId,
    handle: JoinHandle<()>,
}

/// Tokio-backed [`Transport`] delivering events as `M`.
///
/// Holds at most one socket task and one timer task. Dropping the
/// transport cancels both.
pub struct TokioTransport<M> {
    url: String,
    tx: mpsc::UnboundedSender<M>,
    socket: Option<SocketTask>,
    timer: Option<TimerTask>,
}

impl<M> TokioTransport<M>
where
    M: From<TransportEvent> + Send + 'static,
{
    /// Creates a transport for `url` that reports into `tx`.
    #[must_use]
    pub fn new(url: impl Into<String>, tx: mpsc::UnboundedSender<M>) -> Self {
        Self {
            url: url.into(),
            tx,
            socket: None,
            timer: None,
        }
    }
}

impl<M> Transport for TokioTransport<M>
where
    M: From<TransportEvent> + Send + 'static,
{
    fn open(&mut self, attempt: AttemptId) {
        if let Some(previous) = self.socket.take() {
            previous.cancel.cancel();
        }

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_socket(
            self.url.clone(),
            attempt,
            self.tx.clone(),
            cancel.clone(),
        ));
        self.socket = Some(SocketTask {
            attempt,
            cancel,
            _handle: handle,
        });
    }

    fn close(&mut self, attempt: AttemptId) {
        if self
            .socket
            .as_ref()
            .is_some_and(|socket| socket.attempt == attempt)
            && let Some(socket) = self.socket.take()
        {
            socket.cancel.cancel();
        }
    }

    fn schedule_reconnect(&mut self, timer: TimerId, delay: Duration) {
        if let Some(previous) = self.timer.take() {
            previous.handle.abort();
        }

        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(M::from(TransportEvent::ReconnectDue(timer)));
        });
        self.timer = Some(TimerTask { timer, handle });
    }

    fn cancel_reconnect(&mut self, timer: TimerId) {
        if self.timer.as_ref().is_some_and(|t| t.timer == timer)
            && let Some(task) = self.timer.take()
        {
            task.handle.abort();
        }
    }
}

impl<M> Drop for TokioTransport<M> {
    fn drop(&mut self) {
        if let Some(socket) = self.socket.take() {
            socket.cancel.cancel();
        }
        if let Some(timer) = self.timer.take() {
            timer.handle.abort();
        }
    }
}

/// Drives one socket from handshake to close.
///
/// A transport failure is reported as `Failed` followed by `Closed`, the
/// same sequence a browser socket produces. Cancellation closes the
/// socket gracefully and still reports `Closed`.
async fn run_socket<M>(
    url: String,
    attempt: AttemptId,
    tx: mpsc::UnboundedSender<M>,
    cancel: CancellationToken,
) where
    M: From<TransportEvent> + Send + 'static,
{
    let send = |event: TransportEvent| tx.send(M::from(event)).is_ok();

    let connected = tokio::select! {
        result = connect(&url) => result,
        () = cancel.cancelled() => {
            debug!(attempt = attempt.0, "Attempt cancelled before handshake");
            return;
        }
    };

    let (mut write, mut read) = match connected {
        Ok(pair) => pair,
        Err(e) => {
            warn!(attempt = attempt.0, "Connection failed: {e}");
            send(TransportEvent::Failed(
                attempt,
                format!("connection to {url} failed: {e}"),
            ));
            send(TransportEvent::Closed(
                attempt,
                CloseInfo::abnormal("connection never opened"),
            ));
            return;
        }
    };

    if !send(TransportEvent::Opened(attempt)) {
        return;
    }

    loop {
        tokio::select! {
            () = cancel.cancelled() => {
                let clean = close_within(&mut write, CLOSE_TIMEOUT).await;
                if !clean {
                    debug!(attempt = attempt.0, "Socket closed without a clean handshake");
                }
                send(TransportEvent::Closed(attempt, CloseInfo {
                    code: Some(1000),
                    reason: "closed by client".to_string(),
                    clean,
                }));
                return;
            }
            msg = read.next() => {
                match msg {
                    Some(Ok(WsMessage::Text(text))) => {
                        if !send(TransportEvent::Frame(attempt, text.as_str().to_owned())) {
                            return;
                        }
                    }
                    Some(Ok(WsMessage::Close(frame))) => {
                        let close = match frame {
                            Some(frame) => CloseInfo {
                                code: Some(u16::from(frame.code)),
                                reason: frame.reason.as_str().to_owned(),
                                clean: true,
                            },
                            None => CloseInfo {
                                code: None,
                                reason: String::new(),
                                clean: true,
                            },
                        };
                        send(TransportEvent::Closed(attempt, close));
                        return;
                    }
                    Some(Ok(_)) => {} // Binary/Ping/Pong frames
                    Some(Err(e)) => {
                        warn!(attempt = attempt.0, "WebSocket error: {e}");
                        send(TransportEvent::Failed(attempt, format!("websocket error: {e}")));
                        send(TransportEvent::Closed(attempt, CloseInfo::abnormal(e.to_string())));
                        return;
                    }
                    None => {
                        warn!(attempt = attempt.0, "WebSocket stream ended");
                        send(TransportEvent::Closed(attempt, CloseInfo::abnormal("stream ended")));
                        return;
                    }
                }
            }
        }
    }
}

/// Closes `sink`, giving up after `limit` so a peer that stopped reading
/// cannot hold the socket task open.
///
/// Returns `true` if the close completed in time.
async fn close_within<S>(sink: &mut S, limit: Duration) -> bool
where
    S: Sink<WsMessage> + Unpin,
    S::Error: fmt::Display,
{
    match tokio::time::timeout(limit, sink.close()).await {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            debug!("Close handshake failed: {e}");
            false
        }
        Err(_) => {
            debug!(limit_ms = limit.as_millis() as u64, "Close handshake timed out");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use std::time::Instant;

    use super::*;

    /// A sink whose peer never drains it.
    struct StalledSink;

    impl Sink<WsMessage> for StalledSink {
        type Error = tungstenite::Error;

        fn poll_ready(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Pending
        }

        fn start_send(self: Pin<&mut Self>, _: WsMessage) -> Result<(), Self::Error> {
            Ok(())
        }

        fn poll_flush(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Pending
        }

        fn poll_close(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Pending
        }
    }

    #[tokio::test]
    async fn close_gives_up_on_stalled_peer() {
        let started = Instant::now();
        assert!(!close_within(&mut StalledSink, Duration::from_millis(50)).await);
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn close_reports_clean_when_sink_drains() {
        let mut sink = futures_util::sink::drain::<WsMessage>();
        assert!(close_within(&mut sink, Duration::from_millis(50)).await);
    }
}
