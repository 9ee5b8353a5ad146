//! Event handling for the TUI.

use std::time::Duration;

use crossterm::event::{
    self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
};
use tokio::sync::mpsc;

use super::app::App;
use crate::websocket::{Transport, TransportEvent};

/// Terminal events.
#[derive(Debug)]
pub enum Event {
    /// A key was pressed.
    Key(KeyEvent),
    /// Terminal was resized.
    Resize(u16, u16),
}

/// Messages that update application state.
#[derive(Debug)]
pub enum Message {
    /// Input event from terminal.
    Input(Event),
    /// Socket or timer event from the feed transport.
    Feed(TransportEvent),
    /// Request to quit the application.
    Quit,
}

impl From<TransportEvent> for Message {
    fn from(event: TransportEvent) -> Self {
        Message::Feed(event)
    }
}

/// Spawns a task that polls for terminal events and sends them to a channel.
pub fn spawn_event_reader(tx: mpsc::UnboundedSender<Message>) {
    tokio::spawn(async move {
        loop {
            // Poll for events with a 50ms timeout
            match tokio::task::spawn_blocking(|| {
                if event::poll(Duration::from_millis(50)).unwrap_or(false) {
                    event::read().ok()
                } else {
                    None
                }
            })
            .await
            {
                Ok(Some(CrosstermEvent::Key(key))) => {
                    if tx.send(Message::Input(Event::Key(key))).is_err() {
                        break;
                    }
                }
                Ok(Some(CrosstermEvent::Resize(w, h))) => {
                    if tx.send(Message::Input(Event::Resize(w, h))).is_err() {
                        break;
                    }
                }
                Ok(_) => {
                    if tx.is_closed() {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    });
}

/// Updates application state based on a message.
///
/// Returns `true` if the screen should be redrawn.
pub fn update<T: Transport>(app: &mut App<T>, message: Message) -> bool {
    match message {
        Message::Input(Event::Key(key)) => handle_key(app, key),
        Message::Input(Event::Resize(_, _)) => true,
        Message::Feed(event) => app.client.handle_transport_event(event),
        Message::Quit => {
            app.should_quit = true;
            true
        }
    }
}

/// Handles key press events.
fn handle_key<T: Transport>(app: &mut App<T>, key: KeyEvent) -> bool {
    if key.kind == KeyEventKind::Release {
        return false;
    }

    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
        }
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Char('e') | KeyCode::Enter | KeyCode::Char(' ') => app.toggle_expanded(),
        KeyCode::Char('r') => app.client.retry(),
        KeyCode::Char('c') => app.client.connect(),
        KeyCode::Char('d') => app.client.disconnect(),
        _ => return false,
    }
    true
}
