//! The TUI main loop.

use tokio::sync::mpsc;
use tracing::{error, info};

use super::app::App;
use super::event::{Message, spawn_event_reader, update};
use super::terminal::{restore_terminal, setup_terminal};
use super::ui::render;
use crate::config::FeedConfig;
use crate::websocket::{FeedClient, ReconnectPolicy, TokioTransport};
use crate::{OfsError, Result};

/// Runs the viewer until the user quits.
///
/// Terminal input and feed events share one channel and are applied in
/// arrival order on this task. The screen is redrawn only when an update
/// reports a visible change.
///
/// # Errors
///
/// Returns an error if the terminal cannot be set up, drawn, or restored.
/// Feed errors never end the loop.
pub async fn run(config: &FeedConfig) -> Result<()> {
    let mut terminal = setup_terminal()?;

    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();
    spawn_event_reader(tx.clone());

    let quit_tx = tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = quit_tx.send(Message::Quit);
        }
    });

    let transport = TokioTransport::new(config.websocket_url.clone(), tx);
    let client = FeedClient::new(transport, ReconnectPolicy::fixed(config.reconnect_delay));
    let mut app = App::new(client, config);
    app.client.connect();
    info!(url = %config.websocket_url, "Viewer started");

    let mut dirty = true;
    let result = loop {
        if dirty
            && let Err(e) = terminal.draw(|frame| render(frame, &app))
        {
            break Err(OfsError::Io(format!("failed to draw: {e}")));
        }

        let Some(message) = rx.recv().await else {
            break Ok(());
        };
        dirty = update(&mut app, message);

        // Coalesce bursts into a single redraw.
        while let Ok(message) = rx.try_recv() {
            dirty |= update(&mut app, message);
        }

        if app.should_quit {
            break Ok(());
        }
    };

    app.client.disconnect();
    if let Err(e) = restore_terminal(&mut terminal) {
        error!("Failed to restore terminal: {e}");
        return result.and(Err(e));
    }
    info!("Viewer stopped");
    result
}
