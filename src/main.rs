use std::fs::File;
use std::sync::Mutex;

use ofsbook::OfsError;
use ofsbook::config::{FeedConfig, fetch_config};
use ofsbook::headless;
use ofsbook::websocket::{FeedClient, ReconnectPolicy, TokioTransport, TransportEvent};
use tokio::sync::mpsc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), OfsError> {
    let app_config = fetch_config()?;

    if app_config.headless {
        tracing_subscriber::fmt::init();
        return run_headless(&app_config.feed).await;
    }

    // The TUI owns stdout, so logs go to a file.
    let log_file = File::create(&app_config.log_file)
        .map_err(|e| OfsError::Io(format!("failed to open {}: {e}", app_config.log_file)))?;
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .init();

    ofsbook::tui::run(&app_config.feed).await
}

/// Follows the feed without a terminal UI until Ctrl-C.
async fn run_headless(config: &FeedConfig) -> Result<(), OfsError> {
    let (tx, mut rx) = mpsc::unbounded_channel::<TransportEvent>();
    let transport = TokioTransport::new(config.websocket_url.clone(), tx);
    let mut client = FeedClient::new(transport, ReconnectPolicy::fixed(config.reconnect_delay));
    client.connect();
    info!(url = %config.websocket_url, health = %config.health_url, "Following feed");

    headless::follow(&mut client, &mut rx, tokio::signal::ctrl_c()).await;
    Ok(())
}
