//! Application state for the TUI.

use crate::config::FeedConfig;
use crate::websocket::{FeedClient, Transport};

/// Central application state container.
pub struct App<T: Transport> {
    /// The live feed client; owns all order-book and connection state.
    pub client: FeedClient<T>,
    /// Show the full book instead of the head/tail preview.
    pub expanded: bool,
    /// Endpoint being followed, for the header.
    pub websocket_url: String,
    /// Informational health endpoint, for the footer.
    pub health_url: String,
    /// Flag to signal application should quit.
    pub should_quit: bool,
}

impl<T: Transport> App<T> {
    /// Creates a new App around `client`. Does not connect.
    pub fn new(client: FeedClient<T>, config: &FeedConfig) -> Self {
        Self {
            client,
            expanded: false,
            websocket_url: config.websocket_url.clone(),
            health_url: config.health_url.clone(),
            should_quit: false,
        }
    }

    /// Flips between preview and full book. Never touches the store.
    pub fn toggle_expanded(&mut self) {
        self.expanded = !self.expanded;
    }
}
