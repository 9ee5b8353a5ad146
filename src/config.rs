//! Application configuration loaded from environment variables.
//!
//! All variables are optional:
//! - `OFS_WEBSOCKET_URL` — feed endpoint (default `ws://127.0.0.1:8000/ws/nse`)
//! - `OFS_RECONNECT_DELAY_MS` — flat delay between reconnect attempts
//! - `OFS_HEALTH_URL` — informational health endpoint shown in the UI
//! - `OFS_HEADLESS` — run without the terminal UI
//! - `OFS_LOG_FILE` — log destination while the terminal UI is active

use std::time::Duration;

use crate::OfsError;

/// Default feed endpoint of the reference deployment.
pub const DEFAULT_WEBSOCKET_URL: &str = "ws://127.0.0.1:8000/ws/nse";

/// Default delay before a reconnect attempt.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(3000);

/// Default log file used in TUI mode.
pub const DEFAULT_LOG_FILE: &str = "ofsbook.log";

/// Top-level application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub feed: FeedConfig,
    /// Run without the terminal UI, logging snapshots instead.
    pub headless: bool,
    /// Log file path used while the terminal UI owns stdout.
    pub log_file: String,
}

/// Feed connection settings.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub websocket_url: String,
    pub reconnect_delay: Duration,
    /// Shown for manual connectivity checks; never requested.
    pub health_url: String,
}

/// Loads the application configuration from environment variables.
///
/// # Errors
///
/// Returns [`OfsError::Config`] if `OFS_RECONNECT_DELAY_MS` is not a
/// positive integer or `OFS_HEADLESS` is not a recognized boolean.
pub fn fetch_config() -> crate::Result<AppConfig> {
    let websocket_url = non_empty_var("OFS_WEBSOCKET_URL")
        .unwrap_or_else(|| DEFAULT_WEBSOCKET_URL.to_string());

    let reconnect_delay = match non_empty_var("OFS_RECONNECT_DELAY_MS") {
        Some(raw) => match raw.parse::<u64>() {
            Ok(ms) if ms > 0 => Duration::from_millis(ms),
            _ => {
                return Err(OfsError::Config(format!(
                    "OFS_RECONNECT_DELAY_MS must be a positive integer, got {raw:?}"
                )));
            }
        },
        None => DEFAULT_RECONNECT_DELAY,
    };

    let health_url =
        non_empty_var("OFS_HEALTH_URL").unwrap_or_else(|| derive_health_url(&websocket_url));

    let headless = match non_empty_var("OFS_HEADLESS").as_deref() {
        None | Some("0") | Some("false") => false,
        Some("1") | Some("true") => true,
        Some(other) => {
            return Err(OfsError::Config(format!(
                "OFS_HEADLESS must be one of 0, 1, true, false, got {other:?}"
            )));
        }
    };

    let log_file = non_empty_var("OFS_LOG_FILE").unwrap_or_else(|| DEFAULT_LOG_FILE.to_string());

    Ok(AppConfig {
        feed: FeedConfig {
            websocket_url,
            reconnect_delay,
            health_url,
        },
        headless,
        log_file,
    })
}

/// Builds `http(s)://<host>:<port>/health` from a websocket URL.
///
/// Falls back to the websocket URL itself when it has no recognizable
/// `ws://` or `wss://` scheme.
pub fn derive_health_url(websocket_url: &str) -> String {
    let (scheme, rest) = if let Some(rest) = websocket_url.strip_prefix("wss://") {
        ("https", rest)
    } else if let Some(rest) = websocket_url.strip_prefix("ws://") {
        ("http", rest)
    } else {
        return websocket_url.to_string();
    };

    let authority = rest.split('/').next().unwrap_or(rest);
    format!("{scheme}://{authority}/health")
}

/// Returns the value of an environment variable if it exists and is non-empty.
fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}
