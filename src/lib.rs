//! Live viewer client for NSE/BSE offer-for-sale order-book feeds.
//!
//! Keeps one WebSocket connection to the feed alive with a flat-delay
//! reconnect loop, drops snapshots identical to the last accepted one,
//! and exposes the current book, summary statistics, and a head/tail
//! preview for display.

pub mod config;
pub mod dedup;
pub mod error;
pub mod headless;
pub mod models;
pub mod store;
pub mod tui;
pub mod view;
pub mod websocket;

pub use error::{OfsError, Result};
