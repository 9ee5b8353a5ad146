//! Terminal User Interface for the order-book viewer.
//!
//! Provides a Ratatui-based TUI showing the live connection status,
//! summary statistics, and the preview or full order book.

pub mod app;
pub mod components;
pub mod event;
pub mod run;
pub mod terminal;
pub mod ui;

pub use app::App;
pub use event::{Event, Message, update};
pub use run::run;
pub use terminal::{Tui, restore_terminal, setup_terminal};
pub use ui::render;
