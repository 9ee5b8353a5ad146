//! Status bar component.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::tui::app::App;
use crate::websocket::{ConnectionState, Transport};

/// Badge colour for each connection state.
pub fn status_color(state: ConnectionState) -> Color {
    match state {
        ConnectionState::Connected => Color::Green,
        ConnectionState::Connecting => Color::Yellow,
        ConnectionState::Error => Color::Red,
        ConnectionState::Disconnected => Color::Gray,
    }
}

/// Renders the title line with the connection badge.
pub fn render<T: Transport>(frame: &mut Frame, area: Rect, app: &App<T>) {
    let store = app.client.store();
    let state = store.connection_state();

    let updated = store
        .last_update()
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| crate::view::PLACEHOLDER.to_string());

    let left = vec![
        Span::styled(
            " OFS Order Book ",
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("│"),
        Span::styled(
            format!(" {} ", app.websocket_url),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw("│"),
        Span::raw(format!(" msgs {} ", store.message_count())),
        Span::raw("│"),
        Span::raw(format!(" updated {updated} ")),
    ];

    let badge = format!(" {} ", state.label());
    let used: usize = left.iter().map(Span::width).sum();
    let pad = (area.width as usize).saturating_sub(used + badge.chars().count());

    let mut spans = left;
    spans.push(Span::raw(" ".repeat(pad)));
    spans.push(Span::styled(
        badge,
        Style::default()
            .fg(Color::Black)
            .bg(status_color(state))
            .add_modifier(Modifier::BOLD),
    ));

    let para = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(para, area);
}
