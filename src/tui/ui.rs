//! Main UI rendering coordinator.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap},
};

use super::app::App;
use super::components::status_bar;
use crate::view::{self, SummaryField};
use crate::websocket::Transport;

/// Columns in the summary grid.
const SUMMARY_COLUMNS: usize = 3;

/// Renders the entire application UI.
pub fn render<T: Transport>(frame: &mut Frame, app: &App<T>) {
    let area = frame.area();
    let store = app.client.store();
    let error_height = if store.last_error().is_some() { 3 } else { 0 };

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),            // Status bar
            Constraint::Length(5),            // Summary grid
            Constraint::Min(5),               // Order book
            Constraint::Length(error_height), // Error banner
            Constraint::Length(1),            // Keybindings help
        ])
        .split(area);

    status_bar::render(frame, layout[0], app);
    render_summary(frame, layout[1], &view::summary(store.meta()));
    render_book(frame, layout[2], app);
    if let Some(error) = store.last_error() {
        render_error(frame, layout[3], error);
    }
    render_keybindings(frame, layout[4], app);
}

/// Renders the metadata grid, three label/value pairs per line.
fn render_summary(frame: &mut Frame, area: Rect, fields: &[SummaryField]) {
    let block = Block::default()
        .title(" Summary ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let rows: Vec<Row> = fields
        .chunks(SUMMARY_COLUMNS)
        .map(|chunk| {
            let cells: Vec<Cell> = chunk
                .iter()
                .map(|field| {
                    Cell::from(Line::from(vec![
                        Span::styled(
                            format!("{}: ", field.label),
                            Style::default().fg(Color::DarkGray),
                        ),
                        Span::styled(
                            field.value.clone(),
                            Style::default().add_modifier(Modifier::BOLD),
                        ),
                    ]))
                })
                .collect();
            Row::new(cells)
        })
        .collect();

    let widths = [Constraint::Ratio(1, SUMMARY_COLUMNS as u32); SUMMARY_COLUMNS];
    frame.render_widget(Table::new(rows, widths).block(block), area);
}

/// Renders the order book as either the preview or the full table.
fn render_book<T: Transport>(frame: &mut Frame, area: Rect, app: &App<T>) {
    let all_rows = app.client.store().rows();
    let visible = view::project(all_rows, app.expanded);

    let title = if view::is_truncated(all_rows, app.expanded) {
        format!(
            " Order Book (top {edge} + bottom {edge} of {}) ",
            all_rows.len(),
            edge = view::PREVIEW_EDGE
        )
    } else {
        format!(" Order Book ({} rows) ", all_rows.len())
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    if visible.is_empty() {
        let para = Paragraph::new(Line::from(Span::styled(
            "No data",
            Style::default().fg(Color::DarkGray),
        )))
        .block(block);
        frame.render_widget(para, area);
        return;
    }

    let header = Row::new(["Price", "Qty", "Cumulative"])
        .style(Style::default().add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = visible
        .into_iter()
        .map(|row| {
            let [price, qty, cumulative] = view::format_row(row);
            Row::new([
                Cell::from(price),
                Cell::from(Line::from(qty).right_aligned()),
                Cell::from(Line::from(cumulative).right_aligned()),
            ])
        })
        .collect();

    let widths = [
        Constraint::Percentage(34),
        Constraint::Percentage(33),
        Constraint::Percentage(33),
    ];
    let table = Table::new(rows, widths).header(header).block(block);
    frame.render_widget(table, area);
}

/// Renders the latest error. Replaced, never queued.
fn render_error(frame: &mut Frame, area: Rect, error: &str) {
    let para = Paragraph::new(error.to_string())
        .style(Style::default().fg(Color::Red))
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        );
    frame.render_widget(para, area);
}

/// Renders keybinding hints and the health endpoint.
fn render_keybindings<T: Transport>(frame: &mut Frame, area: Rect, app: &App<T>) {
    let toggle = if app.expanded {
        "hide full book"
    } else {
        "show full book"
    };
    let line = Line::from(vec![
        Span::styled(" e", Style::default().fg(Color::Yellow)),
        Span::raw(format!(" {toggle}  ")),
        Span::styled("r", Style::default().fg(Color::Yellow)),
        Span::raw(" retry  "),
        Span::styled("c", Style::default().fg(Color::Yellow)),
        Span::raw(" connect  "),
        Span::styled("d", Style::default().fg(Color::Yellow)),
        Span::raw(" disconnect  "),
        Span::styled("q", Style::default().fg(Color::Yellow)),
        Span::raw(" quit  │ health: "),
        Span::styled(app.health_url.clone(), Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
