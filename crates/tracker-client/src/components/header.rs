// crates/tracker-client/src/components/header.rs

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color as TuiColor, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, ConnectionStatus};
use crate::components::tui_color;

pub fn draw_header(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(33),
            Constraint::Percentage(34),
            Constraint::Percentage(33),
        ])
        .split(area);

    // Left: identity and connection status
    let (status_text, status_color) = match app.status {
        ConnectionStatus::Disconnected => ("Offline", TuiColor::Red),
        ConnectionStatus::Connecting => ("Connecting", TuiColor::Yellow),
        ConnectionStatus::Connected => ("Untracked", TuiColor::Yellow),
        ConnectionStatus::Tracking => ("Tracking", TuiColor::Green),
    };

    let you_style = match app.my_color {
        Some(color) => Style::default().fg(tui_color(color)).add_modifier(Modifier::BOLD),
        None => Style::default().fg(TuiColor::DarkGray),
    };

    let session = app
        .session_id
        .map(|id| format!(" #{}", id))
        .unwrap_or_default();

    let left = Paragraph::new(Line::from(vec![
        Span::styled("YOU ", you_style),
        Span::styled(&app.config.dot, you_style),
        Span::raw(" - "),
        Span::styled(status_text, Style::default().fg(status_color)),
        Span::raw(session),
    ]))
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(left, chunks[0]);

    // Center: relay traffic
    let last_update = app
        .last_update
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string());
    let center = Paragraph::new(format!(
        "Players: {} | Sent: {} | Last: {}",
        app.trails.len(),
        app.positions_sent,
        last_update
    ))
    .style(Style::default().fg(TuiColor::Yellow))
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(center, chunks[1]);

    // Right: own position
    let position = match app.last_position {
        Some((x, y)) => format!("X {:.1}  Y {:.1}", x, y),
        None => "No position copied".to_string(),
    };
    let right = Paragraph::new(position)
        .style(Style::default().fg(TuiColor::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(right, chunks[2]);
}
