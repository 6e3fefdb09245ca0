// crates/tracker-client/src/components/status_bar.rs

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color as TuiColor, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, ConnectionStatus};

pub fn draw_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let connect_key = if app.status == ConnectionStatus::Disconnected {
        vec![
            Span::styled("[C]", Style::default().fg(TuiColor::Green).add_modifier(Modifier::BOLD)),
            Span::raw("onnect "),
        ]
    } else {
        vec![
            Span::styled("[D]", Style::default().fg(TuiColor::Red).add_modifier(Modifier::BOLD)),
            Span::raw("isconnect "),
        ]
    };

    let mut spans = connect_key;
    spans.extend([
        Span::styled("[R]", Style::default().fg(TuiColor::Cyan)),
        Span::raw("eset map "),
        Span::styled("[Q]", Style::default().fg(TuiColor::Gray)),
        Span::raw("uit  "),
        Span::styled(app.status_message.as_str(), Style::default().fg(TuiColor::Yellow)),
    ]);

    let paragraph = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);

    f.render_widget(paragraph, area);
}
