// crates/tracker-client/src/ui.rs

use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

use crate::app::App;
use crate::components::{header::draw_header, map::draw_map, status_bar::draw_status_bar};

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(5),    // Map
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    draw_header(f, chunks[0], app);
    draw_map(f, chunks[1], app);
    draw_status_bar(f, chunks[2], app);
}
