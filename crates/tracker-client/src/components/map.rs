// crates/tracker-client/src/components/map.rs

use indexmap::IndexMap;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color as TuiColor, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use tracker_core::{Color, Point};
use tracker_protocol::coord_codec::{darken, translate};
use tracker_protocol::WorldBounds;

use crate::app::App;
use crate::components::tui_color;

/// A trail point placed on the map grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlottedPoint {
    pub x: u16,
    pub y: u16,
    pub color: Color,
}

pub fn draw_map(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .title(" Map ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(TuiColor::White));

    let inner = block.inner(area);
    f.render_widget(block, area);

    if inner.width == 0 || inner.height == 0 {
        return;
    }

    if app.trails.is_empty() {
        let no_data = Paragraph::new("No positions yet")
            .style(Style::default().fg(TuiColor::Gray))
            .alignment(Alignment::Center);
        f.render_widget(no_data, inner);
        return;
    }

    let points = plot_trails(
        &app.trails,
        &app.config.world_bounds,
        (inner.width, inner.height),
        app.config.trail_darken,
    );

    let buf = f.buffer_mut();
    for p in points {
        buf.get_mut(inner.x + p.x, inner.y + p.y)
            .set_symbol(&app.config.dot)
            .set_fg(tui_color(p.color));
    }
}

/// Place every trail point on a `size` grid, oldest first so newer points
/// win when they share a cell. The newest point of each trail keeps the
/// participant color; older ones are darkened by `darken_pct`.
///
/// Points outside the world bounds are dropped. Points exactly on the right
/// or bottom edge land in the last column/row.
pub fn plot_trails(
    trails: &IndexMap<Color, Vec<Point>>,
    bounds: &WorldBounds,
    size: (u16, u16),
    darken_pct: f64,
) -> Vec<PlottedPoint> {
    let (w, h) = size;
    let mut plotted = Vec::new();

    for (color, trail) in trails {
        let newest = trail.len().saturating_sub(1);

        for (i, point) in trail.iter().enumerate() {
            let Ok((px, py)) = translate(*point, (w as u32, h as u32), bounds) else {
                continue;
            };

            if px < 0 || py < 0 || px > w as i32 || py > h as i32 {
                continue;
            }

            let shade = if i == newest { *color } else { darken(*color, darken_pct) };

            plotted.push(PlottedPoint {
                x: (px as u16).min(w.saturating_sub(1)),
                y: (py as u16).min(h.saturating_sub(1)),
                color: shade,
            });
        }
    }

    plotted
}
