// crates/tracker-client/src/components/mod.rs

pub mod header;
pub mod map;
pub mod status_bar;

use ratatui::style::Color as TuiColor;
use tracker_core::Color;

/// Terminal color for a participant color.
pub fn tui_color(color: Color) -> TuiColor {
    TuiColor::Rgb(color.r(), color.g(), color.b())
}
