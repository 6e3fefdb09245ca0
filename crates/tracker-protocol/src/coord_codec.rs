//! Coordinate codec shared by every client.
//!
//! Raw position strings come from the game's clipboard export and look like
//!
//! ```text
//! x, a, y, b, z, c
//! ```
//!
//! six comma-separated numbers of which only the even positions (0, 2, 4)
//! are used. Positions 0 and 2 are the world `(x, y)` the overlay tracks.
//!
//! This module also maps world coordinates onto a pixel grid and darkens
//! trail colors, so that every client renders the same way.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracker_core::{Color, Point};

/// Number of comma-separated tokens in a raw coordinate string.
pub const COORD_TOKEN_COUNT: usize = 6;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CodecError {
    #[error("invalid coordinate format: {0:?}")]
    InvalidCoordinateFormat(String),

    #[error("degenerate world bounds: {0:?}")]
    DegenerateBounds(WorldBounds),

    #[error("coordinate does not map to a finite pixel")]
    NonFinite,
}

/// Rectangle of the game world shown by the map, in world units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldBounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl WorldBounds {
    /// Build bounds, rejecting zero-width or zero-height rectangles.
    pub fn new(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> Result<Self, CodecError> {
        let bounds = WorldBounds {
            min_x,
            max_x,
            min_y,
            max_y,
        };
        bounds.validate()?;
        Ok(bounds)
    }

    pub fn validate(&self) -> Result<(), CodecError> {
        let width = self.max_x - self.min_x;
        let height = self.max_y - self.min_y;

        if width == 0.0 || height == 0.0 || !width.is_finite() || !height.is_finite() {
            return Err(CodecError::DegenerateBounds(*self));
        }
        Ok(())
    }
}

/// Whether `raw` is exactly six comma-separated finite numbers.
///
/// Whitespace around each token is ignored.
pub fn validate(raw: &str) -> bool {
    tokens(raw).is_some()
}

/// Values at token positions 0, 2 and 4.
///
/// Odd positions are discarded; the export interleaves a value the overlay
/// does not use.
pub fn parse(raw: &str) -> Result<Vec<f64>, CodecError> {
    let values = tokens(raw).ok_or_else(|| CodecError::InvalidCoordinateFormat(raw.to_string()))?;

    Ok(values.into_iter().step_by(2).collect())
}

/// The world `(x, y)` carried by a raw coordinate string: tokens 0 and 2.
pub fn coordinate_pair(raw: &str) -> Result<Point, CodecError> {
    let values = parse(raw)?;
    Ok((values[0], values[1]))
}

/// Map a world point onto an image of `image_size` pixels.
///
/// The y axis is flipped: world origin is bottom-left, pixel origin is
/// top-left. Results are truncated toward zero.
pub fn translate(point: Point, image_size: (u32, u32), bounds: &WorldBounds) -> Result<(i32, i32), CodecError> {
    bounds.validate()?;

    let (x, y) = point;
    let (w, h) = (image_size.0 as f64, image_size.1 as f64);

    let px = (x - bounds.min_x) / (bounds.max_x - bounds.min_x) * w;
    let py = h - (y - bounds.min_y) / (bounds.max_y - bounds.min_y) * h;

    if !(px.is_finite() && py.is_finite()) {
        return Err(CodecError::NonFinite);
    }

    Ok((px.trunc() as i32, py.trunc() as i32))
}

/// Scale each channel by `1 - percent`, clamped to `[0, 255]` and truncated.
pub fn darken(color: Color, percent: f64) -> Color {
    let scale = |channel: u8| -> u8 {
        let v = (channel as f64 * (1.0 - percent)).clamp(0.0, 255.0);
        v.trunc() as u8
    };

    Color::rgb(scale(color.r()), scale(color.g()), scale(color.b()))
}

fn tokens(raw: &str) -> Option<Vec<f64>> {
    let values = raw
        .split(',')
        .map(|tok| tok.trim().parse::<f64>().ok().filter(|v| v.is_finite()))
        .collect::<Option<Vec<f64>>>()?;

    if values.len() != COORD_TOKEN_COUNT {
        return None;
    }
    Some(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracker_core::PALETTE;

    fn bounds() -> WorldBounds {
        WorldBounds::new(-500.0, 500.0, -250.0, 750.0).unwrap()
    }

    #[test]
    fn validates_six_numeric_tokens() {
        assert!(validate("1,2,3,4,5,6"));
        assert!(validate(" 1.5 , -2, 3e2,4 ,5,  6 "));
    }

    #[test]
    fn rejects_wrong_token_count_or_non_numbers() {
        assert!(!validate("1,2,3,4,5"));
        assert!(!validate("1,2,3,4,5,6,7"));
        assert!(!validate("1,2,x,4,5,6"));
        assert!(!validate("1,,3,4,5,6"));
        assert!(!validate(""));
        assert!(!validate("1,2,3,4,5,NaN"));
        assert!(!validate("some copied sentence, not coords"));
    }

    #[test]
    fn parse_keeps_even_positions() {
        assert_eq!(parse("1,2,3,4,5,6").unwrap(), vec![1.0, 3.0, 5.0]);
        assert_eq!(coordinate_pair("1,2,3,4,5,6").unwrap(), (1.0, 3.0));
    }

    #[test]
    fn parse_rejects_invalid_input() {
        assert_eq!(
            parse("1,2"),
            Err(CodecError::InvalidCoordinateFormat("1,2".to_string()))
        );
    }

    #[test]
    fn translate_maps_corners() {
        let b = bounds();
        assert_eq!(translate((b.min_x, b.min_y), (800, 600), &b).unwrap(), (0, 600));
        assert_eq!(translate((b.max_x, b.max_y), (800, 600), &b).unwrap(), (800, 0));
        assert_eq!(translate((0.0, 250.0), (800, 600), &b).unwrap(), (400, 300));
    }

    #[test]
    fn translate_truncates_toward_zero() {
        let b = WorldBounds::new(0.0, 3.0, 0.0, 3.0).unwrap();
        assert_eq!(translate((1.0, 1.0), (10, 10), &b).unwrap(), (3, 6));
        // Left of the map: -3.33 truncates to -3, not -4.
        assert_eq!(translate((-1.0, 1.0), (10, 10), &b).unwrap(), (-3, 6));
    }

    #[test]
    fn translate_rejects_degenerate_bounds() {
        let flat = WorldBounds {
            min_x: 0.0,
            max_x: 10.0,
            min_y: 5.0,
            max_y: 5.0,
        };
        assert!(matches!(
            translate((1.0, 5.0), (100, 100), &flat),
            Err(CodecError::DegenerateBounds(_))
        ));
        assert!(WorldBounds::new(1.0, 1.0, 0.0, 1.0).is_err());
    }

    #[test]
    fn darken_zero_is_identity() {
        for color in PALETTE {
            assert_eq!(darken(color, 0.0), color);
        }
    }

    #[test]
    fn darken_halves_white() {
        let white = Color::rgb(0xFF, 0xFF, 0xFF);
        assert_eq!(darken(white, 0.5).to_string(), "#7F7F7F");
    }

    #[test]
    fn darken_clamps() {
        let c = Color::rgb(200, 100, 0);
        assert_eq!(darken(c, 1.0), Color::rgb(0, 0, 0));
        assert_eq!(darken(c, 2.0), Color::rgb(0, 0, 0));
        assert_eq!(darken(c, -1.0), Color::rgb(255, 200, 0));
    }
}
