//! Per-connection participant state.

use std::fmt;

use crate::color::Color;
use crate::trail::{Point, Trail};

/// Handle for a connected participant.
///
/// Opaque; the server guarantees uniqueness over the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Authenticated, waiting for handshake; has no color.
    Pending,
    /// Holds a color and appears in broadcasts.
    Active,
}

/// One connected participant.
#[derive(Debug, Clone)]
pub struct Participant {
    color: Option<Color>,
    trail: Trail,
}

impl Participant {
    pub(crate) fn pending() -> Self {
        Participant {
            color: None,
            trail: Trail::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        match self.color {
            Some(_) => SessionState::Active,
            None => SessionState::Pending,
        }
    }

    pub fn is_active(&self) -> bool {
        self.color.is_some()
    }

    pub fn color(&self) -> Option<Color> {
        self.color
    }

    pub fn trail(&self) -> &Trail {
        &self.trail
    }

    pub(crate) fn activate(&mut self, color: Color) {
        self.color = Some(color);
    }

    pub(crate) fn record(&mut self, point: Point) {
        self.trail.push(point);
    }
}
