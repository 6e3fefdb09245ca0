//! Checkout pool over the fixed color palette.
//!
//! Every palette color is either free or assigned, never both. Colors are
//! drawn uniformly at random from the free subset so that reconnecting
//! clients do not always land on the same color.

use rand::seq::IndexedRandom;
use rand::Rng;
use tracing::debug;

use crate::color::{Color, PALETTE, PALETTE_SIZE};

/// Tracks which palette colors are currently checked out.
#[derive(Debug, Clone, Default)]
pub struct ColorPool {
    /// `assigned[i]` is true while `PALETTE[i]` is checked out.
    assigned: [bool; PALETTE_SIZE],
}

impl ColorPool {
    /// Create a pool with every palette color free.
    pub fn new() -> Self {
        ColorPool::default()
    }

    /// Check out a random free color, or `None` if the palette is exhausted.
    pub fn occupy(&mut self) -> Option<Color> {
        self.occupy_with(&mut rand::rng())
    }

    /// Same as [`occupy`](Self::occupy), drawing from the given RNG.
    pub fn occupy_with<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Color> {
        let free: Vec<usize> = (0..PALETTE_SIZE).filter(|&i| !self.assigned[i]).collect();

        let index = *free.choose(rng)?;
        self.assigned[index] = true;

        let color = PALETTE[index];
        debug!("Occupying color {}", color);
        Some(color)
    }

    /// Return a color to the free set.
    ///
    /// Releasing a color that is not assigned (or not in the palette at all)
    /// does nothing.
    pub fn release(&mut self, color: Color) {
        if let Some(index) = color.palette_index() {
            if self.assigned[index] {
                debug!("Releasing color {}", color);
                self.assigned[index] = false;
            }
        }
    }

    /// Free every color.
    pub fn reset(&mut self) {
        debug!("Resetting color pool");
        self.assigned = [false; PALETTE_SIZE];
    }

    pub fn is_assigned(&self, color: Color) -> bool {
        color
            .palette_index()
            .map(|i| self.assigned[i])
            .unwrap_or(false)
    }

    pub fn assigned_count(&self) -> usize {
        self.assigned.iter().filter(|a| **a).count()
    }

    pub fn free_count(&self) -> usize {
        PALETTE_SIZE - self.assigned_count()
    }
}
