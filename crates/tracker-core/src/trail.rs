//! Bounded FIFO history of a participant's recent positions.

use std::collections::VecDeque;

/// A world-space position `(x, y)`.
pub type Point = (f64, f64);

/// Maximum number of points kept per participant.
pub const TRAIL_CAPACITY: usize = 10;

/// Recent positions, oldest first. Appending at capacity evicts the oldest.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trail {
    points: VecDeque<Point>,
}

impl Trail {
    pub fn new() -> Self {
        Trail {
            points: VecDeque::with_capacity(TRAIL_CAPACITY),
        }
    }

    pub fn push(&mut self, point: Point) {
        if self.points.len() == TRAIL_CAPACITY {
            self.points.pop_front();
        }
        self.points.push_back(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Most recently appended point.
    pub fn latest(&self) -> Option<Point> {
        self.points.back().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Point> {
        self.points.iter()
    }

    pub fn to_vec(&self) -> Vec<Point> {
        self.points.iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_last_ten_in_append_order() {
        let mut trail = Trail::new();
        for i in 0..15 {
            trail.push((i as f64, -(i as f64)));
        }

        assert_eq!(trail.len(), TRAIL_CAPACITY);
        let xs: Vec<f64> = trail.iter().map(|p| p.0).collect();
        assert_eq!(xs, (5..15).map(|i| i as f64).collect::<Vec<_>>());
        assert_eq!(trail.latest(), Some((14.0, -14.0)));
    }

    #[test]
    fn starts_empty() {
        let trail = Trail::new();
        assert!(trail.is_empty());
        assert_eq!(trail.latest(), None);
    }
}
