//! Registry of connected participants.
//!
//! Owns the [`ColorPool`] and, per session, the assigned color and trail.
//! All mutation goes through `&mut self`, so a single owner (the relay task
//! on the server) serializes every update and [`snapshot`] can never see a
//! half-applied one.
//!
//! [`snapshot`]: SessionRegistry::snapshot

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, info};

use crate::color::Color;
use crate::color_pool::ColorPool;
use crate::error::RelayError;
use crate::session::{Participant, SessionId};
use crate::trail::Point;

/// Color → trail (oldest first) for every Active participant.
///
/// Built fresh from the registry on every broadcast.
pub type Snapshot = BTreeMap<Color, Vec<Point>>;

#[derive(Debug, Default)]
pub struct SessionRegistry {
    pool: ColorPool,
    participants: HashMap<SessionId, Participant>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        SessionRegistry::default()
    }

    /// Register a new Pending participant.
    pub fn admit(&mut self, id: SessionId) -> Result<(), RelayError> {
        if self.participants.contains_key(&id) {
            return Err(RelayError::DuplicateSession(id));
        }

        self.participants.insert(id, Participant::pending());
        debug!("Admitted session {} (pending)", id);
        Ok(())
    }

    /// Assign a color to a participant.
    ///
    /// A participant that already holds a color gets the same color back.
    /// On [`RelayError::PoolExhausted`] the participant stays Pending.
    pub fn activate(&mut self, id: SessionId) -> Result<Color, RelayError> {
        let participant = self
            .participants
            .get_mut(&id)
            .ok_or(RelayError::UnknownSession(id))?;

        if let Some(color) = participant.color() {
            return Ok(color);
        }

        let color = self.pool.occupy().ok_or(RelayError::PoolExhausted)?;
        participant.activate(color);
        info!("Session {} assigned color {}", id, color);
        Ok(color)
    }

    /// Append a point to the participant's trail, evicting the oldest at
    /// capacity.
    pub fn record_position(&mut self, id: SessionId, point: Point) -> Result<(), RelayError> {
        let participant = self
            .participants
            .get_mut(&id)
            .ok_or(RelayError::UnknownSession(id))?;

        participant.record(point);
        Ok(())
    }

    /// Drop all state for `id`, returning its color to the pool.
    ///
    /// Unknown ids are ignored. Returns whether anything was removed.
    pub fn remove(&mut self, id: SessionId) -> bool {
        match self.participants.remove(&id) {
            Some(participant) => {
                if let Some(color) = participant.color() {
                    self.pool.release(color);
                }
                info!("Removed session {}", id);
                true
            }
            None => false,
        }
    }

    /// Current color → trail mapping of all Active participants.
    pub fn snapshot(&self) -> Snapshot {
        self.participants
            .values()
            .filter_map(|p| p.color().map(|c| (c, p.trail().to_vec())))
            .collect()
    }

    /// Drop every participant and free the whole palette.
    pub fn clear(&mut self) {
        self.participants.clear();
        self.pool.reset();
    }

    pub fn get(&self, id: SessionId) -> Option<&Participant> {
        self.participants.get(&id)
    }

    pub fn contains(&self, id: SessionId) -> bool {
        self.participants.contains_key(&id)
    }

    /// Ids of every registered participant, Pending and Active.
    pub fn session_ids(&self) -> Vec<SessionId> {
        let mut ids: Vec<SessionId> = self.participants.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn pool(&self) -> &ColorPool {
        &self.pool
    }
}
