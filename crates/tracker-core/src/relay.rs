//! Session lifecycle and position relay.
//!
//! [`Relay`] drives a [`SessionRegistry`] from inbound connection events and
//! returns the outbound events to deliver, each tagged with its recipients.
//! It performs no I/O.
//!
//! Per-session lifecycle:
//!
//! ```text
//! Connect(ok) ──► Pending ──Handshake──► Active ──Disconnect──► Removed
//!                    │                     │  ▲
//!                    │                     └──┘ PositionUpdate (broadcast)
//!                    └──────────Disconnect───────────────────► Removed
//! ```
//!
//! Routing policy:
//! - `Accepted`, `Rejected`, `ColorAssignment`: only the originating session.
//! - `Positions`: every registered session, Pending included.
//! - `Disconnect` emits nothing.
//!
//! Events for sessions that are not registered are ignored.

use tracing::{debug, info, warn};

use crate::error::RelayError;
use crate::messages::{Dispatch, InboundEvent, OutboundEvent};
use crate::registry::SessionRegistry;
use crate::session::SessionId;
use crate::trail::Point;

#[derive(Debug)]
pub struct Relay {
    registry: SessionRegistry,
    secret: String,
}

impl Relay {
    /// Create a relay that admits connections presenting `secret`.
    pub fn new(secret: impl Into<String>) -> Self {
        Relay {
            registry: SessionRegistry::new(),
            secret: secret.into(),
        }
    }

    /// Process a single inbound event and return any output events.
    pub fn process(&mut self, id: SessionId, event: InboundEvent) -> Vec<Dispatch> {
        let result = match event {
            InboundEvent::Connect { password } => self.process_connect(id, &password),
            InboundEvent::Handshake => self.process_handshake(id),
            InboundEvent::PositionUpdate(point) => self.process_position_update(id, point),
            InboundEvent::Disconnect => {
                self.registry.remove(id);
                Ok(Vec::new())
            }
        };

        match result {
            Ok(outputs) => outputs,
            Err(RelayError::UnknownSession(id)) => {
                debug!("Ignoring event from unregistered session {}", id);
                Vec::new()
            }
            Err(e) => {
                warn!("Session {}: {}", id, e);
                Vec::new()
            }
        }
    }

    /// Drop every session and free the palette.
    pub fn shutdown(&mut self) {
        info!("Relay shutting down, dropping {} session(s)", self.registry.len());
        self.registry.clear();
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    // -------------------------------------------------------------------------
    // Internal handlers
    // -------------------------------------------------------------------------

    fn process_connect(&mut self, id: SessionId, password: &str) -> Result<Vec<Dispatch>, RelayError> {
        // An admitted session is never refused, whatever it presents.
        if self.registry.contains(id) {
            return Err(RelayError::DuplicateSession(id));
        }

        if !secrets_match(password, &self.secret) {
            warn!("Rejected session {}: incorrect password", id);
            return Ok(vec![Dispatch::unicast(
                id,
                OutboundEvent::Rejected {
                    reason: RelayError::AuthenticationFailed.to_string(),
                },
            )]);
        }

        self.registry.admit(id)?;
        info!("Session {} connected", id);

        Ok(vec![Dispatch::unicast(id, OutboundEvent::Accepted { id })])
    }

    fn process_handshake(&mut self, id: SessionId) -> Result<Vec<Dispatch>, RelayError> {
        let color = match self.registry.activate(id) {
            Ok(color) => Some(color),
            Err(RelayError::PoolExhausted) => {
                warn!("Session {}: no color available, staying pending", id);
                None
            }
            Err(e) => return Err(e),
        };

        Ok(vec![Dispatch::unicast(id, OutboundEvent::ColorAssignment(color))])
    }

    fn process_position_update(&mut self, id: SessionId, point: Point) -> Result<Vec<Dispatch>, RelayError> {
        let participant = self.registry.get(id).ok_or(RelayError::UnknownSession(id))?;
        if !participant.is_active() {
            return Err(RelayError::NotActive(id));
        }

        if !(point.0.is_finite() && point.1.is_finite()) {
            return Err(RelayError::InvalidCoordinateFormat(format!("{:?}", point)));
        }

        self.registry.record_position(id, point)?;
        debug!("Session {} at ({}, {})", id, point.0, point.1);

        Ok(vec![Dispatch::multicast(
            self.registry.session_ids(),
            OutboundEvent::Positions(self.registry.snapshot()),
        )])
    }
}

/// Compare without short-circuiting on the first differing byte.
fn secrets_match(given: &str, expected: &str) -> bool {
    let (a, b) = (given.as_bytes(), expected.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::PALETTE_SIZE;
    use crate::messages::Recipients;
    use crate::session::SessionState;

    const SECRET: &str = "hunter2";

    fn connect(relay: &mut Relay, n: u64) -> Vec<Dispatch> {
        relay.process(
            SessionId(n),
            InboundEvent::Connect {
                password: SECRET.to_string(),
            },
        )
    }

    #[test]
    fn connect_with_correct_secret_admits_pending() {
        let mut relay = Relay::new(SECRET);
        let out = connect(&mut relay, 1);

        assert_eq!(
            out,
            vec![Dispatch::unicast(SessionId(1), OutboundEvent::Accepted { id: SessionId(1) })]
        );
        assert_eq!(
            relay.registry().get(SessionId(1)).unwrap().state(),
            SessionState::Pending
        );
    }

    #[test]
    fn connect_with_wrong_secret_creates_nothing() {
        let mut relay = Relay::new(SECRET);
        let out = relay.process(
            SessionId(1),
            InboundEvent::Connect {
                password: "nope".to_string(),
            },
        );

        assert_eq!(out.len(), 1);
        assert!(out[0].event.is_terminal());
        assert!(relay.registry().is_empty());
    }

    #[test]
    fn duplicate_connect_is_ignored() {
        let mut relay = Relay::new(SECRET);
        connect(&mut relay, 1);
        assert!(connect(&mut relay, 1).is_empty());
        assert_eq!(relay.registry().len(), 1);
    }

    #[test]
    fn reconnect_with_wrong_secret_keeps_active_session() {
        let mut relay = Relay::new(SECRET);
        connect(&mut relay, 1);
        relay.process(SessionId(1), InboundEvent::Handshake);
        let color = relay.registry().get(SessionId(1)).unwrap().color();

        let out = relay.process(
            SessionId(1),
            InboundEvent::Connect {
                password: "wrong".to_string(),
            },
        );

        assert!(out.is_empty());
        let participant = relay.registry().get(SessionId(1)).unwrap();
        assert_eq!(participant.state(), SessionState::Active);
        assert_eq!(participant.color(), color);
        assert_eq!(relay.registry().pool().assigned_count(), 1);
    }

    #[test]
    fn handshake_replies_with_color_to_origin_only() {
        let mut relay = Relay::new(SECRET);
        connect(&mut relay, 1);
        connect(&mut relay, 2);

        let out = relay.process(SessionId(1), InboundEvent::Handshake);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].recipients, Recipients::Session(SessionId(1)));
        match &out[0].event {
            OutboundEvent::ColorAssignment(Some(_)) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn handshake_when_exhausted_sends_explicit_none() {
        let mut relay = Relay::new(SECRET);
        for n in 0..PALETTE_SIZE as u64 {
            connect(&mut relay, n);
            relay.process(SessionId(n), InboundEvent::Handshake);
        }

        connect(&mut relay, 100);
        let out = relay.process(SessionId(100), InboundEvent::Handshake);
        assert_eq!(
            out,
            vec![Dispatch::unicast(SessionId(100), OutboundEvent::ColorAssignment(None))]
        );
        assert!(!relay.registry().get(SessionId(100)).unwrap().is_active());
    }

    #[test]
    fn position_update_broadcasts_to_pending_and_active() {
        let mut relay = Relay::new(SECRET);
        connect(&mut relay, 1);
        connect(&mut relay, 2);
        relay.process(SessionId(1), InboundEvent::Handshake);

        let out = relay.process(SessionId(1), InboundEvent::PositionUpdate((3.0, 4.0)));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].recipients.ids(), &[SessionId(1), SessionId(2)]);
        match &out[0].event {
            OutboundEvent::Positions(snap) => {
                assert_eq!(snap.len(), 1);
                assert_eq!(snap.values().next().unwrap(), &vec![(3.0, 4.0)]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn position_update_from_pending_is_ignored() {
        let mut relay = Relay::new(SECRET);
        connect(&mut relay, 1);

        let out = relay.process(SessionId(1), InboundEvent::PositionUpdate((1.0, 1.0)));
        assert!(out.is_empty());
        assert!(relay.registry().get(SessionId(1)).unwrap().trail().is_empty());
    }

    #[test]
    fn non_finite_position_is_rejected() {
        let mut relay = Relay::new(SECRET);
        connect(&mut relay, 1);
        relay.process(SessionId(1), InboundEvent::Handshake);

        let out = relay.process(SessionId(1), InboundEvent::PositionUpdate((f64::NAN, 1.0)));
        assert!(out.is_empty());
    }

    #[test]
    fn events_from_unknown_sessions_are_noops() {
        let mut relay = Relay::new(SECRET);

        assert!(relay.process(SessionId(9), InboundEvent::Handshake).is_empty());
        assert!(relay
            .process(SessionId(9), InboundEvent::PositionUpdate((0.0, 0.0)))
            .is_empty());
        assert!(relay.process(SessionId(9), InboundEvent::Disconnect).is_empty());
        assert!(relay.registry().is_empty());
    }

    #[test]
    fn disconnect_before_handshake_and_twice() {
        let mut relay = Relay::new(SECRET);
        connect(&mut relay, 1);

        assert!(relay.process(SessionId(1), InboundEvent::Disconnect).is_empty());
        assert!(relay.process(SessionId(1), InboundEvent::Disconnect).is_empty());
        assert!(relay.registry().is_empty());
    }

    #[test]
    fn secrets_match_compares_content() {
        assert!(secrets_match("abc", "abc"));
        assert!(!secrets_match("abd", "abc"));
        assert!(!secrets_match("ab", "abc"));
        assert!(secrets_match("", ""));
    }
}
