//! Input/output events of the relay state machine.
//!
//! These are the logical messages only; their wire encoding lives in
//! `tracker-protocol`.

use crate::color::Color;
use crate::registry::Snapshot;
use crate::session::SessionId;
use crate::trail::Point;

/// Something a connection did.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    /// Authenticate with the shared secret.
    Connect { password: String },

    /// Client is ready and wants a color.
    Handshake,

    /// New world-space position of the sender.
    PositionUpdate(Point),

    /// Transport closed.
    Disconnect,
}

/// Something the relay wants a connection to see.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundEvent {
    /// Connect accepted; the participant is Pending.
    Accepted { id: SessionId },

    /// Connect refused. The transport should close after delivering this.
    Rejected { reason: String },

    /// Result of a handshake. `None` means no color is free.
    ColorAssignment(Option<Color>),

    /// Full color → trail mapping.
    Positions(Snapshot),
}

impl OutboundEvent {
    /// Whether the connection should be closed once this is delivered.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OutboundEvent::Rejected { .. })
    }
}

/// Who an [`OutboundEvent`] goes to.
#[derive(Debug, Clone, PartialEq)]
pub enum Recipients {
    Session(SessionId),
    Sessions(Vec<SessionId>),
}

impl Recipients {
    pub fn ids(&self) -> &[SessionId] {
        match self {
            Recipients::Session(id) => std::slice::from_ref(id),
            Recipients::Sessions(ids) => ids,
        }
    }
}

/// An outbound event together with its recipients.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch {
    pub recipients: Recipients,
    pub event: OutboundEvent,
}

impl Dispatch {
    pub fn unicast(id: SessionId, event: OutboundEvent) -> Self {
        Dispatch {
            recipients: Recipients::Session(id),
            event,
        }
    }

    pub fn multicast(ids: Vec<SessionId>, event: OutboundEvent) -> Self {
        Dispatch {
            recipients: Recipients::Sessions(ids),
            event,
        }
    }
}
