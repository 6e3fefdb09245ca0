//! JSON-lines encoding/decoding for relay events.
//!
//! Converts between single lines of text (without the trailing newline)
//! and the logical `tracker_core::InboundEvent` / `OutboundEvent`.
//! Framing (splitting a byte stream on `\n`) is the transport's job.

use std::collections::BTreeMap;

use thiserror::Error;
use tracker_core::{Color, InboundEvent, OutboundEvent, SessionId, Snapshot};

use crate::wire_types::{ClientMessage, ServerMessage};

/// Errors that can arise when encoding/decoding a line.
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// Not valid JSON, or not one of the known message shapes.
    #[error("malformed message: {0}")]
    Json(#[from] serde_json::Error),

    /// A position that is not two finite numbers.
    #[error("invalid position: {0:?}")]
    InvalidPosition([f64; 2]),

    /// A snapshot key or assignment that is not a `#RRGGBB` color.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// The event has no wire representation (e.g. transport-level disconnect).
    #[error("event is not sent on the wire: {0}")]
    NotOnWire(&'static str),
}

// ============================================================================
// Client → server
// ============================================================================

/// Decode one line sent by a client.
pub fn decode_client_line(line: &str) -> Result<InboundEvent, ProtocolError> {
    let msg: ClientMessage = serde_json::from_str(line)?;

    Ok(match msg {
        ClientMessage::Connect { password } => InboundEvent::Connect { password },
        ClientMessage::Handshake => InboundEvent::Handshake,
        ClientMessage::PositionUpdate { position } => {
            if !position.iter().all(|v| v.is_finite()) {
                return Err(ProtocolError::InvalidPosition(position));
            }
            InboundEvent::PositionUpdate((position[0], position[1]))
        }
    })
}

/// Encode a client event as one line.
pub fn encode_client_event(event: &InboundEvent) -> Result<String, ProtocolError> {
    let msg = match event {
        InboundEvent::Connect { password } => ClientMessage::Connect {
            password: password.clone(),
        },
        InboundEvent::Handshake => ClientMessage::Handshake,
        InboundEvent::PositionUpdate((x, y)) => {
            if !(x.is_finite() && y.is_finite()) {
                return Err(ProtocolError::InvalidPosition([*x, *y]));
            }
            ClientMessage::PositionUpdate { position: [*x, *y] }
        }
        InboundEvent::Disconnect => return Err(ProtocolError::NotOnWire("disconnect")),
    };

    Ok(serde_json::to_string(&msg)?)
}

// ============================================================================
// Server → client
// ============================================================================

/// Encode a relay event as one line.
pub fn encode_server_event(event: &OutboundEvent) -> Result<String, ProtocolError> {
    let msg = match event {
        OutboundEvent::Accepted { id } => ServerMessage::Connected { id: id.0 },
        OutboundEvent::Rejected { reason } => ServerMessage::ConnectError {
            message: reason.clone(),
        },
        OutboundEvent::ColorAssignment(color) => ServerMessage::ColorAssignment {
            color: color.map(|c| c.to_string()),
        },
        OutboundEvent::Positions(snapshot) => ServerMessage::PositionUpdate {
            positions: snapshot_to_wire(snapshot),
        },
    };

    Ok(serde_json::to_string(&msg)?)
}

/// Decode one line sent by the relay.
pub fn decode_server_line(line: &str) -> Result<OutboundEvent, ProtocolError> {
    let msg: ServerMessage = serde_json::from_str(line)?;

    Ok(match msg {
        ServerMessage::Connected { id } => OutboundEvent::Accepted { id: SessionId(id) },
        ServerMessage::ConnectError { message } => OutboundEvent::Rejected { reason: message },
        ServerMessage::ColorAssignment { color } => {
            OutboundEvent::ColorAssignment(color.as_deref().map(parse_color).transpose()?)
        }
        ServerMessage::PositionUpdate { positions } => {
            OutboundEvent::Positions(snapshot_from_wire(positions)?)
        }
    })
}

// -----------------------------------------------------------------------------
// Helpers
// -----------------------------------------------------------------------------

fn snapshot_to_wire(snapshot: &Snapshot) -> BTreeMap<String, Vec<[f64; 2]>> {
    snapshot
        .iter()
        .map(|(color, trail)| (color.to_string(), trail.iter().map(|&(x, y)| [x, y]).collect()))
        .collect()
}

fn snapshot_from_wire(positions: BTreeMap<String, Vec<[f64; 2]>>) -> Result<Snapshot, ProtocolError> {
    positions
        .into_iter()
        .map(|(key, trail)| {
            let color = parse_color(&key)?;
            Ok((color, trail.into_iter().map(|[x, y]| (x, y)).collect()))
        })
        .collect()
}

fn parse_color(token: &str) -> Result<Color, ProtocolError> {
    token
        .parse::<Color>()
        .map_err(|_| ProtocolError::InvalidColor(token.to_string()))
}
