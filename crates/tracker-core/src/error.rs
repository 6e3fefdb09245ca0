//! Error types for the relay core.
//!
//! None of these are fatal to the relay: each one concerns a single
//! connection and is recovered from by ignoring the event, refusing the
//! connection, or telling the participant that no color is free.

use thiserror::Error;

use crate::session::SessionId;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RelayError {
    /// Wrong or missing shared secret on connect.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Every palette color is already assigned.
    #[error("no color available")]
    PoolExhausted,

    /// The event references a session that is not registered.
    #[error("unknown session {0}")]
    UnknownSession(SessionId),

    /// The session is already registered.
    #[error("session {0} already exists")]
    DuplicateSession(SessionId),

    /// The session exists but has not completed its handshake.
    #[error("session {0} has no color yet")]
    NotActive(SessionId),

    /// A coordinate payload that is not exactly two finite numbers.
    #[error("invalid coordinate format: {0}")]
    InvalidCoordinateFormat(String),

    /// A color token that is not `#RRGGBB`.
    #[error("invalid color: {0}")]
    InvalidColor(String),
}
