//! Shared types for the relay server.
//!
//! This module defines:
//! - channel aliases between connection tasks and the relay task
//! - `RelayRequest`: events flowing from connections to the relay

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::RwLock;
use tracker_core::{InboundEvent, OutboundEvent, SessionId};

/// Outbound events from the relay to a given connection.
pub type OutboundTx = mpsc::UnboundedSender<OutboundEvent>;
pub type OutboundRx = mpsc::UnboundedReceiver<OutboundEvent>;

/// Open connections and their outbound channels.
///
/// Holds every accepted TCP connection, including ones that have not
/// authenticated yet; the relay decides who actually receives what.
pub type ClientRegistry = Arc<RwLock<HashMap<SessionId, OutboundTx>>>;

/// Event flowing from a connection task into the relay task.
#[derive(Debug)]
pub struct RelayRequest {
    pub session_id: SessionId,
    pub event: InboundEvent,
}

/// Channel from connections → relay task.
pub type RelayTx = mpsc::UnboundedSender<RelayRequest>;
pub type RelayRx = mpsc::UnboundedReceiver<RelayRequest>;
