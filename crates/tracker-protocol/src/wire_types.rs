//! Wire-level message shapes and constants.
//!
//! Every message is one JSON object on one line, tagged by `"event"`:
//!
//! ```text
//! Client → server
//! ---------------
//! {"event":"connect","password":"..."}
//! {"event":"handshake"}
//! {"event":"position-update","position":[x,y]}
//!
//! Server → client
//! ---------------
//! {"event":"connected","id":7}
//! {"event":"connect-error","message":"authentication failed"}
//! {"event":"color-assignment","color":"#F6C945"}      (null = none free)
//! {"event":"position-update","positions":{"#F6C945":[[x,y],...]}}
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Longest line either side will buffer before giving up on the peer.
pub const MAX_LINE_LEN: usize = 64 * 1024;

/// Messages sent by clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum ClientMessage {
    Connect {
        #[serde(default)]
        password: String,
    },
    Handshake,
    PositionUpdate {
        position: [f64; 2],
    },
}

/// Messages sent by the relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum ServerMessage {
    Connected {
        id: u64,
    },
    ConnectError {
        message: String,
    },
    ColorAssignment {
        #[serde(default)]
        color: Option<String>,
    },
    PositionUpdate {
        positions: BTreeMap<String, Vec<[f64; 2]>>,
    },
}
