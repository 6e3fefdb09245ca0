//! tracker-protocol
//!
//! Encoding/decoding shared by the relay and its clients.
//!
//! - [`json_codec`]  : JSON-lines wire protocol (relay ⇄ client)
//! - [`coord_codec`] : raw coordinate strings, world → pixel mapping, trail shading

pub mod wire_types;
pub mod json_codec;
pub mod coord_codec;

pub use json_codec::{
    ProtocolError,
    decode_client_line,
    encode_client_event,
    decode_server_line,
    encode_server_event,
};

pub use coord_codec::{CodecError, WorldBounds};
