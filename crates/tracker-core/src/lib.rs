//! tracker-core
//!
//! Pure relay logic for the shared map tracker:
//! - the fixed color palette and its checkout pool
//! - per-participant trails and the session registry
//! - the relay state machine that turns connection events into broadcasts

pub mod color;
pub mod color_pool;
pub mod error;
pub mod messages;
pub mod registry;
pub mod relay;
pub mod session;
pub mod trail;

pub use color::{Color, PALETTE, PALETTE_SIZE};
pub use color_pool::ColorPool;
pub use error::RelayError;

pub use messages::{Dispatch, InboundEvent, OutboundEvent, Recipients};

pub use registry::{SessionRegistry, Snapshot};
pub use relay::Relay;
pub use session::{Participant, SessionId, SessionState};
pub use trail::{Point, Trail, TRAIL_CAPACITY};
