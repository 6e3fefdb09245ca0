//! Central relay loop.
//!
//! This task owns the `Relay` (and with it the session registry and color
//! pool) and processes every `RelayRequest` coming from connections, one at
//! a time. Serializing all mutations here is what keeps broadcasts from ever
//! observing a half-applied update.
//!
//! Delivery is fire-and-forget: outbound channels are unbounded, so a slow
//! or vanished recipient never holds up anyone else.

use std::collections::HashMap;

use tracing::{debug, info};
use tracker_core::{Dispatch, Relay, SessionId};

use crate::types::{ClientRegistry, OutboundTx, RelayRequest, RelayRx};

/// Run the central relay processing loop until every sender is gone.
///
/// - `relay_rx`: receives events from all connection tasks.
/// - `clients`: open connections and their outbound channels.
/// - `secret`: shared password checked on connect.
pub async fn run_relay_loop(mut relay_rx: RelayRx, clients: ClientRegistry, secret: String) {
    let mut relay = Relay::new(secret);

    while let Some(req) = relay_rx.recv().await {
        let RelayRequest { session_id, event } = req;

        let outputs = relay.process(session_id, event);

        if outputs.is_empty() {
            continue;
        }

        // Snapshot of current clients to minimize lock hold time.
        let current_clients = {
            let guard = clients.read().await;
            guard.clone()
        };

        for out in &outputs {
            route_dispatch(out, &current_clients);
        }
    }

    info!("Relay loop shutting down (relay_rx closed)");
    relay.shutdown();
}

/// Deliver one dispatch to each of its recipients that is still connected.
fn route_dispatch(dispatch: &Dispatch, clients: &HashMap<SessionId, OutboundTx>) {
    for id in dispatch.recipients.ids() {
        match clients.get(id) {
            Some(tx) => {
                let _ = tx.send(dispatch.event.clone());
            }
            None => debug!("Dropping event for departed session {}", id),
        }
    }
}
