//! TCP listener and top-level server wiring.
//!
//! This module:
//! - Listens on the configured address/port.
//! - Accepts new TCP connections.
//! - Assigns each connection a `SessionId`.
//! - Spawns:
//!   - a per-connection task to handle I/O,
//!   - a single central relay task that owns the session registry.
//!
//! The actual per-connection logic and relay loop live in `client`
//! and `relay_task` respectively.

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracker_core::SessionId;

use crate::client;
use crate::config::Config;
use crate::relay_task;
use crate::types::{ClientRegistry, OutboundRx, OutboundTx, RelayRx, RelayTx};

/// Bind the configured address and run the relay.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let addr = config.socket_addr_string();
    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on {}", listener.local_addr()?);

    serve(listener, config).await
}

/// Run the relay on an already-bound listener.
pub async fn serve(listener: TcpListener, config: Config) -> anyhow::Result<()> {
    // Shared registry of connections → outbound channels.
    let clients: ClientRegistry = Arc::new(tokio::sync::RwLock::new(Default::default()));

    // Channel from connections → relay task.
    let (relay_tx, relay_rx): (RelayTx, RelayRx) = mpsc::unbounded_channel();

    // Spawn the central relay task.
    {
        let clients_clone = clients.clone();
        let secret = config.password.clone();
        tokio::spawn(async move {
            relay_task::run_relay_loop(relay_rx, clients_clone, secret).await;
        });
    }

    let mut next_session = 1u64;
    let mut accept_failures = 0u32;

    loop {
        // Accept errors (EMFILE, ECONNABORTED, ...) only cost the pending
        // connection; live sessions keep running.
        let (stream, peer_addr) = match listener.accept().await {
            Ok(accepted) => {
                accept_failures = 0;
                accepted
            }
            Err(e) => {
                accept_failures = accept_failures.saturating_add(1);
                let delay = accept_backoff(accept_failures);
                error!("Accept failed ({} in a row): {}; retrying in {:?}", accept_failures, e, delay);
                tokio::time::sleep(delay).await;
                continue;
            }
        };
        let current_clients = {
            let guard = clients.read().await;
            guard.len()
        };

        if current_clients >= config.max_clients {
            warn!(
                "Rejecting connection from {}: max_clients ({}) reached",
                peer_addr, config.max_clients
            );
            // Just drop the stream; client will see connection closed.
            continue;
        }

        let session_id = SessionId(next_session);
        next_session += 1;
        info!("Accepted connection {} from {}", session_id, peer_addr);

        if let Err(e) = stream.set_nodelay(true) {
            warn!("Session {}: could not set TCP_NODELAY: {}", session_id, e);
        }

        // Create outbound channel for this connection.
        let (out_tx, out_rx): (OutboundTx, OutboundRx) = mpsc::unbounded_channel();

        // Register connection.
        {
            let mut guard = clients.write().await;
            guard.insert(session_id, out_tx);
        }

        // Clone handles to move into the connection task.
        let clients_clone = clients.clone();
        let relay_tx_clone = relay_tx.clone();

        tokio::spawn(async move {
            match client::run_client(session_id, stream, relay_tx_clone, out_rx, clients_clone).await {
                Ok(()) => info!("Session {} disconnected", session_id),
                Err(e) => warn!("Session {} dropped: {:#}", session_id, e),
            }
        });
    }
}

const ACCEPT_BACKOFF_BASE: Duration = Duration::from_millis(10);
const ACCEPT_BACKOFF_MAX: Duration = Duration::from_secs(1);

/// Delay before the next accept after `failures` consecutive errors.
fn accept_backoff(failures: u32) -> Duration {
    let shift = failures.saturating_sub(1).min(16);
    ACCEPT_BACKOFF_BASE
        .saturating_mul(1u32 << shift)
        .min(ACCEPT_BACKOFF_MAX)
}
