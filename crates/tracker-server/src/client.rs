//! Per-connection I/O.
//!
//! Each connection gets a reader loop (this task) and a writer task. The
//! reader splits the byte stream on `\n`, decodes each line and forwards it
//! to the relay; the writer encodes whatever the relay routes here. When the
//! writer delivers a terminal event (a refused connect) it closes the socket
//! and the reader stops too.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tracing::{debug, info, warn};
use tracker_core::{InboundEvent, OutboundEvent, SessionId};
use tracker_protocol::json_codec;
use tracker_protocol::wire_types::MAX_LINE_LEN;

use crate::types::{ClientRegistry, OutboundRx, RelayRequest, RelayTx};

/// Run the I/O loop for a single connection until it closes.
///
/// Always ends by unregistering the connection and sending a
/// `Disconnect` for it to the relay.
pub async fn run_client(
    session_id: SessionId,
    stream: TcpStream,
    relay_tx: RelayTx,
    out_rx: OutboundRx,
    clients: ClientRegistry,
) -> anyhow::Result<()> {
    let (read_stream, write_stream) = stream.into_split();

    let writer_handle = tokio::spawn(run_writer(session_id, write_stream, out_rx));

    let result = run_reader(session_id, read_stream, &relay_tx, writer_handle).await;

    // Remove client from registry
    {
        let mut guard = clients.write().await;
        guard.remove(&session_id);
    }

    let _ = relay_tx.send(RelayRequest {
        session_id,
        event: InboundEvent::Disconnect,
    });

    result
}

async fn run_reader(
    session_id: SessionId,
    mut read_stream: OwnedReadHalf,
    relay_tx: &RelayTx,
    mut writer_handle: tokio::task::JoinHandle<()>,
) -> anyhow::Result<()> {
    let mut buffer = Vec::new();
    let mut temp_buf = [0u8; 1024];

    let result = 'read: loop {
        tokio::select! {
            read = read_stream.read(&mut temp_buf) => {
                let n = match read {
                    Ok(0) => {
                        info!("Session {} closed by peer", session_id);
                        break 'read Ok(());
                    }
                    Ok(n) => n,
                    Err(e) => break 'read Err(e.into()),
                };

                buffer.extend_from_slice(&temp_buf[..n]);

                // Process complete lines
                while let Some(newline_pos) = buffer.iter().position(|&b| b == b'\n') {
                    let line = buffer.drain(..=newline_pos).collect::<Vec<u8>>();
                    let line_str = String::from_utf8_lossy(&line);
                    let line_str = line_str.trim();

                    if line_str.is_empty() {
                        continue;
                    }

                    match json_codec::decode_client_line(line_str) {
                        Ok(event) => {
                            let req = RelayRequest { session_id, event };
                            if relay_tx.send(req).is_err() {
                                break 'read Err(anyhow::anyhow!("relay channel closed"));
                            }
                        }
                        Err(e) => warn!("Session {} sent an invalid message: {}", session_id, e),
                    }
                }

                if buffer.len() > MAX_LINE_LEN {
                    break 'read Err(anyhow::anyhow!("line exceeds {} bytes", MAX_LINE_LEN));
                }
            }
            _ = &mut writer_handle => {
                debug!("Session {} writer finished", session_id);
                return Ok(());
            }
        }
    };

    writer_handle.abort();
    result
}

async fn run_writer(session_id: SessionId, mut write_stream: OwnedWriteHalf, mut out_rx: OutboundRx) {
    while let Some(event) = out_rx.recv().await {
        if let Err(e) = write_event(&mut write_stream, &event).await {
            warn!("Session {} write error: {}", session_id, e);
            break;
        }

        if event.is_terminal() {
            let _ = write_stream.shutdown().await;
            break;
        }
    }
}

async fn write_event(stream: &mut OwnedWriteHalf, event: &OutboundEvent) -> anyhow::Result<()> {
    let line = json_codec::encode_server_event(event)?;
    let data = format!("{}\n", line);

    stream.write_all(data.as_bytes()).await?;
    stream.flush().await?;

    Ok(())
}
