// crates/tracker-client/src/network.rs

//! Background connection to the relay.
//!
//! Everything that can block for an unbounded time (DNS, TCP connect,
//! socket reads) runs in a spawned task. The render loop talks to it only
//! through two channels: [`NetworkCommand`]s in, [`NetworkEvent`]s out.

use anyhow::Result;
use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::{timeout, Duration};
use tracing::{debug, error, info, warn};
use tracker_core::{Color, InboundEvent, OutboundEvent, Point, SessionId, Snapshot};
use tracker_protocol::json_codec;
use tracker_protocol::wire_types::MAX_LINE_LEN;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const AUTH_TIMEOUT: Duration = Duration::from_secs(10);

/// Render loop → network task.
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkCommand {
    SendPosition(Point),
    /// Ask again for a color after the relay had none to give.
    RequestColor,
    Disconnect,
}

/// Network task → render loop.
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkEvent {
    Connected(SessionId),
    ColorAssigned(Option<Color>),
    Positions(Snapshot),
    Disconnected(String),
}

/// Handle to a running connection task.
pub struct ConnectionHandle {
    commands: UnboundedSender<NetworkCommand>,
    task: Option<JoinHandle<()>>,
}

impl ConnectionHandle {
    /// Spawn a task that connects to `server_addr` and pumps traffic until
    /// told to stop or the connection drops.
    pub fn spawn(server_addr: &str, password: &str, events: UnboundedSender<NetworkEvent>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let connection = RelayConnection {
            server_addr: server_addr.to_string(),
            password: password.to_string(),
            events,
        };

        let task = tokio::spawn(connection.run(rx));

        Self {
            commands: tx,
            task: Some(task),
        }
    }

    /// A handle with no task behind it, for driving the app in tests.
    #[cfg(test)]
    pub fn detached(commands: UnboundedSender<NetworkCommand>) -> Self {
        Self {
            commands,
            task: None,
        }
    }

    pub fn send(&self, cmd: NetworkCommand) {
        if self.commands.send(cmd).is_err() {
            debug!("Connection task already finished");
        }
    }

    /// Ask the task to disconnect.
    pub fn close(&self) {
        self.send(NetworkCommand::Disconnect);
    }
}

impl Drop for ConnectionHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

struct RelayConnection {
    server_addr: String,
    password: String,
    events: UnboundedSender<NetworkEvent>,
}

impl RelayConnection {
    async fn run(self, mut commands: UnboundedReceiver<NetworkCommand>) {
        let reason = match self.session(&mut commands).await {
            Ok(reason) => reason,
            Err(e) => {
                error!("Connection to {} failed: {:#}", self.server_addr, e);
                format!("{:#}", e)
            }
        };

        info!("Disconnected: {}", reason);
        let _ = self.events.send(NetworkEvent::Disconnected(reason));
    }

    /// Connect, authenticate, handshake, then relay until closed.
    ///
    /// Returns a human readable reason for the disconnect.
    async fn session(&self, commands: &mut UnboundedReceiver<NetworkCommand>) -> Result<String> {
        // Nothing but a disconnect can be acted on before the relay admits us.
        let (mut reader, mut writer) = tokio::select! {
            admission = self.admit() => match admission? {
                Admission::Accepted { reader, writer } => (reader, writer),
                Admission::Closed(reason) => return Ok(reason),
            },
            _ = wait_for_disconnect(commands) => {
                return Ok("disconnected".to_string());
            }
        };

        send_event(&mut writer, &InboundEvent::Handshake).await?;

        loop {
            tokio::select! {
                cmd = commands.recv() => match cmd {
                    Some(NetworkCommand::SendPosition(point)) => {
                        send_event(&mut writer, &InboundEvent::PositionUpdate(point)).await?;
                    }
                    Some(NetworkCommand::RequestColor) => {
                        send_event(&mut writer, &InboundEvent::Handshake).await?;
                    }
                    Some(NetworkCommand::Disconnect) | None => {
                        let _ = writer.shutdown().await;
                        return Ok("disconnected".to_string());
                    }
                },

                event = reader.next_event() => match event? {
                    Some(OutboundEvent::ColorAssignment(color)) => {
                        self.emit(NetworkEvent::ColorAssigned(color));
                    }
                    Some(OutboundEvent::Positions(snapshot)) => {
                        self.emit(NetworkEvent::Positions(snapshot));
                    }
                    Some(OutboundEvent::Rejected { reason }) => {
                        return Ok(format!("connection refused: {}", reason));
                    }
                    Some(OutboundEvent::Accepted { .. }) => {
                        warn!("Ignoring repeated connect acknowledgement");
                    }
                    None => return Ok("server closed the connection".to_string()),
                },
            }
        }
    }

    /// Open the socket and wait for the relay to accept or refuse us.
    async fn admit(&self) -> Result<Admission> {
        info!("Connecting to {}...", self.server_addr);
        let stream = timeout(CONNECT_TIMEOUT, TcpStream::connect(&self.server_addr))
            .await
            .map_err(|_| anyhow::anyhow!("timed out connecting to {}", self.server_addr))??;
        stream.set_nodelay(true)?;

        let (read_half, mut writer) = stream.into_split();
        let mut reader = LineReader::new(read_half);

        send_event(
            &mut writer,
            &InboundEvent::Connect {
                password: self.password.clone(),
            },
        )
        .await?;

        let reply = timeout(AUTH_TIMEOUT, reader.next_event())
            .await
            .map_err(|_| anyhow::anyhow!("no reply to connect within {:?}", AUTH_TIMEOUT))??;

        match reply {
            Some(OutboundEvent::Accepted { id }) => {
                info!("Connected as session {}", id);
                self.emit(NetworkEvent::Connected(id));
                Ok(Admission::Accepted { reader, writer })
            }
            Some(OutboundEvent::Rejected { reason }) => {
                Ok(Admission::Closed(format!("connection refused: {}", reason)))
            }
            Some(other) => anyhow::bail!("unexpected reply to connect: {:?}", other),
            None => Ok(Admission::Closed("server closed the connection".to_string())),
        }
    }

    fn emit(&self, event: NetworkEvent) {
        if self.events.send(event).is_err() {
            debug!("App no longer listening for network events");
        }
    }
}

enum Admission {
    Accepted { reader: LineReader, writer: OwnedWriteHalf },
    Closed(String),
}

/// Resolve once the app asks to disconnect or drops its handle.
async fn wait_for_disconnect(commands: &mut UnboundedReceiver<NetworkCommand>) {
    loop {
        match commands.recv().await {
            Some(NetworkCommand::Disconnect) | None => return,
            Some(other) => debug!("Not connected yet, dropping {:?}", other),
        }
    }
}

/// Newline-framed reader over the socket.
struct LineReader {
    stream: OwnedReadHalf,
    read_buffer: BytesMut,
}

impl LineReader {
    fn new(stream: OwnedReadHalf) -> Self {
        Self {
            stream,
            read_buffer: BytesMut::with_capacity(4096),
        }
    }

    /// Next decodable event, skipping lines that fail to decode.
    /// `None` once the server closes the connection.
    async fn next_event(&mut self) -> Result<Option<OutboundEvent>> {
        loop {
            let line = match self.next_line().await? {
                Some(line) => line,
                None => return Ok(None),
            };

            match json_codec::decode_server_line(&line) {
                Ok(event) => return Ok(Some(event)),
                Err(e) => warn!("Ignoring message from server: {}", e),
            }
        }
    }

    async fn next_line(&mut self) -> Result<Option<String>> {
        loop {
            if let Some(pos) = self.read_buffer.iter().position(|&b| b == b'\n') {
                let line = self.read_buffer.split_to(pos + 1);
                let text = String::from_utf8_lossy(&line).trim().to_string();
                if text.is_empty() {
                    continue;
                }
                return Ok(Some(text));
            }

            if self.read_buffer.len() > MAX_LINE_LEN {
                anyhow::bail!("server line exceeds {} bytes", MAX_LINE_LEN);
            }

            let n = self.stream.read_buf(&mut self.read_buffer).await?;
            if n == 0 {
                return Ok(None); // Connection closed
            }
        }
    }
}

async fn send_event(writer: &mut OwnedWriteHalf, event: &InboundEvent) -> Result<()> {
    let line = json_codec::encode_client_event(event)?;
    writer.write_all(format!("{}\n", line).as_bytes()).await?;
    writer.flush().await?;

    debug!("Sent: {}", line);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncBufReadExt;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn close_while_awaiting_connect_reply_disconnects() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let (events_tx, mut events_rx) = mpsc::unbounded_channel();

        let handle = ConnectionHandle::spawn(&addr, "secret", events_tx);

        // Accept and read the connect line, but never answer it.
        let (socket, _) = listener.accept().await.unwrap();
        let mut lines = tokio::io::BufReader::new(socket).lines();
        let first = lines.next_line().await.unwrap().unwrap();
        assert!(first.contains("\"connect\""));

        handle.close();

        let event = timeout(Duration::from_secs(3), events_rx.recv())
            .await
            .expect("no disconnect event after close");
        assert_eq!(event, Some(NetworkEvent::Disconnected("disconnected".to_string())));
    }

    #[tokio::test]
    async fn request_color_sends_another_handshake() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let (events_tx, mut events_rx) = mpsc::unbounded_channel();

        let handle = ConnectionHandle::spawn(&addr, "secret", events_tx);

        let (socket, _) = listener.accept().await.unwrap();
        let (read_half, mut write_half) = socket.into_split();
        let mut lines = tokio::io::BufReader::new(read_half).lines();
        let _connect = lines.next_line().await.unwrap().unwrap();
        write_half
            .write_all(b"{\"event\":\"connected\",\"id\":7}\n")
            .await
            .unwrap();

        let handshake = lines.next_line().await.unwrap().unwrap();
        assert!(handshake.contains("\"handshake\""));
        assert_eq!(events_rx.recv().await, Some(NetworkEvent::Connected(SessionId(7))));

        handle.send(NetworkCommand::RequestColor);
        let again = timeout(Duration::from_secs(3), lines.next_line())
            .await
            .expect("no second handshake")
            .unwrap()
            .unwrap();
        assert!(again.contains("\"handshake\""));
    }
}
