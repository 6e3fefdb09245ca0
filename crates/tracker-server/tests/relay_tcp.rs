// crates/tracker-server/tests/relay_tcp.rs
use std::collections::HashSet;
use std::net::SocketAddr;
use std::time::Duration;

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tracker_server::config::Config;
use tracker_server::server;

const SECRET: &str = "letmein";

async fn start_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let config = Config {
        bind_addr: "127.0.0.1".to_string(),
        port: addr.port(),
        password: SECRET.to_string(),
        max_clients: 32,
    };

    tokio::spawn(async move {
        let _ = server::serve(listener, config).await;
    });

    addr
}

struct TestClient {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl TestClient {
    async fn open(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.unwrap();
        let (read, writer) = stream.into_split();
        TestClient {
            lines: BufReader::new(read).lines(),
            writer,
        }
    }

    async fn send(&mut self, line: &str) {
        self.writer.write_all(line.as_bytes()).await.unwrap();
        self.writer.write_all(b"\n").await.unwrap();
    }

    async fn recv(&mut self) -> Option<Value> {
        let line = timeout(Duration::from_secs(5), self.lines.next_line())
            .await
            .expect("timed out waiting for server")
            .unwrap()?;
        Some(serde_json::from_str(&line).unwrap())
    }

    async fn recv_event(&mut self, event: &str) -> Value {
        loop {
            let msg = self.recv().await.expect("connection closed");
            if msg["event"] == event {
                return msg;
            }
        }
    }

    /// Connect, authenticate and handshake; returns the assigned color.
    async fn join(addr: SocketAddr) -> (Self, Option<String>) {
        let mut client = TestClient::open(addr).await;
        client
            .send(&format!(r#"{{"event":"connect","password":"{}"}}"#, SECRET))
            .await;
        client.recv_event("connected").await;

        client.send(r#"{"event":"handshake"}"#).await;
        let msg = client.recv_event("color-assignment").await;
        let color = msg["color"].as_str().map(str::to_string);
        (client, color)
    }

    async fn send_position(&mut self, x: f64, y: f64) {
        self.send(&format!(r#"{{"event":"position-update","position":[{},{}]}}"#, x, y))
            .await;
    }
}

#[tokio::test]
async fn wrong_password_is_refused_and_closed() {
    let addr = start_server().await;
    let mut client = TestClient::open(addr).await;

    client.send(r#"{"event":"connect","password":"guess"}"#).await;
    let msg = client.recv().await.unwrap();
    assert_eq!(msg["event"], "connect-error");

    assert!(client.recv().await.is_none(), "server should close the connection");
}

#[tokio::test]
async fn three_clients_share_positions() {
    let addr = start_server().await;

    let mut clients = Vec::new();
    let mut colors = Vec::new();
    for _ in 0..3 {
        let (client, color) = TestClient::join(addr).await;
        clients.push(client);
        colors.push(color.expect("palette has room"));
    }
    assert_eq!(colors.iter().collect::<HashSet<_>>().len(), 3);

    for (i, client) in clients.iter_mut().enumerate() {
        client.send_position(i as f64, 100.0 + i as f64).await;
    }

    // Every client sees all three broadcasts; the last one holds all three trails.
    for client in clients.iter_mut() {
        let mut last = Value::Null;
        for _ in 0..3 {
            last = client.recv_event("position-update").await;
        }
        let positions = last["positions"].as_object().unwrap();
        assert_eq!(positions.len(), 3);
        for color in &colors {
            assert_eq!(positions[color].as_array().unwrap().len(), 1);
        }
    }

    // Drop the second client and wait until broadcasts stop carrying it.
    let gone = colors[1].clone();
    drop(clients.remove(1));

    let mut remaining = None;
    for attempt in 0..50 {
        clients[0].send_position(attempt as f64, 0.0).await;
        let msg = clients[0].recv_event("position-update").await;
        let positions = msg["positions"].as_object().unwrap().clone();
        if positions.len() == 2 {
            remaining = Some(positions);
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    let remaining = remaining.expect("disconnect was never applied");
    assert!(!remaining.contains_key(&gone));

    // Six more participants fill the palette; the freed color is among them.
    let mut newcomers = Vec::new();
    let mut new_colors = HashSet::new();
    for _ in 0..6 {
        let (client, color) = TestClient::join(addr).await;
        newcomers.push(client);
        new_colors.insert(color.expect("palette has room"));
    }
    assert!(new_colors.contains(&gone));

    // A ninth participant is told explicitly that no color is free.
    let (_late, color) = TestClient::join(addr).await;
    assert_eq!(color, None);
}

#[tokio::test]
async fn malformed_lines_do_not_drop_the_connection() {
    let addr = start_server().await;
    let (mut client, color) = TestClient::join(addr).await;
    let color = color.unwrap();

    client.send("this is not json").await;
    client
        .send(r#"{"event":"position-update","position":[1.0,2.0,3.0]}"#)
        .await;
    client.send_position(7.0, 8.0).await;

    let msg = client.recv_event("position-update").await;
    let trail = msg["positions"][color.as_str()].as_array().unwrap();
    assert_eq!(trail.len(), 1);
    assert_eq!(trail[0], serde_json::json!([7.0, 8.0]));
}

#[tokio::test]
async fn oversized_line_closes_connection_and_frees_color() {
    let addr = start_server().await;
    let (mut greedy, color) = TestClient::join(addr).await;
    let color = color.unwrap();

    // 70 KB with no newline; the server may reset before reading it all.
    let _ = greedy.writer.write_all(&vec![b'x'; 70 * 1024]).await;

    let closed = timeout(Duration::from_secs(5), async {
        loop {
            match greedy.lines.next_line().await {
                Ok(Some(_)) => continue,
                Ok(None) | Err(_) => break,
            }
        }
    })
    .await;
    assert!(closed.is_ok(), "server should close the connection");

    // The freed color lets eight fresh participants fill the palette.
    let mut clients = Vec::new();
    let mut colors = HashSet::new();
    for _ in 0..7 {
        let (client, c) = TestClient::join(addr).await;
        colors.insert(c.unwrap());
        clients.push(client);
    }

    // The relay may still be processing the disconnect.
    let mut last = None;
    for _ in 0..50 {
        let (client, c) = TestClient::join(addr).await;
        if let Some(c) = c {
            last = Some(c);
            clients.push(client);
            break;
        }
        drop(client);
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    colors.insert(last.expect("color was never released"));
    assert_eq!(colors.len(), 8);
    assert!(colors.contains(&color));
}
