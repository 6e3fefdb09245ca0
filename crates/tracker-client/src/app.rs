// crates/tracker-client/src/app.rs

use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use indexmap::IndexMap;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};
use tracker_core::{Color, Point, SessionId};
use tracker_protocol::coord_codec;

use crate::config::ClientConfig;
use crate::network::{ConnectionHandle, NetworkCommand, NetworkEvent};

/// How long to wait before asking again after the relay had no color.
pub const COLOR_RETRY_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    /// Authenticated, waiting for (or denied) a color.
    Connected,
    /// Holds a color; position updates are being sent.
    Tracking,
}

pub struct App {
    pub config: ClientConfig,

    // Connection state
    pub status: ConnectionStatus,
    pub session_id: Option<SessionId>,
    pub my_color: Option<Color>,

    // Map state
    pub trails: IndexMap<Color, Vec<Point>>,
    pub last_position: Option<Point>,
    pub last_update: Option<DateTime<Local>>,

    // UI state
    pub status_message: String,
    pub should_quit: bool,

    // Statistics
    pub positions_sent: u64,
    pub broadcasts_received: u64,

    network: Option<ConnectionHandle>,
    network_events: UnboundedSender<NetworkEvent>,
    color_retry_at: Option<Instant>,
}

impl App {
    pub fn new(config: ClientConfig, network_events: UnboundedSender<NetworkEvent>) -> Self {
        Self {
            config,
            status: ConnectionStatus::Disconnected,
            session_id: None,
            my_color: None,
            trails: IndexMap::new(),
            last_position: None,
            last_update: None,
            status_message: "Press [C] to connect".to_string(),
            should_quit: false,
            positions_sent: 0,
            broadcasts_received: 0,
            network: None,
            network_events,
            color_retry_at: None,
        }
    }

    /// Start connecting in the background. No-op while already connected.
    pub fn connect(&mut self) {
        if self.status != ConnectionStatus::Disconnected {
            return;
        }

        info!("Connecting to {}", self.config.server_addr);
        self.network = Some(ConnectionHandle::spawn(
            &self.config.server_addr,
            &self.config.password,
            self.network_events.clone(),
        ));
        self.status = ConnectionStatus::Connecting;
        self.status_message = format!("Connecting to {}...", self.config.server_addr);
    }

    pub fn disconnect(&mut self) {
        if let Some(network) = &self.network {
            network.close();
        }
    }

    /// Forget every trail drawn so far.
    pub fn reset_map(&mut self) {
        self.trails.clear();
        self.status_message = "Map reset".to_string();
    }

    pub fn quit(&mut self) {
        self.disconnect();
        self.should_quit = true;
    }

    pub fn handle_network_event(&mut self, event: NetworkEvent) {
        match event {
            NetworkEvent::Connected(id) => {
                self.session_id = Some(id);
                self.status = ConnectionStatus::Connected;
                self.status_message = "Connected, waiting for a color".to_string();
            }
            NetworkEvent::ColorAssigned(Some(color)) => {
                self.my_color = Some(color);
                self.status = ConnectionStatus::Tracking;
                self.color_retry_at = None;
                self.status_message = format!("Tracking as {}", color);

                // The clipboard only reports changes, so publish what it
                // already held while we were waiting.
                if let Some(point) = self.last_position {
                    self.send_position(point);
                }
            }
            NetworkEvent::ColorAssigned(None) => {
                warn!("Relay has no free color; not tracked");
                self.my_color = None;
                self.status = ConnectionStatus::Connected;
                self.color_retry_at = Some(Instant::now() + COLOR_RETRY_INTERVAL);
                self.status_message = "No color available: map is full, retrying shortly".to_string();
            }
            NetworkEvent::Positions(snapshot) => {
                self.trails = snapshot.into_iter().collect();
                self.broadcasts_received += 1;
                self.last_update = Some(Local::now());
            }
            NetworkEvent::Disconnected(reason) => {
                self.network = None;
                self.status = ConnectionStatus::Disconnected;
                self.session_id = None;
                self.my_color = None;
                self.color_retry_at = None;
                self.trails.clear();
                self.status_message = format!("Disconnected: {}", reason);
            }
        }
    }

    /// Periodic work driven by the render loop.
    ///
    /// While connected without a color, asks the relay again once the retry
    /// deadline passes. The next request is scheduled by the reply.
    pub fn tick(&mut self, now: Instant) {
        let due = match self.color_retry_at {
            Some(at) => now >= at,
            None => false,
        };
        if !due || self.status != ConnectionStatus::Connected {
            return;
        }

        if let Some(network) = &self.network {
            debug!("Asking the relay for a color again");
            network.send(NetworkCommand::RequestColor);
        }
        self.color_retry_at = None;
    }

    /// Feed freshly copied clipboard text.
    ///
    /// Text that is not a coordinate string is ignored. Valid positions are
    /// sent only while this client holds a color.
    pub fn on_clipboard_text(&mut self, raw: &str) {
        if !coord_codec::validate(raw) {
            debug!("Clipboard text is not a coordinate string");
            return;
        }

        let point = match coord_codec::coordinate_pair(raw) {
            Ok(point) => point,
            Err(e) => {
                warn!("{}", e);
                return;
            }
        };
        self.last_position = Some(point);

        if self.status != ConnectionStatus::Tracking {
            return;
        }
        self.send_position(point);
    }

    fn send_position(&mut self, point: Point) {
        if let Some(network) = &self.network {
            network.send(NetworkCommand::SendPosition(point));
            self.positions_sent += 1;
        }
    }
}
