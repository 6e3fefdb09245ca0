// crates/tracker-client/src/clipboard.rs

//! Interval-based clipboard polling.

use std::time::{Duration, Instant};

use copypasta::{ClipboardContext, ClipboardProvider};
use tracing::warn;

/// Reads the system clipboard at most once per interval and reports text
/// only when it changed since the last read.
pub struct ClipboardPoller {
    ctx: Option<ClipboardContext>,
    interval: Duration,
    last_poll: Option<Instant>,
    last_text: Option<String>,
}

impl ClipboardPoller {
    pub fn new(interval: Duration) -> Self {
        let ctx = match ClipboardContext::new() {
            Ok(ctx) => Some(ctx),
            Err(e) => {
                warn!("Clipboard unavailable, position tracking disabled: {}", e);
                None
            }
        };

        Self {
            ctx,
            interval,
            last_poll: None,
            last_text: None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.ctx.is_some()
    }

    /// New clipboard text, if the interval elapsed and the text changed.
    pub fn poll(&mut self) -> Option<String> {
        let now = Instant::now();
        if let Some(last) = self.last_poll {
            if now.duration_since(last) < self.interval {
                return None;
            }
        }
        self.last_poll = Some(now);

        let text = self.ctx.as_mut()?.get_contents().ok()?;
        if self.last_text.as_deref() == Some(text.as_str()) {
            return None;
        }

        self.last_text = Some(text.clone());
        Some(text)
    }
}
