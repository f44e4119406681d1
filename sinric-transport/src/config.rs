//! Transport configuration.

use std::time::Duration;

use url::Url;

use crate::error::{Result, TransportError};

/// Interval between client heartbeat pings.
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(300);

/// How long to wait for the pong answering a heartbeat.
pub const DEFAULT_PONG_TIMEOUT: Duration = Duration::from_secs(10);

/// Fixed delay between reconnect attempts.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Settings for [`WebSocketClient`](crate::WebSocketClient).
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// `ws://` or `wss://` endpoint
    pub url: String,

    /// Handshake headers, sent in order on every connection attempt
    pub headers: Vec<(String, String)>,

    pub heartbeat_interval: Duration,

    pub pong_timeout: Duration,

    pub reconnect_delay: Duration,
}

impl TransportConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Add or replace a handshake header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        set_header(&mut self.headers, name.into(), value.into());
        self
    }

    pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }

    pub fn with_pong_timeout(mut self, timeout: Duration) -> Self {
        self.pong_timeout = timeout;
        self
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    /// Check the url scheme and that every timing is non-zero.
    pub fn validate(&self) -> Result<()> {
        let parsed = Url::parse(&self.url).map_err(|e| TransportError::InvalidUrl {
            url: self.url.clone(),
            reason: e.to_string(),
        })?;

        if !matches!(parsed.scheme(), "ws" | "wss") {
            return Err(TransportError::InvalidUrl {
                url: self.url.clone(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        if self.heartbeat_interval.is_zero() {
            return Err(TransportError::Configuration(
                "heartbeat_interval must be greater than 0".to_string(),
            ));
        }

        if self.pong_timeout.is_zero() {
            return Err(TransportError::Configuration(
                "pong_timeout must be greater than 0".to_string(),
            ));
        }

        if self.pong_timeout >= self.heartbeat_interval {
            return Err(TransportError::Configuration(
                "pong_timeout must be shorter than heartbeat_interval".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            headers: Vec::new(),
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
            pong_timeout: DEFAULT_PONG_TIMEOUT,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
        }
    }
}

pub(crate) fn set_header(headers: &mut Vec<(String, String)>, name: String, value: String) {
    match headers.iter_mut().find(|(existing, _)| existing.eq_ignore_ascii_case(&name)) {
        Some(entry) => entry.1 = value,
        None => headers.push((name, value)),
    }
}
