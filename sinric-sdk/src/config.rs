//! Configuration for [`SinricPro`](crate::SinricPro).
//!
//! Credentials come from the Sinric Pro portal. Everything else has a working
//! default, so the usual setup is:
//!
//! ```rust
//! use sinric_sdk::SinricProConfig;
//!
//! let config = SinricProConfig::new(
//!     "de0bxxxx-1x3x-4x3x-ax2x-5dabxxxxxxxx",
//!     "5f36xxxx-x3x7-4x3x-xexe-e86724a9xxxx-4c4axxxx-3x3x-x5xe-x9x3-333d65xxxxxx",
//! );
//! assert_eq!(config.server_url, "ws.sinric.pro");
//! ```

use std::fmt;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::Deserialize;
use sinric_transport::{
    TransportConfig, DEFAULT_HEARTBEAT_INTERVAL, DEFAULT_PONG_TIMEOUT, DEFAULT_RECONNECT_DELAY,
};

use crate::error::{Result, SdkError};

/// Cloud endpoint used when none is configured.
pub const DEFAULT_SERVER_URL: &str = "ws.sinric.pro";

/// Value of the `platform` handshake header.
pub const PLATFORM: &str = "Rust";

/// Value of the `SDKVersion` handshake header.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Delay before retrying a message the socket refused.
pub const DEFAULT_SEND_RETRY_DELAY: Duration = Duration::from_millis(500);

const MIN_SECRET_LENGTH: usize = 32;

static APP_KEY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?i)[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$")
        .expect("app key pattern is valid")
});

/// Settings for a [`SinricPro`](crate::SinricPro) session.
///
/// Can be embedded in an application's own config file; timings are given in
/// seconds there (`heartbeat_interval = 300`).
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct SinricProConfig {
    /// App key (a UUID)
    pub app_key: String,

    /// App secret, at least 32 characters
    pub app_secret: String,

    /// Host name, or a full `ws://` / `wss://` url
    /// Default: ws.sinric.pro
    pub server_url: String,

    /// Install a verbose tracing subscriber on `begin` if none is set
    /// Default: false
    pub debug: bool,

    /// Ask the server to push the last known device states after connecting
    /// Default: false
    pub restore_device_states: bool,

    /// Default: 300 seconds
    #[serde(deserialize_with = "seconds")]
    pub heartbeat_interval: Duration,

    /// Default: 10 seconds
    #[serde(deserialize_with = "seconds")]
    pub pong_timeout: Duration,

    /// Default: 5 seconds
    #[serde(deserialize_with = "seconds")]
    pub reconnect_delay: Duration,

    /// Default: 500 milliseconds
    #[serde(skip, default = "default_send_retry_delay")]
    pub send_retry_delay: Duration,
}

fn default_send_retry_delay() -> Duration {
    DEFAULT_SEND_RETRY_DELAY
}

fn seconds<'de, D>(deserializer: D) -> std::result::Result<Duration, D::Error>
where
    D: serde::Deserializer<'de>,
{
    u64::deserialize(deserializer).map(Duration::from_secs)
}

impl Default for SinricProConfig {
    fn default() -> Self {
        Self {
            app_key: String::new(),
            app_secret: String::new(),
            server_url: DEFAULT_SERVER_URL.to_string(),
            debug: false,
            restore_device_states: false,
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
            pong_timeout: DEFAULT_PONG_TIMEOUT,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            send_retry_delay: default_send_retry_delay(),
        }
    }
}

impl fmt::Debug for SinricProConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SinricProConfig")
            .field("app_key", &self.app_key)
            .field("app_secret", &"<redacted>")
            .field("server_url", &self.server_url)
            .field("debug", &self.debug)
            .field("restore_device_states", &self.restore_device_states)
            .field("heartbeat_interval", &self.heartbeat_interval)
            .field("pong_timeout", &self.pong_timeout)
            .field("reconnect_delay", &self.reconnect_delay)
            .field("send_retry_delay", &self.send_retry_delay)
            .finish()
    }
}

impl SinricProConfig {
    pub fn new(app_key: impl Into<String>, app_secret: impl Into<String>) -> Self {
        Self {
            app_key: app_key.into(),
            app_secret: app_secret.into(),
            ..Default::default()
        }
    }

    /// Build a config from `SINRIC_APP_KEY`, `SINRIC_APP_SECRET` and the
    /// optional `SINRIC_SERVER_URL` and `SINRIC_DEBUG`.
    pub fn from_env() -> Result<Self> {
        let required = |name: &str| {
            std::env::var(name)
                .map_err(|_| SdkError::Configuration(format!("{name} is not set")))
        };

        let mut config = Self::new(required("SINRIC_APP_KEY")?, required("SINRIC_APP_SECRET")?);
        if let Ok(server_url) = std::env::var("SINRIC_SERVER_URL") {
            config.server_url = server_url;
        }
        if let Ok(debug) = std::env::var("SINRIC_DEBUG") {
            config.debug = matches!(debug.to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }
        Ok(config)
    }

    pub fn with_server_url(mut self, server_url: impl Into<String>) -> Self {
        self.server_url = server_url.into();
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_restore_device_states(mut self, restore: bool) -> Self {
        self.restore_device_states = restore;
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

    pub fn with_send_retry_delay(mut self, delay: Duration) -> Self {
        self.send_retry_delay = delay;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !APP_KEY_PATTERN.is_match(&self.app_key) {
            return Err(SdkError::Configuration(
                "Invalid app_key: expected a UUID".to_string(),
            ));
        }

        if self.app_secret.len() < MIN_SECRET_LENGTH {
            return Err(SdkError::Configuration(format!(
                "Invalid app_secret: must be at least {MIN_SECRET_LENGTH} characters"
            )));
        }

        if self.server_url.trim().is_empty() {
            return Err(SdkError::Configuration(
                "server_url must not be empty".to_string(),
            ));
        }

        if self.send_retry_delay.is_zero() {
            return Err(SdkError::Configuration(
                "send_retry_delay must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// The endpoint to connect to.
    ///
    /// A bare host name becomes `wss://<host>:443/`; a url with a scheme is
    /// used as given.
    pub fn websocket_url(&self) -> String {
        let server_url = self.server_url.trim();
        if server_url.contains("://") {
            server_url.to_string()
        } else {
            format!("wss://{server_url}:443/")
        }
    }

    /// Transport settings with the handshake headers for `device_ids`.
    pub(crate) fn transport_config(&self, device_ids: &[String]) -> TransportConfig {
        TransportConfig::new(self.websocket_url())
            .with_header("appkey", self.app_key.as_str())
            .with_header("deviceids", device_ids.join(";"))
            .with_header("restoredevicestates", self.restore_device_states.to_string())
            .with_header("platform", PLATFORM)
            .with_header("SDKVersion", SDK_VERSION)
            .with_heartbeat_interval(self.heartbeat_interval)
            .with_pong_timeout(self.pong_timeout)
            .with_reconnect_delay(self.reconnect_delay)
    }
}
