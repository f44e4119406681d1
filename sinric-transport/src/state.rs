//! Connection lifecycle state.

use std::fmt;

/// Where the client is in its connect / reconnect cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConnectionState {
    /// `start` has not been called yet
    #[default]
    Idle,
    /// First connection attempt in progress
    Connecting,
    /// Handshake completed, frames flowing
    Connected,
    /// Connection lost, waiting for or attempting a retry
    Reconnecting,
    /// `stop` was called; the client will not connect again
    Stopped,
}

impl ConnectionState {
    pub fn is_connected(self) -> bool {
        self == ConnectionState::Connected
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionState::Idle => "idle",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Reconnecting => "reconnecting",
            ConnectionState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}
