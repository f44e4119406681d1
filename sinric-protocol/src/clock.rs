//! Server-corrected clock used for `createdAt` timestamps.

use std::sync::atomic::{AtomicI64, Ordering};

/// Local wall clock plus the offset reported by the server's keepalive messages.
///
/// The server periodically sends a bare `{"timestamp": <unix-seconds>}` message.
/// Recording it lets events carry a `createdAt` the server agrees with even when
/// the device has no RTC or NTP.
#[derive(Debug, Default)]
pub struct ServerClock {
    offset_secs: AtomicI64,
}

impl ServerClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current unix time in seconds, adjusted by the last server timestamp.
    pub fn now(&self) -> i64 {
        chrono::Utc::now().timestamp() + self.offset_secs.load(Ordering::Relaxed)
    }

    /// Record a timestamp received from the server.
    pub fn sync(&self, server_timestamp: i64) {
        let offset = server_timestamp - chrono::Utc::now().timestamp();
        self.offset_secs.store(offset, Ordering::Relaxed);
        tracing::debug!("Server clock synced, offset {}s", offset);
    }

    pub fn offset(&self) -> i64 {
        self.offset_secs.load(Ordering::Relaxed)
    }
}

/// Current local unix time in milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsynced_clock_matches_local_time() {
        let clock = ServerClock::new();
        let local = chrono::Utc::now().timestamp();
        assert!((clock.now() - local).abs() <= 1);
        assert_eq!(clock.offset(), 0);
    }

    #[test]
    fn test_sync_applies_offset() {
        let clock = ServerClock::new();
        let server_time = chrono::Utc::now().timestamp() + 3600;
        clock.sync(server_time);

        assert!((clock.offset() - 3600).abs() <= 1);
        assert!((clock.now() - server_time).abs() <= 1);
    }
}
