//! Adaptive rate limiting for outbound events.

use parking_lot::Mutex;
use sinric_protocol::clock::now_millis;

/// Minimum spacing between ordinary state events, in milliseconds.
pub const EVENT_LIMIT_STATE: u64 = 1_000;

/// Minimum spacing between sensor readings, in milliseconds.
pub const EVENT_LIMIT_SENSOR_VALUE: u64 = 60_000;

/// Gate for one capability's outbound events.
///
/// An allowed call schedules the next opening `minimum_distance + extra_distance`
/// milliseconds later. Calls made while closed are counted; if more than a
/// quarter of `minimum_distance` of them pile up before the gate reopens, the
/// next allowed call grows `extra_distance` by `minimum_distance`. An allowed
/// call without that backlog clears the penalty.
#[derive(Debug)]
pub struct EventLimiter {
    minimum_distance: i64,
    state: Mutex<LimiterState>,
}

/// An opening taken from an [`EventLimiter`].
#[derive(Debug)]
#[must_use]
pub struct Opening {
    previous: LimiterState,
    granted: LimiterState,
}

#[derive(Debug, Default, Clone, Copy)]
struct LimiterState {
    next_event: i64,
    extra_distance: i64,
    fail_counter: i64,
}

impl EventLimiter {
    pub fn new(minimum_distance_ms: u64) -> Self {
        Self {
            minimum_distance: i64::try_from(minimum_distance_ms).unwrap_or(i64::MAX),
            state: Mutex::new(LimiterState::default()),
        }
    }

    /// Limiter for ordinary state events.
    pub fn for_state() -> Self {
        Self::new(EVENT_LIMIT_STATE)
    }

    /// Limiter for periodic sensor readings.
    pub fn for_sensor() -> Self {
        Self::new(EVENT_LIMIT_SENSOR_VALUE)
    }

    pub fn minimum_distance(&self) -> u64 {
        self.minimum_distance.unsigned_abs()
    }

    fn fail_threshold(&self) -> i64 {
        self.minimum_distance / 4
    }

    /// Check the gate against the current time, consuming it if open.
    pub fn is_limited(&self) -> bool {
        self.is_limited_at(now_millis())
    }

    /// Check the gate at an explicit time in milliseconds.
    pub fn is_limited_at(&self, now: i64) -> bool {
        self.acquire_at(now).is_none()
    }

    /// Take the gate if it is open, keeping a receipt for [`give_back`](Self::give_back).
    pub fn acquire(&self) -> Option<Opening> {
        self.acquire_at(now_millis())
    }

    pub fn acquire_at(&self, now: i64) -> Option<Opening> {
        let threshold = self.fail_threshold();
        let mut state = self.state.lock();

        if now >= state.next_event {
            let previous = *state;
            if state.fail_counter > threshold {
                state.extra_distance += self.minimum_distance;
                state.fail_counter = 0;
            } else {
                state.extra_distance = 0;
            }
            state.next_event = now + self.minimum_distance + state.extra_distance;
            return Some(Opening {
                previous,
                granted: *state,
            });
        }

        state.fail_counter += 1;
        if state.fail_counter == threshold {
            tracing::warn!(
                "Too many events: {} attempts within {} ms, slow down event sending",
                state.fail_counter,
                self.minimum_distance
            );
        }
        None
    }

    /// Undo an [`acquire`](Self::acquire) whose event was never sent.
    ///
    /// Blocked attempts counted since the opening are kept. Does nothing if
    /// the gate has been taken again in the meantime.
    pub fn give_back(&self, opening: Opening) {
        let mut state = self.state.lock();
        if state.next_event != opening.granted.next_event {
            return;
        }
        let blocked_since = state.fail_counter - opening.granted.fail_counter;
        *state = LimiterState {
            fail_counter: opening.previous.fail_counter + blocked_since,
            ..opening.previous
        };
    }

    pub fn can_send_event(&self) -> bool {
        !self.is_limited()
    }

    pub fn extra_distance(&self) -> u64 {
        self.state.lock().extra_distance.unsigned_abs()
    }

    pub fn fail_counter(&self) -> u64 {
        self.state.lock().fail_counter.unsigned_abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_call_passes_second_is_limited() {
        let limiter = EventLimiter::new(1000);
        assert!(!limiter.is_limited_at(10_000));
        assert!(limiter.is_limited_at(10_000));
        assert_eq!(limiter.fail_counter(), 1);
    }

    #[test]
    fn test_reopens_after_minimum_distance() {
        let limiter = EventLimiter::new(1000);
        assert!(!limiter.is_limited_at(10_000));
        assert!(limiter.is_limited_at(10_999));
        assert!(!limiter.is_limited_at(11_000));
        assert_eq!(limiter.extra_distance(), 0);
    }

    #[test]
    fn test_penalty_grows_when_hammered() {
        let limiter = EventLimiter::new(1000);
        assert!(!limiter.is_limited_at(0));

        // threshold is 250; exceed it before the gate reopens
        for t in 1..=251 {
            assert!(limiter.is_limited_at(t));
        }
        assert!(!limiter.is_limited_at(1000));
        assert_eq!(limiter.extra_distance(), 1000);
        assert_eq!(limiter.fail_counter(), 0);

        // next opening is now two distances away
        assert!(limiter.is_limited_at(2999));
        assert!(!limiter.is_limited_at(3000));
    }

    #[test]
    fn test_penalty_accumulates_and_clears() {
        let limiter = EventLimiter::new(100);
        let mut now = 0;
        assert!(!limiter.is_limited_at(now));

        for round in 1..=3 {
            for _ in 0..26 {
                assert!(limiter.is_limited_at(now + 1));
            }
            now += 100 * (round as i64);
            assert!(!limiter.is_limited_at(now));
            assert_eq!(limiter.extra_distance(), 100 * round);
        }

        // a well-behaved call clears the penalty
        now += 400;
        assert!(!limiter.is_limited_at(now));
        assert_eq!(limiter.extra_distance(), 0);
    }

    #[test]
    fn test_at_threshold_does_not_escalate() {
        let limiter = EventLimiter::new(1000);
        assert!(!limiter.is_limited_at(0));
        for t in 1..=250 {
            assert!(limiter.is_limited_at(t));
        }
        assert!(!limiter.is_limited_at(1000));
        assert_eq!(limiter.extra_distance(), 0);
    }

    #[test]
    fn test_give_back_reopens_gate() {
        let limiter = EventLimiter::new(1000);
        let opening = limiter.acquire_at(10_000).unwrap();
        assert!(limiter.acquire_at(10_001).is_none());

        limiter.give_back(opening);
        assert_eq!(limiter.fail_counter(), 1);
        assert!(!limiter.is_limited_at(10_002));
        assert!(limiter.is_limited_at(10_003));
    }

    #[test]
    fn test_give_back_after_new_opening_is_ignored() {
        let limiter = EventLimiter::new(1000);
        let stale = limiter.acquire_at(0).unwrap();
        assert!(limiter.acquire_at(1000).is_some());

        limiter.give_back(stale);
        assert!(limiter.is_limited_at(1999));
        assert!(!limiter.is_limited_at(2000));
    }

    #[test]
    fn test_constants() {
        assert_eq!(EventLimiter::for_state().minimum_distance(), 1000);
        assert_eq!(EventLimiter::for_sensor().minimum_distance(), 60000);
    }

    #[test]
    fn test_can_send_event_uses_wall_clock() {
        let limiter = EventLimiter::for_state();
        assert!(limiter.can_send_event());
        assert!(!limiter.can_send_event());
    }
}
