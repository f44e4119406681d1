//! Property-based tests for clamping and rate limiting.

use std::sync::Arc;

use proptest::prelude::*;
use serde_json::json;
use sinric_capabilities::controllers::{BrightnessController, RangeValueController};
use sinric_capabilities::{Capability, EventLimiter};
use sinric_protocol::{Action, Request};

fn request(action: Action, value: serde_json::Value) -> Request {
    Request::new(action.as_str(), value.as_object().cloned().unwrap_or_default())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Any sequence of brightness adjustments stays within 0..=100.
    #[test]
    fn prop_adjust_brightness_stays_in_range(
        start in 0i64..=100,
        deltas in prop::collection::vec(any::<i32>(), 1..20),
    ) {
        let controller = BrightnessController::default();
        controller.set_callback(Arc::new(|_, _| true));
        controller.set_adjust_callback(Arc::new(|_, _| true));

        controller
            .handle("dev", &request(Action::SetBrightness, json!({"brightness": start})))
            .unwrap();

        for delta in deltas {
            let value = controller
                .handle("dev", &request(Action::AdjustBrightness, json!({"brightnessDelta": delta})))
                .unwrap();
            let level = value["brightness"].as_i64().unwrap();
            prop_assert!((0..=100).contains(&level));
            prop_assert_eq!(level, i64::from(controller.level()));
        }
    }

    /// Range values are clamped per instance.
    #[test]
    fn prop_range_value_clamped(value in any::<i64>()) {
        let controller = RangeValueController::default();
        controller.set_callback(Arc::new(|_, _, _| true));

        let response = controller
            .handle("dev", &request(Action::SetRangeValue, json!({"rangeValue": value})).with_instance("i"))
            .unwrap();
        let clamped = response["rangeValue"].as_i64().unwrap();
        prop_assert_eq!(clamped, value.clamp(0, 100));
    }

    /// After an allowed call the gate is closed until the minimum distance passes.
    #[test]
    fn prop_limiter_gate(
        distance in 4u64..100_000,
        start in 0i64..1_000_000_000,
        offset in 0u64..100_000,
    ) {
        let limiter = EventLimiter::new(distance);
        prop_assert!(!limiter.is_limited_at(start));

        let at = start + offset as i64;
        let limited = limiter.is_limited_at(at);
        prop_assert_eq!(limited, offset < distance);
    }

    /// Exceeding the fail threshold grows the penalty by exactly one distance.
    #[test]
    fn prop_limiter_penalty_growth(distance in 4u64..2_000, start in 0i64..1_000_000) {
        let limiter = EventLimiter::new(distance);
        prop_assert!(!limiter.is_limited_at(start));

        let threshold = distance / 4;
        for _ in 0..=threshold {
            prop_assert!(limiter.is_limited_at(start));
        }

        let reopened = start + distance as i64;
        prop_assert!(!limiter.is_limited_at(reopened));
        prop_assert_eq!(limiter.extra_distance(), distance);
        prop_assert!(limiter.is_limited_at(reopened + 2 * distance as i64 - 1));
        prop_assert!(!limiter.is_limited_at(reopened + 2 * distance as i64));
    }
}
