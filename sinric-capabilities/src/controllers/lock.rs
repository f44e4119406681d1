//! Smart lock.

use std::sync::Arc;

use serde_json::json;
use sinric_protocol::{Action, Cause, JsonMap, Request};

use super::{ensure_accepted, unsupported};
use crate::callback::CallbackSlot;
use crate::device::{Capability, Device, DeviceCore};
use crate::error::{HandlerResult, ValidationError};
use crate::limiter::EventLimiter;
use crate::values::{map, text};

/// `(device_id, lock) -> accepted`
pub type LockCallback = dyn Fn(&str, bool) -> bool + Send + Sync;

#[derive(Debug)]
pub struct LockController {
    on_lock_state: CallbackSlot<LockCallback>,
    limiter: EventLimiter,
}

impl Default for LockController {
    fn default() -> Self {
        Self {
            on_lock_state: CallbackSlot::default(),
            limiter: EventLimiter::for_state(),
        }
    }
}

/// Responses and events always use the canonical spelling.
fn lock_value(locked: bool) -> JsonMap {
    map([("state", json!(if locked { "LOCKED" } else { "UNLOCKED" }))])
}

/// Accepts `lock`/`locked` and `unlock`/`unlocked` in any case.
fn parse_lock_state(state: &str) -> Result<bool, ValidationError> {
    match state.to_ascii_uppercase().as_str() {
        "LOCK" | "LOCKED" => Ok(true),
        "UNLOCK" | "UNLOCKED" => Ok(false),
        _ => Err(ValidationError::invalid_value("state", state, "expected LOCKED or UNLOCKED")),
    }
}

impl LockController {
    pub fn set_callback(&self, callback: Arc<LockCallback>) {
        self.on_lock_state.set(callback);
    }

    pub fn send_event(&self, core: &DeviceCore, locked: bool, cause: Cause) -> bool {
        core.send_limited_event(&self.limiter, Action::SetLockState, lock_value(locked), cause, "")
    }
}

impl Capability for LockController {
    const ACTIONS: &'static [Action] = &[Action::SetLockState];

    fn handle(&self, device_id: &str, request: &Request) -> HandlerResult<JsonMap> {
        if request.action() != Some(Action::SetLockState) {
            return Err(unsupported(&request.action));
        }

        let lock = parse_lock_state(text(&request.request_value, "state")?)?;
        let accepted = self
            .on_lock_state
            .invoke(Action::SetLockState, device_id, |cb| cb(device_id, lock))?;
        ensure_accepted(Action::SetLockState, accepted)?;
        Ok(lock_value(lock))
    }
}

pub trait LockCapability: Device {
    fn lock_controller(&self) -> &LockController;

    fn on_lock_state<F>(&self, callback: F)
    where
        F: Fn(&str, bool) -> bool + Send + Sync + 'static,
    {
        self.lock_controller().set_callback(Arc::new(callback));
    }

    fn send_lock_state_event(&self, locked: bool, cause: Cause) -> bool {
        self.lock_controller().send_event(self.core(), locked, cause)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{core, request, RecordingSink};
    use rstest::rstest;

    #[rstest]
    #[case("lock", "LOCKED")]
    #[case("Locked", "LOCKED")]
    #[case("unlock", "UNLOCKED")]
    #[case("UNLOCKED", "UNLOCKED")]
    fn test_state_is_canonicalized(#[case] requested: &str, #[case] expected: &str) {
        let controller = LockController::default();
        controller.set_callback(Arc::new(|_, _| true));

        let value = controller
            .handle("dev", &request(Action::SetLockState, json!({"state": requested})))
            .unwrap();
        assert_eq!(value["state"], json!(expected));
    }

    #[test]
    fn test_unknown_state() {
        let controller = LockController::default();
        controller.set_callback(Arc::new(|_, _| true));
        assert!(controller
            .handle("dev", &request(Action::SetLockState, json!({"state": "JAMMED"})))
            .is_err());
    }

    #[test]
    fn test_event_is_canonical() {
        let controller = LockController::default();
        let core = core();
        let sink = RecordingSink::attach(&core);

        controller.send_event(&core, true, Cause::PhysicalInteraction);
        assert_eq!(sink.last().unwrap().value["state"], json!("LOCKED"));
    }
}
