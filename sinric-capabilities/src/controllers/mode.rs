//! Named modes, optionally per instance (e.g. a washer's wash and spin modes).

use std::sync::Arc;

use serde_json::json;
use sinric_protocol::{Action, Cause, JsonMap, Request};

use super::{ensure_accepted, unsupported};
use crate::callback::CallbackSlot;
use crate::device::{Capability, Device, DeviceCore};
use crate::error::HandlerResult;
use crate::limiter::EventLimiter;
use crate::values::{map, text};

/// `(device_id, instance_id, mode) -> accepted`
pub type ModeCallback = dyn Fn(&str, &str, &str) -> bool + Send + Sync;

#[derive(Debug)]
pub struct ModeController {
    on_mode: CallbackSlot<ModeCallback>,
    limiter: EventLimiter,
}

impl Default for ModeController {
    fn default() -> Self {
        Self {
            on_mode: CallbackSlot::default(),
            limiter: EventLimiter::for_state(),
        }
    }
}

impl ModeController {
    pub fn set_callback(&self, callback: Arc<ModeCallback>) {
        self.on_mode.set(callback);
    }

    pub fn send_event(&self, core: &DeviceCore, mode: &str, instance_id: &str, cause: Cause) -> bool {
        let value = map([("mode", json!(mode))]);
        core.send_limited_event(&self.limiter, Action::SetMode, value, cause, instance_id)
    }
}

impl Capability for ModeController {
    const ACTIONS: &'static [Action] = &[Action::SetMode];

    fn handle(&self, device_id: &str, request: &Request) -> HandlerResult<JsonMap> {
        if request.action() != Some(Action::SetMode) {
            return Err(unsupported(&request.action));
        }

        let mode = text(&request.request_value, "mode")?;
        let instance_id = request.instance.as_str();
        let accepted = self
            .on_mode
            .invoke(Action::SetMode, device_id, |cb| cb(device_id, instance_id, mode))?;
        ensure_accepted(Action::SetMode, accepted)?;
        Ok(map([("mode", json!(mode))]))
    }
}

pub trait ModeCapability: Device {
    fn mode_controller(&self) -> &ModeController;

    fn on_mode<F>(&self, callback: F)
    where
        F: Fn(&str, &str, &str) -> bool + Send + Sync + 'static,
    {
        self.mode_controller().set_callback(Arc::new(callback));
    }

    fn send_mode_event(&self, mode: &str, instance_id: &str, cause: Cause) -> bool {
        self.mode_controller()
            .send_event(self.core(), mode, instance_id, cause)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::request;

    #[test]
    fn test_mode_with_instance() {
        let controller = ModeController::default();
        controller.set_callback(Arc::new(|_, instance, mode| instance == "wash" && mode == "Delicate"));

        let req = request(Action::SetMode, json!({"mode": "Delicate"})).with_instance("wash");
        let value = controller.handle("dev", &req).unwrap();
        assert_eq!(value["mode"], json!("Delicate"));

        let req = request(Action::SetMode, json!({"mode": "Delicate"}));
        assert!(controller.handle("dev", &req).is_err());
    }
}
