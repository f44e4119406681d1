//! Input source selection.

use std::sync::Arc;

use serde_json::json;
use sinric_protocol::{Action, Cause, JsonMap, Request};

use super::{ensure_accepted, unsupported};
use crate::callback::CallbackSlot;
use crate::device::{Capability, Device, DeviceCore};
use crate::error::HandlerResult;
use crate::limiter::EventLimiter;
use crate::values::{map, text};

/// `(device_id, input) -> accepted`, input e.g. `"HDMI1"`
pub type InputCallback = dyn Fn(&str, &str) -> bool + Send + Sync;

#[derive(Debug)]
pub struct InputController {
    on_select_input: CallbackSlot<InputCallback>,
    limiter: EventLimiter,
}

impl Default for InputController {
    fn default() -> Self {
        Self {
            on_select_input: CallbackSlot::default(),
            limiter: EventLimiter::for_state(),
        }
    }
}

impl InputController {
    pub fn set_callback(&self, callback: Arc<InputCallback>) {
        self.on_select_input.set(callback);
    }

    pub fn send_event(&self, core: &DeviceCore, input: &str, cause: Cause) -> bool {
        core.send_limited_event(&self.limiter, Action::SelectInput, map([("input", json!(input))]), cause, "")
    }
}

impl Capability for InputController {
    const ACTIONS: &'static [Action] = &[Action::SelectInput];

    fn handle(&self, device_id: &str, request: &Request) -> HandlerResult<JsonMap> {
        if request.action() != Some(Action::SelectInput) {
            return Err(unsupported(&request.action));
        }

        let input = text(&request.request_value, "input")?;
        let accepted = self
            .on_select_input
            .invoke(Action::SelectInput, device_id, |cb| cb(device_id, input))?;
        ensure_accepted(Action::SelectInput, accepted)?;
        Ok(map([("input", json!(input))]))
    }
}

pub trait InputCapability: Device {
    fn input_controller(&self) -> &InputController;

    fn on_select_input<F>(&self, callback: F)
    where
        F: Fn(&str, &str) -> bool + Send + Sync + 'static,
    {
        self.input_controller().set_callback(Arc::new(callback));
    }

    fn send_select_input_event(&self, input: &str, cause: Cause) -> bool {
        self.input_controller().send_event(self.core(), input, cause)
    }
}
