//! On / off.

use std::sync::Arc;

use serde_json::json;
use sinric_protocol::{Action, Cause, JsonMap, Request};

use super::{ensure_accepted, unsupported};
use crate::callback::CallbackSlot;
use crate::device::{Capability, Device, DeviceCore};
use crate::error::{HandlerResult, ValidationError};
use crate::limiter::EventLimiter;
use crate::values::{map, text};

/// `(device_id, on) -> accepted`
pub type PowerStateCallback = dyn Fn(&str, bool) -> bool + Send + Sync;

#[derive(Debug)]
pub struct PowerStateController {
    on_power_state: CallbackSlot<PowerStateCallback>,
    limiter: EventLimiter,
}

impl Default for PowerStateController {
    fn default() -> Self {
        Self {
            on_power_state: CallbackSlot::default(),
            limiter: EventLimiter::for_state(),
        }
    }
}

impl PowerStateController {
    pub fn set_callback(&self, callback: Arc<PowerStateCallback>) {
        self.on_power_state.set(callback);
    }

    pub fn send_event(&self, core: &DeviceCore, on: bool, cause: Cause) -> bool {
        core.send_limited_event(&self.limiter, Action::SetPowerState, state_value(on), cause, "")
    }
}

fn state_value(on: bool) -> JsonMap {
    map([("state", json!(if on { "On" } else { "Off" }))])
}

fn parse_state(state: &str) -> Result<bool, ValidationError> {
    if state.eq_ignore_ascii_case("on") {
        Ok(true)
    } else if state.eq_ignore_ascii_case("off") {
        Ok(false)
    } else {
        Err(ValidationError::invalid_value("state", state, "expected On or Off"))
    }
}

impl Capability for PowerStateController {
    const ACTIONS: &'static [Action] = &[Action::SetPowerState];

    fn handle(&self, device_id: &str, request: &Request) -> HandlerResult<JsonMap> {
        if request.action() != Some(Action::SetPowerState) {
            return Err(unsupported(&request.action));
        }

        let on = parse_state(text(&request.request_value, "state")?)?;
        let accepted = self
            .on_power_state
            .invoke(Action::SetPowerState, device_id, |cb| cb(device_id, on))?;
        ensure_accepted(Action::SetPowerState, accepted)?;
        Ok(state_value(on))
    }
}

pub trait PowerStateCapability: Device {
    fn power_state_controller(&self) -> &PowerStateController;

    /// Register the handler for `setPowerState`.
    fn on_power_state<F>(&self, callback: F)
    where
        F: Fn(&str, bool) -> bool + Send + Sync + 'static,
    {
        self.power_state_controller().set_callback(Arc::new(callback));
    }

    fn send_power_state_event(&self, on: bool, cause: Cause) -> bool {
        self.power_state_controller().send_event(self.core(), on, cause)
    }
}
