//! Garage door open / close, carried on `setMode`.

use std::fmt;
use std::sync::Arc;

use serde_json::json;
use sinric_protocol::{Action, Cause, JsonMap, Request};

use super::{ensure_accepted, unsupported};
use crate::callback::CallbackSlot;
use crate::device::{Capability, Device, DeviceCore};
use crate::error::{HandlerResult, ValidationError};
use crate::limiter::EventLimiter;
use crate::values::{map, text};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoorMode {
    Open,
    Close,
}

impl DoorMode {
    pub fn as_str(self) -> &'static str {
        match self {
            DoorMode::Open => "Open",
            DoorMode::Close => "Close",
        }
    }

    fn parse(mode: &str) -> Result<Self, ValidationError> {
        if mode.eq_ignore_ascii_case("open") {
            Ok(DoorMode::Open)
        } else if mode.eq_ignore_ascii_case("close") {
            Ok(DoorMode::Close)
        } else {
            Err(ValidationError::invalid_value("mode", mode, "expected Open or Close"))
        }
    }
}

impl fmt::Display for DoorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `(device_id, instance_id, mode) -> accepted`
pub type DoorCallback = dyn Fn(&str, &str, DoorMode) -> bool + Send + Sync;

#[derive(Debug)]
pub struct DoorController {
    on_door_state: CallbackSlot<DoorCallback>,
    limiter: EventLimiter,
}

impl Default for DoorController {
    fn default() -> Self {
        Self {
            on_door_state: CallbackSlot::default(),
            limiter: EventLimiter::for_state(),
        }
    }
}

impl DoorController {
    pub fn set_callback(&self, callback: Arc<DoorCallback>) {
        self.on_door_state.set(callback);
    }

    pub fn send_event(&self, core: &DeviceCore, mode: DoorMode, instance_id: &str, cause: Cause) -> bool {
        let value = map([("mode", json!(mode.as_str()))]);
        core.send_limited_event(&self.limiter, Action::SetMode, value, cause, instance_id)
    }
}

impl Capability for DoorController {
    const ACTIONS: &'static [Action] = &[Action::SetMode];

    fn handle(&self, device_id: &str, request: &Request) -> HandlerResult<JsonMap> {
        if request.action() != Some(Action::SetMode) {
            return Err(unsupported(&request.action));
        }

        let mode = DoorMode::parse(text(&request.request_value, "mode")?)?;
        let instance_id = request.instance.as_str();
        let accepted = self
            .on_door_state
            .invoke(Action::SetMode, device_id, |cb| cb(device_id, instance_id, mode))?;
        ensure_accepted(Action::SetMode, accepted)?;
        Ok(map([("mode", json!(mode.as_str()))]))
    }
}

pub trait DoorCapability: Device {
    fn door_controller(&self) -> &DoorController;

    fn on_door_state<F>(&self, callback: F)
    where
        F: Fn(&str, &str, DoorMode) -> bool + Send + Sync + 'static,
    {
        self.door_controller().set_callback(Arc::new(callback));
    }

    fn send_door_state_event(&self, mode: DoorMode, instance_id: &str, cause: Cause) -> bool {
        self.door_controller()
            .send_event(self.core(), mode, instance_id, cause)
    }
}
