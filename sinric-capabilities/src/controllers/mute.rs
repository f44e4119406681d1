//! Audio mute.

use std::sync::Arc;

use serde_json::json;
use sinric_protocol::{Action, Cause, JsonMap, Request};

use super::{ensure_accepted, unsupported};
use crate::callback::CallbackSlot;
use crate::device::{Capability, Device, DeviceCore};
use crate::error::HandlerResult;
use crate::limiter::EventLimiter;
use crate::values::{flag, map};

/// `(device_id, muted) -> accepted`
pub type MuteCallback = dyn Fn(&str, bool) -> bool + Send + Sync;

#[derive(Debug)]
pub struct MuteController {
    on_mute: CallbackSlot<MuteCallback>,
    limiter: EventLimiter,
}

impl Default for MuteController {
    fn default() -> Self {
        Self {
            on_mute: CallbackSlot::default(),
            limiter: EventLimiter::for_state(),
        }
    }
}

impl MuteController {
    pub fn set_callback(&self, callback: Arc<MuteCallback>) {
        self.on_mute.set(callback);
    }

    pub fn send_event(&self, core: &DeviceCore, muted: bool, cause: Cause) -> bool {
        core.send_limited_event(&self.limiter, Action::SetMute, map([("mute", json!(muted))]), cause, "")
    }
}

impl Capability for MuteController {
    const ACTIONS: &'static [Action] = &[Action::SetMute];

    fn handle(&self, device_id: &str, request: &Request) -> HandlerResult<JsonMap> {
        if request.action() != Some(Action::SetMute) {
            return Err(unsupported(&request.action));
        }

        let muted = flag(&request.request_value, "mute")?;
        let accepted = self
            .on_mute
            .invoke(Action::SetMute, device_id, |cb| cb(device_id, muted))?;
        ensure_accepted(Action::SetMute, accepted)?;
        Ok(map([("mute", json!(muted))]))
    }
}

pub trait MuteCapability: Device {
    fn mute_controller(&self) -> &MuteController;

    fn on_mute<F>(&self, callback: F)
    where
        F: Fn(&str, bool) -> bool + Send + Sync + 'static,
    {
        self.mute_controller().set_callback(Arc::new(callback));
    }

    fn send_mute_event(&self, muted: bool, cause: Cause) -> bool {
        self.mute_controller().send_event(self.core(), muted, cause)
    }
}
