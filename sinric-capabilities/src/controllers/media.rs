//! Transport controls such as play, pause and skip.

use std::sync::Arc;

use serde_json::json;
use sinric_protocol::{Action, Cause, JsonMap, Request};

use super::{ensure_accepted, unsupported};
use crate::callback::CallbackSlot;
use crate::device::{Capability, Device, DeviceCore};
use crate::error::HandlerResult;
use crate::limiter::EventLimiter;
use crate::values::{map, text};

/// `(device_id, control) -> accepted`, control e.g. `"Play"`, `"FastForward"`
pub type MediaControlCallback = dyn Fn(&str, &str) -> bool + Send + Sync;

#[derive(Debug)]
pub struct MediaController {
    on_media_control: CallbackSlot<MediaControlCallback>,
    limiter: EventLimiter,
}

impl Default for MediaController {
    fn default() -> Self {
        Self {
            on_media_control: CallbackSlot::default(),
            limiter: EventLimiter::for_state(),
        }
    }
}

impl MediaController {
    pub fn set_callback(&self, callback: Arc<MediaControlCallback>) {
        self.on_media_control.set(callback);
    }

    pub fn send_event(&self, core: &DeviceCore, control: &str, cause: Cause) -> bool {
        let value = map([("control", json!(control))]);
        core.send_limited_event(&self.limiter, Action::MediaControl, value, cause, "")
    }
}

impl Capability for MediaController {
    const ACTIONS: &'static [Action] = &[Action::MediaControl];

    fn handle(&self, device_id: &str, request: &Request) -> HandlerResult<JsonMap> {
        if request.action() != Some(Action::MediaControl) {
            return Err(unsupported(&request.action));
        }

        let control = text(&request.request_value, "control")?;
        let accepted = self
            .on_media_control
            .invoke(Action::MediaControl, device_id, |cb| cb(device_id, control))?;
        ensure_accepted(Action::MediaControl, accepted)?;
        Ok(map([("control", json!(control))]))
    }
}

pub trait MediaCapability: Device {
    fn media_controller(&self) -> &MediaController;

    fn on_media_control<F>(&self, callback: F)
    where
        F: Fn(&str, &str) -> bool + Send + Sync + 'static,
    {
        self.media_controller().set_callback(Arc::new(callback));
    }

    fn send_media_control_event(&self, control: &str, cause: Cause) -> bool {
        self.media_controller().send_event(self.core(), control, cause)
    }
}
