//! RGB color.

use std::sync::Arc;

use serde_json::{json, Value};
use sinric_protocol::{Action, Cause, JsonMap, Request};

use super::{ensure_accepted, unsupported};
use crate::callback::CallbackSlot;
use crate::device::{Capability, Device, DeviceCore};
use crate::error::{HandlerResult, ValidationError};
use crate::limiter::EventLimiter;
use crate::values::{int, map, object};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `{r, g, b}`; any channel outside 0..=255 rejects the whole color.
    pub fn from_value(color: &JsonMap) -> Result<Self, ValidationError> {
        let channel = |key: &str| -> Result<u8, ValidationError> {
            let raw = int(color, key)?;
            u8::try_from(raw).map_err(|_| ValidationError::range_error(key, 0, 255, raw))
        };
        Ok(Self {
            r: channel("r")?,
            g: channel("g")?,
            b: channel("b")?,
        })
    }

    fn to_value(self) -> Value {
        json!({"r": self.r, "g": self.g, "b": self.b})
    }
}

/// `(device_id, color) -> accepted`
pub type ColorCallback = dyn Fn(&str, Rgb) -> bool + Send + Sync;

#[derive(Debug)]
pub struct ColorController {
    on_color: CallbackSlot<ColorCallback>,
    limiter: EventLimiter,
}

impl Default for ColorController {
    fn default() -> Self {
        Self {
            on_color: CallbackSlot::default(),
            limiter: EventLimiter::for_state(),
        }
    }
}

impl ColorController {
    pub fn set_callback(&self, callback: Arc<ColorCallback>) {
        self.on_color.set(callback);
    }

    pub fn send_event(&self, core: &DeviceCore, color: Rgb, cause: Cause) -> bool {
        let value = map([("color", color.to_value())]);
        core.send_limited_event(&self.limiter, Action::SetColor, value, cause, "")
    }
}

impl Capability for ColorController {
    const ACTIONS: &'static [Action] = &[Action::SetColor];

    fn handle(&self, device_id: &str, request: &Request) -> HandlerResult<JsonMap> {
        if request.action() != Some(Action::SetColor) {
            return Err(unsupported(&request.action));
        }

        let color = Rgb::from_value(object(&request.request_value, "color")?)?;
        let accepted = self
            .on_color
            .invoke(Action::SetColor, device_id, |cb| cb(device_id, color))?;
        ensure_accepted(Action::SetColor, accepted)?;
        Ok(map([("color", color.to_value())]))
    }
}

pub trait ColorCapability: Device {
    fn color_controller(&self) -> &ColorController;

    fn on_color<F>(&self, callback: F)
    where
        F: Fn(&str, Rgb) -> bool + Send + Sync + 'static,
    {
        self.color_controller().set_callback(Arc::new(callback));
    }

    fn send_color_event(&self, color: Rgb, cause: Cause) -> bool {
        self.color_controller().send_event(self.core(), color, cause)
    }
}
