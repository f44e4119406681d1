//! White color temperature in Kelvin.

use std::sync::Arc;

use serde_json::json;
use sinric_protocol::{Action, Cause, JsonMap, Request};

use super::{ensure_accepted, unsupported};
use crate::callback::CallbackSlot;
use crate::device::{Capability, Device, DeviceCore};
use crate::error::{HandlerError, HandlerResult, ValidationError};
use crate::limiter::EventLimiter;
use crate::values::{int, map};

/// Range most ecosystems agree on. Values outside it are logged, not refused.
const EXPECTED_KELVIN: std::ops::RangeInclusive<u32> = 1000..=10000;

/// `(device_id, kelvin) -> accepted`
pub type ColorTemperatureCallback = dyn Fn(&str, u32) -> bool + Send + Sync;

/// `(device_id) -> new kelvin`, `None` to refuse
pub type ColorTemperatureStepCallback = dyn Fn(&str) -> Option<u32> + Send + Sync;

#[derive(Debug)]
pub struct ColorTemperatureController {
    on_set: CallbackSlot<ColorTemperatureCallback>,
    on_increase: CallbackSlot<ColorTemperatureStepCallback>,
    on_decrease: CallbackSlot<ColorTemperatureStepCallback>,
    limiter: EventLimiter,
}

impl Default for ColorTemperatureController {
    fn default() -> Self {
        Self {
            on_set: CallbackSlot::default(),
            on_increase: CallbackSlot::default(),
            on_decrease: CallbackSlot::default(),
            limiter: EventLimiter::for_state(),
        }
    }
}

fn check_kelvin(kelvin: u32) {
    if !EXPECTED_KELVIN.contains(&kelvin) {
        tracing::warn!(
            "Color temperature {}K is outside {}..={}K",
            kelvin,
            EXPECTED_KELVIN.start(),
            EXPECTED_KELVIN.end()
        );
    }
}

impl ColorTemperatureController {
    pub fn set_callback(&self, callback: Arc<ColorTemperatureCallback>) {
        self.on_set.set(callback);
    }

    pub fn set_increase_callback(&self, callback: Arc<ColorTemperatureStepCallback>) {
        self.on_increase.set(callback);
    }

    pub fn set_decrease_callback(&self, callback: Arc<ColorTemperatureStepCallback>) {
        self.on_decrease.set(callback);
    }

    pub fn send_event(&self, core: &DeviceCore, kelvin: u32, cause: Cause) -> bool {
        check_kelvin(kelvin);
        let value = map([("colorTemperature", json!(kelvin))]);
        core.send_limited_event(&self.limiter, Action::SetColorTemperature, value, cause, "")
    }

    fn step(
        &self,
        action: Action,
        slot: &CallbackSlot<ColorTemperatureStepCallback>,
        device_id: &str,
    ) -> HandlerResult<JsonMap> {
        let kelvin = slot.invoke(action, device_id, |cb| cb(device_id))?;
        let kelvin = kelvin.ok_or_else(|| HandlerError::rejected(action))?;
        check_kelvin(kelvin);
        Ok(map([("colorTemperature", json!(kelvin))]))
    }
}

impl Capability for ColorTemperatureController {
    const ACTIONS: &'static [Action] = &[
        Action::SetColorTemperature,
        Action::IncreaseColorTemperature,
        Action::DecreaseColorTemperature,
    ];

    fn handle(&self, device_id: &str, request: &Request) -> HandlerResult<JsonMap> {
        match request.action() {
            Some(Action::SetColorTemperature) => {
                let raw = int(&request.request_value, "colorTemperature")?;
                let kelvin = u32::try_from(raw).map_err(|_| {
                    ValidationError::invalid_value("colorTemperature", raw, "must not be negative")
                })?;
                check_kelvin(kelvin);

                let accepted = self
                    .on_set
                    .invoke(Action::SetColorTemperature, device_id, |cb| cb(device_id, kelvin))?;
                ensure_accepted(Action::SetColorTemperature, accepted)?;
                Ok(map([("colorTemperature", json!(kelvin))]))
            }
            Some(Action::IncreaseColorTemperature) => {
                self.step(Action::IncreaseColorTemperature, &self.on_increase, device_id)
            }
            Some(Action::DecreaseColorTemperature) => {
                self.step(Action::DecreaseColorTemperature, &self.on_decrease, device_id)
            }
            _ => Err(unsupported(&request.action)),
        }
    }
}

pub trait ColorTemperatureCapability: Device {
    fn color_temperature_controller(&self) -> &ColorTemperatureController;

    fn on_color_temperature<F>(&self, callback: F)
    where
        F: Fn(&str, u32) -> bool + Send + Sync + 'static,
    {
        self.color_temperature_controller().set_callback(Arc::new(callback));
    }

    /// The callback returns the new temperature, or `None` to refuse.
    fn on_increase_color_temperature<F>(&self, callback: F)
    where
        F: Fn(&str) -> Option<u32> + Send + Sync + 'static,
    {
        self.color_temperature_controller()
            .set_increase_callback(Arc::new(callback));
    }

    /// The callback returns the new temperature, or `None` to refuse.
    fn on_decrease_color_temperature<F>(&self, callback: F)
    where
        F: Fn(&str) -> Option<u32> + Send + Sync + 'static,
    {
        self.color_temperature_controller()
            .set_decrease_callback(Arc::new(callback));
    }

    fn send_color_temperature_event(&self, kelvin: u32, cause: Cause) -> bool {
        self.color_temperature_controller()
            .send_event(self.core(), kelvin, cause)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::request;

    #[test]
    fn test_out_of_range_is_only_a_warning() {
        let controller = ColorTemperatureController::default();
        controller.set_callback(Arc::new(|_, _| true));

        let value = controller
            .handle(
                "dev",
                &request(Action::SetColorTemperature, json!({"colorTemperature": 20000})),
            )
            .unwrap();
        assert_eq!(value["colorTemperature"], json!(20000));
    }

    #[test]
    fn test_increase_echoes_new_value() {
        let controller = ColorTemperatureController::default();
        controller.set_increase_callback(Arc::new(|_| Some(4000)));
        controller.set_decrease_callback(Arc::new(|_| None));

        let value = controller
            .handle("dev", &request(Action::IncreaseColorTemperature, json!({})))
            .unwrap();
        assert_eq!(value["colorTemperature"], json!(4000));

        assert!(controller
            .handle("dev", &request(Action::DecreaseColorTemperature, json!({})))
            .is_err());
    }
}
