//! Thermostat mode and target temperature.

use std::sync::Arc;

use serde_json::json;
use sinric_protocol::{Action, Cause, JsonMap, Request};

use super::{ensure_accepted, unsupported};
use crate::callback::CallbackSlot;
use crate::device::{Capability, Device, DeviceCore};
use crate::error::{HandlerError, HandlerResult, ValidationError};
use crate::limiter::EventLimiter;
use crate::values::{map, number, text};

/// `(device_id, mode) -> accepted`, mode as sent, e.g. `"COOL"`
pub type ThermostatModeCallback = dyn Fn(&str, &str) -> bool + Send + Sync;

/// `(device_id, celsius) -> accepted`
pub type TargetTemperatureCallback = dyn Fn(&str, f64) -> bool + Send + Sync;

/// `(device_id, delta) -> new target`, `None` to refuse
pub type AdjustTargetTemperatureCallback = dyn Fn(&str, f64) -> Option<f64> + Send + Sync;

#[derive(Debug)]
pub struct ThermostatController {
    on_mode: CallbackSlot<ThermostatModeCallback>,
    on_target: CallbackSlot<TargetTemperatureCallback>,
    on_adjust_target: CallbackSlot<AdjustTargetTemperatureCallback>,
    limiter: EventLimiter,
}

impl Default for ThermostatController {
    fn default() -> Self {
        Self {
            on_mode: CallbackSlot::default(),
            on_target: CallbackSlot::default(),
            on_adjust_target: CallbackSlot::default(),
            limiter: EventLimiter::for_state(),
        }
    }
}

impl ThermostatController {
    pub fn set_mode_callback(&self, callback: Arc<ThermostatModeCallback>) {
        self.on_mode.set(callback);
    }

    pub fn set_target_callback(&self, callback: Arc<TargetTemperatureCallback>) {
        self.on_target.set(callback);
    }

    pub fn set_adjust_target_callback(&self, callback: Arc<AdjustTargetTemperatureCallback>) {
        self.on_adjust_target.set(callback);
    }

    pub fn send_mode_event(&self, core: &DeviceCore, mode: &str, cause: Cause) -> bool {
        let value = map([("thermostatMode", json!(mode))]);
        core.send_limited_event(&self.limiter, Action::SetThermostatMode, value, cause, "")
    }

    pub fn send_target_event(&self, core: &DeviceCore, celsius: f64, cause: Cause) -> bool {
        let value = map([("temperature", json!(celsius))]);
        core.send_limited_event(&self.limiter, Action::TargetTemperature, value, cause, "")
    }
}

impl Capability for ThermostatController {
    const ACTIONS: &'static [Action] = &[
        Action::SetThermostatMode,
        Action::TargetTemperature,
        Action::AdjustTargetTemperature,
    ];

    fn handle(&self, device_id: &str, request: &Request) -> HandlerResult<JsonMap> {
        let value = &request.request_value;
        match request.action() {
            Some(Action::SetThermostatMode) => {
                let mode = text(value, "thermostatMode")?;
                if mode.is_empty() {
                    return Err(ValidationError::invalid_value("thermostatMode", mode, "empty").into());
                }
                let accepted = self
                    .on_mode
                    .invoke(Action::SetThermostatMode, device_id, |cb| cb(device_id, mode))?;
                ensure_accepted(Action::SetThermostatMode, accepted)?;
                Ok(map([("thermostatMode", json!(mode))]))
            }
            Some(Action::TargetTemperature) => {
                let celsius = number(value, "temperature")?;
                let accepted = self
                    .on_target
                    .invoke(Action::TargetTemperature, device_id, |cb| cb(device_id, celsius))?;
                ensure_accepted(Action::TargetTemperature, accepted)?;
                Ok(map([("temperature", json!(celsius))]))
            }
            Some(Action::AdjustTargetTemperature) => {
                let delta = number(value, "temperature")?;
                let target = self
                    .on_adjust_target
                    .invoke(Action::AdjustTargetTemperature, device_id, |cb| cb(device_id, delta))?
                    .ok_or_else(|| HandlerError::rejected(Action::AdjustTargetTemperature))?;
                Ok(map([("temperature", json!(target))]))
            }
            _ => Err(unsupported(&request.action)),
        }
    }
}

pub trait ThermostatCapability: Device {
    fn thermostat_controller(&self) -> &ThermostatController;

    fn on_thermostat_mode<F>(&self, callback: F)
    where
        F: Fn(&str, &str) -> bool + Send + Sync + 'static,
    {
        self.thermostat_controller().set_mode_callback(Arc::new(callback));
    }

    fn on_target_temperature<F>(&self, callback: F)
    where
        F: Fn(&str, f64) -> bool + Send + Sync + 'static,
    {
        self.thermostat_controller().set_target_callback(Arc::new(callback));
    }

    /// The callback receives the requested change and returns the new target.
    fn on_adjust_target_temperature<F>(&self, callback: F)
    where
        F: Fn(&str, f64) -> Option<f64> + Send + Sync + 'static,
    {
        self.thermostat_controller()
            .set_adjust_target_callback(Arc::new(callback));
    }

    fn send_thermostat_mode_event(&self, mode: &str, cause: Cause) -> bool {
        self.thermostat_controller().send_mode_event(self.core(), mode, cause)
    }

    fn send_target_temperature_event(&self, celsius: f64, cause: Cause) -> bool {
        self.thermostat_controller()
            .send_target_event(self.core(), celsius, cause)
    }
}
