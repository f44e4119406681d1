//! Generic 0..=100 range, optionally per instance.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::json;
use sinric_protocol::{Action, Cause, JsonMap, Request};

use super::{ensure_accepted, unsupported};
use crate::callback::CallbackSlot;
use crate::device::{Capability, Device, DeviceCore};
use crate::error::HandlerResult;
use crate::limiter::EventLimiter;
use crate::values::{clamp_percent, int, map};

/// `(device_id, instance_id, value) -> accepted`
pub type RangeValueCallback = dyn Fn(&str, &str, u8) -> bool + Send + Sync;

/// Range values keyed by instance id; the default instance is `""`.
#[derive(Debug)]
pub struct RangeValueController {
    on_set: CallbackSlot<RangeValueCallback>,
    on_adjust: CallbackSlot<RangeValueCallback>,
    values: Mutex<HashMap<String, u8>>,
    limiter: EventLimiter,
}

impl Default for RangeValueController {
    fn default() -> Self {
        Self {
            on_set: CallbackSlot::default(),
            on_adjust: CallbackSlot::default(),
            values: Mutex::new(HashMap::new()),
            limiter: EventLimiter::for_state(),
        }
    }
}

impl RangeValueController {
    pub fn set_callback(&self, callback: Arc<RangeValueCallback>) {
        self.on_set.set(callback);
    }

    pub fn set_adjust_callback(&self, callback: Arc<RangeValueCallback>) {
        self.on_adjust.set(callback);
    }

    pub fn value(&self, instance_id: &str) -> u8 {
        self.values.lock().get(instance_id).copied().unwrap_or(0)
    }

    fn apply(
        &self,
        action: Action,
        slot: &CallbackSlot<RangeValueCallback>,
        device_id: &str,
        instance_id: &str,
        value: u8,
    ) -> HandlerResult<JsonMap> {
        let accepted = slot.invoke(action, device_id, |cb| cb(device_id, instance_id, value))?;
        ensure_accepted(action, accepted)?;
        self.values.lock().insert(instance_id.to_string(), value);
        Ok(map([("rangeValue", json!(value))]))
    }

    pub fn send_event(&self, core: &DeviceCore, value: i64, instance_id: &str, cause: Cause) -> bool {
        let value = clamp_percent(value);
        let sent = core.send_limited_event(
            &self.limiter,
            Action::SetRangeValue,
            map([("rangeValue", json!(value))]),
            cause,
            instance_id,
        );
        if sent {
            self.values.lock().insert(instance_id.to_string(), value);
        }
        sent
    }
}

impl Capability for RangeValueController {
    const ACTIONS: &'static [Action] = &[Action::SetRangeValue, Action::AdjustRangeValue];

    fn handle(&self, device_id: &str, request: &Request) -> HandlerResult<JsonMap> {
        let instance_id = request.instance.as_str();
        match request.action() {
            Some(Action::SetRangeValue) => {
                let value = clamp_percent(int(&request.request_value, "rangeValue")?);
                self.apply(Action::SetRangeValue, &self.on_set, device_id, instance_id, value)
            }
            Some(Action::AdjustRangeValue) => {
                let delta = int(&request.request_value, "rangeValueDelta")?;
                let value = clamp_percent(i64::from(self.value(instance_id)).saturating_add(delta));
                self.apply(Action::AdjustRangeValue, &self.on_adjust, device_id, instance_id, value)
            }
            _ => Err(unsupported(&request.action)),
        }
    }
}

pub trait RangeValueCapability: Device {
    fn range_value_controller(&self) -> &RangeValueController;

    fn on_range_value<F>(&self, callback: F)
    where
        F: Fn(&str, &str, u8) -> bool + Send + Sync + 'static,
    {
        self.range_value_controller().set_callback(Arc::new(callback));
    }

    /// The callback receives the resulting absolute value for the instance.
    fn on_adjust_range_value<F>(&self, callback: F)
    where
        F: Fn(&str, &str, u8) -> bool + Send + Sync + 'static,
    {
        self.range_value_controller().set_adjust_callback(Arc::new(callback));
    }

    fn send_range_value_event(&self, value: i64, instance_id: &str, cause: Cause) -> bool {
        self.range_value_controller()
            .send_event(self.core(), value, instance_id, cause)
    }
}
