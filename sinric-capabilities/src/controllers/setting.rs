//! Device-level settings (`setSetting`).

use std::sync::Arc;

use serde_json::{json, Value};
use sinric_protocol::{Action, JsonMap, Request};

use super::{ensure_accepted, unsupported};
use crate::callback::CallbackSlot;
use crate::device::{Capability, Device};
use crate::error::{HandlerResult, ValidationError};
use crate::values::{map, text};

/// `(device_id, setting_id, value) -> accepted`
pub type SettingCallback = dyn Fn(&str, &str, &Value) -> bool + Send + Sync;

/// Settings have no event and so no limiter.
#[derive(Debug, Default)]
pub struct SettingController {
    on_setting: CallbackSlot<SettingCallback>,
}

impl SettingController {
    pub fn set_callback(&self, callback: Arc<SettingCallback>) {
        self.on_setting.set(callback);
    }
}

impl Capability for SettingController {
    const ACTIONS: &'static [Action] = &[Action::SetSetting];

    fn handle(&self, device_id: &str, request: &Request) -> HandlerResult<JsonMap> {
        if request.action() != Some(Action::SetSetting) {
            return Err(unsupported(&request.action));
        }

        let id = text(&request.request_value, "id")?;
        let value = request
            .request_value
            .get("value")
            .ok_or_else(|| ValidationError::missing("value"))?;
        let accepted = self
            .on_setting
            .invoke(Action::SetSetting, device_id, |cb| cb(device_id, id, value))?;
        ensure_accepted(Action::SetSetting, accepted)?;
        Ok(map([("id", json!(id)), ("value", value.clone())]))
    }
}

pub trait SettingCapability: Device {
    fn setting_controller(&self) -> &SettingController;

    fn on_setting<F>(&self, callback: F)
    where
        F: Fn(&str, &str, &Value) -> bool + Send + Sync + 'static,
    {
        self.setting_controller().set_callback(Arc::new(callback));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::request;

    #[test]
    fn test_setting_echoes_id_and_value() {
        let controller = SettingController::default();
        controller.set_callback(Arc::new(|_, id, value| id == "tilt" && value == &json!(15)));

        let value = controller
            .handle("dev", &request(Action::SetSetting, json!({"id": "tilt", "value": 15})))
            .unwrap();
        assert_eq!(value, map([("id", json!("tilt")), ("value", json!(15))]));
    }
}
