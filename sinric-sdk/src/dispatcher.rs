//! Inbound message handling.
//!
//! Every text frame from the server goes through [`Dispatcher::process`]:
//!
//! 1. A bare `{"timestamp": ...}` keepalive updates the server clock.
//! 2. Responses and events are logged and dropped. A frame without a `type`
//!    is handled as a request.
//! 3. The signature is checked before any handler runs; a bad one is answered
//!    with a failure response.
//! 4. Module scope `setSetting` goes to the module setting callback, everything
//!    else to the device named in the payload.
//!
//! A panic while routing is contained and answered with a failure response.
//!
//! The result is the payload of the response to send, if any.

use std::sync::Arc;

use serde_json::{json, Value};
use sinric_capabilities::{guarded, CallbackSlot, HandlerError, ValidationError};
use sinric_protocol::{
    missing_callback_message, response_payload, Action, JsonMap, Message, MessageKind, Request,
    RequestPayload, ResponseStatus, Scope, ServerClock, Signature,
};

use crate::registry::DeviceRegistry;

/// `(setting_id, value) -> accepted`
pub type ModuleSettingCallback = dyn Fn(&str, &Value) -> bool + Send + Sync;

pub(crate) const INVALID_SIGNATURE: &str = "Signature is invalid";

pub(crate) struct Dispatcher {
    signature: Signature,
    clock: Arc<ServerClock>,
    registry: Arc<DeviceRegistry>,
    module_setting: Arc<CallbackSlot<ModuleSettingCallback>>,
}

impl Dispatcher {
    pub(crate) fn new(
        signature: Signature,
        clock: Arc<ServerClock>,
        registry: Arc<DeviceRegistry>,
        module_setting: Arc<CallbackSlot<ModuleSettingCallback>>,
    ) -> Self {
        Self {
            signature,
            clock,
            registry,
            module_setting,
        }
    }

    /// Handle one inbound frame, returning the response payload to send.
    pub(crate) fn process(&self, raw: &str) -> Option<JsonMap> {
        let value: Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Dropping unparseable message: {}", e);
                return None;
            }
        };

        if let Some(timestamp) = keepalive_timestamp(&value) {
            self.clock.sync(timestamp);
            return None;
        }

        let message: Message = match serde_json::from_value(value) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!("Dropping malformed message: {}", e);
                return None;
            }
        };

        // Frames without a `type` are treated as requests
        if matches!(message.kind(), MessageKind::Response | MessageKind::Event) {
            tracing::debug!("Ignoring {:?} message", message.kind());
            return None;
        }

        let request = match RequestPayload::from_payload(&message.payload) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!("Dropping request without routing fields: {}", e);
                return None;
            }
        };

        tracing::debug!(
            "Request {} for {} (scope {})",
            request.action,
            request.device_id,
            request.scope.as_str()
        );

        if !self.signature.validate(&message) {
            tracing::error!("Rejecting {} request: signature is invalid", request.action);
            return Some(self.respond(&request, ResponseStatus::failure(INVALID_SIGNATURE), JsonMap::new()));
        }

        let routed = guarded(&format!("Request {}", request.action), || match request.scope {
            Scope::Module => self.handle_module(&request),
            Scope::Device => self.handle_device(&request),
        });
        let (status, value) = routed.unwrap_or_else(|| {
            (
                ResponseStatus::failure(format!("Request {} failed", request.action)),
                JsonMap::new(),
            )
        });
        Some(self.respond(&request, status, value))
    }

    fn respond(&self, request: &RequestPayload, status: ResponseStatus, value: JsonMap) -> JsonMap {
        response_payload(request, &status, value, self.clock.now())
    }

    fn handle_module(&self, request: &RequestPayload) -> (ResponseStatus, JsonMap) {
        if Action::from_wire(&request.action) != Some(Action::SetSetting) {
            return (
                ResponseStatus::failure(missing_callback_message(&request.action)),
                JsonMap::new(),
            );
        }

        match self.module_setting(request) {
            Ok(value) => (ResponseStatus::ok(), value),
            Err(e) => {
                tracing::error!("Module setting failed: {}", e);
                (ResponseStatus::failure(e.to_string()), JsonMap::new())
            }
        }
    }

    fn module_setting(&self, request: &RequestPayload) -> Result<JsonMap, HandlerError> {
        let id = request
            .value
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| ValidationError::missing("id"))?;
        let setting = request
            .value
            .get("value")
            .ok_or_else(|| ValidationError::missing("value"))?;

        let accepted = self
            .module_setting
            .invoke(Action::SetSetting, "module", |cb| cb(id, setting))?;
        if !accepted {
            return Err(HandlerError::rejected(Action::SetSetting));
        }

        let mut value = JsonMap::new();
        value.insert("id".into(), json!(id));
        value.insert("value".into(), setting.clone());
        Ok(value)
    }

    fn handle_device(&self, request: &RequestPayload) -> (ResponseStatus, JsonMap) {
        let Some(device) = self.registry.get(&request.device_id) else {
            tracing::error!("Request {} for unknown device {}", request.action, request.device_id);
            return (
                ResponseStatus::failure(format!("Device '{}' is not registered", request.device_id)),
                JsonMap::new(),
            );
        };

        let mut handled = Request::from(request);
        if device.handle_request(&mut handled) {
            (ResponseStatus::ok(), handled.response_value)
        } else {
            let message = handled
                .error_message
                .unwrap_or_else(|| missing_callback_message(&request.action));
            (ResponseStatus::failure(message), JsonMap::new())
        }
    }
}

fn keepalive_timestamp(value: &Value) -> Option<i64> {
    let object = value.as_object()?;
    if object.contains_key("payload") {
        return None;
    }
    object.get("timestamp")?.as_i64()
}
