//! Inbound requests.
//!
//! A [`RequestPayload`] is the routing view of an inbound `payload` object
//! (who it is for, how to answer it). A [`Request`] is the mutable record a
//! device fills in while handling it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::action::Action;
use crate::error::{ProtocolError, Result};
use crate::JsonMap;

/// Whether a request targets one device or the module as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    #[default]
    Device,
    Module,
}

impl Scope {
    pub fn as_str(self) -> &'static str {
        match self {
            Scope::Device => "device",
            Scope::Module => "module",
        }
    }
}

/// Routing fields of an inbound request payload.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestPayload {
    pub action: String,
    pub scope: Scope,
    pub device_id: String,
    pub instance_id: String,
    pub client_id: String,
    pub reply_token: String,
    pub value: JsonMap,
}

impl RequestPayload {
    /// Extract the routing fields from a request payload.
    ///
    /// Only `action` is required; every other field falls back to an empty
    /// value (and `scope` to `device`) so a reply can always be built.
    pub fn from_payload(payload: &JsonMap) -> Result<Self> {
        let text = |key: &str| {
            payload
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        let action = payload
            .get("action")
            .and_then(Value::as_str)
            .ok_or(ProtocolError::MissingField("action"))?
            .to_string();

        let scope = match payload.get("scope").and_then(Value::as_str) {
            Some("module") => Scope::Module,
            _ => Scope::Device,
        };

        let value = match payload.get("value") {
            Some(Value::Object(map)) => map.clone(),
            _ => JsonMap::new(),
        };

        Ok(Self {
            action,
            scope,
            device_id: text("deviceId"),
            instance_id: text("instanceId"),
            client_id: text("clientId"),
            reply_token: text("replyToken"),
            value,
        })
    }
}

/// A request as handed to a device for dispatch.
///
/// Created fresh per inbound message. The device's capability handler fills
/// in `response_value` on success or `error_message` on failure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Request {
    pub action: String,
    pub instance: String,
    pub request_value: JsonMap,
    pub response_value: JsonMap,
    pub error_message: Option<String>,
}

impl Request {
    pub fn new(action: impl Into<String>, request_value: JsonMap) -> Self {
        Self {
            action: action.into(),
            request_value,
            ..Default::default()
        }
    }

    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = instance.into();
        self
    }

    /// The typed action, or `None` if the name is not one the SDK knows.
    pub fn action(&self) -> Option<Action> {
        Action::from_wire(&self.action)
    }

    /// Record that no handler exists for this request's action.
    ///
    /// Always returns `false` so dispatch code can `return request.missing_callback()`.
    pub fn missing_callback(&mut self) -> bool {
        self.response_value.clear();
        self.error_message = Some(missing_callback_message(&self.action));
        false
    }
}

impl From<&RequestPayload> for Request {
    fn from(payload: &RequestPayload) -> Self {
        Request::new(payload.action.clone(), payload.value.clone())
            .with_instance(payload.instance_id.clone())
    }
}

/// The uniform error text for an action nobody handles.
pub fn missing_callback_message(action: &str) -> String {
    format!("Missing callback function: {action}")
}
