//! Message envelope and outbound payload builders.
//!
//! Every message on the socket, in either direction, has the same shape:
//!
//! ```text
//! {"header":    {"payloadVersion": 2, "signatureVersion": 1},
//!  "payload":   {...},
//!  "signature": {"HMAC": "<base64>"}}
//! ```
//!
//! The builders in this module emit payload fields in a fixed order because
//! the payload is signed as a serialized string.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::action::{Action, Cause};
use crate::error::Result;
use crate::request::{RequestPayload, Scope};
use crate::JsonMap;

/// Payload format version sent in every header.
pub const PAYLOAD_VERSION: u32 = 2;

/// Signature scheme version sent in every header (HMAC-SHA256, base64).
pub const SIGNATURE_VERSION: u32 = 1;

/// Envelope header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    #[serde(rename = "payloadVersion")]
    pub payload_version: u32,
    #[serde(rename = "signatureVersion")]
    pub signature_version: u32,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            payload_version: PAYLOAD_VERSION,
            signature_version: SIGNATURE_VERSION,
        }
    }
}

/// Envelope signature block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureBlock {
    #[serde(rename = "HMAC", default, skip_serializing_if = "Option::is_none")]
    pub hmac: Option<String>,
}

/// A complete wire message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub header: Header,
    #[serde(default)]
    pub payload: JsonMap,
    #[serde(default)]
    pub signature: SignatureBlock,
}

/// The `payload.type` of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Request,
    Response,
    Event,
    Unknown,
}

impl Message {
    /// Wrap a payload in a fresh, unsigned envelope.
    pub fn new(payload: JsonMap) -> Self {
        Self {
            header: Header::default(),
            payload,
            signature: SignatureBlock::default(),
        }
    }

    /// Parse a message from its JSON text.
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Serialize the whole envelope for sending.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn kind(&self) -> MessageKind {
        match self.payload.get("type").and_then(Value::as_str) {
            Some("request") => MessageKind::Request,
            Some("response") => MessageKind::Response,
            Some("event") => MessageKind::Event,
            _ => MessageKind::Unknown,
        }
    }

    pub fn hmac(&self) -> Option<&str> {
        self.signature.hmac.as_deref()
    }
}

/// Outcome reported in a response payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseStatus {
    pub success: bool,
    pub message: String,
}

impl ResponseStatus {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: "OK".to_string(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Build the payload answering `request`.
///
/// Echoes the request's `action`, `clientId`, `replyToken`, `scope` and
/// `instanceId`. `deviceId` is left out for module scope requests.
pub fn response_payload(
    request: &RequestPayload,
    status: &ResponseStatus,
    value: JsonMap,
    created_at: i64,
) -> JsonMap {
    let mut payload = JsonMap::new();
    payload.insert("action".into(), Value::from(request.action.as_str()));
    payload.insert("clientId".into(), Value::from(request.client_id.as_str()));
    payload.insert("createdAt".into(), Value::from(created_at));
    if request.scope == Scope::Device || !request.device_id.is_empty() {
        payload.insert("deviceId".into(), Value::from(request.device_id.as_str()));
    }
    payload.insert("message".into(), Value::from(status.message.as_str()));
    payload.insert("replyToken".into(), Value::from(request.reply_token.as_str()));
    payload.insert("scope".into(), Value::from(request.scope.as_str()));
    payload.insert("success".into(), Value::from(status.success));
    payload.insert("type".into(), Value::from("response"));
    payload.insert("value".into(), Value::Object(value));
    if !request.instance_id.is_empty() {
        payload.insert("instanceId".into(), Value::from(request.instance_id.as_str()));
    }
    payload
}

/// A device-to-cloud state change waiting to be serialized.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub action: Action,
    pub device_id: String,
    pub cause: Cause,
    pub value: JsonMap,
    pub instance_id: Option<String>,
}

impl Event {
    pub fn new(action: Action, device_id: impl Into<String>, value: JsonMap, cause: Cause) -> Self {
        Self {
            action,
            device_id: device_id.into(),
            cause,
            value,
            instance_id: None,
        }
    }

    /// Attach an instance id; an empty id is treated as no instance.
    pub fn with_instance(mut self, instance_id: impl Into<String>) -> Self {
        let instance_id = instance_id.into();
        self.instance_id = (!instance_id.is_empty()).then_some(instance_id);
        self
    }
}

/// Build the payload for an outbound event.
pub fn event_payload(event: &Event, created_at: i64) -> JsonMap {
    let mut cause = JsonMap::new();
    cause.insert("type".into(), Value::from(event.cause.as_str()));

    let mut payload = JsonMap::new();
    payload.insert("action".into(), Value::from(event.action.as_str()));
    payload.insert("cause".into(), Value::Object(cause));
    payload.insert("createdAt".into(), Value::from(created_at));
    payload.insert("deviceId".into(), Value::from(event.device_id.as_str()));
    payload.insert("type".into(), Value::from("event"));
    payload.insert("value".into(), Value::Object(event.value.clone()));
    if let Some(instance_id) = &event.instance_id {
        payload.insert("instanceId".into(), Value::from(instance_id.as_str()));
    }
    payload
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical_json;
    use serde_json::json;

    fn sample_request() -> RequestPayload {
        let payload = json!({
            "type": "request",
            "scope": "device",
            "action": "setPowerState",
            "deviceId": "aaaaaaaaaaaaaaaaaaaaaaaa",
            "clientId": "c1",
            "replyToken": "r1",
            "value": {"state": "On"}
        });
        RequestPayload::from_payload(payload.as_object().unwrap()).unwrap()
    }

    #[test]
    fn test_header_defaults() {
        let message = Message::new(JsonMap::new());
        let json = message.to_json().unwrap();
        assert!(json.starts_with(r#"{"header":{"payloadVersion":2,"signatureVersion":1}"#));
        assert!(!json.contains("HMAC"));
    }

    #[test]
    fn test_inbound_message_without_header() {
        let message = Message::from_json(
            r#"{"payload":{"type":"request","action":"setMute"},"signature":{"HMAC":"abc"}}"#,
        )
        .unwrap();
        assert_eq!(message.header, Header::default());
        assert_eq!(message.kind(), MessageKind::Request);
        assert_eq!(message.hmac(), Some("abc"));
    }

    #[test]
    fn test_response_field_order() {
        let request = sample_request();
        let mut value = JsonMap::new();
        value.insert("state".into(), json!("On"));

        let payload = response_payload(&request, &ResponseStatus::ok(), value, 1_700_000_000);
        assert_eq!(
            canonical_json(&payload).unwrap(),
            concat!(
                r#"{"action":"setPowerState","clientId":"c1","createdAt":1700000000,"#,
                r#""deviceId":"aaaaaaaaaaaaaaaaaaaaaaaa","message":"OK","replyToken":"r1","#,
                r#""scope":"device","success":true,"type":"response","value":{"state":"On"}}"#
            )
        );
    }

    #[test]
    fn test_response_echoes_instance_id() {
        let mut request = sample_request();
        request.instance_id = "fanSpeed".to_string();
        let payload = response_payload(
            &request,
            &ResponseStatus::failure("nope"),
            JsonMap::new(),
            1,
        );
        assert_eq!(payload["instanceId"], json!("fanSpeed"));
        assert_eq!(payload["success"], json!(false));
        assert_eq!(payload["message"], json!("nope"));
    }

    #[test]
    fn test_module_response_omits_device_id() {
        let payload = json!({
            "type": "request",
            "scope": "module",
            "action": "setSetting",
            "clientId": "c1",
            "replyToken": "r1",
            "value": {"id": "wifi", "value": 1}
        });
        let request = RequestPayload::from_payload(payload.as_object().unwrap()).unwrap();
        let response = response_payload(&request, &ResponseStatus::ok(), JsonMap::new(), 1);
        assert!(!response.contains_key("deviceId"));
        assert_eq!(response["scope"], json!("module"));
    }

    #[test]
    fn test_event_payload() {
        let mut value = JsonMap::new();
        value.insert("state".into(), json!("Off"));
        let event = Event::new(
            Action::SetPowerState,
            "aaaaaaaaaaaaaaaaaaaaaaaa",
            value,
            Cause::PhysicalInteraction,
        );

        let payload = event_payload(&event, 42);
        assert_eq!(
            canonical_json(&payload).unwrap(),
            concat!(
                r#"{"action":"setPowerState","cause":{"type":"PHYSICAL_INTERACTION"},"#,
                r#""createdAt":42,"deviceId":"aaaaaaaaaaaaaaaaaaaaaaaa","type":"event","#,
                r#""value":{"state":"Off"}}"#
            )
        );
        assert!(!payload.contains_key("replyToken"));
        assert!(!payload.contains_key("clientId"));
    }

    #[test]
    fn test_event_instance_id() {
        let event = Event::new(Action::SetMode, "a", JsonMap::new(), Cause::AppInteraction)
            .with_instance("washMode");
        assert_eq!(event_payload(&event, 0)["instanceId"], json!("washMode"));

        let event = Event::new(Action::SetMode, "a", JsonMap::new(), Cause::AppInteraction)
            .with_instance("");
        assert!(event.instance_id.is_none());
    }
}
