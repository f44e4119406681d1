//! Wire protocol for the Sinric device SDK.
//!
//! This crate owns everything that is visible on the socket: the signed message
//! envelope, the canonical payload serialization the HMAC is computed over, the
//! closed set of action names, and the request/response/event payload shapes.
//! It has no knowledge of devices, capabilities or the transport.
//!
//! # Overview
//!
//! - [`Message`]: the `{header, payload, signature}` envelope exchanged in both directions
//! - [`Signature`]: HMAC-SHA256 signing and constant-time validation of a message payload
//! - [`Action`]: every action string the SDK understands, mapped to a closed enum
//! - [`RequestPayload`] / [`Request`]: an inbound request as parsed off the wire and as
//!   handed to a device for dispatch
//! - [`Event`]: a device-to-cloud state change, turned into a payload by [`event_payload`]
//! - [`ServerClock`]: local clock corrected by the server's keepalive timestamps
//!
//! # Example
//!
//! ```
//! use sinric_protocol::{Message, Signature};
//! use serde_json::json;
//!
//! let signature = Signature::new("a-shared-secret-of-at-least-32-characters");
//! let payload = json!({"action": "setPowerState", "value": {"state": "On"}});
//! let mut message = Message::new(payload.as_object().cloned().unwrap_or_default());
//!
//! signature.sign(&mut message).unwrap();
//! assert!(signature.validate(&message));
//! ```
//!
//! # Private Workspace Crate
//!
//! This crate is intended for internal use within the workspace and is not published
//! to crates.io.

pub mod action;
mod canonical;
pub mod clock;
pub mod device_id;
mod error;
pub mod message;
pub mod request;
mod signature;

pub use action::{Action, Cause};
pub use canonical::canonical_json;
pub use clock::ServerClock;
pub use device_id::{is_valid_device_id, DeviceId};
pub use error::{ProtocolError, Result};
pub use message::{
    event_payload, response_payload, Event, Header, Message, MessageKind, ResponseStatus,
    SignatureBlock, PAYLOAD_VERSION, SIGNATURE_VERSION,
};
pub use request::{missing_callback_message, Request, RequestPayload, Scope};
pub use signature::Signature;

/// JSON object type used for payloads and values, insertion-ordered.
pub type JsonMap = serde_json::Map<String, serde_json::Value>;
