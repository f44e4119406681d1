//! HMAC-SHA256 message signing.

use std::fmt;

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::canonical::canonical_json;
use crate::error::{ProtocolError, Result};
use crate::message::Message;
use crate::JsonMap;

type HmacSha256 = Hmac<Sha256>;

/// Signs outbound messages and validates inbound ones with the app secret.
///
/// The MAC covers the canonical serialization of `payload` only; the header and
/// signature block are not part of it.
#[derive(Clone)]
pub struct Signature {
    secret: String,
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signature").field("secret", &"<redacted>").finish()
    }
}

impl Signature {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    fn mac_for(&self, payload: &JsonMap) -> Result<HmacSha256> {
        let serialized = canonical_json(payload)?;
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|e| ProtocolError::Signature(e.to_string()))?;
        mac.update(serialized.as_bytes());
        Ok(mac)
    }

    /// Compute the base64 HMAC of a payload.
    pub fn compute(&self, payload: &JsonMap) -> Result<String> {
        let mac = self.mac_for(payload)?;
        Ok(BASE64_STANDARD.encode(mac.finalize().into_bytes()))
    }

    /// Sign a message in place and return the signature.
    pub fn sign(&self, message: &mut Message) -> Result<String> {
        let hmac = self.compute(&message.payload)?;
        message.signature.hmac = Some(hmac.clone());
        Ok(hmac)
    }

    /// Check a message's `signature.HMAC` against its payload.
    ///
    /// Fails closed: a missing or undecodable signature is invalid, and any
    /// internal error is logged and reported as invalid.
    pub fn validate(&self, message: &Message) -> bool {
        let Some(received) = message.hmac() else {
            tracing::warn!("Message has no signature");
            return false;
        };

        let received = match BASE64_STANDARD.decode(received) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("Signature is not valid base64: {}", e);
                return false;
            }
        };

        match self.mac_for(&message.payload) {
            Ok(mac) => mac.verify_slice(&received).is_ok(),
            Err(e) => {
                tracing::error!("Failed to compute expected signature: {}", e);
                false
            }
        }
    }

    /// Parse and validate a raw JSON message.
    pub fn validate_json(&self, raw: &str) -> bool {
        match Message::from_json(raw) {
            Ok(message) => self.validate(&message),
            Err(e) => {
                tracing::warn!("Cannot validate unparseable message: {}", e);
                false
            }
        }
    }
}
