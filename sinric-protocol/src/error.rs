//! Error types for the sinric-protocol crate.

/// Errors raised while parsing, building or signing wire messages.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The message is not valid JSON or does not have the expected shape
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The action string is not one the SDK knows about
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    /// The device id does not match the 24 lowercase hex character format
    #[error("Invalid device id: {0}")]
    InvalidDeviceId(String),

    /// A required payload field is absent
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// The HMAC could not be computed
    #[error("Signature error: {0}")]
    Signature(String),
}

/// Convenience type alias for Results using ProtocolError.
pub type Result<T> = std::result::Result<T, ProtocolError>;
