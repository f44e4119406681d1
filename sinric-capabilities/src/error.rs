//! Error types for capability handling.

use thiserror::Error;

/// A request value that failed validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Parameter '{parameter}' value '{value}' is out of range ({min}..={max})")]
    RangeError {
        parameter: String,
        value: String,
        min: String,
        max: String,
    },

    #[error("Parameter '{parameter}' value '{value}' is invalid: {reason}")]
    InvalidValue {
        parameter: String,
        value: String,
        reason: String,
    },

    #[error("Required parameter '{parameter}' is missing")]
    MissingParameter { parameter: String },
}

impl ValidationError {
    pub fn range_error(
        parameter: &str,
        min: impl std::fmt::Display,
        max: impl std::fmt::Display,
        value: impl std::fmt::Display,
    ) -> Self {
        Self::RangeError {
            parameter: parameter.to_string(),
            value: value.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        }
    }

    pub fn invalid_value(
        parameter: &str,
        value: impl std::fmt::Display,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            parameter: parameter.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub fn missing(parameter: &str) -> Self {
        Self::MissingParameter {
            parameter: parameter.to_string(),
        }
    }
}

/// Why a capability did not handle a request.
///
/// The `Display` text becomes the `message` of the failed response.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HandlerError {
    #[error("Missing callback function: {0}")]
    MissingCallback(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Callback for {action} failed")]
    CallbackPanicked { action: String },

    #[error("Device did not accept {action}")]
    Rejected { action: String },
}

impl HandlerError {
    pub fn rejected(action: sinric_protocol::Action) -> Self {
        Self::Rejected {
            action: action.as_str().to_string(),
        }
    }
}

pub type HandlerResult<T> = std::result::Result<T, HandlerError>;
