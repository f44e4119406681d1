use thiserror::Error;

#[derive(Error, Debug)]
pub enum SdkError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid device id: {0}")]
    InvalidDeviceId(String),

    #[error("Device {id} is already registered with a different type")]
    DeviceTypeMismatch { id: String },

    #[error("SinricPro must be started from within a Tokio runtime")]
    NoRuntime,

    #[error("Transport error: {0}")]
    Transport(#[from] sinric_transport::TransportError),

    #[error("Protocol error: {0}")]
    Protocol(#[from] sinric_protocol::ProtocolError),
}

pub type Result<T> = std::result::Result<T, SdkError>;
