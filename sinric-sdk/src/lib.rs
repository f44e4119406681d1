//! # Sinric SDK - device side of the Sinric Pro IoT cloud
//!
//! Connects devices to Sinric Pro so they can be controlled from Alexa, Google
//! Home and the Sinric Pro apps:
//!
//! ```rust,no_run
//! use sinric_sdk::devices::Light;
//! use sinric_sdk::{BrightnessCapability, Cause, PowerStateCapability, SinricPro, SinricProConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), sinric_sdk::SdkError> {
//!     let sinric = SinricPro::get_instance();
//!     let light = sinric.add(Light::new("5dc1564130aa42c6e2b8f4a1"))?;
//!
//!     // Requests from the cloud
//!     light.on_power_state(|_, on| {
//!         println!("light {}", if on { "on" } else { "off" });
//!         true
//!     });
//!     light.on_brightness(|_, level| {
//!         println!("brightness {level}");
//!         true
//!     });
//!
//!     sinric.begin(SinricProConfig::from_env()?)?;
//!
//!     // Report a change made at the device itself
//!     light.send_power_state_event(true, Cause::PhysicalInteraction);
//!
//!     tokio::signal::ctrl_c().await.ok();
//!     sinric.stop().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Key Features
//!
//! - **Signed messages**: every request is checked with HMAC-SHA256 before a
//!   handler runs, and every response and event is signed
//! - **Capabilities as traits**: a device type exposes `on_*` and
//!   `send_*_event` methods for exactly the capabilities it has
//! - **Rate limiting**: events are throttled per capability, with growing
//!   back-off for devices that flood
//! - **Reconnecting transport**: heartbeat pings, pong timeout and automatic
//!   reconnect; queued messages survive a dropped connection
//!
//! ## Architecture
//!
//! ```text
//! sinric-sdk (SinricPro, device types, config, logging)
//!     ↓
//! sinric-capabilities (controllers, EventLimiter, dispatch)
//!     ↓                         sinric-transport (WebSocket, queues)
//! sinric-protocol (envelope, signature, actions)
//! ```
//!
//! Callbacks run on the SDK's background tasks and should return quickly.
//! A panicking callback is reported to the cloud as a failed request.

pub use config::{SinricProConfig, DEFAULT_SERVER_URL, PLATFORM, SDK_VERSION};
pub use dispatcher::ModuleSettingCallback;
pub use error::{Result, SdkError};
pub use sinric::{ConnectionCallback, PongCallback, SinricPro, SinricState};

// Re-export what applications need from the lower layers
pub use sinric_capabilities::controllers::{
    AirQualitySensorCapability, Band, BrightnessCapability, ChannelCapability,
    ColorCapability, ColorTemperatureCapability, ContactSensorCapability, DoorCapability,
    DoorMode, DoorbellCapability, EqualizerCapability, InputCapability, LockCapability,
    MediaCapability, ModeCapability, MotionSensorCapability, MuteCapability,
    PercentageCapability, PowerLevelCapability, PowerReading, PowerSensorCapability,
    PowerStateCapability, PushNotificationCapability, RangeValueCapability, Rgb,
    SettingCapability, TemperatureSensorCapability, ThermostatCapability, VolumeCapability,
};
pub use sinric_capabilities::{Device, EventLimiter, EVENT_LIMIT_SENSOR_VALUE, EVENT_LIMIT_STATE};
pub use sinric_protocol::{Action, Cause, JsonMap};

pub mod config;
pub mod devices;
mod dispatcher;
mod error;
pub mod logging;
mod outbox;
mod registry;
mod sinric;
