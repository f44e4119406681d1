//! One controller per capability.
//!
//! A controller owns the callback slots, held state and [`EventLimiter`] of one
//! capability on one device. Each is paired with a capability trait that a
//! device type implements by exposing the controller; the trait's default
//! methods provide the `on_*` registration and `send_*_event` calls.
//!
//! [`EventLimiter`]: crate::EventLimiter

use sinric_protocol::Action;

use crate::error::{HandlerError, HandlerResult};

mod channel;
mod color;
mod color_temperature;
mod door;
mod equalizer;
mod input;
mod lock;
mod media;
mod mode;
mod mute;
mod percent;
mod power_state;
mod range_value;
mod sensors;
mod setting;
mod thermostat;

pub use channel::{ChannelCapability, ChannelController};
pub use color::{ColorCapability, ColorController, Rgb};
pub use color_temperature::{ColorTemperatureCapability, ColorTemperatureController};
pub use door::{DoorCapability, DoorController, DoorMode};
pub use equalizer::{Band, EqualizerCapability, EqualizerController};
pub use input::{InputCapability, InputController};
pub use lock::{LockCapability, LockController};
pub use media::{MediaCapability, MediaController};
pub use mode::{ModeCapability, ModeController};
pub use mute::{MuteCapability, MuteController};
pub use percent::{
    BrightnessCapability, BrightnessController, PercentageCapability, PercentageController,
    PowerLevelCapability, PowerLevelController, VolumeCapability, VolumeController,
};
pub use power_state::{PowerStateCapability, PowerStateController};
pub use range_value::{RangeValueCapability, RangeValueController};
pub use sensors::{
    AirQualitySensor, AirQualitySensorCapability, ContactSensor, ContactSensorCapability,
    Doorbell, DoorbellCapability, MotionSensor, MotionSensorCapability, PowerReading,
    PowerSensor, PowerSensorCapability, PushNotification, PushNotificationCapability,
    TemperatureSensor, TemperatureSensorCapability,
};
pub use setting::{SettingCapability, SettingController};
pub use thermostat::{ThermostatCapability, ThermostatController};

/// Turn a callback's `false` into a rejection.
pub(crate) fn ensure_accepted(action: Action, accepted: bool) -> HandlerResult<()> {
    if accepted {
        Ok(())
    } else {
        Err(HandlerError::rejected(action))
    }
}

/// Error for an action routed to a capability that does not own it.
pub(crate) fn unsupported(action: &str) -> HandlerError {
    HandlerError::MissingCallback(action.to_string())
}
