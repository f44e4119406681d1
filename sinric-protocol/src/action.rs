//! Action names and event causes.
//!
//! Action strings only exist at the (de)serialization boundary; everywhere
//! else the SDK works with the closed [`Action`] enum so device dispatch tables
//! are checked by the compiler.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;

macro_rules! define_actions {
    ($($variant:ident => $wire:literal),* $(,)?) => {
        /// Every action the SDK can receive as a request or emit as an event.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Action {
            $(
                #[doc = concat!("`", $wire, "`")]
                $variant,
            )*
        }

        impl Action {
            /// All known actions, in declaration order.
            pub const ALL: &'static [Action] = &[$(Action::$variant),*];

            /// The action string used on the wire.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Action::$variant => $wire,)*
                }
            }

            /// Look up an action by its wire string.
            pub fn from_wire(name: &str) -> Option<Self> {
                match name {
                    $($wire => Some(Action::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

define_actions! {
    // Requests (and their echo events)
    SetPowerState => "setPowerState",
    SetPowerLevel => "setPowerLevel",
    AdjustPowerLevel => "adjustPowerLevel",
    SetBrightness => "setBrightness",
    AdjustBrightness => "adjustBrightness",
    SetColor => "setColor",
    SetColorTemperature => "setColorTemperature",
    IncreaseColorTemperature => "increaseColorTemperature",
    DecreaseColorTemperature => "decreaseColorTemperature",
    SetRangeValue => "setRangeValue",
    AdjustRangeValue => "adjustRangeValue",
    SetThermostatMode => "setThermostatMode",
    TargetTemperature => "targetTemperature",
    AdjustTargetTemperature => "adjustTargetTemperature",
    SetVolume => "setVolume",
    AdjustVolume => "adjustVolume",
    SetMute => "setMute",
    MediaControl => "mediaControl",
    SetBands => "setBands",
    AdjustBands => "adjustBands",
    ResetBands => "resetBands",
    ChangeChannel => "changeChannel",
    SkipChannels => "skipChannels",
    SelectInput => "selectInput",
    SetLockState => "setLockState",
    SetMode => "setMode",
    SetPercentage => "setPercentage",
    AdjustPercentage => "adjustPercentage",
    SetSetting => "setSetting",
    // Events only
    CurrentTemperature => "currentTemperature",
    AirQuality => "airQuality",
    PowerUsage => "powerUsage",
    Motion => "motion",
    SetContactState => "setContactState",
    DoorbellPress => "DoorbellPress",
    PushNotification => "pushNotification",
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::from_wire(s).ok_or_else(|| ProtocolError::UnknownAction(s.to_string()))
    }
}

/// Why a device's state changed, attached to every outbound event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Cause {
    /// Someone operated the device by hand
    #[default]
    PhysicalInteraction,
    /// The change was triggered from an app or voice assistant
    AppInteraction,
    /// A sensor reading taken on a schedule
    PeriodicPoll,
    /// An alert raised by the device itself
    Alert,
}

impl Cause {
    /// The cause string used on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Cause::PhysicalInteraction => "PHYSICAL_INTERACTION",
            Cause::AppInteraction => "APP_INTERACTION",
            Cause::PeriodicPoll => "PERIODIC_POLL",
            Cause::Alert => "ALERT",
        }
    }
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
