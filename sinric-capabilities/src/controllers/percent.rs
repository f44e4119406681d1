//! Capabilities holding a 0..=100 level: power level, brightness, volume and
//! percentage.
//!
//! They share one shape. A `set` request is clamped into range. An `adjust`
//! request adds its delta to the level the controller last saw and clamps the
//! sum, so the callback always receives an absolute level.

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::json;
use sinric_protocol::{Action, Cause, JsonMap, Request};

use super::{ensure_accepted, unsupported};
use crate::callback::CallbackSlot;
use crate::device::{Capability, Device, DeviceCore};
use crate::error::HandlerResult;
use crate::limiter::EventLimiter;
use crate::values::{clamp_percent, int, map};

/// `(device_id, level) -> accepted`
pub type LevelCallback = dyn Fn(&str, u8) -> bool + Send + Sync;

macro_rules! define_percent_controller {
    (
        $(#[$meta:meta])*
        controller: $controller:ident,
        capability: $capability:ident,
        accessor: $accessor:ident,
        key: $key:literal,
        set: ($set_action:ident, $on_set:ident),
        adjust: ($adjust_action:ident, $on_adjust:ident, $delta_key:literal),
        event: $send_event:ident $(,)?
    ) => {
        $(#[$meta])*
        #[derive(Debug)]
        pub struct $controller {
            on_set: CallbackSlot<LevelCallback>,
            on_adjust: CallbackSlot<LevelCallback>,
            level: Mutex<u8>,
            limiter: EventLimiter,
        }

        impl Default for $controller {
            fn default() -> Self {
                Self {
                    on_set: CallbackSlot::default(),
                    on_adjust: CallbackSlot::default(),
                    level: Mutex::new(0),
                    limiter: EventLimiter::for_state(),
                }
            }
        }

        impl $controller {
            pub fn set_callback(&self, callback: Arc<LevelCallback>) {
                self.on_set.set(callback);
            }

            pub fn set_adjust_callback(&self, callback: Arc<LevelCallback>) {
                self.on_adjust.set(callback);
            }

            /// The level last accepted by a callback or reported in an event.
            pub fn level(&self) -> u8 {
                *self.level.lock()
            }

            /// Compute the level an adjustment by `delta` would produce.
            pub fn adjusted(&self, delta: i64) -> u8 {
                clamp_percent(i64::from(self.level()).saturating_add(delta))
            }

            fn apply(
                &self,
                action: Action,
                slot: &CallbackSlot<LevelCallback>,
                device_id: &str,
                level: u8,
            ) -> HandlerResult<JsonMap> {
                let accepted = slot.invoke(action, device_id, |cb| cb(device_id, level))?;
                ensure_accepted(action, accepted)?;
                *self.level.lock() = level;
                Ok(map([($key, json!(level))]))
            }

            pub fn send_event(&self, core: &DeviceCore, level: i64, cause: Cause) -> bool {
                let level = clamp_percent(level);
                let value = map([($key, json!(level))]);
                let sent = core.send_limited_event(&self.limiter, Action::$set_action, value, cause, "");
                if sent {
                    *self.level.lock() = level;
                }
                sent
            }
        }

        impl Capability for $controller {
            const ACTIONS: &'static [Action] = &[Action::$set_action, Action::$adjust_action];

            fn handle(&self, device_id: &str, request: &Request) -> HandlerResult<JsonMap> {
                match request.action() {
                    Some(Action::$set_action) => {
                        let level = clamp_percent(int(&request.request_value, $key)?);
                        self.apply(Action::$set_action, &self.on_set, device_id, level)
                    }
                    Some(Action::$adjust_action) => {
                        let level = self.adjusted(int(&request.request_value, $delta_key)?);
                        self.apply(Action::$adjust_action, &self.on_adjust, device_id, level)
                    }
                    _ => Err(unsupported(&request.action)),
                }
            }
        }

        pub trait $capability: Device {
            fn $accessor(&self) -> &$controller;

            /// Register the handler for absolute levels.
            fn $on_set<F>(&self, callback: F)
            where
                F: Fn(&str, u8) -> bool + Send + Sync + 'static,
            {
                self.$accessor().set_callback(Arc::new(callback));
            }

            /// Register the handler for relative adjustments; it receives the
            /// resulting absolute level.
            fn $on_adjust<F>(&self, callback: F)
            where
                F: Fn(&str, u8) -> bool + Send + Sync + 'static,
            {
                self.$accessor().set_adjust_callback(Arc::new(callback));
            }

            fn $send_event(&self, level: i64, cause: Cause) -> bool {
                self.$accessor().send_event(self.core(), level, cause)
            }
        }
    };
}

define_percent_controller! {
    /// `setPowerLevel` / `adjustPowerLevel`.
    controller: PowerLevelController,
    capability: PowerLevelCapability,
    accessor: power_level_controller,
    key: "powerLevel",
    set: (SetPowerLevel, on_power_level),
    adjust: (AdjustPowerLevel, on_adjust_power_level, "powerLevelDelta"),
    event: send_power_level_event,
}

define_percent_controller! {
    /// `setBrightness` / `adjustBrightness`.
    controller: BrightnessController,
    capability: BrightnessCapability,
    accessor: brightness_controller,
    key: "brightness",
    set: (SetBrightness, on_brightness),
    adjust: (AdjustBrightness, on_adjust_brightness, "brightnessDelta"),
    event: send_brightness_event,
}

define_percent_controller! {
    /// `setVolume` / `adjustVolume`; the adjustment arrives under `volume`.
    controller: VolumeController,
    capability: VolumeCapability,
    accessor: volume_controller,
    key: "volume",
    set: (SetVolume, on_volume),
    adjust: (AdjustVolume, on_adjust_volume, "volume"),
    event: send_volume_event,
}

define_percent_controller! {
    /// `setPercentage` / `adjustPercentage`.
    controller: PercentageController,
    capability: PercentageCapability,
    accessor: percentage_controller,
    key: "percentage",
    set: (SetPercentage, on_percentage),
    adjust: (AdjustPercentage, on_adjust_percentage, "percentage"),
    event: send_percentage_event,
}
