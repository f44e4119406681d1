//! Device types, one per Sinric Pro product type.
//!
//! A device type is a [`DeviceCore`] plus the controllers of its capabilities.
//! Request capabilities are routed by their action table; event capabilities
//! only contribute `send_*_event` methods. Every type also answers the
//! device-level `setSetting`.
//!
//! Capabilities are used through their traits, so bring the ones you need into
//! scope:
//!
//! ```rust
//! use sinric_sdk::devices::Switch;
//! use sinric_sdk::PowerStateCapability;
//!
//! let switch = Switch::new("5dc1564130aa42c6e2b8f4a1");
//! switch.on_power_state(|_device_id, on| {
//!     println!("turned {}", if on { "on" } else { "off" });
//!     true
//! });
//! ```
//!
//! [`DeviceCore`]: sinric_capabilities::DeviceCore

/// Declare a device type from its capability list.
///
/// `requests` entries are dispatched in the listed order, so when two
/// capabilities share an action the first one wins.
macro_rules! define_device {
    (
        $(#[$meta:meta])*
        $name:ident => $product_type:literal {
            requests: [$($req_field:ident: $req_ty:ty => $req_trait:ident::$req_accessor:ident),* $(,)?],
            events: [$($ev_field:ident: $ev_ty:ty => $ev_trait:ident::$ev_accessor:ident),* $(,)?] $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug)]
        pub struct $name {
            core: ::sinric_capabilities::DeviceCore,
            setting: ::sinric_capabilities::controllers::SettingController,
            $($req_field: $req_ty,)*
            $($ev_field: $ev_ty,)*
        }

        impl $name {
            pub const PRODUCT_TYPE: &'static str = $product_type;

            pub fn new(device_id: impl Into<String>) -> Self {
                Self {
                    core: ::sinric_capabilities::DeviceCore::new(device_id, Self::PRODUCT_TYPE),
                    setting: Default::default(),
                    $($req_field: <$req_ty>::default(),)*
                    $($ev_field: <$ev_ty>::default(),)*
                }
            }
        }

        impl ::sinric_capabilities::Device for $name {
            fn core(&self) -> &::sinric_capabilities::DeviceCore {
                &self.core
            }

            fn supported_actions(&self) -> Vec<::sinric_protocol::Action> {
                let mut actions = Vec::new();
                $(actions.extend_from_slice(
                    <$req_ty as ::sinric_capabilities::Capability>::ACTIONS,
                );)*
                actions.extend_from_slice(
                    <::sinric_capabilities::controllers::SettingController
                        as ::sinric_capabilities::Capability>::ACTIONS,
                );
                actions
            }

            fn handle_request(&self, request: &mut ::sinric_protocol::Request) -> bool {
                let Some(action) = request.action() else {
                    return request.missing_callback();
                };
                let device_id = self.core.id();
                $(
                    if <$req_ty as ::sinric_capabilities::Capability>::ACTIONS.contains(&action) {
                        return ::sinric_capabilities::dispatch(&self.$req_field, device_id, request);
                    }
                )*
                if <::sinric_capabilities::controllers::SettingController
                    as ::sinric_capabilities::Capability>::ACTIONS.contains(&action)
                {
                    return ::sinric_capabilities::dispatch(&self.setting, device_id, request);
                }
                request.missing_callback()
            }
        }

        impl ::sinric_capabilities::controllers::SettingCapability for $name {
            fn setting_controller(&self) -> &::sinric_capabilities::controllers::SettingController {
                &self.setting
            }
        }

        $(
            impl ::sinric_capabilities::controllers::$req_trait for $name {
                fn $req_accessor(&self) -> &$req_ty {
                    &self.$req_field
                }
            }
        )*

        $(
            impl ::sinric_capabilities::controllers::$ev_trait for $name {
                fn $ev_accessor(&self) -> &$ev_ty {
                    &self.$ev_field
                }
            }
        )*
    };
}

mod climate;
mod custom;
mod entertainment;
mod lighting;
mod openings;
mod sensors;

pub use climate::{AcUnit, Fan, Thermostat};
pub use custom::CustomDevice;
pub use entertainment::{Speaker, Tv};
pub use lighting::{DimSwitch, Light, Switch};
pub use openings::{Blinds, DoorbellDevice, GarageDoor, SmartLock};
pub use sensors::{
    AirQualitySensorDevice, ContactSensorDevice, MotionSensorDevice, PowerSensorDevice,
    TemperatureSensorDevice,
};

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;
    use sinric_capabilities::Device;
    use sinric_protocol::{missing_callback_message, Action, JsonMap, Request};

    const ID: &str = "aaaaaaaaaaaaaaaaaaaaaaaa";

    fn catalog() -> Vec<Box<dyn Device>> {
        vec![
            Box::new(Switch::new(ID)),
            Box::new(DimSwitch::new(ID)),
            Box::new(Light::new(ID)),
            Box::new(Blinds::new(ID)),
            Box::new(GarageDoor::new(ID)),
            Box::new(Thermostat::new(ID)),
            Box::new(AcUnit::new(ID)),
            Box::new(Fan::new(ID)),
            Box::new(SmartLock::new(ID)),
            Box::new(Speaker::new(ID)),
            Box::new(Tv::new(ID)),
            Box::new(TemperatureSensorDevice::new(ID)),
            Box::new(MotionSensorDevice::new(ID)),
            Box::new(ContactSensorDevice::new(ID)),
            Box::new(PowerSensorDevice::new(ID)),
            Box::new(AirQualitySensorDevice::new(ID)),
            Box::new(DoorbellDevice::new(ID)),
            Box::new(CustomDevice::new(ID)),
        ]
    }

    #[test]
    fn test_every_supported_action_is_routed() {
        // No callbacks are registered, so every routed action must fail
        for device in catalog() {
            for action in device.supported_actions() {
                let mut request = Request::new(action.as_str(), JsonMap::new());
                let handled = device.handle_request(&mut request);
                assert!(!handled, "{} handled {} without a callback", device.product_type(), action);
                assert!(request.error_message.is_some());
            }
        }
    }

    mod accepting {
        use sinric_capabilities::controllers::*;

        pub fn power(device: &impl PowerStateCapability) {
            device.on_power_state(|_, _| true);
        }

        pub fn power_level(device: &impl PowerLevelCapability) {
            device.on_power_level(|_, _| true);
            device.on_adjust_power_level(|_, _| true);
        }

        pub fn brightness(device: &impl BrightnessCapability) {
            device.on_brightness(|_, _| true);
            device.on_adjust_brightness(|_, _| true);
        }

        pub fn volume(device: &impl VolumeCapability) {
            device.on_volume(|_, _| true);
            device.on_adjust_volume(|_, _| true);
        }

        pub fn percentage(device: &impl PercentageCapability) {
            device.on_percentage(|_, _| true);
            device.on_adjust_percentage(|_, _| true);
        }

        pub fn color(device: &impl ColorCapability) {
            device.on_color(|_, _| true);
        }

        pub fn color_temperature(device: &impl ColorTemperatureCapability) {
            device.on_color_temperature(|_, _| true);
            device.on_increase_color_temperature(|_| Some(3000));
            device.on_decrease_color_temperature(|_| Some(2500));
        }

        pub fn range(device: &impl RangeValueCapability) {
            device.on_range_value(|_, _, _| true);
            device.on_adjust_range_value(|_, _, _| true);
        }

        pub fn thermostat(device: &impl ThermostatCapability) {
            device.on_thermostat_mode(|_, _| true);
            device.on_target_temperature(|_, _| true);
            device.on_adjust_target_temperature(|_, delta| Some(20.0 + delta));
        }

        pub fn mute(device: &impl MuteCapability) {
            device.on_mute(|_, _| true);
        }

        pub fn media(device: &impl MediaCapability) {
            device.on_media_control(|_, _| true);
        }

        pub fn equalizer(device: &impl EqualizerCapability) {
            device.on_set_bands(|_, _| true);
            device.on_adjust_bands(|_, changes| Some(changes.to_vec()));
            device.on_reset_bands(|_, _| true);
        }

        pub fn channel(device: &impl ChannelCapability) {
            device.on_change_channel(|_, name| Some(name.to_string()));
            device.on_skip_channels(|_, _| Some("HBO".to_string()));
        }

        pub fn input(device: &impl InputCapability) {
            device.on_select_input(|_, _| true);
        }

        pub fn lock(device: &impl LockCapability) {
            device.on_lock_state(|_, _| true);
        }

        pub fn mode(device: &impl ModeCapability) {
            device.on_mode(|_, _, _| true);
        }

        pub fn door(device: &impl DoorCapability) {
            device.on_door_state(|_, _, _| true);
        }

        pub fn setting(device: &impl SettingCapability) {
            device.on_setting(|_, _, _| true);
        }
    }

    /// Every catalog device with an accepting callback on each capability.
    fn accepting_catalog() -> Vec<Box<dyn Device>> {
        fn ready<D>(device: D, register: impl FnOnce(&D)) -> Box<dyn Device>
        where
            D: Device + sinric_capabilities::controllers::SettingCapability + 'static,
        {
            accepting::setting(&device);
            register(&device);
            Box::new(device)
        }

        vec![
            ready(Switch::new(ID), accepting::power),
            ready(DimSwitch::new(ID), |d| {
                accepting::power(d);
                accepting::power_level(d);
            }),
            ready(Light::new(ID), |d| {
                accepting::power(d);
                accepting::brightness(d);
                accepting::color(d);
                accepting::color_temperature(d);
            }),
            ready(Blinds::new(ID), |d| {
                accepting::power(d);
                accepting::range(d);
            }),
            ready(GarageDoor::new(ID), accepting::door),
            ready(Thermostat::new(ID), |d| {
                accepting::power(d);
                accepting::thermostat(d);
            }),
            ready(AcUnit::new(ID), |d| {
                accepting::power(d);
                accepting::range(d);
                accepting::thermostat(d);
            }),
            ready(Fan::new(ID), |d| {
                accepting::power(d);
                accepting::range(d);
            }),
            ready(SmartLock::new(ID), accepting::lock),
            ready(Speaker::new(ID), |d| {
                accepting::power(d);
                accepting::volume(d);
                accepting::mute(d);
                accepting::media(d);
                accepting::equalizer(d);
                accepting::mode(d);
                accepting::input(d);
            }),
            ready(Tv::new(ID), |d| {
                accepting::power(d);
                accepting::volume(d);
                accepting::mute(d);
                accepting::media(d);
                accepting::input(d);
                accepting::channel(d);
            }),
            ready(TemperatureSensorDevice::new(ID), accepting::power),
            ready(MotionSensorDevice::new(ID), accepting::power),
            ready(ContactSensorDevice::new(ID), accepting::power),
            ready(PowerSensorDevice::new(ID), accepting::power),
            ready(AirQualitySensorDevice::new(ID), accepting::power),
            ready(DoorbellDevice::new(ID), accepting::power),
            ready(CustomDevice::new(ID), |d| {
                accepting::power(d);
                accepting::power_level(d);
                accepting::brightness(d);
                accepting::color(d);
                accepting::color_temperature(d);
                accepting::range(d);
                accepting::thermostat(d);
                accepting::volume(d);
                accepting::mute(d);
                accepting::media(d);
                accepting::equalizer(d);
                accepting::channel(d);
                accepting::input(d);
                accepting::lock(d);
                accepting::mode(d);
                accepting::percentage(d);
            }),
        ]
    }

    /// A valid request value for `action` and the key its response carries.
    fn sample(action: Action) -> (serde_json::Value, &'static str) {
        match action {
            Action::SetPowerState => (json!({"state": "On"}), "state"),
            Action::SetPowerLevel => (json!({"powerLevel": 50}), "powerLevel"),
            Action::AdjustPowerLevel => (json!({"powerLevelDelta": 5}), "powerLevel"),
            Action::SetBrightness => (json!({"brightness": 50}), "brightness"),
            Action::AdjustBrightness => (json!({"brightnessDelta": -5}), "brightness"),
            Action::SetVolume => (json!({"volume": 30}), "volume"),
            Action::AdjustVolume => (json!({"volume": 5}), "volume"),
            Action::SetPercentage => (json!({"percentage": 40}), "percentage"),
            Action::AdjustPercentage => (json!({"percentage": 5}), "percentage"),
            Action::SetColor => (json!({"color": {"r": 255, "g": 0, "b": 0}}), "color"),
            Action::SetColorTemperature => (json!({"colorTemperature": 2700}), "colorTemperature"),
            Action::IncreaseColorTemperature | Action::DecreaseColorTemperature => {
                (json!({}), "colorTemperature")
            }
            Action::SetRangeValue => (json!({"rangeValue": 3}), "rangeValue"),
            Action::AdjustRangeValue => (json!({"rangeValueDelta": 1}), "rangeValue"),
            Action::SetThermostatMode => (json!({"thermostatMode": "COOL"}), "thermostatMode"),
            Action::TargetTemperature => (json!({"temperature": 21.5}), "temperature"),
            Action::AdjustTargetTemperature => (json!({"temperature": 1.0}), "temperature"),
            Action::SetMute => (json!({"mute": true}), "mute"),
            Action::MediaControl => (json!({"control": "Play"}), "control"),
            Action::SetBands => (json!({"bands": [{"name": "BASS", "value": 2}]}), "bands"),
            Action::AdjustBands => (
                json!({"bands": [{"name": "BASS", "levelDelta": 1, "levelDirection": "UP"}]}),
                "bands",
            ),
            Action::ResetBands => (json!({"bands": [{"name": "BASS"}]}), "bands"),
            Action::ChangeChannel => (json!({"channel": {"name": "HBO"}}), "channel"),
            Action::SkipChannels => (json!({"channelCount": 2}), "channel"),
            Action::SelectInput => (json!({"input": "HDMI1"}), "input"),
            Action::SetLockState => (json!({"state": "lock"}), "state"),
            Action::SetMode => (json!({"mode": "Open"}), "mode"),
            Action::SetSetting => (json!({"id": "led", "value": 1}), "id"),
            other => panic!("no sample request for {other}"),
        }
    }

    #[test]
    fn test_every_supported_action_reaches_its_callback() {
        for device in accepting_catalog() {
            for action in device.supported_actions() {
                let (value, key) = sample(action);
                let mut request = Request::new(action.as_str(), value.as_object().cloned().unwrap());
                let handled = device.handle_request(&mut request);
                assert!(
                    handled,
                    "{} failed {}: {:?}",
                    device.product_type(),
                    action,
                    request.error_message
                );
                assert!(
                    request.response_value.contains_key(key),
                    "{} answered {} with {:?}",
                    device.product_type(),
                    action,
                    request.response_value
                );
            }
        }
    }

    #[test]
    fn test_unsupported_actions_report_missing_callback() {
        for device in catalog() {
            let supported = device.supported_actions();
            for action in Action::ALL.iter().filter(|a| !supported.contains(a)) {
                let mut request = Request::new(action.as_str(), JsonMap::new());
                assert!(!device.handle_request(&mut request));
                assert_eq!(
                    request.error_message.as_deref(),
                    Some(missing_callback_message(action.as_str()).as_str()),
                    "{} routed {}",
                    device.product_type(),
                    action
                );
            }
        }
    }

    #[test]
    fn test_unknown_action_string() {
        let switch = Switch::new(ID);
        let mut request = Request::new("setWarpDrive", JsonMap::new());
        assert!(!switch.handle_request(&mut request));
        assert_eq!(
            request.error_message.as_deref(),
            Some("Missing callback function: setWarpDrive")
        );
    }

    #[test]
    fn test_every_device_supports_settings() {
        for device in catalog() {
            assert!(device.supported_actions().contains(&Action::SetSetting));
        }
    }

    #[rstest]
    #[case(Box::new(Switch::new(ID)) as Box<dyn Device>, "SWITCH")]
    #[case(Box::new(DimSwitch::new(ID)) as Box<dyn Device>, "DIMMABLE_SWITCH")]
    #[case(Box::new(Light::new(ID)) as Box<dyn Device>, "LIGHT")]
    #[case(Box::new(GarageDoor::new(ID)) as Box<dyn Device>, "GARAGE_DOOR")]
    #[case(Box::new(AcUnit::new(ID)) as Box<dyn Device>, "AC_UNIT")]
    #[case(Box::new(SmartLock::new(ID)) as Box<dyn Device>, "SMARTLOCK")]
    #[case(Box::new(TemperatureSensorDevice::new(ID)) as Box<dyn Device>, "TEMPERATURESENSOR")]
    #[case(Box::new(CustomDevice::new(ID)) as Box<dyn Device>, "CUSTOM")]
    fn test_product_types(#[case] device: Box<dyn Device>, #[case] expected: &str) {
        assert_eq!(device.product_type(), expected);
        assert_eq!(device.device_id(), ID);
    }

    #[test]
    fn test_setting_request() {
        use sinric_capabilities::controllers::SettingCapability;

        let blinds = Blinds::new(ID);
        blinds.on_setting(|_, id, value| id == "tilt" && value == &json!(30));

        let value = json!({"id": "tilt", "value": 30});
        let mut request = Request::new("setSetting", value.as_object().cloned().unwrap());
        assert!(blinds.handle_request(&mut request));
        assert_eq!(request.response_value["value"], json!(30));
    }
}
