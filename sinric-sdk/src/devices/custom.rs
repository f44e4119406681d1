//! The catch-all product type.

use sinric_capabilities::controllers::{
    AirQualitySensor, BrightnessController, ChannelController, ColorController,
    ColorTemperatureController, ContactSensor, Doorbell, EqualizerController, InputController,
    LockController, MediaController, ModeController, MotionSensor, MuteController,
    PercentageController, PowerLevelController, PowerSensor, PowerStateController,
    PushNotification, RangeValueController, TemperatureSensor, ThermostatController,
    VolumeController,
};

define_device! {
    /// A device built in the portal from any combination of capabilities.
    ///
    /// Carries every request capability except the garage door, whose
    /// `setMode` would collide with [`ModeCapability`], and every event
    /// capability.
    ///
    /// [`ModeCapability`]: sinric_capabilities::controllers::ModeCapability
    CustomDevice => "CUSTOM" {
        requests: [
            power_state: PowerStateController => PowerStateCapability::power_state_controller,
            power_level: PowerLevelController => PowerLevelCapability::power_level_controller,
            brightness: BrightnessController => BrightnessCapability::brightness_controller,
            color: ColorController => ColorCapability::color_controller,
            color_temperature: ColorTemperatureController
                => ColorTemperatureCapability::color_temperature_controller,
            range_value: RangeValueController => RangeValueCapability::range_value_controller,
            thermostat: ThermostatController => ThermostatCapability::thermostat_controller,
            volume: VolumeController => VolumeCapability::volume_controller,
            mute: MuteController => MuteCapability::mute_controller,
            media: MediaController => MediaCapability::media_controller,
            equalizer: EqualizerController => EqualizerCapability::equalizer_controller,
            channel: ChannelController => ChannelCapability::channel_controller,
            input: InputController => InputCapability::input_controller,
            lock: LockController => LockCapability::lock_controller,
            mode: ModeController => ModeCapability::mode_controller,
            percentage: PercentageController => PercentageCapability::percentage_controller,
        ],
        events: [
            temperature: TemperatureSensor => TemperatureSensorCapability::temperature_sensor,
            air_quality: AirQualitySensor => AirQualitySensorCapability::air_quality_sensor,
            power: PowerSensor => PowerSensorCapability::power_sensor,
            motion: MotionSensor => MotionSensorCapability::motion_sensor,
            contact: ContactSensor => ContactSensorCapability::contact_sensor,
            doorbell: Doorbell => DoorbellCapability::doorbell,
            push: PushNotification => PushNotificationCapability::push_notifier,
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sinric_capabilities::controllers::ModeCapability;
    use sinric_capabilities::Device;
    use sinric_protocol::{Action, Request};

    #[test]
    fn test_custom_routes_set_mode_to_mode_controller() {
        let device = CustomDevice::new("5dc1564130aa42c6e2b8f4a1");
        device.on_mode(|_, instance, mode| instance == "wash" && mode == "Eco");

        let value = json!({"mode": "Eco"});
        let mut request =
            Request::new("setMode", value.as_object().cloned().unwrap()).with_instance("wash");
        assert!(device.handle_request(&mut request));
        assert_eq!(request.response_value["mode"], json!("Eco"));
    }

    #[test]
    fn test_custom_supports_every_request_action_but_nothing_twice() {
        let actions = CustomDevice::new("5dc1564130aa42c6e2b8f4a1").supported_actions();
        assert!(actions.contains(&Action::SetBands));
        assert!(actions.contains(&Action::AdjustPercentage));
        assert!(actions.contains(&Action::SetSetting));

        let mut unique = actions.clone();
        unique.sort_by_key(|action| action.as_str());
        unique.dedup();
        assert_eq!(unique.len(), actions.len());
    }
}
