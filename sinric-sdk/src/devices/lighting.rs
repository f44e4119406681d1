//! Switches and lights.

use sinric_capabilities::controllers::{
    BrightnessController, ColorController, ColorTemperatureController, PowerLevelController,
    PowerStateController,
};

define_device! {
    /// An on/off switch or plug.
    Switch => "SWITCH" {
        requests: [power_state: PowerStateController => PowerStateCapability::power_state_controller],
        events: [],
    }
}

define_device! {
    /// A switch with a dimmer.
    DimSwitch => "DIMMABLE_SWITCH" {
        requests: [
            power_state: PowerStateController => PowerStateCapability::power_state_controller,
            power_level: PowerLevelController => PowerLevelCapability::power_level_controller,
        ],
        events: [],
    }
}

define_device! {
    /// A color bulb or strip.
    Light => "LIGHT" {
        requests: [
            power_state: PowerStateController => PowerStateCapability::power_state_controller,
            brightness: BrightnessController => BrightnessCapability::brightness_controller,
            color: ColorController => ColorCapability::color_controller,
            color_temperature: ColorTemperatureController
                => ColorTemperatureCapability::color_temperature_controller,
        ],
        events: [],
    }
}
