//! Heating, cooling and air movement.

use sinric_capabilities::controllers::{
    PowerStateController, RangeValueController, TemperatureSensor, ThermostatController,
};

define_device! {
    /// A thermostat with its own temperature reading.
    Thermostat => "THERMOSTAT" {
        requests: [
            power_state: PowerStateController => PowerStateCapability::power_state_controller,
            thermostat: ThermostatController => ThermostatCapability::thermostat_controller,
        ],
        events: [
            temperature: TemperatureSensor => TemperatureSensorCapability::temperature_sensor,
        ],
    }
}

define_device! {
    /// An air conditioner; the range value is the fan speed.
    AcUnit => "AC_UNIT" {
        requests: [
            power_state: PowerStateController => PowerStateCapability::power_state_controller,
            range_value: RangeValueController => RangeValueCapability::range_value_controller,
            thermostat: ThermostatController => ThermostatCapability::thermostat_controller,
        ],
        events: [
            temperature: TemperatureSensor => TemperatureSensorCapability::temperature_sensor,
        ],
    }
}

define_device! {
    /// A fan; the range value is the speed setting.
    Fan => "FAN" {
        requests: [
            power_state: PowerStateController => PowerStateCapability::power_state_controller,
            range_value: RangeValueController => RangeValueCapability::range_value_controller,
        ],
        events: [],
    }
}
