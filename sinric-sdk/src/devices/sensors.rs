//! Sensor devices. Their only request is `setPowerState`, used to enable or
//! disable reporting.

use sinric_capabilities::controllers::{
    AirQualitySensor, ContactSensor, MotionSensor, PowerSensor, PowerStateController,
    TemperatureSensor,
};

define_device! {
    TemperatureSensorDevice => "TEMPERATURESENSOR" {
        requests: [power_state: PowerStateController => PowerStateCapability::power_state_controller],
        events: [temperature: TemperatureSensor => TemperatureSensorCapability::temperature_sensor],
    }
}

define_device! {
    MotionSensorDevice => "MOTION_SENSOR" {
        requests: [power_state: PowerStateController => PowerStateCapability::power_state_controller],
        events: [motion: MotionSensor => MotionSensorCapability::motion_sensor],
    }
}

define_device! {
    ContactSensorDevice => "CONTACT_SENSOR" {
        requests: [power_state: PowerStateController => PowerStateCapability::power_state_controller],
        events: [contact: ContactSensor => ContactSensorCapability::contact_sensor],
    }
}

define_device! {
    PowerSensorDevice => "POWER_SENSOR" {
        requests: [power_state: PowerStateController => PowerStateCapability::power_state_controller],
        events: [power: PowerSensor => PowerSensorCapability::power_sensor],
    }
}

define_device! {
    AirQualitySensorDevice => "AIR_QUALITY_SENSOR" {
        requests: [power_state: PowerStateController => PowerStateCapability::power_state_controller],
        events: [air_quality: AirQualitySensor => AirQualitySensorCapability::air_quality_sensor],
    }
}
