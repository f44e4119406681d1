//! Event-only capabilities: sensors, the doorbell and push notifications.

use parking_lot::Mutex;
use serde_json::json;
use sinric_protocol::clock::now_millis;
use sinric_protocol::{Action, Cause};

use crate::device::{Device, DeviceCore};
use crate::limiter::EventLimiter;
use crate::values::map;

// ============================================================================
// Temperature
// ============================================================================

/// `currentTemperature` readings.
#[derive(Debug)]
pub struct TemperatureSensor {
    limiter: EventLimiter,
}

impl Default for TemperatureSensor {
    fn default() -> Self {
        Self {
            limiter: EventLimiter::for_sensor(),
        }
    }
}

impl TemperatureSensor {
    /// Report a reading; humidity is sent as `-1` when the sensor has none.
    pub fn send_event(&self, core: &DeviceCore, celsius: f64, humidity: Option<f64>, cause: Cause) -> bool {
        let value = map([
            ("humidity", json!(humidity.unwrap_or(-1.0))),
            ("temperature", json!(celsius)),
        ]);
        core.send_limited_event(&self.limiter, Action::CurrentTemperature, value, cause, "")
    }
}

pub trait TemperatureSensorCapability: Device {
    fn temperature_sensor(&self) -> &TemperatureSensor;

    fn send_temperature_event(&self, celsius: f64, humidity: Option<f64>, cause: Cause) -> bool {
        self.temperature_sensor()
            .send_event(self.core(), celsius, humidity, cause)
    }
}

// ============================================================================
// Air quality
// ============================================================================

/// `airQuality` readings in µg/m³.
#[derive(Debug)]
pub struct AirQualitySensor {
    limiter: EventLimiter,
}

impl Default for AirQualitySensor {
    fn default() -> Self {
        Self {
            limiter: EventLimiter::for_sensor(),
        }
    }
}

impl AirQualitySensor {
    pub fn send_event(&self, core: &DeviceCore, pm1: u32, pm2_5: u32, pm10: u32, cause: Cause) -> bool {
        let value = map([
            ("pm1", json!(pm1)),
            ("pm2_5", json!(pm2_5)),
            ("pm10", json!(pm10)),
        ]);
        core.send_limited_event(&self.limiter, Action::AirQuality, value, cause, "")
    }
}

pub trait AirQualitySensorCapability: Device {
    fn air_quality_sensor(&self) -> &AirQualitySensor;

    fn send_air_quality_event(&self, pm1: u32, pm2_5: u32, pm10: u32, cause: Cause) -> bool {
        self.air_quality_sensor()
            .send_event(self.core(), pm1, pm2_5, pm10, cause)
    }
}

// ============================================================================
// Power usage
// ============================================================================

/// One electrical measurement. Unknown optional values are sent as `-1`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PowerReading {
    pub voltage: f64,
    pub current: f64,
    /// Defaults to `voltage * current`
    pub power: Option<f64>,
    pub apparent_power: Option<f64>,
    pub reactive_power: Option<f64>,
    /// Defaults to `power / apparent_power` when apparent power is known
    pub factor: Option<f64>,
}

impl PowerReading {
    pub fn new(voltage: f64, current: f64) -> Self {
        Self {
            voltage,
            current,
            ..Default::default()
        }
    }
}

#[derive(Debug, Default)]
struct EnergyWindow {
    /// Unix seconds of the last delivered reading
    start_time: Option<i64>,
    last_power: f64,
}

/// `powerUsage` readings with energy integrated between events.
#[derive(Debug)]
pub struct PowerSensor {
    window: Mutex<EnergyWindow>,
    limiter: EventLimiter,
}

impl Default for PowerSensor {
    fn default() -> Self {
        Self {
            window: Mutex::new(EnergyWindow::default()),
            limiter: EventLimiter::for_sensor(),
        }
    }
}

impl PowerSensor {
    pub fn send_event(&self, core: &DeviceCore, reading: PowerReading, cause: Cause) -> bool {
        self.send_event_at(core, reading, now_millis() / 1000, cause)
    }

    /// Report a reading taken at `now` (unix seconds).
    ///
    /// Watt-hours cover the time since the last delivered reading at that
    /// reading's power. The window only moves forward when this event is
    /// accepted, so a limited send does not lose energy.
    pub fn send_event_at(&self, core: &DeviceCore, reading: PowerReading, now: i64, cause: Cause) -> bool {
        let power = reading.power.unwrap_or(reading.voltage * reading.current);
        let apparent_power = reading.apparent_power.unwrap_or(-1.0);
        let factor = reading.factor.unwrap_or(if apparent_power > 0.0 {
            power / apparent_power
        } else {
            -1.0
        });

        let (start_time, watt_hours) = {
            let window = self.window.lock();
            let start_time = window.start_time.unwrap_or(now);
            let elapsed = (now - start_time).max(0) as f64;
            (start_time, window.last_power * elapsed / 3600.0)
        };

        let value = map([
            ("startTime", json!(start_time)),
            ("voltage", json!(reading.voltage)),
            ("current", json!(reading.current)),
            ("power", json!(power)),
            ("apparentPower", json!(apparent_power)),
            ("reactivePower", json!(reading.reactive_power.unwrap_or(-1.0))),
            ("factor", json!(factor)),
            ("wattHours", json!(watt_hours)),
        ]);

        let sent = core.send_limited_event(&self.limiter, Action::PowerUsage, value, cause, "");
        if sent {
            let mut window = self.window.lock();
            window.start_time = Some(now);
            window.last_power = power;
        }
        sent
    }
}

pub trait PowerSensorCapability: Device {
    fn power_sensor(&self) -> &PowerSensor;

    fn send_power_sensor_event(&self, reading: PowerReading, cause: Cause) -> bool {
        self.power_sensor().send_event(self.core(), reading, cause)
    }
}

// ============================================================================
// Motion, contact, doorbell
// ============================================================================

#[derive(Debug)]
pub struct MotionSensor {
    limiter: EventLimiter,
}

impl Default for MotionSensor {
    fn default() -> Self {
        Self {
            limiter: EventLimiter::for_sensor(),
        }
    }
}

impl MotionSensor {
    pub fn send_event(&self, core: &DeviceCore, detected: bool, cause: Cause) -> bool {
        let state = if detected { "detected" } else { "notDetected" };
        core.send_limited_event(&self.limiter, Action::Motion, map([("state", json!(state))]), cause, "")
    }
}

pub trait MotionSensorCapability: Device {
    fn motion_sensor(&self) -> &MotionSensor;

    fn send_motion_event(&self, detected: bool, cause: Cause) -> bool {
        self.motion_sensor().send_event(self.core(), detected, cause)
    }
}

#[derive(Debug)]
pub struct ContactSensor {
    limiter: EventLimiter,
}

impl Default for ContactSensor {
    fn default() -> Self {
        Self {
            limiter: EventLimiter::for_state(),
        }
    }
}

impl ContactSensor {
    pub fn send_event(&self, core: &DeviceCore, open: bool, cause: Cause) -> bool {
        let state = if open { "open" } else { "closed" };
        let value = map([("state", json!(state))]);
        core.send_limited_event(&self.limiter, Action::SetContactState, value, cause, "")
    }
}

pub trait ContactSensorCapability: Device {
    fn contact_sensor(&self) -> &ContactSensor;

    fn send_contact_event(&self, open: bool, cause: Cause) -> bool {
        self.contact_sensor().send_event(self.core(), open, cause)
    }
}

#[derive(Debug)]
pub struct Doorbell {
    limiter: EventLimiter,
}

impl Default for Doorbell {
    fn default() -> Self {
        Self {
            limiter: EventLimiter::for_state(),
        }
    }
}

impl Doorbell {
    pub fn send_event(&self, core: &DeviceCore, cause: Cause) -> bool {
        let value = map([("state", json!("pressed"))]);
        core.send_limited_event(&self.limiter, Action::DoorbellPress, value, cause, "")
    }
}

pub trait DoorbellCapability: Device {
    fn doorbell(&self) -> &Doorbell;

    fn send_doorbell_event(&self, cause: Cause) -> bool {
        self.doorbell().send_event(self.core(), cause)
    }
}

// ============================================================================
// Push notifications
// ============================================================================

/// Free-text alerts shown in the Sinric Pro app, always with cause `ALERT`.
#[derive(Debug)]
pub struct PushNotification {
    limiter: EventLimiter,
}

impl Default for PushNotification {
    fn default() -> Self {
        Self {
            limiter: EventLimiter::for_sensor(),
        }
    }
}

impl PushNotification {
    pub fn send(&self, core: &DeviceCore, alert: &str) -> bool {
        let value = map([("alert", json!(alert))]);
        core.send_limited_event(&self.limiter, Action::PushNotification, value, Cause::Alert, "")
    }
}

pub trait PushNotificationCapability: Device {
    fn push_notifier(&self) -> &PushNotification;

    fn send_push_notification(&self, alert: &str) -> bool {
        self.push_notifier().send(self.core(), alert)
    }
}
