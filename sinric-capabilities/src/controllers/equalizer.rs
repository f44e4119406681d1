//! Equalizer bands (bass, midrange, treble, ...).

use std::sync::Arc;

use serde_json::{json, Value};
use sinric_protocol::{Action, Cause, JsonMap, Request};

use super::{ensure_accepted, unsupported};
use crate::callback::CallbackSlot;
use crate::device::{Capability, Device, DeviceCore};
use crate::error::{HandlerError, HandlerResult, ValidationError};
use crate::limiter::EventLimiter;
use crate::values::{array, int, map, text};

/// One band and its level; for adjustments `level` is the signed change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Band {
    pub name: String,
    pub level: i64,
}

impl Band {
    pub fn new(name: impl Into<String>, level: i64) -> Self {
        Self {
            name: name.into(),
            level,
        }
    }
}

/// `(device_id, bands) -> accepted`
pub type BandsCallback = dyn Fn(&str, &[Band]) -> bool + Send + Sync;

/// `(device_id, changes) -> resulting levels`, `None` to refuse
pub type AdjustBandsCallback = dyn Fn(&str, &[Band]) -> Option<Vec<Band>> + Send + Sync;

/// `(device_id, band names) -> accepted`
pub type ResetBandsCallback = dyn Fn(&str, &[String]) -> bool + Send + Sync;

#[derive(Debug)]
pub struct EqualizerController {
    on_set_bands: CallbackSlot<BandsCallback>,
    on_adjust_bands: CallbackSlot<AdjustBandsCallback>,
    on_reset_bands: CallbackSlot<ResetBandsCallback>,
    limiter: EventLimiter,
}

impl Default for EqualizerController {
    fn default() -> Self {
        Self {
            on_set_bands: CallbackSlot::default(),
            on_adjust_bands: CallbackSlot::default(),
            on_reset_bands: CallbackSlot::default(),
            limiter: EventLimiter::for_state(),
        }
    }
}

fn band_entries(value: &JsonMap) -> Result<Vec<&JsonMap>, ValidationError> {
    array(value, "bands")?
        .iter()
        .map(|band| {
            band.as_object()
                .ok_or_else(|| ValidationError::invalid_value("bands", band, "expected an object"))
        })
        .collect()
}

fn bands_value(bands: &[Band]) -> JsonMap {
    let bands: Vec<Value> = bands
        .iter()
        .map(|band| json!({"name": band.name, "value": band.level}))
        .collect();
    map([("bands", Value::Array(bands))])
}

fn parse_levels(value: &JsonMap) -> Result<Vec<Band>, ValidationError> {
    band_entries(value)?
        .into_iter()
        .map(|band| -> Result<Band, ValidationError> {
            Ok(Band::new(text(band, "name")?, int(band, "value")?))
        })
        .collect()
}

/// `levelDirection` of `DOWN` makes `levelDelta` negative.
fn parse_changes(value: &JsonMap) -> Result<Vec<Band>, ValidationError> {
    band_entries(value)?
        .into_iter()
        .map(|band| -> Result<Band, ValidationError> {
            let delta = int(band, "levelDelta")?.saturating_abs();
            let delta = match band.get("levelDirection").and_then(Value::as_str) {
                Some(direction) if direction.eq_ignore_ascii_case("down") => -delta,
                _ => delta,
            };
            Ok(Band::new(text(band, "name")?, delta))
        })
        .collect()
}

impl EqualizerController {
    pub fn set_bands_callback(&self, callback: Arc<BandsCallback>) {
        self.on_set_bands.set(callback);
    }

    pub fn set_adjust_bands_callback(&self, callback: Arc<AdjustBandsCallback>) {
        self.on_adjust_bands.set(callback);
    }

    pub fn set_reset_bands_callback(&self, callback: Arc<ResetBandsCallback>) {
        self.on_reset_bands.set(callback);
    }

    pub fn send_event(&self, core: &DeviceCore, bands: &[Band], cause: Cause) -> bool {
        core.send_limited_event(&self.limiter, Action::SetBands, bands_value(bands), cause, "")
    }
}

impl Capability for EqualizerController {
    const ACTIONS: &'static [Action] = &[Action::SetBands, Action::AdjustBands, Action::ResetBands];

    fn handle(&self, device_id: &str, request: &Request) -> HandlerResult<JsonMap> {
        let value = &request.request_value;
        match request.action() {
            Some(Action::SetBands) => {
                let bands = parse_levels(value)?;
                let accepted = self
                    .on_set_bands
                    .invoke(Action::SetBands, device_id, |cb| cb(device_id, &bands))?;
                ensure_accepted(Action::SetBands, accepted)?;
                Ok(bands_value(&bands))
            }
            Some(Action::AdjustBands) => {
                let changes = parse_changes(value)?;
                let bands = self
                    .on_adjust_bands
                    .invoke(Action::AdjustBands, device_id, |cb| cb(device_id, &changes))?
                    .ok_or_else(|| HandlerError::rejected(Action::AdjustBands))?;
                Ok(bands_value(&bands))
            }
            Some(Action::ResetBands) => {
                let names = band_entries(value)?
                    .into_iter()
                    .map(|band| text(band, "name").map(str::to_string))
                    .collect::<Result<Vec<_>, _>>()?;
                let accepted = self
                    .on_reset_bands
                    .invoke(Action::ResetBands, device_id, |cb| cb(device_id, &names))?;
                ensure_accepted(Action::ResetBands, accepted)?;
                let reset: Vec<Band> = names.into_iter().map(|name| Band::new(name, 0)).collect();
                Ok(bands_value(&reset))
            }
            _ => Err(unsupported(&request.action)),
        }
    }
}

pub trait EqualizerCapability: Device {
    fn equalizer_controller(&self) -> &EqualizerController;

    fn on_set_bands<F>(&self, callback: F)
    where
        F: Fn(&str, &[Band]) -> bool + Send + Sync + 'static,
    {
        self.equalizer_controller().set_bands_callback(Arc::new(callback));
    }

    /// The callback receives signed changes and returns the resulting levels.
    fn on_adjust_bands<F>(&self, callback: F)
    where
        F: Fn(&str, &[Band]) -> Option<Vec<Band>> + Send + Sync + 'static,
    {
        self.equalizer_controller()
            .set_adjust_bands_callback(Arc::new(callback));
    }

    fn on_reset_bands<F>(&self, callback: F)
    where
        F: Fn(&str, &[String]) -> bool + Send + Sync + 'static,
    {
        self.equalizer_controller()
            .set_reset_bands_callback(Arc::new(callback));
    }

    fn send_bands_event(&self, bands: &[Band], cause: Cause) -> bool {
        self.equalizer_controller().send_event(self.core(), bands, cause)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::request;
    use rstest::rstest;

    #[test]
    fn test_set_bands() {
        let controller = EqualizerController::default();
        controller.set_bands_callback(Arc::new(|_, bands| bands.len() == 2));

        let value = controller
            .handle(
                "dev",
                &request(
                    Action::SetBands,
                    json!({"bands": [{"name": "BASS", "value": 2}, {"name": "TREBLE", "value": -1}]}),
                ),
            )
            .unwrap();
        assert_eq!(value["bands"][1], json!({"name": "TREBLE", "value": -1}));
    }

    #[test]
    fn test_adjust_bands_direction() {
        let controller = EqualizerController::default();
        controller.set_adjust_bands_callback(Arc::new(|_, changes| {
            Some(changes.iter().map(|c| Band::new(c.name.clone(), 5 + c.level)).collect())
        }));

        let value = controller
            .handle(
                "dev",
                &request(
                    Action::AdjustBands,
                    json!({"bands": [{"name": "BASS", "levelDelta": 3, "levelDirection": "DOWN"}]}),
                ),
            )
            .unwrap();
        assert_eq!(value["bands"][0], json!({"name": "BASS", "value": 2}));
    }

    #[rstest]
    #[case("UP", i64::MAX)]
    #[case("DOWN", -i64::MAX)]
    fn test_adjust_bands_huge_delta_saturates(#[case] direction: &str, #[case] expected: i64) {
        let controller = EqualizerController::default();
        controller.set_adjust_bands_callback(Arc::new(|_, changes| Some(changes.to_vec())));

        let value = controller
            .handle(
                "dev",
                &request(
                    Action::AdjustBands,
                    json!({"bands": [{"name": "BASS", "levelDelta": -1e300, "levelDirection": direction}]}),
                ),
            )
            .unwrap();
        assert_eq!(value["bands"][0], json!({"name": "BASS", "value": expected}));
    }

    #[test]
    fn test_reset_bands() {
        let controller = EqualizerController::default();
        controller.set_reset_bands_callback(Arc::new(|_, names| names == ["MIDRANGE"]));

        let value = controller
            .handle(
                "dev",
                &request(Action::ResetBands, json!({"bands": [{"name": "MIDRANGE"}]})),
            )
            .unwrap();
        assert_eq!(value["bands"][0], json!({"name": "MIDRANGE", "value": 0}));
    }
}
