//! TV channels.

use std::sync::Arc;

use serde_json::{json, Value};
use sinric_protocol::{Action, Cause, JsonMap, Request};

use super::unsupported;
use crate::callback::CallbackSlot;
use crate::device::{Capability, Device, DeviceCore};
use crate::error::{HandlerError, HandlerResult, ValidationError};
use crate::limiter::EventLimiter;
use crate::values::{int, map, object};

/// `(device_id, channel) -> tuned channel name`, `None` to refuse
pub type ChangeChannelCallback = dyn Fn(&str, &str) -> Option<String> + Send + Sync;

/// `(device_id, count) -> tuned channel name`, `None` to refuse
pub type SkipChannelsCallback = dyn Fn(&str, i64) -> Option<String> + Send + Sync;

#[derive(Debug)]
pub struct ChannelController {
    on_change_channel: CallbackSlot<ChangeChannelCallback>,
    on_skip_channels: CallbackSlot<SkipChannelsCallback>,
    limiter: EventLimiter,
}

impl Default for ChannelController {
    fn default() -> Self {
        Self {
            on_change_channel: CallbackSlot::default(),
            on_skip_channels: CallbackSlot::default(),
            limiter: EventLimiter::for_state(),
        }
    }
}

fn channel_value(name: &str) -> JsonMap {
    map([("channel", json!({"name": name}))])
}

/// The channel's name, or its number when no name is given.
fn requested_channel(value: &JsonMap) -> Result<String, ValidationError> {
    let channel = object(value, "channel")?;
    match (channel.get("name"), channel.get("number")) {
        (Some(Value::String(name)), _) if !name.is_empty() => Ok(name.clone()),
        (_, Some(Value::String(number))) => Ok(number.clone()),
        (_, Some(Value::Number(number))) => Ok(number.to_string()),
        _ => Err(ValidationError::missing("channel.name")),
    }
}

impl ChannelController {
    pub fn set_change_callback(&self, callback: Arc<ChangeChannelCallback>) {
        self.on_change_channel.set(callback);
    }

    pub fn set_skip_callback(&self, callback: Arc<SkipChannelsCallback>) {
        self.on_skip_channels.set(callback);
    }

    pub fn send_event(&self, core: &DeviceCore, name: &str, cause: Cause) -> bool {
        core.send_limited_event(&self.limiter, Action::ChangeChannel, channel_value(name), cause, "")
    }
}

impl Capability for ChannelController {
    const ACTIONS: &'static [Action] = &[Action::ChangeChannel, Action::SkipChannels];

    fn handle(&self, device_id: &str, request: &Request) -> HandlerResult<JsonMap> {
        let tuned = match request.action() {
            Some(Action::ChangeChannel) => {
                let channel = requested_channel(&request.request_value)?;
                self.on_change_channel
                    .invoke(Action::ChangeChannel, device_id, |cb| cb(device_id, &channel))?
                    .ok_or_else(|| HandlerError::rejected(Action::ChangeChannel))?
            }
            Some(Action::SkipChannels) => {
                let count = int(&request.request_value, "channelCount")?;
                self.on_skip_channels
                    .invoke(Action::SkipChannels, device_id, |cb| cb(device_id, count))?
                    .ok_or_else(|| HandlerError::rejected(Action::SkipChannels))?
            }
            _ => return Err(unsupported(&request.action)),
        };
        Ok(channel_value(&tuned))
    }
}

pub trait ChannelCapability: Device {
    fn channel_controller(&self) -> &ChannelController;

    /// The callback returns the name of the channel actually tuned.
    fn on_change_channel<F>(&self, callback: F)
    where
        F: Fn(&str, &str) -> Option<String> + Send + Sync + 'static,
    {
        self.channel_controller().set_change_callback(Arc::new(callback));
    }

    /// The callback returns the name of the channel actually tuned.
    fn on_skip_channels<F>(&self, callback: F)
    where
        F: Fn(&str, i64) -> Option<String> + Send + Sync + 'static,
    {
        self.channel_controller().set_skip_callback(Arc::new(callback));
    }

    fn send_change_channel_event(&self, name: &str, cause: Cause) -> bool {
        self.channel_controller().send_event(self.core(), name, cause)
    }
}
