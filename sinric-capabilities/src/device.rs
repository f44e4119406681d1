//! Device identity, event sending and request dispatch.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use sinric_protocol::{Action, Cause, Event, JsonMap, Request};

use crate::error::HandlerResult;
use crate::limiter::EventLimiter;

/// Receives events raised by devices, typically the SDK's signing outbox.
pub trait EventSink: Send + Sync {
    /// Queue an event for delivery. Returns `false` if it was not accepted.
    fn send_event(&self, event: Event) -> bool;
}

/// A capability that answers one or more request actions.
pub trait Capability: Send + Sync {
    /// Actions this capability handles.
    const ACTIONS: &'static [Action];

    /// Handle a request, returning the response `value` on success.
    fn handle(&self, device_id: &str, request: &Request) -> HandlerResult<JsonMap>;
}

/// Run `capability` for `request` and record the outcome on it.
pub fn dispatch<C: Capability>(capability: &C, device_id: &str, request: &mut Request) -> bool {
    match capability.handle(device_id, request) {
        Ok(value) => {
            request.response_value = value;
            request.error_message = None;
            true
        }
        Err(e) => {
            tracing::error!("{} for device {} failed: {}", request.action, device_id, e);
            request.response_value.clear();
            request.error_message = Some(e.to_string());
            false
        }
    }
}

/// Identity and event plumbing shared by every device type.
pub struct DeviceCore {
    id: String,
    product_type: &'static str,
    sink: RwLock<Option<Arc<dyn EventSink>>>,
}

impl fmt::Debug for DeviceCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceCore")
            .field("id", &self.id)
            .field("product_type", &self.product_type)
            .field("attached", &self.is_attached())
            .finish()
    }
}

impl DeviceCore {
    pub fn new(id: impl Into<String>, product_type: &'static str) -> Self {
        Self {
            id: id.into(),
            product_type,
            sink: RwLock::new(None),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn product_type(&self) -> &'static str {
        self.product_type
    }

    /// Connect the device to the sink its events go to.
    pub fn attach(&self, sink: Arc<dyn EventSink>) {
        *self.sink.write() = Some(sink);
    }

    pub fn detach(&self) {
        self.sink.write().take();
    }

    pub fn is_attached(&self) -> bool {
        self.sink.read().is_some()
    }

    /// Hand an event to the sink. Returns `false` if the device was never added.
    pub fn send_event(&self, action: Action, value: JsonMap, cause: Cause, instance_id: &str) -> bool {
        let Some(sink) = self.sink.read().clone() else {
            tracing::warn!(
                "Device {} has not been added to SinricPro, dropping {} event",
                self.id,
                action
            );
            return false;
        };
        sink.send_event(Event::new(action, self.id.clone(), value, cause).with_instance(instance_id))
    }

    /// Like [`send_event`](Self::send_event), but gated by `limiter`.
    ///
    /// The gate is only used up by an event the sink accepted.
    pub fn send_limited_event(
        &self,
        limiter: &EventLimiter,
        action: Action,
        value: JsonMap,
        cause: Cause,
        instance_id: &str,
    ) -> bool {
        if !self.is_attached() {
            return self.send_event(action, value, cause, instance_id);
        }
        let Some(opening) = limiter.acquire() else {
            tracing::warn!("{} event for device {} is rate limited", action, self.id);
            return false;
        };
        let sent = self.send_event(action, value, cause, instance_id);
        if !sent {
            limiter.give_back(opening);
        }
        sent
    }
}

/// A device that can be registered with SinricPro.
pub trait Device: Send + Sync {
    fn core(&self) -> &DeviceCore;

    /// Every request action this device type routes.
    fn supported_actions(&self) -> Vec<Action>;

    /// Route `request` to the capability owning its action.
    ///
    /// Unknown or unsupported actions set the missing callback error and
    /// return `false`.
    fn handle_request(&self, request: &mut Request) -> bool;

    fn device_id(&self) -> &str {
        self.core().id()
    }

    fn product_type(&self) -> &'static str {
        self.core().product_type()
    }

    /// Raise an arbitrary event for this device.
    fn send_event(&self, action: Action, value: JsonMap, cause: Cause, instance_id: &str) -> bool {
        self.core().send_event(action, value, cause, instance_id)
    }
}
