use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use sinric_protocol::{Action, Event, Request};

use crate::device::{DeviceCore, EventSink};

pub(crate) const DEVICE_ID: &str = "aaaaaaaaaaaaaaaaaaaaaaaa";

#[derive(Default)]
pub(crate) struct RecordingSink {
    events: Mutex<Vec<Event>>,
}

impl RecordingSink {
    pub(crate) fn attach(core: &DeviceCore) -> Arc<Self> {
        let sink = Arc::new(Self::default());
        core.attach(sink.clone());
        sink
    }

    pub(crate) fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    pub(crate) fn last(&self) -> Option<Event> {
        self.events.lock().last().cloned()
    }
}

impl EventSink for RecordingSink {
    fn send_event(&self, event: Event) -> bool {
        self.events.lock().push(event);
        true
    }
}

pub(crate) fn core() -> DeviceCore {
    DeviceCore::new(DEVICE_ID, "TEST")
}

pub(crate) fn request(action: Action, value: Value) -> Request {
    Request::new(action.as_str(), value.as_object().cloned().unwrap_or_default())
}
