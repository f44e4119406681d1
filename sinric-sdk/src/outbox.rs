//! Signs outbound payloads and queues them for the socket.

use std::sync::Arc;

use sinric_capabilities::EventSink;
use sinric_protocol::{event_payload, Event, JsonMap, Message, ServerClock, Signature};
use sinric_transport::MessageQueue;

pub(crate) struct Outbox {
    signature: Signature,
    clock: Arc<ServerClock>,
    queue: Arc<MessageQueue>,
}

impl Outbox {
    pub(crate) fn new(signature: Signature, clock: Arc<ServerClock>, queue: Arc<MessageQueue>) -> Self {
        Self {
            signature,
            clock,
            queue,
        }
    }

    /// Wrap, sign and enqueue a payload. Returns `false` if it could not be signed.
    pub(crate) fn submit(&self, payload: JsonMap) -> bool {
        let mut message = Message::new(payload);
        if let Err(e) = self.signature.sign(&mut message) {
            tracing::error!("Failed to sign outbound message: {}", e);
            return false;
        }

        match message.to_json() {
            Ok(json) => {
                tracing::trace!("Queueing {}", json);
                self.queue.push(json);
                true
            }
            Err(e) => {
                tracing::error!("Failed to serialize outbound message: {}", e);
                false
            }
        }
    }
}

impl EventSink for Outbox {
    fn send_event(&self, event: Event) -> bool {
        tracing::debug!("Sending {} event for device {}", event.action, event.device_id);
        self.submit(event_payload(&event, self.clock.now()))
    }
}
