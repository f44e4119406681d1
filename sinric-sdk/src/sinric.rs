//! SinricPro - Main entry point for the SDK
//!
//! Owns the device registry, the two message queues and, once started, the
//! WebSocket session with its three background tasks:
//!
//! ```text
//!  socket ──TransportEvent──▶ event pump ──▶ incoming queue ──▶ inbound loop
//!                                                                   │ Dispatcher
//!  devices ──Event──▶ Outbox ──▶ outgoing queue ◀──── responses ────┘
//!                                      │
//!                                      ▼
//!                               outbound loop ──▶ socket (only while connected)
//! ```

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::Value;
use sinric_capabilities::{guarded, CallbackSlot, Device};
use sinric_protocol::{is_valid_device_id, ServerClock, Signature};
use sinric_transport::{ConnectionState, MessageQueue, TransportEvent, WebSocketClient};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::SinricProConfig;
use crate::dispatcher::{Dispatcher, ModuleSettingCallback};
use crate::error::{Result, SdkError};
use crate::logging;
use crate::outbox::Outbox;
use crate::registry::DeviceRegistry;

pub type ConnectionCallback = dyn Fn() + Send + Sync;

/// Receives the round trip time of each heartbeat.
pub type PongCallback = dyn Fn(Duration) + Send + Sync;

/// Lifecycle of a [`SinricPro`] instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinricState {
    /// `begin` has not been called
    Uninitialized,
    Connecting,
    Connected,
    /// The connection dropped and a retry is pending
    Reconnecting,
    Stopped,
}

impl fmt::Display for SinricState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SinricState::Uninitialized => "uninitialized",
            SinricState::Connecting => "connecting",
            SinricState::Connected => "connected",
            SinricState::Reconnecting => "reconnecting",
            SinricState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

impl From<ConnectionState> for SinricState {
    fn from(state: ConnectionState) -> Self {
        match state {
            ConnectionState::Idle | ConnectionState::Connecting => SinricState::Connecting,
            ConnectionState::Connected => SinricState::Connected,
            ConnectionState::Reconnecting => SinricState::Reconnecting,
            ConnectionState::Stopped => SinricState::Stopped,
        }
    }
}

#[derive(Default)]
struct Hooks {
    connected: CallbackSlot<ConnectionCallback>,
    disconnected: CallbackSlot<ConnectionCallback>,
    pong: CallbackSlot<PongCallback>,
}

struct Session {
    transport: Arc<WebSocketClient>,
    outbox: Arc<Outbox>,
    shutdown: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

/// Main entry point: register devices, then `begin`.
///
/// # Example
///
/// ```rust,no_run
/// use sinric_sdk::devices::Switch;
/// use sinric_sdk::{PowerStateCapability, SinricPro, SinricProConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), sinric_sdk::SdkError> {
///     let sinric = SinricPro::get_instance();
///
///     let switch = sinric.add(Switch::new("5dc1564130aa42c6e2b8f4a1"))?;
///     switch.on_power_state(|_, on| {
///         println!("power {}", if on { "on" } else { "off" });
///         true
///     });
///
///     sinric.begin(SinricProConfig::from_env()?)?;
///
///     tokio::signal::ctrl_c().await.ok();
///     sinric.stop().await;
///     Ok(())
/// }
/// ```
pub struct SinricPro {
    registry: Arc<DeviceRegistry>,
    clock: Arc<ServerClock>,
    incoming: Arc<MessageQueue>,
    outgoing: Arc<MessageQueue>,
    module_setting: Arc<CallbackSlot<ModuleSettingCallback>>,
    hooks: Arc<Hooks>,
    session: Mutex<Option<Session>>,
    stopped: AtomicBool,
}

impl Default for SinricPro {
    fn default() -> Self {
        Self::new()
    }
}

impl SinricPro {
    /// Create an independent instance.
    ///
    /// Most applications use [`get_instance`](Self::get_instance); separate
    /// instances are useful in tests or when one process serves several apps.
    pub fn new() -> Self {
        Self {
            registry: Arc::new(DeviceRegistry::new()),
            clock: Arc::new(ServerClock::new()),
            incoming: Arc::new(MessageQueue::new()),
            outgoing: Arc::new(MessageQueue::new()),
            module_setting: Arc::new(CallbackSlot::default()),
            hooks: Arc::new(Hooks::default()),
            session: Mutex::new(None),
            stopped: AtomicBool::new(false),
        }
    }

    /// The process-wide instance.
    pub fn get_instance() -> &'static SinricPro {
        static INSTANCE: OnceLock<SinricPro> = OnceLock::new();
        INSTANCE.get_or_init(SinricPro::new)
    }

    /// Validate `config`, connect and start processing messages.
    ///
    /// Must be called from within a Tokio runtime. The connection is
    /// established in the background; use [`state`](Self::state) or
    /// [`on_connected`](Self::on_connected) to follow it. Calling `begin`
    /// again while running logs a warning and changes nothing.
    pub fn begin(&self, config: SinricProConfig) -> Result<()> {
        let runtime = Handle::try_current().map_err(|_| SdkError::NoRuntime)?;
        config.validate()?;

        if config.debug {
            logging::ensure_debug_logging();
        }

        let mut session = self.session.lock();
        if session.is_some() {
            tracing::warn!("SinricPro is already running, ignoring begin");
            return Ok(());
        }

        let device_ids = self.registry.ids();
        if device_ids.is_empty() {
            tracing::warn!("Starting SinricPro without any devices");
        }

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let transport = Arc::new(WebSocketClient::new(
            config.transport_config(&device_ids),
            events_tx,
        )?);

        let signature = Signature::new(config.app_secret.clone());
        let outbox = Arc::new(Outbox::new(
            signature.clone(),
            Arc::clone(&self.clock),
            Arc::clone(&self.outgoing),
        ));
        let dispatcher = Dispatcher::new(
            signature,
            Arc::clone(&self.clock),
            Arc::clone(&self.registry),
            Arc::clone(&self.module_setting),
        );

        let shutdown = CancellationToken::new();
        let tasks = vec![
            runtime.spawn(pump_events(
                events_rx,
                Arc::clone(&self.incoming),
                Arc::clone(&self.hooks),
                shutdown.clone(),
            )),
            runtime.spawn(inbound_loop(
                dispatcher,
                Arc::clone(&self.incoming),
                Arc::clone(&outbox),
                shutdown.clone(),
            )),
            runtime.spawn(outbound_loop(
                Arc::clone(&transport),
                Arc::clone(&self.outgoing),
                config.send_retry_delay,
                shutdown.clone(),
            )),
        ];

        if let Err(e) = transport.start() {
            shutdown.cancel();
            return Err(e.into());
        }

        self.registry.attach_all(outbox.clone());
        self.stopped.store(false, Ordering::SeqCst);
        *session = Some(Session {
            transport,
            outbox,
            shutdown,
            tasks,
        });

        tracing::info!(
            "SinricPro started with {} device(s), connecting to {}",
            device_ids.len(),
            config.websocket_url()
        );
        Ok(())
    }

    /// Register a device.
    ///
    /// Adding an id that is already registered returns the existing instance.
    /// Devices can be added before or after `begin`; ids added while running
    /// are announced to the server on the next connection.
    pub fn add<D: Device + 'static>(&self, device: D) -> Result<Arc<D>> {
        let id = device.device_id().to_string();
        if !is_valid_device_id(&id) {
            return Err(SdkError::InvalidDeviceId(id));
        }

        let (device, inserted) = self.registry.insert(device)?;
        if !inserted {
            tracing::warn!("Device {} is already added, returning the existing instance", id);
            return Ok(device);
        }

        tracing::info!("Added {} device {}", device.product_type(), id);
        if let Some(session) = self.session.lock().as_ref() {
            device.core().attach(session.outbox.clone());
            session
                .transport
                .set_header("deviceids", self.registry.ids().join(";"));
        }
        Ok(device)
    }

    /// Look up a registered device by id and type.
    pub fn device<D: Device + 'static>(&self, id: &str) -> Option<Arc<D>> {
        self.registry.get_typed(id)
    }

    pub fn device_ids(&self) -> Vec<String> {
        self.registry.ids()
    }

    /// Handle module scope `setSetting` requests.
    pub fn on_set_setting<F>(&self, callback: F)
    where
        F: Fn(&str, &Value) -> bool + Send + Sync + 'static,
    {
        self.module_setting.set(Arc::new(callback));
    }

    /// Called each time the WebSocket connects.
    pub fn on_connected<F>(&self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.hooks.connected.set(Arc::new(callback));
    }

    /// Called each time an established connection is lost.
    pub fn on_disconnected<F>(&self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.hooks.disconnected.set(Arc::new(callback));
    }

    /// Called with the round trip time whenever a heartbeat is answered.
    pub fn on_pong<F>(&self, callback: F)
    where
        F: Fn(Duration) + Send + Sync + 'static,
    {
        self.hooks.pong.set(Arc::new(callback));
    }

    pub fn state(&self) -> SinricState {
        if let Some(session) = self.session.lock().as_ref() {
            return session.transport.state().into();
        }
        if self.stopped.load(Ordering::SeqCst) {
            SinricState::Stopped
        } else {
            SinricState::Uninitialized
        }
    }

    pub fn is_connected(&self) -> bool {
        self.state() == SinricState::Connected
    }

    /// Server time in unix seconds, as used for `createdAt`.
    pub fn timestamp(&self) -> i64 {
        self.clock.now()
    }

    /// Close the connection and stop all background work.
    ///
    /// Queued messages are discarded and devices stop accepting events.
    /// Registered devices and callbacks are kept, so `begin` may be called
    /// again.
    pub async fn stop(&self) {
        let session = self.session.lock().take();
        let Some(session) = session else {
            tracing::debug!("SinricPro is not running");
            return;
        };

        session.shutdown.cancel();
        session.transport.stop().await;
        for task in session.tasks {
            if let Err(e) = task.await {
                tracing::warn!("Background task ended abnormally: {}", e);
            }
        }

        self.registry.detach_all();
        let dropped = self.incoming.clear() + self.outgoing.clear();
        self.stopped.store(true, Ordering::SeqCst);
        tracing::info!("SinricPro stopped, {} queued message(s) discarded", dropped);
    }
}

impl Drop for SinricPro {
    fn drop(&mut self) {
        if let Some(session) = self.session.get_mut().take() {
            session.shutdown.cancel();
        }
    }
}

// ============================================================================
// Background tasks
// ============================================================================

/// Forward transport notifications: frames to the incoming queue, connection
/// changes to the application hooks.
async fn pump_events(
    mut events: mpsc::UnboundedReceiver<TransportEvent>,
    incoming: Arc<MessageQueue>,
    hooks: Arc<Hooks>,
    shutdown: CancellationToken,
) {
    loop {
        let event = tokio::select! {
            _ = shutdown.cancelled() => break,
            event = events.recv() => match event {
                Some(event) => event,
                None => break,
            },
        };

        match event {
            TransportEvent::Message(text) => incoming.push(text),
            TransportEvent::Connected => {
                tracing::info!("Connected to SinricPro");
                hooks.connected.notify("on_connected", |cb| cb());
            }
            TransportEvent::Disconnected => {
                tracing::warn!("Disconnected from SinricPro");
                hooks.disconnected.notify("on_disconnected", |cb| cb());
            }
            TransportEvent::Pong { latency } => {
                tracing::debug!("Heartbeat answered in {:?}", latency);
                hooks.pong.notify("on_pong", |cb| cb(latency));
            }
        }
    }
}

/// Dispatch inbound messages one at a time and queue the responses.
async fn inbound_loop(
    dispatcher: Dispatcher,
    incoming: Arc<MessageQueue>,
    outbox: Arc<Outbox>,
    shutdown: CancellationToken,
) {
    loop {
        let raw = tokio::select! {
            _ = shutdown.cancelled() => break,
            raw = incoming.pop() => raw,
        };

        if let Some(response) = guarded("Inbound dispatch", || dispatcher.process(&raw)).flatten() {
            outbox.submit(response);
        }
    }
}

/// Drain the outgoing queue while connected.
///
/// A message the socket refuses goes back to the front of the queue and is
/// retried after `retry_delay`, so ordering is kept across reconnects.
async fn outbound_loop(
    transport: Arc<WebSocketClient>,
    outgoing: Arc<MessageQueue>,
    retry_delay: Duration,
    shutdown: CancellationToken,
) {
    let mut states = transport.subscribe_state();
    loop {
        let connected = tokio::select! {
            _ = shutdown.cancelled() => break,
            state = states.wait_for(|state| state.is_connected()) => state.is_ok(),
        };
        if !connected {
            break;
        }

        let message = tokio::select! {
            _ = shutdown.cancelled() => break,
            message = outgoing.pop() => message,
        };

        if let Err(e) = transport.send(message.clone()).await {
            tracing::warn!("Send failed, retrying in {:?}: {}", retry_delay, e);
            outgoing.push_front(message);
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(retry_delay) => {}
            }
        }
    }
}
