//! Reconnecting WebSocket client.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use parking_lot::{Mutex, RwLock};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http::{HeaderName, HeaderValue};
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;

use crate::config::{set_header, TransportConfig};
use crate::error::{Result, TransportError};
use crate::state::ConnectionState;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, WsMessage>;
type WsSource = SplitStream<WsStream>;

/// Upper bound on waiting for a close handshake on a connection being torn down.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

/// Notifications delivered to the owner of a [`WebSocketClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Handshake completed
    Connected,
    /// An established connection ended (closed, errored or timed out)
    Disconnected,
    /// A text frame, or a binary frame holding UTF-8
    Message(String),
    /// The server answered a heartbeat ping
    Pong { latency: Duration },
}

/// Why a connected session ended.
enum SessionEnd {
    Stopped,
    Closed,
    PongTimeout,
    Error(String),
}

impl fmt::Display for SessionEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionEnd::Stopped => f.write_str("client stopped"),
            SessionEnd::Closed => f.write_str("closed by server"),
            SessionEnd::PongTimeout => f.write_str("pong timeout"),
            SessionEnd::Error(e) => write!(f, "{e}"),
        }
    }
}

/// A WebSocket client that keeps one connection alive until stopped.
///
/// After [`start`](Self::start) a background task connects, forwards inbound
/// frames as [`TransportEvent`]s and sends a heartbeat ping every
/// `heartbeat_interval`. A missing pong, a close frame or a socket error ends
/// the session; the task then waits `reconnect_delay` and connects again,
/// indefinitely, until [`stop`](Self::stop) is called.
///
/// # Example
///
/// ```no_run
/// use sinric_transport::{TransportConfig, TransportEvent, WebSocketClient};
/// use tokio::sync::mpsc;
///
/// # async fn run() -> sinric_transport::Result<()> {
/// let (tx, mut rx) = mpsc::unbounded_channel();
/// let config = TransportConfig::new("wss://ws.sinric.pro:443/").with_header("appkey", "...");
/// let client = WebSocketClient::new(config, tx)?;
/// client.start()?;
///
/// while let Some(event) = rx.recv().await {
///     if let TransportEvent::Message(text) = event {
///         println!("received {text}");
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub struct WebSocketClient {
    inner: Arc<Inner>,
    task: Mutex<Option<JoinHandle<()>>>,
}

struct Inner {
    config: TransportConfig,
    headers: RwLock<Vec<(String, String)>>,
    /// Write half of the live connection, `None` while disconnected
    sink: tokio::sync::Mutex<Option<WsSink>>,
    state: watch::Sender<ConnectionState>,
    events: mpsc::UnboundedSender<TransportEvent>,
    shutdown: CancellationToken,
}

impl WebSocketClient {
    /// Create a client without connecting.
    ///
    /// Fails if the configuration is invalid or a configured header cannot be
    /// sent in a handshake.
    pub fn new(
        config: TransportConfig,
        events: mpsc::UnboundedSender<TransportEvent>,
    ) -> Result<Self> {
        config.validate()?;

        let (state, _) = watch::channel(ConnectionState::Idle);
        let inner = Inner {
            headers: RwLock::new(config.headers.clone()),
            config,
            sink: tokio::sync::Mutex::new(None),
            state,
            events,
            shutdown: CancellationToken::new(),
        };
        inner.handshake_request()?;

        Ok(Self {
            inner: Arc::new(inner),
            task: Mutex::new(None),
        })
    }

    /// Spawn the connection task. Must be called from within a Tokio runtime.
    pub fn start(&self) -> Result<()> {
        let mut task = self.task.lock();
        if task.is_some() || self.inner.shutdown.is_cancelled() {
            return Err(TransportError::AlreadyStarted);
        }

        self.inner.set_state(ConnectionState::Connecting);
        *task = Some(tokio::spawn(connection_loop(Arc::clone(&self.inner))));
        Ok(())
    }

    /// Send a text frame on the current connection.
    pub async fn send(&self, text: String) -> Result<()> {
        self.inner.send_frame(WsMessage::Text(text)).await
    }

    /// Add or replace a handshake header.
    ///
    /// The live connection is not renegotiated; the new value is sent on the
    /// next connection attempt.
    pub fn set_header(&self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        tracing::debug!("Handshake header '{}' updated", name);
        set_header(&mut self.inner.headers.write(), name, value.into());
    }

    /// Current value of a handshake header.
    pub fn header(&self, name: &str) -> Option<String> {
        self.inner
            .headers
            .read()
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.clone())
    }

    pub fn state(&self) -> ConnectionState {
        *self.inner.state.borrow()
    }

    pub fn is_connected(&self) -> bool {
        self.state().is_connected()
    }

    /// Watch state transitions.
    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.state.subscribe()
    }

    pub fn url(&self) -> &str {
        &self.inner.config.url
    }

    /// Close the connection and end the background task for good.
    pub async fn stop(&self) {
        self.inner.shutdown.cancel();
        self.inner.close_sink().await;

        let handle = self.task.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                tracing::warn!("Connection task ended abnormally: {}", e);
            }
        }

        self.inner.set_state(ConnectionState::Stopped);
        tracing::info!("WebSocket client stopped");
    }
}

impl Drop for WebSocketClient {
    fn drop(&mut self) {
        self.inner.shutdown.cancel();
    }
}

impl Inner {
    fn set_state(&self, state: ConnectionState) {
        let previous = self.state.send_replace(state);
        if previous != state {
            tracing::debug!("Connection state {} -> {}", previous, state);
        }
    }

    fn handshake_request(&self) -> Result<Request> {
        let mut request =
            self.config
                .url
                .as_str()
                .into_client_request()
                .map_err(|e| TransportError::InvalidUrl {
                    url: self.config.url.clone(),
                    reason: e.to_string(),
                })?;

        let headers = request.headers_mut();
        for (name, value) in self.headers.read().iter() {
            let invalid = |reason: String| TransportError::InvalidHeader {
                name: name.clone(),
                reason,
            };
            let header_name =
                HeaderName::from_bytes(name.as_bytes()).map_err(|e| invalid(e.to_string()))?;
            let header_value = HeaderValue::from_str(value).map_err(|e| invalid(e.to_string()))?;
            headers.insert(header_name, header_value);
        }

        Ok(request)
    }

    async fn connect(&self) -> Result<WsSource> {
        let request = self.handshake_request()?;
        tracing::info!("Connecting to {}", self.config.url);

        let (stream, _response) = tokio::select! {
            _ = self.shutdown.cancelled() => {
                return Err(TransportError::Connect("client stopped".to_string()));
            }
            result = connect_async(request) => result?,
        };

        let (sink, source) = stream.split();
        *self.sink.lock().await = Some(sink);
        self.set_state(ConnectionState::Connected);
        tracing::info!("Connected to {}", self.config.url);
        let _ = self.events.send(TransportEvent::Connected);

        Ok(source)
    }

    async fn send_frame(&self, frame: WsMessage) -> Result<()> {
        let mut sink = self.sink.lock().await;
        let sink = sink.as_mut().ok_or(TransportError::NotConnected)?;
        sink.send(frame)
            .await
            .map_err(|e| TransportError::Send(e.to_string()))
    }

    async fn close_sink(&self) {
        let sink = self.sink.lock().await.take();
        if let Some(mut sink) = sink {
            if tokio::time::timeout(CLOSE_TIMEOUT, sink.close()).await.is_err() {
                tracing::debug!("Close handshake timed out");
            }
        }
    }

    /// Pump one connected session until it ends.
    async fn session(&self, mut source: WsSource) -> SessionEnd {
        let period = self.config.heartbeat_interval;
        let mut heartbeat = tokio::time::interval_at(Instant::now() + period, period);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut ping_sent: Option<Instant> = None;

        loop {
            let pong_deadline = ping_sent.map(|sent| sent + self.config.pong_timeout);
            let pong_timeout = async move {
                match pong_deadline {
                    Some(deadline) => tokio::time::sleep_until(deadline).await,
                    None => std::future::pending::<()>().await,
                }
            };

            tokio::select! {
                _ = self.shutdown.cancelled() => return SessionEnd::Stopped,
                _ = pong_timeout => return SessionEnd::PongTimeout,
                _ = heartbeat.tick() => {
                    ping_sent.get_or_insert_with(Instant::now);
                    if let Err(e) = self.send_frame(WsMessage::Ping(Vec::new())).await {
                        return SessionEnd::Error(e.to_string());
                    }
                    tracing::trace!("Heartbeat ping sent");
                }
                frame = source.next() => match frame {
                    Some(Ok(WsMessage::Text(text))) => {
                        let _ = self.events.send(TransportEvent::Message(text));
                    }
                    Some(Ok(WsMessage::Binary(data))) => match String::from_utf8(data) {
                        Ok(text) => {
                            let _ = self.events.send(TransportEvent::Message(text));
                        }
                        Err(_) => tracing::warn!("Dropping binary frame that is not UTF-8"),
                    },
                    Some(Ok(WsMessage::Pong(_))) => {
                        if let Some(sent) = ping_sent.take() {
                            let latency = sent.elapsed();
                            tracing::debug!("Pong received after {:?}", latency);
                            let _ = self.events.send(TransportEvent::Pong { latency });
                        }
                    }
                    Some(Ok(WsMessage::Close(frame))) => {
                        tracing::debug!("Close frame received: {:?}", frame);
                        return SessionEnd::Closed;
                    }
                    // Pings are answered by tungstenite itself
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return SessionEnd::Error(e.to_string()),
                    None => return SessionEnd::Closed,
                },
            }
        }
    }
}

async fn connection_loop(inner: Arc<Inner>) {
    loop {
        match inner.connect().await {
            Ok(source) => {
                let end = inner.session(source).await;
                inner.close_sink().await;
                let _ = inner.events.send(TransportEvent::Disconnected);

                if inner.shutdown.is_cancelled() {
                    break;
                }
                tracing::warn!("Connection to {} lost: {}", inner.config.url, end);
            }
            Err(e) => {
                if inner.shutdown.is_cancelled() {
                    break;
                }
                tracing::error!("Failed to connect to {}: {}", inner.config.url, e);
            }
        }

        inner.set_state(ConnectionState::Reconnecting);
        tokio::select! {
            _ = inner.shutdown.cancelled() => break,
            _ = tokio::time::sleep(inner.config.reconnect_delay) => {}
        }
    }

    inner.set_state(ConnectionState::Stopped);
    tracing::debug!("Connection task for {} exited", inner.config.url);
}
