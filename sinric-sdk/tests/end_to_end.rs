//! End-to-end tests: a SinricPro instance talking to a local fake cloud.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tokio_tungstenite::accept_hdr_async;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::Message as WsMessage;

use sinric_protocol::{Message, Signature};
use sinric_sdk::devices::{Blinds, Switch};
use sinric_sdk::{
    Cause, PowerStateCapability, RangeValueCapability, SinricPro, SinricProConfig, SinricState,
    PLATFORM, SDK_VERSION,
};

const APP_KEY: &str = "de0bd6f1-1d3c-4b3e-a52f-5dab09c2a1b7";
const APP_SECRET: &str = "5f36a1b2-c3d7-4e3f-8e9e-e86724a9c0d1-4c4a0b1c-9d2e";
const SWITCH_ID: &str = "5dc1564130aa42c6e2b8f4a1";
const BLINDS_ID: &str = "5dc1564130aa42c6e2b8f4a2";
const WAIT: Duration = Duration::from_secs(5);

// ============================================================================
// Fake cloud
// ============================================================================

/// One accepted WebSocket connection, driven through channels.
struct FakeCloud {
    to_device: mpsc::UnboundedSender<String>,
    from_device: mpsc::UnboundedReceiver<String>,
    headers: oneshot::Receiver<HashMap<String, String>>,
}

impl FakeCloud {
    /// Bind a listener; the connection is accepted once `gate` fires (or at once).
    async fn start(gate: Option<oneshot::Receiver<()>>) -> (Self, String) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("ws://{}/", listener.local_addr().unwrap());

        let (to_device, mut outbound) = mpsc::unbounded_channel::<String>();
        let (inbound, from_device) = mpsc::unbounded_channel::<String>();
        let (headers_tx, headers) = oneshot::channel();

        tokio::spawn(async move {
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            let (stream, _) = listener.accept().await.unwrap();
            let callback = move |request: &Request, response: Response| -> Result<Response, ErrorResponse> {
                let headers = request
                    .headers()
                    .iter()
                    .map(|(name, value)| {
                        (name.as_str().to_string(), value.to_str().unwrap_or_default().to_string())
                    })
                    .collect();
                let _ = headers_tx.send(headers);
                Ok(response)
            };
            let mut ws = accept_hdr_async(stream, callback).await.unwrap();

            loop {
                tokio::select! {
                    Some(text) = outbound.recv() => {
                        if ws.send(WsMessage::Text(text)).await.is_err() {
                            break;
                        }
                    }
                    frame = ws.next() => match frame {
                        Some(Ok(WsMessage::Text(text))) => {
                            let _ = inbound.send(text);
                        }
                        Some(Ok(_)) => {}
                        _ => break,
                    },
                }
            }
        });

        (
            Self {
                to_device,
                from_device,
                headers,
            },
            url,
        )
    }

    fn send(&self, text: String) {
        self.to_device.send(text).unwrap();
    }

    /// Next message from the device, checked against the app secret.
    async fn receive(&mut self) -> Value {
        let raw = timeout(WAIT, self.from_device.recv())
            .await
            .expect("timed out waiting for the device")
            .expect("connection closed");
        assert!(
            Signature::new(APP_SECRET).validate_json(&raw),
            "device sent an invalid signature: {raw}"
        );
        serde_json::from_str::<Value>(&raw).unwrap()["payload"].clone()
    }
}

fn signed_with(secret: &str, payload: Value) -> String {
    let mut message = Message::new(payload.as_object().cloned().unwrap());
    Signature::new(secret).sign(&mut message).unwrap();
    message.to_json().unwrap()
}

fn signed(payload: Value) -> String {
    signed_with(APP_SECRET, payload)
}

fn request(device_id: &str, action: &str, reply_token: &str, value: Value) -> Value {
    json!({
        "type": "request",
        "scope": "device",
        "action": action,
        "clientId": "alexa-skill",
        "createdAt": 1_700_000_000,
        "deviceId": device_id,
        "replyToken": reply_token,
        "value": value
    })
}

fn config(url: &str) -> SinricProConfig {
    SinricProConfig::new(APP_KEY, APP_SECRET)
        .with_server_url(url)
        .with_reconnect_delay(Duration::from_millis(100))
}

async fn wait_for_connection(rx: &mut mpsc::UnboundedReceiver<()>) {
    timeout(WAIT, rx.recv())
        .await
        .expect("timed out waiting for connection")
        .expect("hook dropped");
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_request_response_and_event() {
    let (mut cloud, url) = FakeCloud::start(None).await;

    let sinric = SinricPro::new();
    let switch = sinric.add(Switch::new(SWITCH_ID)).unwrap();
    let received = Arc::new(Mutex::new(Vec::new()));
    let record = received.clone();
    switch.on_power_state(move |device_id, on| {
        record.lock().push((device_id.to_string(), on));
        true
    });

    let (connected_tx, mut connected) = mpsc::unbounded_channel();
    sinric.on_connected(move || {
        let _ = connected_tx.send(());
    });

    sinric
        .begin(config(&url).with_restore_device_states(true))
        .unwrap();
    wait_for_connection(&mut connected).await;
    assert_eq!(sinric.state(), SinricState::Connected);

    let headers = timeout(WAIT, &mut cloud.headers).await.unwrap().unwrap();
    assert_eq!(headers["appkey"], APP_KEY);
    assert_eq!(headers["deviceids"], SWITCH_ID);
    assert_eq!(headers["restoredevicestates"], "true");
    assert_eq!(headers["platform"], PLATFORM);
    assert_eq!(headers["sdkversion"], SDK_VERSION);

    // Keepalives are consumed silently
    cloud.send(json!({"timestamp": 1_700_000_000}).to_string());

    cloud.send(signed(request(SWITCH_ID, "setPowerState", "reply-1", json!({"state": "On"}))));
    let response = cloud.receive().await;
    assert_eq!(response["type"], json!("response"));
    assert_eq!(response["success"], json!(true));
    assert_eq!(response["message"], json!("OK"));
    assert_eq!(response["replyToken"], json!("reply-1"));
    assert_eq!(response["deviceId"], json!(SWITCH_ID));
    assert_eq!(response["value"], json!({"state": "On"}));
    // createdAt follows the server clock set by the keepalive
    assert!((response["createdAt"].as_i64().unwrap() - 1_700_000_000).abs() <= 5);
    assert_eq!(*received.lock(), vec![(SWITCH_ID.to_string(), true)]);

    assert!(switch.send_power_state_event(false, Cause::PhysicalInteraction));
    let event = cloud.receive().await;
    assert_eq!(event["type"], json!("event"));
    assert_eq!(event["action"], json!("setPowerState"));
    assert_eq!(event["deviceId"], json!(SWITCH_ID));
    assert_eq!(event["cause"], json!({"type": "PHYSICAL_INTERACTION"}));
    assert_eq!(event["value"], json!({"state": "Off"}));

    // Within a second of the last event, the next one is rate limited
    assert!(!switch.send_power_state_event(true, Cause::PhysicalInteraction));

    sinric.stop().await;
    assert_eq!(sinric.state(), SinricState::Stopped);
}

#[tokio::test]
async fn test_failures_are_answered() {
    let (mut cloud, url) = FakeCloud::start(None).await;

    let sinric = SinricPro::new();
    let switch = sinric.add(Switch::new(SWITCH_ID)).unwrap();
    switch.on_power_state(|_, _| panic!("must not be called with a bad signature"));

    let (connected_tx, mut connected) = mpsc::unbounded_channel();
    sinric.on_connected(move || {
        let _ = connected_tx.send(());
    });
    sinric.begin(config(&url)).unwrap();
    wait_for_connection(&mut connected).await;

    let forged = request(SWITCH_ID, "setPowerState", "reply-1", json!({"state": "On"}));
    cloud.send(signed_with("someone-else-entirely-0123456789abcdef", forged));
    let response = cloud.receive().await;
    assert_eq!(response["replyToken"], json!("reply-1"));
    assert_eq!(response["success"], json!(false));
    assert_eq!(response["message"], json!("Signature is invalid"));

    let unknown = "ffffffffffffffffffffffff";
    cloud.send(signed(request(unknown, "setPowerState", "reply-2", json!({"state": "On"}))));
    let response = cloud.receive().await;
    assert_eq!(response["replyToken"], json!("reply-2"));
    assert_eq!(response["success"], json!(false));
    assert_eq!(
        response["message"],
        json!(format!("Device '{unknown}' is not registered"))
    );

    cloud.send(signed(request(SWITCH_ID, "setBrightness", "reply-3", json!({"brightness": 5}))));
    let response = cloud.receive().await;
    assert_eq!(response["success"], json!(false));
    assert_eq!(response["message"], json!("Missing callback function: setBrightness"));

    // A panicking callback becomes a failed response, the session survives
    cloud.send(signed(request(SWITCH_ID, "setPowerState", "reply-4", json!({"state": "Off"}))));
    let response = cloud.receive().await;
    assert_eq!(response["replyToken"], json!("reply-4"));
    assert_eq!(response["success"], json!(false));
    assert!(sinric.is_connected());

    sinric.stop().await;
}

#[tokio::test]
async fn test_module_setting_and_instances() {
    let (mut cloud, url) = FakeCloud::start(None).await;

    let sinric = SinricPro::new();
    let blinds = sinric.add(Blinds::new(BLINDS_ID)).unwrap();
    blinds.on_range_value(|_, instance, value| instance == "tilt" && value <= 100);
    let settings = Arc::new(Mutex::new(Vec::new()));
    let record = settings.clone();
    sinric.on_set_setting(move |id, value| {
        record.lock().push((id.to_string(), value.clone()));
        true
    });

    let (connected_tx, mut connected) = mpsc::unbounded_channel();
    sinric.on_connected(move || {
        let _ = connected_tx.send(());
    });
    sinric.begin(config(&url)).unwrap();
    wait_for_connection(&mut connected).await;

    cloud.send(signed(json!({
        "type": "request",
        "scope": "module",
        "action": "setSetting",
        "clientId": "portal",
        "createdAt": 1_700_000_000,
        "replyToken": "reply-1",
        "value": {"id": "pollInterval", "value": 30}
    })));
    let response = cloud.receive().await;
    assert_eq!(response["success"], json!(true));
    assert_eq!(response["scope"], json!("module"));
    assert!(response.get("deviceId").is_none());
    assert_eq!(*settings.lock(), vec![("pollInterval".to_string(), json!(30))]);

    let mut tilt = request(BLINDS_ID, "setRangeValue", "reply-2", json!({"rangeValue": 140}));
    tilt["instanceId"] = json!("tilt");
    cloud.send(signed(tilt));
    let response = cloud.receive().await;
    assert_eq!(response["success"], json!(true));
    assert_eq!(response["instanceId"], json!("tilt"));
    assert_eq!(response["value"], json!({"rangeValue": 100}));

    assert!(blinds.send_range_value_event(40, "tilt", Cause::PhysicalInteraction));
    let event = cloud.receive().await;
    assert_eq!(event["instanceId"], json!("tilt"));
    assert_eq!(event["value"], json!({"rangeValue": 40}));

    sinric.stop().await;
}

#[tokio::test]
async fn test_events_wait_for_connection() {
    let (gate_tx, gate) = oneshot::channel();
    let (mut cloud, url) = FakeCloud::start(Some(gate)).await;

    let sinric = SinricPro::new();
    let switch = sinric.add(Switch::new(SWITCH_ID)).unwrap();
    sinric.begin(config(&url)).unwrap();

    // The handshake cannot complete until the fake cloud accepts
    assert!(switch.send_power_state_event(true, Cause::AppInteraction));
    assert_ne!(sinric.state(), SinricState::Connected);

    gate_tx.send(()).unwrap();
    let event = cloud.receive().await;
    assert_eq!(event["action"], json!("setPowerState"));
    assert_eq!(event["cause"], json!({"type": "APP_INTERACTION"}));

    sinric.stop().await;
}

#[tokio::test]
async fn test_heartbeat_reports_pong() {
    let (_cloud, url) = FakeCloud::start(None).await;

    let sinric = SinricPro::new();
    sinric.add(Switch::new(SWITCH_ID)).unwrap();
    let (pong_tx, mut pongs) = mpsc::unbounded_channel();
    sinric.on_pong(move |latency| {
        let _ = pong_tx.send(latency);
    });

    let config = config(&url)
        .with_heartbeat_interval(Duration::from_millis(200))
        .with_pong_timeout(Duration::from_millis(150));
    sinric.begin(config).unwrap();

    let latency = timeout(WAIT, pongs.recv()).await.unwrap().unwrap();
    assert!(latency < Duration::from_millis(150));

    sinric.stop().await;
}
