//! Minimal Sinric Pro switch
//!
//! Registers one switch, prints every power change requested from the cloud
//! and reports a state change of its own every thirty seconds.
//!
//! Run with:
//! SINRIC_APP_KEY=... SINRIC_APP_SECRET=... SWITCH_ID=... \
//!     cargo run -p sinric-sdk --example basic_switch

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use sinric_sdk::devices::Switch;
use sinric_sdk::logging::{init_logging, LoggingMode};
use sinric_sdk::{Cause, PowerStateCapability, SdkError, SinricPro, SinricProConfig};

#[tokio::main]
async fn main() -> Result<(), SdkError> {
    if let Err(e) = init_logging(LoggingMode::Development) {
        eprintln!("Logging disabled: {e}");
    }

    let switch_id = std::env::var("SWITCH_ID")
        .map_err(|_| SdkError::Configuration("SWITCH_ID is not set".to_string()))?;

    let sinric = SinricPro::get_instance();
    let switch = sinric.add(Switch::new(switch_id))?;

    let power = Arc::new(AtomicBool::new(false));
    let state = power.clone();
    switch.on_power_state(move |device_id, on| {
        println!("{device_id} turned {}", if on { "on" } else { "off" });
        state.store(on, Ordering::SeqCst);
        true
    });

    sinric.on_connected(|| println!("Connected to Sinric Pro"));
    sinric.on_disconnected(|| println!("Disconnected from Sinric Pro"));

    sinric.begin(SinricProConfig::from_env()?)?;

    let mut ticker = tokio::time::interval(Duration::from_secs(30));
    ticker.tick().await;
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let on = !power.load(Ordering::SeqCst);
                if switch.send_power_state_event(on, Cause::PhysicalInteraction) {
                    power.store(on, Ordering::SeqCst);
                    println!("Reported power {}", if on { "on" } else { "off" });
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    sinric.stop().await;
    Ok(())
}
