//! WebSocket transport for the Sinric device SDK.
//!
//! This crate keeps a single outbound WebSocket connection alive and moves text
//! frames in and out of it. It has no knowledge of message formats, signing or
//! devices.
//!
//! # Overview
//!
//! - [`WebSocketClient`]: connects with configurable handshake headers, sends a
//!   heartbeat ping, treats a missing pong as a dead connection and reconnects
//!   after a fixed delay until stopped.
//! - [`TransportEvent`]: connection and frame notifications delivered over an
//!   unbounded channel.
//! - [`MessageQueue`]: FIFO of serialized messages with push-front for retries,
//!   used to decouple producers from the socket.
//! - [`ConnectionState`]: lifecycle of the client.
//!
//! # Private Workspace Crate
//!
//! This crate is intended for internal use within the workspace and is not published
//! to crates.io.

mod client;
pub mod config;
mod error;
mod queue;
mod state;

pub use client::{TransportEvent, WebSocketClient};
pub use config::{
    TransportConfig, DEFAULT_HEARTBEAT_INTERVAL, DEFAULT_PONG_TIMEOUT, DEFAULT_RECONNECT_DELAY,
};
pub use error::{Result, TransportError};
pub use queue::MessageQueue;
pub use state::ConnectionState;
