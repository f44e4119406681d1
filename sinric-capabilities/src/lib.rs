//! Capability controllers and device dispatch for the Sinric device SDK.
//!
//! A device is an identity plus a fixed set of capabilities. Each capability is
//! a controller (callbacks, held state and an [`EventLimiter`]) paired with a
//! trait whose default methods give the device its `on_*` and `send_*_event`
//! calls. Device types are assembled from these in `sinric-sdk`.
//!
//! # Overview
//!
//! - [`Device`] / [`DeviceCore`]: identity, request routing and the event primitive
//! - [`Capability`]: a controller that answers request actions
//! - [`EventLimiter`]: adaptive gate on outbound events
//! - [`controllers`]: every capability the SDK supports
//!
//! # Private Workspace Crate
//!
//! This crate is intended for internal use within the workspace and is not published
//! to crates.io.

mod callback;
pub mod controllers;
mod device;
mod error;
mod limiter;
pub mod values;

#[cfg(test)]
mod test_support;

pub use callback::{guarded, CallbackSlot};
pub use device::{dispatch, Capability, Device, DeviceCore, EventSink};
pub use error::{HandlerError, HandlerResult, ValidationError};
pub use limiter::{EventLimiter, Opening, EVENT_LIMIT_SENSOR_VALUE, EVENT_LIMIT_STATE};
