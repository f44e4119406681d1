//! Registered application callbacks.

use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::RwLock;
use sinric_protocol::Action;

use crate::error::HandlerError;

/// Holds at most one callback; registering again replaces it.
pub struct CallbackSlot<F: ?Sized> {
    callback: RwLock<Option<Arc<F>>>,
}

impl<F: ?Sized> Default for CallbackSlot<F> {
    fn default() -> Self {
        Self {
            callback: RwLock::new(None),
        }
    }
}

impl<F: ?Sized> fmt::Debug for CallbackSlot<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackSlot")
            .field("registered", &self.is_set())
            .finish()
    }
}

impl<F: ?Sized> CallbackSlot<F> {
    pub fn set(&self, callback: Arc<F>) {
        *self.callback.write() = Some(callback);
    }

    pub fn is_set(&self) -> bool {
        self.callback.read().is_some()
    }

    pub fn get(&self) -> Option<Arc<F>> {
        self.callback.read().clone()
    }

    /// Run the registered callback for `action`.
    ///
    /// The slot lock is released before the callback runs, so a callback may
    /// re-register itself. A panic inside the callback is logged and reported
    /// as [`HandlerError::CallbackPanicked`].
    pub fn invoke<R>(
        &self,
        action: Action,
        device_id: &str,
        call: impl FnOnce(&F) -> R,
    ) -> Result<R, HandlerError> {
        let callback = self
            .get()
            .ok_or_else(|| HandlerError::MissingCallback(action.as_str().to_string()))?;

        guarded(&format!("Callback for {action} on device {device_id}"), || call(&callback)).ok_or_else(|| {
            HandlerError::CallbackPanicked {
                action: action.as_str().to_string(),
            }
        })
    }

    /// Run the callback if one is registered, for notifications nobody answers.
    ///
    /// Returns `None` when the slot is empty or the callback panicked.
    pub fn notify<R>(&self, label: &str, call: impl FnOnce(&F) -> R) -> Option<R> {
        let callback = self.get()?;
        guarded(&format!("Callback {label}"), || call(&callback))
    }
}

/// Run `call`, logging and swallowing a panic.
///
/// Returns `None` if `call` panicked.
pub fn guarded<R>(label: &str, call: impl FnOnce() -> R) -> Option<R> {
    match catch_unwind(AssertUnwindSafe(call)) {
        Ok(result) => Some(result),
        Err(panic) => {
            tracing::error!(
                "{} panicked: {}",
                label,
                panic_message(panic.as_ref())
            );
            None
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}
