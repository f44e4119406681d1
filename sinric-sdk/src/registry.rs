//! Registered devices, keyed by device id.

use std::any::Any;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use sinric_capabilities::{Device, EventSink};

use crate::error::{Result, SdkError};

struct RegisteredDevice {
    device: Arc<dyn Device>,
    /// Same allocation as `device`, kept for typed lookups
    any: Arc<dyn Any + Send + Sync>,
}

/// Concurrent map of devices.
///
/// Lookups clone the `Arc` out of the map, so no shard lock is held while a
/// device handles a request.
#[derive(Default)]
pub(crate) struct DeviceRegistry {
    devices: DashMap<String, RegisteredDevice>,
}

impl DeviceRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Register `device`, or return the instance already registered under its id.
    ///
    /// The flag is `true` when the device was newly inserted.
    pub(crate) fn insert<D: Device + 'static>(&self, device: D) -> Result<(Arc<D>, bool)> {
        let id = device.device_id().to_string();
        match self.devices.entry(id.clone()) {
            Entry::Occupied(entry) => {
                let existing = Arc::clone(&entry.get().any);
                drop(entry);
                existing
                    .downcast::<D>()
                    .map(|device| (device, false))
                    .map_err(|_| SdkError::DeviceTypeMismatch { id })
            }
            Entry::Vacant(entry) => {
                let device = Arc::new(device);
                entry.insert(RegisteredDevice {
                    device: device.clone(),
                    any: device.clone(),
                });
                Ok((device, true))
            }
        }
    }

    pub(crate) fn get(&self, id: &str) -> Option<Arc<dyn Device>> {
        self.devices.get(id).map(|entry| Arc::clone(&entry.device))
    }

    pub(crate) fn get_typed<D: Device + 'static>(&self, id: &str) -> Option<Arc<D>> {
        let any = self.devices.get(id).map(|entry| Arc::clone(&entry.any))?;
        any.downcast::<D>().ok()
    }

    /// Registered ids in sorted order.
    pub(crate) fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.devices.iter().map(|entry| entry.key().clone()).collect();
        ids.sort();
        ids
    }

    pub(crate) fn len(&self) -> usize {
        self.devices.len()
    }

    fn all(&self) -> Vec<Arc<dyn Device>> {
        self.devices
            .iter()
            .map(|entry| Arc::clone(&entry.device))
            .collect()
    }

    pub(crate) fn attach_all(&self, sink: Arc<dyn EventSink>) {
        for device in self.all() {
            device.core().attach(Arc::clone(&sink));
        }
    }

    pub(crate) fn detach_all(&self) {
        for device in self.all() {
            device.core().detach();
        }
    }
}
