use std::sync::atomic::{AtomicUsize, Ordering};

use polishplan::errors::Result;
use polishplan::resources::{DeviceId, DeviceInventory, DeviceStatus};

/// An inventory backed by fixed device statuses that counts how often it was
/// queried.
#[derive(Debug, Default)]
pub struct FakeInventory {
    devices: Vec<DeviceStatus>,
    queries: AtomicUsize,
}

impl FakeInventory {
    pub fn new(devices: Vec<DeviceStatus>) -> Self {
        Self {
            devices,
            queries: AtomicUsize::new(0),
        }
    }

    /// Devices that are all idle.
    pub fn idle(ids: &[DeviceId]) -> Self {
        Self::new(
            ids.iter()
                .map(|&id| DeviceStatus {
                    id,
                    load: 0.0,
                    memory: 0.0,
                })
                .collect(),
        )
    }

    /// Devices that are all fully loaded.
    pub fn busy(ids: &[DeviceId]) -> Self {
        Self::new(
            ids.iter()
                .map(|&id| DeviceStatus {
                    id,
                    load: 1.0,
                    memory: 1.0,
                })
                .collect(),
        )
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

impl DeviceInventory for FakeInventory {
    fn list_available(&self, max_load: f32, max_memory: f32) -> Result<Vec<DeviceId>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .devices
            .iter()
            .filter(|d| d.eligible(max_load, max_memory))
            .map(|d| d.id)
            .collect())
    }
}
