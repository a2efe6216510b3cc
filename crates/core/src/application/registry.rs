// Device Registry - in-memory cache of the last discovery pass

use crate::domain::DeviceInfo;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Immutable snapshot published by one refresh
#[derive(Debug, Default)]
struct Snapshot {
    devices: Vec<DeviceInfo>,
    index: HashMap<String, usize>,
}

impl Snapshot {
    fn build(devices: Vec<DeviceInfo>) -> Self {
        let mut index = HashMap::with_capacity(devices.len());
        let mut ordered: Vec<DeviceInfo> = Vec::with_capacity(devices.len());
        for device in devices {
            // A repeated id replaces the earlier entry in place
            if let Some(&pos) = index.get(device.id()) {
                ordered[pos] = device;
                continue;
            }
            index.insert(device.id().to_string(), ordered.len());
            ordered.push(device);
        }
        Self {
            devices: ordered,
            index,
        }
    }
}

/// Device Registry
///
/// Refreshed wholesale by discovery, read everywhere else. A refresh swaps
/// in a fully built snapshot, so readers see either the old or the new
/// fleet, never a mix.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    current: RwLock<Arc<Snapshot>>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole mapping with `discovered` (no merge)
    pub fn refresh(&self, discovered: Vec<DeviceInfo>) {
        let next = Arc::new(Snapshot::build(discovered));
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = next;
    }

    pub fn get(&self, id: &str) -> Option<DeviceInfo> {
        let snapshot = self.snapshot();
        snapshot
            .index
            .get(id)
            .map(|&pos| snapshot.devices[pos].clone())
    }

    /// Devices in the order of the most recent refresh
    pub fn list(&self) -> Vec<DeviceInfo> {
        self.snapshot().devices.clone()
    }

    pub fn len(&self) -> usize {
        self.snapshot().devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }
}
