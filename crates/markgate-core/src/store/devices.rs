// ── Device store ──
//
// Lock-free concurrent storage keyed by MAC address, with a secondary
// id index. The `DashMap` entry API makes the MAC uniqueness check
// atomic with the insert, so it is the final arbiter under concurrent
// registration even when a caller's pre-check passed.
//
// Lock ordering: a shard guard on one map is never held while locking
// the other map, or the two maps could deadlock against each other.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::error::CoreError;
use crate::model::{Device, DeviceId, MacAddress};

#[derive(Debug, Default)]
pub struct DeviceStore {
    /// Primary storage: MAC -> device record.
    by_mac: DashMap<MacAddress, Arc<Device>>,

    /// Secondary index: id -> MAC key.
    id_index: DashMap<DeviceId, MacAddress>,

    /// Next surrogate id. Ids are never reused.
    next_id: AtomicU64,
}

impl DeviceStore {
    pub fn new() -> Self {
        Self {
            by_mac: DashMap::new(),
            id_index: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Whether a record with this MAC already exists. Advisory only;
    /// `insert_with` re-checks atomically.
    pub fn contains_mac(&self, mac: &MacAddress) -> bool {
        self.by_mac.contains_key(mac)
    }

    /// Allocate an id and insert the record built by `build`, failing
    /// with `DuplicateDevice` if the MAC slot is already occupied. The
    /// occupancy check and the insert happen under the same shard lock.
    pub fn insert_with(
        &self,
        mac: MacAddress,
        build: impl FnOnce(DeviceId) -> Device,
    ) -> Result<Arc<Device>, CoreError> {
        match self.by_mac.entry(mac.clone()) {
            Entry::Occupied(_) => Err(CoreError::DuplicateDevice {
                mac: mac.to_string(),
            }),
            Entry::Vacant(slot) => {
                let id = DeviceId(self.next_id.fetch_add(1, Ordering::Relaxed));
                let device = Arc::new(build(id));
                // Releases the shard guard before the id index is touched.
                slot.insert(Arc::clone(&device));
                self.id_index.insert(id, mac);
                Ok(device)
            }
        }
    }

    /// Look up a record by id.
    pub fn get(&self, id: DeviceId) -> Option<Arc<Device>> {
        // Clone the key out so no id_index guard is held across by_mac.
        let mac = self.id_index.get(&id).map(|r| r.value().clone())?;
        self.by_mac.get(&mac).map(|r| Arc::clone(r.value()))
    }

    /// Commit an updated record for `id`. A changed MAC is re-keyed
    /// atomically against the new slot; an occupied slot fails with
    /// `DuplicateDevice` and leaves the old record in place.
    pub fn commit(&self, id: DeviceId, updated: Device) -> Result<Arc<Device>, CoreError> {
        let Some(old_mac) = self.id_index.get(&id).map(|r| r.value().clone()) else {
            return Err(CoreError::NotFound { id });
        };
        let record = Arc::new(updated);

        if record.mac == old_mac {
            self.by_mac.insert(old_mac, Arc::clone(&record));
            return Ok(record);
        }

        match self.by_mac.entry(record.mac.clone()) {
            Entry::Occupied(_) => Err(CoreError::DuplicateDevice {
                mac: record.mac.to_string(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(Arc::clone(&record));
                self.id_index.insert(id, record.mac.clone());
                self.by_mac.remove(&old_mac);
                Ok(record)
            }
        }
    }

    /// Remove the record (base and user extension alike) for `id`.
    pub fn remove(&self, id: DeviceId) -> Option<Arc<Device>> {
        let (_, mac) = self.id_index.remove(&id)?;
        self.by_mac.remove(&mac).map(|(_, device)| device)
    }

    /// All records ordered by id.
    pub fn list(&self) -> Vec<Arc<Device>> {
        let mut devices: Vec<Arc<Device>> =
            self.by_mac.iter().map(|r| Arc::clone(r.value())).collect();
        devices.sort_by_key(|d| d.id);
        devices
    }

    /// Per-mark usage: `(non-whitelisted, whitelisted)` record counts
    /// carrying this mark value.
    pub fn count_for_mark(&self, value: u32) -> (usize, usize) {
        let mut devices = 0;
        let mut whitelisted = 0;
        for r in &self.by_mac {
            if r.value().mark == Some(value) {
                if r.value().whitelisted {
                    whitelisted += 1;
                } else {
                    devices += 1;
                }
            }
        }
        (devices, whitelisted)
    }

    pub fn len(&self) -> usize {
        self.by_mac.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_mac.is_empty()
    }
}
