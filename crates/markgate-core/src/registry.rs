//! The device registry: the aggregate access-control service.
//!
//! Every operation follows the same shape: validate the caller's input,
//! get the firewall daemon to acknowledge the change, then commit local
//! state. The daemon is the source of truth for MAC/area resolution and
//! must answer before any record is written, so the registry cannot
//! drift ahead of actual enforcement. A daemon failure aborts the
//! operation with no partial local state.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::CoreError;
use crate::marks::{MarkAllocator, MarkEntry};
use crate::model::{Device, DeviceId, DeviceUpdate, MacAddress, UserBinding, parse_ipv4};
use crate::names::{NameGenerator, RandomNameGenerator};
use crate::netcontrol::Netcontrol;
use crate::store::DeviceStore;

/// One mark of the active configuration with its live device usage,
/// as reported by [`DeviceRegistry::list_marks`].
#[derive(Debug, Clone, Serialize)]
pub struct MarkStatus {
    pub name: String,
    pub value: u32,
    pub priority: f64,
    /// Non-whitelisted devices currently carrying this mark.
    pub devices: usize,
    /// Whitelisted devices currently carrying this mark.
    pub whitelisted: usize,
}

/// Registry of devices allowed on the managed network.
///
/// Generic over the [`Netcontrol`] capability so tests can substitute a
/// fake daemon for the socket client.
pub struct DeviceRegistry<N> {
    netcontrol: N,
    store: DeviceStore,
    marks: MarkAllocator,
    names: Arc<dyn NameGenerator>,
}

impl<N: Netcontrol> DeviceRegistry<N> {
    pub fn new(netcontrol: N, marks: MarkAllocator) -> Self {
        Self {
            netcontrol,
            store: DeviceStore::new(),
            marks,
            names: Arc::new(RandomNameGenerator),
        }
    }

    /// Replace the name generator (tests pin it to a fixed source).
    pub fn with_name_generator(mut self, names: Arc<dyn NameGenerator>) -> Self {
        self.names = names;
        self
    }

    /// The active mark configuration holder.
    pub fn marks(&self) -> &MarkAllocator {
        &self.marks
    }

    // ── Create ───────────────────────────────────────────────────────

    /// Register a base (non-user) device by MAC. Whitelisted devices
    /// bypass mark-based routing and never receive a mark.
    pub async fn create_device(
        &self,
        mac: &str,
        name: Option<&str>,
        whitelisted: bool,
    ) -> Result<Arc<Device>, CoreError> {
        let mac = MacAddress::parse(mac)?;
        // Cheap pre-check before the daemon round-trip; the store's
        // entry API re-checks atomically at insert.
        if self.store.contains_mac(&mac) {
            return Err(CoreError::DuplicateDevice {
                mac: mac.to_string(),
            });
        }

        self.netcontrol.confirm(mac.as_str()).await?;

        let name = self.resolve_name(name);
        let device = self.store.insert_with(mac.clone(), |id| Device {
            id,
            mac,
            name,
            whitelisted,
            mark: None,
            user: None,
        })?;
        info!(id = %device.id, mac = %device.mac, whitelisted, "device registered");
        Ok(device)
    }

    /// Register a device for an authenticated user by its
    /// network-assigned IP. The daemon resolves the authoritative MAC
    /// and area; uniqueness is checked against that resolved MAC, not
    /// the caller's input.
    pub async fn create_user_device(
        &self,
        user: &str,
        ip: &str,
        name: Option<&str>,
    ) -> Result<Arc<Device>, CoreError> {
        let ip = parse_ipv4(ip)?;

        let admission = self.netcontrol.register_user(&ip.to_string()).await?;
        let mac = MacAddress::parse(&admission.mac)?;
        if self.store.contains_mac(&mac) {
            return Err(CoreError::DuplicateDevice {
                mac: mac.to_string(),
            });
        }

        let name = self.resolve_name(name);
        let mark = self.marks.allocate();
        let area = admission.area;
        let user = user.to_owned();
        let device = self.store.insert_with(mac.clone(), |id| Device {
            id,
            mac,
            name,
            whitelisted: false,
            mark: Some(mark),
            user: Some(UserBinding { user, ip, area }),
        })?;
        info!(id = %device.id, mac = %device.mac, mark, "user device registered");
        Ok(device)
    }

    // ── Read ─────────────────────────────────────────────────────────

    pub fn get_device(&self, id: DeviceId) -> Result<Arc<Device>, CoreError> {
        self.store.get(id).ok_or(CoreError::NotFound { id })
    }

    /// All device records, ordered by id.
    pub fn list_devices(&self) -> Vec<Arc<Device>> {
        self.store.list()
    }

    // ── Update ───────────────────────────────────────────────────────

    /// Apply field changes to an existing device. A MAC change is
    /// validated, checked for uniqueness, and acknowledged by the
    /// daemon before anything is committed locally.
    pub async fn update_device(
        &self,
        id: DeviceId,
        update: DeviceUpdate,
    ) -> Result<Arc<Device>, CoreError> {
        let current = self.get_device(id)?;

        // Validate everything before the daemon call.
        let new_mac = match update.mac.as_deref() {
            Some(raw) => {
                let mac = MacAddress::parse(raw)?;
                (mac != current.mac).then_some(mac)
            }
            None => None,
        };
        let new_ip = match update.ip.as_deref() {
            Some(raw) => {
                let ip = parse_ipv4(raw)?;
                if current.user.is_none() {
                    warn!(id = %id, "ignoring ip update for device without a user binding");
                    None
                } else {
                    Some(ip)
                }
            }
            None => None,
        };

        if let Some(mac) = &new_mac {
            if self.store.contains_mac(mac) {
                return Err(CoreError::DuplicateDevice {
                    mac: mac.to_string(),
                });
            }
            self.netcontrol
                .update(current.mac.as_str(), Some(mac.as_str()), update.name.as_deref())
                .await?;
        }

        let mut updated = (*current).clone();
        if let Some(mac) = new_mac {
            updated.mac = mac;
        }
        if let Some(name) = update.name {
            updated.name = name;
        }
        if let Some(ip) = new_ip {
            if let Some(binding) = &mut updated.user {
                binding.ip = ip;
            }
        }

        let device = self.store.commit(id, updated)?;
        debug!(id = %id, mac = %device.mac, "device updated");
        Ok(device)
    }

    // ── Delete ───────────────────────────────────────────────────────

    /// Remove a device. The daemon deregisters it from enforcement
    /// first; the local record (base and user extension alike) is only
    /// removed after that succeeds.
    pub async fn delete_device(&self, id: DeviceId) -> Result<(), CoreError> {
        let device = self.get_device(id)?;
        self.netcontrol.deregister(device.mac.as_str()).await?;
        self.store.remove(id);
        info!(id = %id, mac = %device.mac, "device removed");
        Ok(())
    }

    // ── Marks ────────────────────────────────────────────────────────

    /// The active mark configuration with live per-mark device counts.
    pub fn list_marks(&self) -> Vec<MarkStatus> {
        self.marks
            .current()
            .entries()
            .iter()
            .map(|entry| {
                let (devices, whitelisted) = self.store.count_for_mark(entry.value);
                MarkStatus {
                    name: entry.name.clone(),
                    value: entry.value,
                    priority: entry.priority,
                    devices,
                    whitelisted,
                }
            })
            .collect()
    }

    /// Administrative replacement of the mark configuration. Fails with
    /// `InvalidMark` and keeps the prior configuration on violation.
    pub fn replace_marks(&self, entries: Vec<MarkEntry>) -> Result<(), CoreError> {
        self.marks.replace(entries)
    }

    fn resolve_name(&self, name: Option<&str>) -> String {
        match name {
            Some(name) => name.to_owned(),
            None => self.names.generate(),
        }
    }
}
