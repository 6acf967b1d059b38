// ── Device domain types ──

use std::fmt;
use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use super::ident::MacAddress;

/// Surrogate device identifier, assigned by the store at creation and
/// immutable for the record's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(pub u64);

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The user-side extension of a device record.
///
/// Present exactly when the device was registered through user
/// authentication; whitelisted devices never carry one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserBinding {
    /// Owning identity. Many devices per user are allowed.
    pub user: String,
    /// Network-assigned IPv4 address of this device.
    pub ip: Ipv4Addr,
    /// Network segment reported by the daemon (e.g. "LAN").
    pub area: String,
}

/// A device allowed on the managed network.
///
/// Base records (whitelisted or not) have no `user` binding and no
/// mark; user devices carry both. The registry is the only writer of
/// the `mark` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    /// Unique identity key, normalized colon-separated lowercase hex.
    pub mac: MacAddress,
    pub name: String,
    /// Whitelisted devices bypass mark-based routing entirely.
    pub whitelisted: bool,
    /// Routing mark steering this device's traffic; set only for user
    /// devices.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mark: Option<u32>,
    #[serde(flatten)]
    pub user: Option<UserBinding>,
}

impl Device {
    /// Whether this record carries the user-device extension.
    pub fn is_user_device(&self) -> bool {
        self.user.is_some()
    }
}

/// Field changes accepted by the registry's update operation. Unset
/// fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct DeviceUpdate {
    pub mac: Option<String>,
    pub name: Option<String>,
    /// Only meaningful for user devices; ignored for base records.
    pub ip: Option<String>,
}
