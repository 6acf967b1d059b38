// Netcontrol wire contract
//
// One JSON request, one JSON response, newline-delimited. The request is
// a tagged union on `action`; the response is a flat envelope whose
// optional fields depend on the action that was sent.

use serde::{Deserialize, Serialize};

/// A request message to the netcontrol daemon.
///
/// Serializes as `{"action": "...", ...}` with only the fields the
/// action uses, e.g. `{"action":"register_user","ip":"10.0.3.7"}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Request {
    /// Ask whether a device with this MAC is known/reachable.
    Confirm { mac: String },

    /// Admit a device by its network-assigned IP; the daemon resolves
    /// the real MAC and the physical area the device is plugged into.
    RegisterUser { ip: String },

    /// Apply an identity/metadata change to a known device.
    Update {
        mac: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        new_mac: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        new_name: Option<String>,
    },

    /// Remove a device from active enforcement.
    Deregister { mac: String },
}

impl Request {
    /// Wire name of the action, for logging and refusal diagnostics.
    pub fn action(&self) -> &'static str {
        match self {
            Self::Confirm { .. } => "confirm",
            Self::RegisterUser { .. } => "register_user",
            Self::Update { .. } => "update",
            Self::Deregister { .. } => "deregister",
        }
    }
}

/// The raw response envelope from the daemon.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Response {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
}

/// Successful `confirm` payload. The daemon may acknowledge a base
/// device without reporting any metadata, so both fields are optional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub mac: Option<String>,
    pub area: Option<String>,
}

/// Successful `register_user` payload: the authoritative identity the
/// daemon resolved for the admitted device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admission {
    pub mac: String,
    pub area: String,
}
