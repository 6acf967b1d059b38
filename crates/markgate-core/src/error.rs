// ── Core error types ──
//
// Registry-facing errors. Each variant maps to a stable machine-readable
// code via `error_code()` so the HTTP layer can pick a client-facing
// status without matching on messages.

use thiserror::Error;

use crate::model::DeviceId;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Validation errors ────────────────────────────────────────────
    #[error("invalid MAC address: {value:?}")]
    InvalidMac { value: String },

    #[error("invalid IPv4 address: {value:?}")]
    InvalidIp { value: String },

    // ── Registry errors ──────────────────────────────────────────────
    #[error("device already registered: {mac}")]
    DuplicateDevice { mac: String },

    #[error("no device with id {id}")]
    NotFound { id: DeviceId },

    // ── Mark configuration errors ────────────────────────────────────
    #[error("invalid mark configuration: {reason}")]
    InvalidMark { reason: String },

    // ── Daemon errors ────────────────────────────────────────────────
    #[error("netcontrol failure: {0}")]
    Netcontrol(#[from] markgate_netcontrol::Error),
}

impl CoreError {
    /// Stable error code for the outer API surface.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidMac { .. } | Self::InvalidIp { .. } => "invalid_format",
            Self::DuplicateDevice { .. } => "duplicate_device",
            Self::NotFound { .. } => "not_found",
            Self::InvalidMark { .. } => "invalid_mark",
            Self::Netcontrol(_) => "netcontrol_error",
        }
    }

    /// Returns `true` if the failure came from the daemon rather than
    /// from the caller's input.
    pub fn is_daemon_failure(&self) -> bool {
        matches!(self, Self::Netcontrol(_))
    }
}
