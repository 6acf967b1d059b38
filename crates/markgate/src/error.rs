//! CLI error types with miette diagnostics.
//!
//! Maps core and daemon errors into user-facing errors with actionable
//! help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use markgate_core::CoreError;
use markgate_netcontrol::Error as NetcontrolError;

/// Exit codes per the CLI contract.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Daemon ───────────────────────────────────────────────────────
    #[error("Could not reach the netcontrol daemon")]
    #[diagnostic(
        code(markgate::daemon_unreachable),
        help(
            "Check that the daemon is running and the socket path is right.\n\
             Override it with --socket or NETCONTROL_SOCKET_FILE."
        )
    )]
    DaemonUnreachable {
        #[source]
        source: NetcontrolError,
    },

    #[error("Daemon request timed out after {seconds}s")]
    #[diagnostic(
        code(markgate::timeout),
        help("Increase the timeout with --timeout or check daemon responsiveness.")
    )]
    Timeout { seconds: u64 },

    #[error("Daemon refused the {action} request")]
    #[diagnostic(code(markgate::refused))]
    Refused { action: &'static str },

    #[error("Daemon protocol error: {message}")]
    #[diagnostic(code(markgate::protocol))]
    Protocol { message: String },

    // ── Input / registry ─────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(markgate::validation))]
    Validation { field: String, reason: String },

    #[error("Device already registered: {mac}")]
    #[diagnostic(code(markgate::duplicate_device))]
    Duplicate { mac: String },

    #[error("Device not found: {id}")]
    #[diagnostic(code(markgate::not_found))]
    NotFound { id: String },

    // ── Marks ────────────────────────────────────────────────────────
    #[error("Invalid mark configuration: {reason}")]
    #[diagnostic(
        code(markgate::invalid_marks),
        help("Priorities must be non-negative, values unique, and the priorities must sum to 1.")
    )]
    InvalidMarks { reason: String },

    // ── Configuration / IO ───────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(code(markgate::config))]
    Config(#[from] markgate_config::ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(markgate::json))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::DaemonUnreachable { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Duplicate { .. } => exit_code::CONFLICT,
            Self::Validation { .. } | Self::InvalidMarks { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

impl From<NetcontrolError> for CliError {
    fn from(err: NetcontrolError) -> Self {
        match err {
            NetcontrolError::Timeout { timeout_secs } => Self::Timeout {
                seconds: timeout_secs,
            },
            NetcontrolError::Refused { action } => Self::Refused { action },
            NetcontrolError::Malformed { ref message, .. } => Self::Protocol {
                message: message.clone(),
            },
            err @ (NetcontrolError::Connect { .. } | NetcontrolError::Io(_)) => {
                Self::DaemonUnreachable { source: err }
            }
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidMac { value } => Self::Validation {
                field: "mac".into(),
                reason: format!("{value:?} is not a MAC address"),
            },
            CoreError::InvalidIp { value } => Self::Validation {
                field: "ip".into(),
                reason: format!("{value:?} is not an IPv4 address"),
            },
            CoreError::DuplicateDevice { mac } => Self::Duplicate { mac },
            CoreError::NotFound { id } => Self::NotFound { id: id.to_string() },
            CoreError::InvalidMark { reason } => Self::InvalidMarks { reason },
            CoreError::Netcontrol(err) => err.into(),
        }
    }
}
