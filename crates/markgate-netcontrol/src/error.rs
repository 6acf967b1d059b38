use thiserror::Error;

/// Top-level error type for the `markgate-netcontrol` crate.
///
/// Covers every failure mode of a daemon round-trip: the socket being
/// unreachable, the exchange timing out, the daemon rejecting the request
/// (`success: false`), and replies the client cannot parse.
/// `markgate-core` maps these into its own registry-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// Could not connect to the daemon socket.
    #[error("netcontrol daemon unreachable at {path}: {source}")]
    Connect {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// IO error during an established exchange.
    #[error("netcontrol IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The full request/response round-trip exceeded the configured timeout.
    #[error("netcontrol request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Protocol ────────────────────────────────────────────────────
    /// The daemon answered with `success: false`.
    #[error("netcontrol daemon refused {action} request")]
    Refused { action: &'static str },

    /// The reply was not valid JSON, or lacked a field the action requires.
    /// Carries the raw body for debugging.
    #[error("malformed netcontrol reply: {message}")]
    Malformed { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Connect { .. } | Self::Io(_) | Self::Timeout { .. })
    }

    /// Returns `true` if the daemon explicitly rejected the request.
    pub fn is_refused(&self) -> bool {
        matches!(self, Self::Refused { .. })
    }
}
