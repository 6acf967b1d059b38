// Netcontrol socket client
//
// Thin synchronous request/response exchange over a Unix domain socket:
// connect, write one newline-terminated JSON request, read one JSON
// reply. Concurrency is handled by independent connections per call,
// not by pipelining, so the client itself carries no connection state.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;
use tracing::{debug, trace};

use crate::error::Error;
use crate::protocol::{Admission, Confirmation, Request, Response};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Client for the firewall-control daemon's local RPC endpoint.
///
/// Cheap to clone; every call opens its own connection, so a single
/// client can be shared across tasks without serializing calls.
#[derive(Debug, Clone)]
pub struct NetcontrolClient {
    socket_path: PathBuf,
    timeout: Duration,
}

impl NetcontrolClient {
    /// Create a client for the daemon socket at `socket_path` with the
    /// default round-trip timeout.
    pub fn new(socket_path: impl Into<PathBuf>) -> Self {
        Self {
            socket_path: socket_path.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the round-trip timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The daemon socket path this client talks to.
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    // ── Typed operations ─────────────────────────────────────────────

    /// Ask the daemon whether a device with this MAC is known/reachable.
    pub async fn confirm(&self, mac: &str) -> Result<Confirmation, Error> {
        let resp = self.call(Request::Confirm { mac: mac.to_owned() }).await?;
        Ok(Confirmation {
            mac: resp.mac,
            area: resp.area,
        })
    }

    /// Admit a device by IP; returns the daemon-resolved MAC and area.
    pub async fn register_user(&self, ip: &str) -> Result<Admission, Error> {
        let resp = self
            .call(Request::RegisterUser { ip: ip.to_owned() })
            .await?;
        let mac = resp
            .mac
            .ok_or_else(|| malformed("register_user reply lacks mac"))?;
        let area = resp
            .area
            .ok_or_else(|| malformed("register_user reply lacks area"))?;
        Ok(Admission { mac, area })
    }

    /// Apply an identity/metadata change; returns the resulting MAC.
    pub async fn update(
        &self,
        mac: &str,
        new_mac: Option<&str>,
        new_name: Option<&str>,
    ) -> Result<String, Error> {
        let resp = self
            .call(Request::Update {
                mac: mac.to_owned(),
                new_mac: new_mac.map(str::to_owned),
                new_name: new_name.map(str::to_owned),
            })
            .await?;
        resp.mac.ok_or_else(|| malformed("update reply lacks mac"))
    }

    /// Remove a device from active enforcement.
    pub async fn deregister(&self, mac: &str) -> Result<(), Error> {
        self.call(Request::Deregister { mac: mac.to_owned() })
            .await?;
        Ok(())
    }

    // ── Exchange primitives ──────────────────────────────────────────

    /// Perform one raw request/response exchange without interpreting
    /// the `success` flag. Most callers want the typed operations.
    pub async fn query(&self, request: &Request) -> Result<Response, Error> {
        debug!(action = request.action(), "netcontrol query");
        tokio::time::timeout(self.timeout, self.round_trip(request))
            .await
            .map_err(|_| Error::Timeout {
                timeout_secs: self.timeout.as_secs(),
            })?
    }

    async fn call(&self, request: Request) -> Result<Response, Error> {
        let action = request.action();
        let resp = self.query(&request).await?;
        if !resp.success {
            return Err(Error::Refused { action });
        }
        Ok(resp)
    }

    async fn round_trip(&self, request: &Request) -> Result<Response, Error> {
        let stream = UnixStream::connect(&self.socket_path)
            .await
            .map_err(|source| Error::Connect {
                path: self.socket_path.display().to_string(),
                source,
            })?;
        let (read_half, mut write_half) = stream.into_split();

        let mut payload = serde_json::to_vec(request).map_err(|e| Error::Malformed {
            message: format!("request encoding failed: {e}"),
            body: String::new(),
        })?;
        payload.push(b'\n');
        write_half.write_all(&payload).await?;
        write_half.flush().await?;

        let mut line = String::new();
        BufReader::new(read_half).read_line(&mut line).await?;
        trace!(reply = line.trim(), "netcontrol reply");
        if line.trim().is_empty() {
            return Err(malformed("daemon closed the connection without replying"));
        }
        serde_json::from_str(&line).map_err(|e| Error::Malformed {
            message: e.to_string(),
            body: line.trim().to_owned(),
        })
    }
}

fn malformed(message: &str) -> Error {
    Error::Malformed {
        message: message.to_owned(),
        body: String::new(),
    }
}
