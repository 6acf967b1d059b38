//! Settings for the markgate gateway.
//!
//! Two documents, two loaders:
//!
//! - Process settings (netcontrol socket, timeouts, paths): TOML file
//!   merged with `MARKGATE_`-prefixed environment variables via
//!   `figment`. The daemon socket additionally honors the plain
//!   `NETCONTROL_SOCKET_FILE` variable used by deployments.
//! - The marks document: JSON `{"marks":[{name,value,priority}]}` at a
//!   well-known path. Absence or a parse failure yields an empty list,
//!   which [`markgate_core::MarkAllocator::load`] turns into the
//!   single-default fallback; a bad marks file must not take the
//!   gateway down.

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info};

use markgate_core::MarkEntry;
use markgate_netcontrol::NetcontrolClient;

/// Default process settings file.
pub const DEFAULT_SETTINGS_FILE: &str = "/etc/markgate/markgate.toml";

/// Default marks document path.
pub const DEFAULT_MARKS_FILE: &str = "/etc/markgate/marks.json";

/// Default netcontrol daemon socket.
pub const DEFAULT_NETCONTROL_SOCKET: &str = "/var/run/markgate-netcontrol.sock";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed marks document: {0}")]
    Marks(#[from] serde_json::Error),

    #[error("settings loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Process settings ────────────────────────────────────────────────

/// Netcontrol daemon connection settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NetcontrolSettings {
    /// Filesystem path of the daemon's Unix socket.
    pub socket: PathBuf,
    /// Round-trip timeout for one daemon exchange.
    pub timeout_secs: u64,
}

impl Default for NetcontrolSettings {
    fn default() -> Self {
        Self {
            socket: DEFAULT_NETCONTROL_SOCKET.into(),
            timeout_secs: 5,
        }
    }
}

/// Top-level process settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub netcontrol: NetcontrolSettings,
    /// Path of the marks document.
    pub marks_file: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            netcontrol: NetcontrolSettings::default(),
            marks_file: DEFAULT_MARKS_FILE.into(),
        }
    }
}

impl Settings {
    /// Load from the default settings file location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(DEFAULT_SETTINGS_FILE)
    }

    /// Load from a specific TOML file, then apply environment
    /// overrides (`MARKGATE_NETCONTROL__SOCKET`, `MARKGATE_MARKS_FILE`,
    /// and the plain `NETCONTROL_SOCKET_FILE`). A missing file is fine;
    /// defaults apply.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let mut settings: Self = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("MARKGATE_").split("__"))
            .extract()?;

        if let Ok(socket) = std::env::var("NETCONTROL_SOCKET_FILE") {
            settings.netcontrol.socket = socket.into();
        }
        Ok(settings)
    }

    /// Build a netcontrol client from these settings.
    pub fn netcontrol_client(&self) -> NetcontrolClient {
        NetcontrolClient::new(&self.netcontrol.socket)
            .with_timeout(Duration::from_secs(self.netcontrol.timeout_secs))
    }
}

// ── Marks document ──────────────────────────────────────────────────

/// On-disk shape of the marks document.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MarksDocument {
    pub marks: Vec<MarkEntry>,
}

/// Read and parse the marks document.
pub fn read_marks(path: impl AsRef<Path>) -> Result<Vec<MarkEntry>, ConfigError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let doc: MarksDocument = serde_json::from_str(&raw)?;
    Ok(doc.marks)
}

/// Load the marks document for startup, degrading to an empty list on
/// any failure so the allocator substitutes its single-default mark.
pub fn load_marks(path: impl AsRef<Path>) -> Vec<MarkEntry> {
    match read_marks(&path) {
        Ok(marks) => {
            info!(
                path = %path.as_ref().display(),
                marks = marks.len(),
                "marks document loaded"
            );
            marks
        }
        Err(err) => {
            error!(
                path = %path.as_ref().display(),
                error = %err,
                "cannot load marks document, the default mark will be used"
            );
            Vec::new()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_apply_without_a_file() {
        figment::Jail::expect_with(|jail| {
            jail.clear_env();
            let settings = Settings::load_from("missing.toml").unwrap();
            assert_eq!(
                settings.netcontrol.socket,
                PathBuf::from(DEFAULT_NETCONTROL_SOCKET)
            );
            assert_eq!(settings.netcontrol.timeout_secs, 5);
            assert_eq!(settings.marks_file, PathBuf::from(DEFAULT_MARKS_FILE));
            Ok(())
        });
    }

    #[test]
    fn toml_file_overrides_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.clear_env();
            jail.create_file(
                "markgate.toml",
                r#"
                marks_file = "/srv/gate/marks.json"

                [netcontrol]
                socket = "/run/gate.sock"
                timeout_secs = 2
                "#,
            )?;
            let settings = Settings::load_from("markgate.toml").unwrap();
            assert_eq!(settings.netcontrol.socket, PathBuf::from("/run/gate.sock"));
            assert_eq!(settings.netcontrol.timeout_secs, 2);
            assert_eq!(settings.marks_file, PathBuf::from("/srv/gate/marks.json"));
            Ok(())
        });
    }

    #[test]
    fn environment_overrides_the_file() {
        figment::Jail::expect_with(|jail| {
            jail.clear_env();
            jail.set_env("MARKGATE_NETCONTROL__TIMEOUT_SECS", "9");
            jail.set_env("NETCONTROL_SOCKET_FILE", "/tmp/netcontrol.sock");
            let settings = Settings::load_from("missing.toml").unwrap();
            assert_eq!(settings.netcontrol.timeout_secs, 9);
            assert_eq!(
                settings.netcontrol.socket,
                PathBuf::from("/tmp/netcontrol.sock")
            );
            Ok(())
        });
    }

    #[test]
    fn marks_document_parses() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"marks":[
                {{"name":"sans vpn","value":100,"priority":0}},
                {{"name":"vpn1","value":101,"priority":0.1}},
                {{"name":"vpn2","value":102,"priority":0.2}},
                {{"name":"vpn3","value":103,"priority":0.7}}
            ]}}"#
        )
        .unwrap();

        let marks = read_marks(file.path()).unwrap();
        assert_eq!(marks.len(), 4);
        assert_eq!(marks[1].value, 101);
        assert!((marks[3].priority - 0.7).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_marks_document_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_marks(dir.path().join("absent.json")).is_empty());
    }

    #[test]
    fn garbage_marks_document_degrades_to_empty() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(load_marks(file.path()).is_empty());
    }
}
