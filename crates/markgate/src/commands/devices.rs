//! Device command handlers: one daemon round trip per invocation.

use std::time::Duration;

use serde::Serialize;
use tabled::Tabled;

use markgate_config::Settings;
use markgate_core::{validate_ipv4, validate_mac};
use markgate_netcontrol::NetcontrolClient;

use crate::cli::{DeviceCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

// ── Output shapes ───────────────────────────────────────────────────

#[derive(Serialize, Tabled)]
struct ConfirmRow {
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "Area")]
    area: String,
    #[tabled(rename = "Known")]
    known: bool,
}

#[derive(Serialize, Tabled)]
struct AdmissionRow {
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "Area")]
    area: String,
}

fn confirm_detail(row: &ConfirmRow) -> String {
    [
        format!("MAC:   {}", row.mac),
        format!("Area:  {}", row.area),
        format!("Known: {}", row.known),
    ]
    .join("\n")
}

fn admission_detail(row: &AdmissionRow) -> String {
    [format!("MAC:  {}", row.mac), format!("Area: {}", row.area)].join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(cmd: DeviceCommand, global: &GlobalOpts) -> Result<(), CliError> {
    let client = build_client(global)?;

    match cmd {
        DeviceCommand::Confirm { mac } => {
            validate_mac(&mac)?;
            let confirmation = client.confirm(&mac).await?;
            let row = ConfirmRow {
                mac: confirmation.mac.unwrap_or(mac),
                area: confirmation.area.unwrap_or_else(|| "-".into()),
                known: true,
            };
            let rendered =
                output::render_single(&global.output, &row, confirm_detail, |r| r.mac.clone());
            output::print_output(&rendered, global.quiet);
        }

        DeviceCommand::RegisterUser { ip } => {
            validate_ipv4(&ip)?;
            let admission = client.register_user(&ip).await?;
            let row = AdmissionRow {
                mac: admission.mac,
                area: admission.area,
            };
            let rendered =
                output::render_single(&global.output, &row, admission_detail, |r| r.mac.clone());
            output::print_output(&rendered, global.quiet);
        }

        DeviceCommand::Update {
            mac,
            new_mac,
            new_name,
        } => {
            validate_mac(&mac)?;
            if let Some(ref new_mac) = new_mac {
                validate_mac(new_mac)?;
            }
            if new_mac.is_none() && new_name.is_none() {
                return Err(CliError::Validation {
                    field: "update".into(),
                    reason: "nothing to change, pass --new-mac and/or --new-name".into(),
                });
            }
            let resulting = client
                .update(&mac, new_mac.as_deref(), new_name.as_deref())
                .await?;
            output::print_output(&format!("updated, device is now {resulting}"), global.quiet);
        }

        DeviceCommand::Deregister { mac } => {
            validate_mac(&mac)?;
            client.deregister(&mac).await?;
            output::print_output(&format!("deregistered {mac}"), global.quiet);
        }
    }

    Ok(())
}

// ── Client construction ─────────────────────────────────────────────

/// Build the daemon client from settings, applying `--socket` and
/// `--timeout` overrides on top.
fn build_client(global: &GlobalOpts) -> Result<NetcontrolClient, CliError> {
    let settings = match &global.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };

    let socket = global
        .socket
        .clone()
        .unwrap_or(settings.netcontrol.socket);
    let timeout = global.timeout.unwrap_or(settings.netcontrol.timeout_secs);

    tracing::debug!(socket = %socket.display(), timeout_secs = timeout, "netcontrol client");
    Ok(NetcontrolClient::new(socket).with_timeout(Duration::from_secs(timeout)))
}
