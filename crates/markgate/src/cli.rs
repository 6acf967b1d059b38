//! Clap derive structures for the `markgate` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// markgate -- operator tooling for the captive-portal access-control core
#[derive(Debug, Parser)]
#[command(
    name = "markgate",
    version,
    about = "Inspect mark configurations and drive the netcontrol daemon",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Settings file (TOML)
    #[arg(long, env = "MARKGATE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Netcontrol daemon socket (overrides settings)
    #[arg(long, env = "NETCONTROL_SOCKET_FILE", global = true)]
    pub socket: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'o', default_value = "table", global = true)]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Daemon round-trip timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Plain,
}

// ── Command tree ─────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Talk to the netcontrol daemon about a device
    #[command(subcommand)]
    Device(DeviceCommand),

    /// Inspect and validate mark configurations
    #[command(subcommand)]
    Marks(MarksCommand),
}

#[derive(Debug, Subcommand)]
pub enum DeviceCommand {
    /// Ask the daemon whether a device with this MAC is known
    Confirm {
        /// MAC address (aa:bb:cc:dd:ee:ff)
        mac: String,
    },

    /// Admit a device by IP and resolve its MAC and area
    RegisterUser {
        /// IPv4 address assigned to the device
        ip: String,
    },

    /// Apply an identity/metadata change to a known device
    Update {
        /// Current MAC address
        mac: String,

        /// New MAC address
        #[arg(long)]
        new_mac: Option<String>,

        /// New display name
        #[arg(long)]
        new_name: Option<String>,
    },

    /// Remove a device from active enforcement
    Deregister {
        /// MAC address
        mac: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum MarksCommand {
    /// Show the marks document
    List(MarksFileArgs),

    /// Validate the marks document invariants
    Check(MarksFileArgs),

    /// Sample the weighted allocator and show the observed shares
    Draw {
        #[command(flatten)]
        file: MarksFileArgs,

        /// Number of draws
        #[arg(long, short = 'n', default_value = "1000")]
        draws: usize,
    },
}

#[derive(Debug, Args)]
pub struct MarksFileArgs {
    /// Marks document path (defaults to the settings value)
    #[arg(long)]
    pub file: Option<PathBuf>,
}
