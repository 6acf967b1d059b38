//! Command dispatch: bridges CLI args to daemon calls and output formatting.

pub mod devices;
pub mod marks;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a parsed command to the appropriate handler.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Device(cmd) => devices::handle(cmd, global).await,
        Command::Marks(cmd) => marks::handle(cmd, global),
    }
}
