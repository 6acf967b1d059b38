//! Marks command handlers: inspect, validate, and sample the weighted
//! mark configuration without touching the daemon.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;
use tabled::Tabled;

use markgate_config::Settings;
use markgate_core::{MarkAllocator, MarkEntry, MarkTable};

use crate::cli::{GlobalOpts, MarksCommand, MarksFileArgs};
use crate::error::CliError;
use crate::output;

// ── Output shapes ───────────────────────────────────────────────────

#[derive(Serialize, Tabled)]
struct MarkRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Value")]
    value: u32,
    #[tabled(rename = "Priority")]
    priority: f64,
}

impl From<&MarkEntry> for MarkRow {
    fn from(entry: &MarkEntry) -> Self {
        Self {
            name: entry.name.clone(),
            value: entry.value,
            priority: entry.priority,
        }
    }
}

#[derive(Serialize, Tabled, Clone)]
struct DrawRow {
    #[tabled(rename = "Value")]
    value: u32,
    #[tabled(rename = "Draws")]
    draws: usize,
    #[tabled(rename = "Share")]
    share: String,
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(cmd: MarksCommand, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        MarksCommand::List(file) => {
            let entries = load_entries(file, global)?;
            let rendered = output::render_list(&global.output, &entries, |e| MarkRow::from(e), |e| {
                e.value.to_string()
            });
            output::print_output(&rendered, global.quiet);
        }

        MarksCommand::Check(file) => {
            let entries = load_entries(file, global)?;
            let table = MarkTable::new(entries)?;
            output::print_output(
                &format!("ok: {} marks, priorities sum to 1", table.entries().len()),
                global.quiet,
            );
        }

        MarksCommand::Draw { file, draws } => {
            let entries = load_entries(file, global)?;
            let allocator = MarkAllocator::fallback();
            allocator.replace(entries)?;

            let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
            for _ in 0..draws {
                *counts.entry(allocator.allocate()).or_insert(0) += 1;
            }

            #[allow(clippy::cast_precision_loss)]
            let rows: Vec<DrawRow> = counts
                .into_iter()
                .map(|(value, count)| DrawRow {
                    value,
                    draws: count,
                    share: format!("{:.1}%", 100.0 * count as f64 / draws as f64),
                })
                .collect();
            let rendered =
                output::render_list(&global.output, &rows, DrawRow::clone, |r| {
                    r.value.to_string()
                });
            output::print_output(&rendered, global.quiet);
        }
    }

    Ok(())
}

// ── Document loading ────────────────────────────────────────────────

/// Resolve the marks document path from `--file` or the settings, then
/// read and parse it. Unlike gateway startup this does not degrade on
/// failure, operators asked about this file explicitly.
fn load_entries(file: MarksFileArgs, global: &GlobalOpts) -> Result<Vec<MarkEntry>, CliError> {
    let path: PathBuf = match file.file {
        Some(path) => path,
        None => {
            let settings = match &global.config {
                Some(path) => Settings::load_from(path)?,
                None => Settings::load()?,
            };
            settings.marks_file
        }
    };
    Ok(markgate_config::read_marks(path)?)
}
