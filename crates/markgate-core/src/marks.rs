//! Routing-mark configuration and weighted allocation.
//!
//! A [`MarkTable`] is an immutable, validated snapshot of the configured
//! marks with a precomputed cumulative distribution. The process-wide
//! active table lives behind an [`MarkAllocator`]'s `ArcSwap`, so reads
//! (every allocation) are lock-free and a `replace` is atomic: an
//! allocation in flight sees either the fully-old or fully-new table.

use std::collections::HashSet;
use std::sync::Arc;

use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::error::CoreError;

/// Mark value of the single-entry fallback configuration.
pub const DEFAULT_MARK: u32 = 100;

/// Tolerance when checking that priorities sum to 1.
const PRIORITY_TOLERANCE: f64 = 1e-9;

/// One configured routing mark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkEntry {
    /// Display label, e.g. "vpn1".
    pub name: String,
    /// Firewall mark value attached to the device's traffic.
    pub value: u32,
    /// Probability weight. Zero is allowed and means "never drawn".
    pub priority: f64,
}

/// A validated, insertion-ordered mark configuration snapshot.
#[derive(Debug, Clone)]
pub struct MarkTable {
    entries: Vec<MarkEntry>,
    /// cumulative[i] = sum of priorities of entries[..=i].
    cumulative: Vec<f64>,
}

impl MarkTable {
    /// Validate `entries` and precompute the cumulative distribution.
    ///
    /// Rejects empty tables, non-finite or negative priorities,
    /// duplicate mark values, and priority sums different from 1
    /// (within 1e-9).
    pub fn new(entries: Vec<MarkEntry>) -> Result<Self, CoreError> {
        if entries.is_empty() {
            return Err(invalid("no marks configured"));
        }

        let mut seen = HashSet::new();
        for entry in &entries {
            if !entry.priority.is_finite() || entry.priority < 0.0 {
                return Err(invalid(format!(
                    "mark {} has priority {}, expected a non-negative number",
                    entry.value, entry.priority
                )));
            }
            if !seen.insert(entry.value) {
                return Err(invalid(format!("duplicate mark value {}", entry.value)));
            }
        }

        let mut cumulative = Vec::with_capacity(entries.len());
        let mut sum = 0.0f64;
        for entry in &entries {
            sum += entry.priority;
            cumulative.push(sum);
        }
        if (sum - 1.0).abs() > PRIORITY_TOLERANCE {
            return Err(invalid(format!("priorities sum to {sum}, expected 1")));
        }

        Ok(Self { entries, cumulative })
    }

    /// The single safe default configuration: one mark, priority 1.
    pub fn fallback() -> Self {
        Self {
            entries: vec![MarkEntry {
                name: "default".into(),
                value: DEFAULT_MARK,
                priority: 1.0,
            }],
            cumulative: vec![1.0],
        }
    }

    /// Configured entries, in insertion order.
    pub fn entries(&self) -> &[MarkEntry] {
        &self.entries
    }

    /// Select the mark for a uniform draw `r` in `[0, 1)`: the first
    /// entry whose cumulative mass strictly exceeds `r`. Rounding at
    /// the top of the range falls back to the last entry, so a mark is
    /// always returned.
    pub fn pick(&self, r: f64) -> u32 {
        for (entry, cum) in self.entries.iter().zip(&self.cumulative) {
            if *cum > r {
                return entry.value;
            }
        }
        self.entries.last().map_or(DEFAULT_MARK, |e| e.value)
    }
}

/// Holder of the active mark configuration, shared process-wide.
///
/// Reads go through a lock-free `ArcSwap` snapshot; `replace` swaps the
/// whole table at once.
#[derive(Debug)]
pub struct MarkAllocator {
    active: ArcSwap<MarkTable>,
}

impl MarkAllocator {
    /// Bootstrap from startup configuration. An invalid table is
    /// logged and substituted with the single-default fallback, since
    /// the gateway must stay operational with a bad settings file.
    pub fn load(entries: Vec<MarkEntry>) -> Self {
        let table = match MarkTable::new(entries) {
            Ok(table) => {
                info!(marks = table.entries().len(), "mark configuration loaded");
                table
            }
            Err(err) => {
                error!(error = %err, "invalid mark configuration, falling back to single default mark");
                MarkTable::fallback()
            }
        };
        Self::from_table(table)
    }

    /// Start from the single-default fallback table.
    pub fn fallback() -> Self {
        Self::from_table(MarkTable::fallback())
    }

    fn from_table(table: MarkTable) -> Self {
        Self {
            active: ArcSwap::from_pointee(table),
        }
    }

    /// Administrative replacement of the active configuration. On
    /// validation failure the prior table is left untouched and the
    /// error is returned to the caller, with no silent fallback on this
    /// path.
    pub fn replace(&self, entries: Vec<MarkEntry>) -> Result<(), CoreError> {
        let table = MarkTable::new(entries)?;
        info!(marks = table.entries().len(), "mark configuration replaced");
        self.active.store(Arc::new(table));
        Ok(())
    }

    /// Snapshot of the active table.
    pub fn current(&self) -> Arc<MarkTable> {
        self.active.load_full()
    }

    /// Draw a mark from the active configuration.
    pub fn allocate(&self) -> u32 {
        self.current().pick(rand::random::<f64>())
    }
}

fn invalid(reason: impl Into<String>) -> CoreError {
    CoreError::InvalidMark {
        reason: reason.into(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn entry(name: &str, value: u32, priority: f64) -> MarkEntry {
        MarkEntry {
            name: name.into(),
            value,
            priority,
        }
    }

    fn vpn_pool() -> Vec<MarkEntry> {
        vec![
            entry("sans vpn", 100, 0.0),
            entry("vpn1", 101, 0.1),
            entry("vpn2", 102, 0.2),
            entry("vpn3", 103, 0.7),
        ]
    }

    #[test]
    fn pick_walks_cumulative_mass() {
        let table = MarkTable::new(vpn_pool()).unwrap();
        assert_eq!(table.pick(0.06), 101);
        assert_eq!(table.pick(0.14), 102);
        assert_eq!(table.pick(0.86), 103);
    }

    #[test]
    fn zero_priority_mark_is_never_drawn() {
        let table = MarkTable::new(vpn_pool()).unwrap();
        for i in 1..=100u32 {
            let r = f64::from(i) / 100.0;
            assert_ne!(table.pick(r), 100, "r={r} drew the zero-priority mark");
        }
    }

    #[test]
    fn rounding_at_the_top_returns_last_entry() {
        let table = MarkTable::new(vpn_pool()).unwrap();
        assert_eq!(table.pick(1.0), 103);
    }

    #[test]
    fn sum_not_one_is_rejected() {
        let err = MarkTable::new(vec![entry("a", 102, 0.3), entry("b", 103, 0.6)]).unwrap_err();
        assert!(matches!(err, CoreError::InvalidMark { .. }));
        assert_eq!(err.error_code(), "invalid_mark");
    }

    #[test]
    fn duplicate_value_is_rejected() {
        let err = MarkTable::new(vec![entry("a", 102, 0.5), entry("b", 102, 0.5)]).unwrap_err();
        assert!(matches!(err, CoreError::InvalidMark { .. }));
    }

    #[test]
    fn negative_priority_is_rejected() {
        let err = MarkTable::new(vec![entry("a", 102, -0.5), entry("b", 103, 1.5)]).unwrap_err();
        assert!(matches!(err, CoreError::InvalidMark { .. }));
    }

    #[test]
    fn load_falls_back_to_single_default() {
        let allocator = MarkAllocator::load(vec![entry("a", 102, 0.3)]);
        let table = allocator.current();
        assert_eq!(table.entries().len(), 1);
        assert_eq!(table.entries()[0].value, DEFAULT_MARK);
        assert_eq!(allocator.allocate(), DEFAULT_MARK);
    }

    #[test]
    fn replace_keeps_prior_table_on_failure() {
        let allocator = MarkAllocator::load(vpn_pool());
        let err = allocator
            .replace(vec![entry("a", 102, 0.3), entry("b", 103, 0.6)])
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidMark { .. }));
        assert_eq!(allocator.current().entries().len(), 4);
    }

    #[test]
    fn replace_swaps_the_whole_table() {
        let allocator = MarkAllocator::load(vpn_pool());
        let snapshot = allocator.current();
        allocator
            .replace(vec![entry("only", 42, 1.0)])
            .unwrap();
        // The old snapshot is untouched; new reads see the new table.
        assert_eq!(snapshot.entries().len(), 4);
        assert_eq!(allocator.current().entries().len(), 1);
        assert_eq!(allocator.allocate(), 42);
    }

    #[test]
    fn allocate_only_returns_configured_values() {
        let allocator = MarkAllocator::load(vpn_pool());
        for _ in 0..200 {
            let mark = allocator.allocate();
            assert!((101..=103).contains(&mark));
        }
    }
}
