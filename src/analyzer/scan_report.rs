use crate::core::{Anomaly, CycleSignature};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;

/// Outcome of a full scan.
///
/// `anomalies` holds every anomaly from every root, roots in enumeration
/// order and each root's anomalies in traversal order. The same defect seen
/// from several roots appears several times.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: u64,
    pub max_depth: usize,
    pub roots_total: usize,
    /// Roots that were started, whether or not they finished.
    pub roots_scanned: usize,
    /// Started roots whose walk the deadline cut short.
    pub roots_partial: usize,
    /// The deadline passed before all work was done.
    pub truncated: bool,
    pub anomalies: Vec<Anomaly>,
}

impl ScanReport {
    pub fn circular_nesting(&self) -> impl Iterator<Item = &Anomaly> {
        self.anomalies
            .iter()
            .filter(|a| matches!(a, Anomaly::CircularNesting { .. }))
    }

    pub fn depth_violations(&self) -> impl Iterator<Item = &Anomaly> {
        self.anomalies
            .iter()
            .filter(|a| matches!(a, Anomaly::DepthExceeded { .. }))
    }

    pub fn lookup_failures(&self) -> impl Iterator<Item = &Anomaly> {
        self.anomalies
            .iter()
            .filter(|a| matches!(a, Anomaly::LookupFailure { .. }))
    }

    pub fn cycle_count(&self) -> usize {
        self.circular_nesting().count()
    }

    pub fn depth_violation_count(&self) -> usize {
        self.depth_violations().count()
    }

    pub fn lookup_failure_count(&self) -> usize {
        self.lookup_failures().count()
    }

    /// Number of different cycles behind all circular-nesting reports.
    pub fn distinct_cycles(&self) -> usize {
        self.anomalies
            .iter()
            .filter_map(CycleSignature::of)
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Roots whose whole subtree was explored.
    pub fn roots_completed(&self) -> usize {
        self.roots_scanned.saturating_sub(self.roots_partial)
    }

    pub fn is_clean(&self) -> bool {
        self.anomalies.is_empty()
    }
}
