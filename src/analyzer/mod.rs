//! Depth- and cycle-aware walk of the group containment graph.
//!
//! [`NestingAnalyzer::explore`] is called once per group reached from a
//! root. At each call, in order:
//!
//! 1. **Cycle check**: the group is already on the trail. Emit
//!    `CircularNesting(path + group)` and stop. This wins over the depth
//!    check.
//! 2. **Depth check**: the trail already holds `max_depth` ancestors. Emit
//!    `DepthExceeded(path + group, max_depth)` and stop. Recursion is
//!    therefore bounded by `max_depth` regardless of graph shape.
//! 3. **Expand**: descend into a new trail, resolve the group's direct
//!    child groups, and explore each child independently. A failed lookup
//!    becomes `LookupFailure(group, path + group, detail)` and stops only
//!    this branch.
//!
//! Each call returns the anomalies of its subtree; parents concatenate
//! their children's results in child order. Nothing is shared between
//! branches except the read-only directory and the notification sink.

pub mod driver;
pub mod scan_report;
pub mod sink;

pub use driver::{scan_directory, ScanOptions, Scanner};
pub use scan_report::ScanReport;
pub use sink::{AnomalySink, LoggingAnomalySink, RecordingAnomalySink, SilentAnomalySink};

use crate::core::{Anomaly, GroupId, Trail};
use crate::directory::DirectorySource;
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

static SILENT: SilentAnomalySink = SilentAnomalySink;

/// Anomalies found below one root.
#[derive(Debug, Clone, PartialEq)]
pub struct RootScan {
    pub anomalies: Vec<Anomaly>,
    /// False when the deadline stopped some expansion below this root.
    pub complete: bool,
}

pub struct NestingAnalyzer<'a, D: DirectorySource> {
    directory: &'a D,
    sink: &'a dyn AnomalySink,
    max_depth: usize,
    parallel_branches: bool,
    deadline: Option<Instant>,
    truncated: AtomicBool,
}

impl<'a, D: DirectorySource> NestingAnalyzer<'a, D> {
    /// `max_depth` must be at least 1.
    pub fn new(directory: &'a D, max_depth: usize) -> Self {
        Self {
            directory,
            sink: &SILENT,
            max_depth,
            parallel_branches: false,
            deadline: None,
            truncated: AtomicBool::new(false),
        }
    }

    pub fn with_sink(mut self, sink: &'a dyn AnomalySink) -> Self {
        self.sink = sink;
        self
    }

    /// Explore sibling child groups on the current rayon pool.
    pub fn with_parallel_branches(mut self, enabled: bool) -> Self {
        self.parallel_branches = enabled;
        self
    }

    /// Stop expanding new groups once `deadline` has passed.
    pub fn with_deadline(mut self, deadline: Option<Instant>) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Whether any work was skipped because the deadline passed.
    pub fn is_truncated(&self) -> bool {
        self.truncated.load(Ordering::Relaxed)
    }

    pub(crate) fn mark_truncated(&self) {
        self.truncated.store(true, Ordering::Relaxed);
    }

    pub fn deadline_passed(&self) -> bool {
        self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// Explore the containment graph below `root`, starting with an empty
    /// trail.
    pub fn scan_root(&self, root: &GroupId) -> Vec<Anomaly> {
        self.scan_root_checked(root).anomalies
    }

    /// Like [`scan_root`](Self::scan_root), also telling whether the deadline
    /// cut the walk short.
    pub fn scan_root_checked(&self, root: &GroupId) -> RootScan {
        let cut = AtomicBool::new(false);
        let anomalies = self.walk(root, &Trail::root(), &cut);
        RootScan {
            anomalies,
            complete: !cut.load(Ordering::Relaxed),
        }
    }

    /// Explore `group`, reached via `trail`. Returns every anomaly found in
    /// the subtree.
    pub fn explore(&self, group: &GroupId, trail: &Trail) -> Vec<Anomaly> {
        self.walk(group, trail, &AtomicBool::new(false))
    }

    fn walk(&self, group: &GroupId, trail: &Trail, cut: &AtomicBool) -> Vec<Anomaly> {
        if trail.contains(group) {
            return vec![self.notify(Anomaly::CircularNesting {
                path: trail.path().with(group.clone()),
            })];
        }

        if trail.depth() >= self.max_depth {
            return vec![self.notify(Anomaly::DepthExceeded {
                path: trail.path().with(group.clone()),
                limit: self.max_depth,
            })];
        }

        if self.deadline_passed() {
            self.mark_truncated();
            cut.store(true, Ordering::Relaxed);
            return Vec::new();
        }

        let trail = trail.descend(group);
        let children = match self.directory.list_child_groups(group) {
            Ok(children) => children,
            Err(error) => {
                tracing::debug!(
                    group = %group,
                    path = %trail.path(),
                    error = %error,
                    "member lookup failed"
                );
                return vec![Anomaly::LookupFailure {
                    group: group.clone(),
                    path: trail.path().clone(),
                    error_kind: error.kind(),
                    detail: error.to_string(),
                }];
            }
        };

        if self.parallel_branches && children.len() > 1 {
            children
                .par_iter()
                .flat_map_iter(|child| self.walk(child, &trail, cut))
                .collect()
        } else {
            children
                .iter()
                .flat_map(|child| self.walk(child, &trail, cut))
                .collect()
        }
    }

    fn notify(&self, anomaly: Anomaly) -> Anomaly {
        self.sink.on_anomaly(&anomaly);
        anomaly
    }
}
