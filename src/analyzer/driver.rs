//! Top-level scan driver.
//!
//! Every group returned by the directory is explored as its own root, not
//! only top-level groups. Each root produces its own anomaly vector; the
//! driver concatenates them in enumeration order, so results are identical
//! whether roots ran sequentially or on a worker pool.

use super::scan_report::ScanReport;
use super::sink::{AnomalySink, SilentAnomalySink};
use super::{NestingAnalyzer, RootScan};
use crate::config::{GroupnestConfig, ParallelConfig, DEFAULT_MAX_DEPTH};
use crate::core::{Anomaly, GroupId};
use crate::directory::DirectorySource;
use crate::errors::ScanError;
use chrono::Utc;
use indicatif::ProgressBar;
use rayon::prelude::*;
use std::time::{Duration, Instant};
use tracing::{debug_span, info};

#[derive(Debug, Clone, PartialEq)]
pub struct ScanOptions {
    pub max_depth: usize,
    pub parallel: ParallelConfig,
    /// Stop starting new roots and expanding new groups after this long.
    pub deadline: Option<Duration>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            parallel: ParallelConfig::default(),
            deadline: None,
        }
    }
}

impl ScanOptions {
    /// Sibling fan-out only runs inside the sized worker pool, so it is off
    /// whenever root parallelism is.
    pub fn parallel_branches(&self) -> bool {
        self.parallel.enabled && self.parallel.parallel_branches
    }

    /// Absolute deadline for a scan that started at `started`. A limit too
    /// large to represent means no deadline.
    pub fn deadline_from(&self, started: Instant) -> Option<Instant> {
        self.deadline.and_then(|limit| started.checked_add(limit))
    }
}

impl From<&GroupnestConfig> for ScanOptions {
    fn from(config: &GroupnestConfig) -> Self {
        Self {
            max_depth: config.max_depth,
            parallel: config.parallel.clone(),
            deadline: config.deadline(),
        }
    }
}

pub struct Scanner<'a, D: DirectorySource> {
    directory: &'a D,
    options: ScanOptions,
    sink: &'a dyn AnomalySink,
    progress: ProgressBar,
}

static SILENT: SilentAnomalySink = SilentAnomalySink;

impl<'a, D: DirectorySource> Scanner<'a, D> {
    pub fn new(directory: &'a D, options: ScanOptions) -> Self {
        Self {
            directory,
            options,
            sink: &SILENT,
            progress: ProgressBar::hidden(),
        }
    }

    pub fn with_sink(mut self, sink: &'a dyn AnomalySink) -> Self {
        self.sink = sink;
        self
    }

    /// Bar advanced once per finished root. Its length is set by [`run`](Self::run).
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Scan every group in the directory.
    ///
    /// # Errors
    ///
    /// [`ScanError::DirectoryUnavailable`] if the group catalog cannot be
    /// listed. Per-group failures never produce an error; they are returned
    /// as anomalies in the report.
    pub fn run(&self) -> Result<ScanReport, ScanError> {
        let started_at = Utc::now();
        let started = Instant::now();

        let roots = self
            .directory
            .list_all_groups()
            .map_err(ScanError::DirectoryUnavailable)?;

        info!(
            groups = roots.len(),
            max_depth = self.options.max_depth,
            parallel = self.options.parallel.enabled,
            "starting nesting scan"
        );

        let analyzer = NestingAnalyzer::new(self.directory, self.options.max_depth)
            .with_sink(self.sink)
            .with_parallel_branches(self.options.parallel_branches())
            .with_deadline(self.options.deadline_from(started));

        self.progress.set_length(roots.len() as u64);

        let per_root: Vec<Option<RootScan>> = if self.options.parallel.enabled {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.options.parallel.effective_concurrency())
                .build()?;
            pool.install(|| {
                roots
                    .par_iter()
                    .map(|root| self.scan_one(&analyzer, root))
                    .collect()
            })
        } else {
            roots
                .iter()
                .map(|root| self.scan_one(&analyzer, root))
                .collect()
        };

        self.progress.finish_and_clear();

        let started_roots: Vec<RootScan> = per_root.into_iter().flatten().collect();
        let roots_scanned = started_roots.len();
        let roots_partial = started_roots.iter().filter(|r| !r.complete).count();
        let anomalies: Vec<Anomaly> = started_roots
            .into_iter()
            .flat_map(|root| root.anomalies)
            .collect();
        let report = ScanReport {
            started_at,
            elapsed_ms: started.elapsed().as_millis() as u64,
            max_depth: self.options.max_depth,
            roots_total: roots.len(),
            roots_scanned,
            roots_partial,
            truncated: analyzer.is_truncated(),
            anomalies,
        };

        info!(
            roots = report.roots_scanned,
            cycles = report.cycle_count(),
            depth_violations = report.depth_violation_count(),
            lookup_failures = report.lookup_failure_count(),
            truncated = report.truncated,
            elapsed_ms = report.elapsed_ms,
            "nesting scan finished"
        );
        Ok(report)
    }

    /// `None` when the deadline passed before this root started.
    fn scan_one(&self, analyzer: &NestingAnalyzer<'_, D>, root: &GroupId) -> Option<RootScan> {
        if analyzer.deadline_passed() {
            analyzer.mark_truncated();
            return None;
        }
        let _span = debug_span!("scan_root", root = %root).entered();
        let scan = analyzer.scan_root_checked(root);
        self.progress.inc(1);
        Some(scan)
    }
}

/// Scan with options from `config` and no notifications or progress.
pub fn scan_directory<D: DirectorySource>(
    directory: &D,
    config: &GroupnestConfig,
) -> Result<ScanReport, ScanError> {
    Scanner::new(directory, ScanOptions::from(config)).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::RecordingAnomalySink;
    use crate::directory::{DirectoryMember, InMemoryDirectory};
    use crate::errors::DirectoryError;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;

    /// Delays every member lookup and records which pool served it.
    struct InstrumentedDirectory {
        inner: InMemoryDirectory,
        delay: Duration,
        /// `(worker index, pool size)` seen by each lookup.
        threads: Mutex<Vec<(Option<usize>, usize)>>,
    }

    impl InstrumentedDirectory {
        fn new(inner: InMemoryDirectory, delay: Duration) -> Self {
            Self {
                inner,
                delay,
                threads: Mutex::new(Vec::new()),
            }
        }

        fn threads(&self) -> Vec<(Option<usize>, usize)> {
            self.threads.lock().clone()
        }
    }

    impl DirectorySource for InstrumentedDirectory {
        fn list_all_groups(&self) -> Result<Vec<GroupId>, DirectoryError> {
            self.inner.list_all_groups()
        }

        fn list_members(&self, group: &GroupId) -> Result<Vec<DirectoryMember>, DirectoryError> {
            self.threads
                .lock()
                .push((rayon::current_thread_index(), rayon::current_num_threads()));
            std::thread::sleep(self.delay);
            self.inner.list_members(group)
        }
    }

    fn standalone_groups(directory: InMemoryDirectory, count: usize) -> InMemoryDirectory {
        (0..count).fold(directory, |dir, i| dir.with_group(&format!("G{i}")))
    }

    fn options(parallel: bool) -> ScanOptions {
        ScanOptions {
            parallel: ParallelConfig {
                enabled: parallel,
                max_concurrency: Some(2),
                parallel_branches: false,
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_every_group_is_a_root() {
        let directory = InMemoryDirectory::from_edges([("A", "B"), ("B", "C")]).with_group("D");

        let report = Scanner::new(&directory, options(false)).run().unwrap();

        assert_eq!(report.roots_total, 4);
        assert_eq!(report.roots_scanned, 4);
        assert!(report.is_clean());
        // A expands A,B,C; B expands B,C; C expands C; D expands D.
        assert_eq!(directory.lookup_count("C"), 3);
        assert_eq!(directory.total_lookups(), 7);
    }

    #[test]
    fn test_cycle_reported_from_each_member_root() {
        let directory = InMemoryDirectory::from_edges([("A", "B"), ("B", "C"), ("C", "A")]);

        let report = Scanner::new(&directory, options(false)).run().unwrap();

        assert_eq!(report.cycle_count(), 3);
        assert_eq!(report.distinct_cycles(), 1);
    }

    #[test]
    fn test_parallel_matches_sequential_order() {
        let directory = InMemoryDirectory::from_edges([
            ("A", "B"),
            ("B", "C"),
            ("C", "A"),
            ("D", "E"),
            ("E", "F"),
            ("F", "G"),
            ("G", "H"),
            ("H", "I"),
            ("I", "J"),
        ])
        .with_child("J", "Ghost");

        let sequential = Scanner::new(&directory, options(false)).run().unwrap();
        let parallel = Scanner::new(&directory, options(true)).run().unwrap();

        assert_eq!(sequential.anomalies, parallel.anomalies);
        assert_eq!(sequential.roots_scanned, parallel.roots_scanned);
    }

    #[test]
    fn test_catalog_failure_is_fatal() {
        let directory = InMemoryDirectory::from_edges([("A", "B")]).unavailable("dc01 refused");

        let error = Scanner::new(&directory, options(false)).run().unwrap_err();

        assert!(matches!(error, ScanError::DirectoryUnavailable(_)));
        assert_eq!(directory.total_lookups(), 0);
    }

    #[test]
    fn test_sink_receives_structural_anomalies() {
        let directory = InMemoryDirectory::from_edges([("A", "A")]).with_child("B", "Ghost");
        let sink = RecordingAnomalySink::new();

        let report = Scanner::new(&directory, options(true))
            .with_sink(&sink)
            .run()
            .unwrap();

        assert_eq!(sink.len(), 1);
        assert_eq!(report.lookup_failure_count(), 1);
    }

    #[test]
    fn test_zero_deadline_skips_all_roots() {
        let directory = InMemoryDirectory::from_edges([("A", "B")]);
        let options = ScanOptions {
            deadline: Some(Duration::ZERO),
            ..options(false)
        };

        let report = Scanner::new(&directory, options).run().unwrap();

        assert!(report.truncated);
        assert_eq!(report.roots_scanned, 0);
        assert_eq!(report.roots_total, 2);
    }

    #[test]
    fn test_deadline_mid_scan_keeps_recorded_anomalies() {
        let graph = standalone_groups(InMemoryDirectory::from_edges([("A", "A")]), 40);
        let directory = InstrumentedDirectory::new(graph, Duration::from_millis(20));
        let options = ScanOptions {
            deadline: Some(Duration::from_millis(150)),
            ..options(false)
        };

        let report = Scanner::new(&directory, options).run().unwrap();

        assert!(report.truncated);
        assert!(report.roots_scanned < report.roots_total);
        assert!(report.roots_completed() >= 1);
        assert!(report.roots_partial <= 1);
        // Root A finished long before the deadline; its cycle survives.
        assert_eq!(
            report.anomalies,
            vec![Anomaly::CircularNesting {
                path: ["A", "A"].into_iter().collect()
            }]
        );
    }

    #[test]
    fn test_root_cut_short_is_counted_as_partial() {
        let edges: Vec<(String, String)> = (0..10)
            .map(|i| ("R".to_string(), format!("C{i}")))
            .collect();
        let graph = InMemoryDirectory::from_edges(
            edges.iter().map(|(p, c)| (p.as_str(), c.as_str())),
        );
        let directory = InstrumentedDirectory::new(graph, Duration::from_millis(20));
        let options = ScanOptions {
            deadline: Some(Duration::from_millis(60)),
            ..options(false)
        };

        let report = Scanner::new(&directory, options).run().unwrap();

        assert!(report.truncated);
        assert_eq!(report.roots_total, 11);
        assert_eq!(report.roots_scanned, 1);
        assert_eq!(report.roots_partial, 1);
        assert_eq!(report.roots_completed(), 0);
        assert!(directory.threads().len() < 11);
    }

    #[test]
    fn test_unrepresentable_deadline_means_no_deadline() {
        let directory = InMemoryDirectory::from_edges([("A", "B"), ("B", "A")]);
        let config = GroupnestConfig {
            deadline_seconds: Some(u64::MAX),
            parallel: ParallelConfig::sequential(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());

        let report = scan_directory(&directory, &config).unwrap();

        assert!(!report.truncated);
        assert_eq!(report.roots_scanned, 2);
        assert_eq!(report.cycle_count(), 2);
        assert_eq!(
            ScanOptions::from(&config).deadline_from(Instant::now()),
            None
        );
    }

    #[test]
    fn test_branches_stay_on_calling_thread_without_parallelism() {
        let graph = InMemoryDirectory::from_edges([("A", "B"), ("A", "C"), ("A", "D")]);
        let directory = InstrumentedDirectory::new(graph, Duration::ZERO);
        let options = ScanOptions {
            parallel: ParallelConfig {
                enabled: false,
                max_concurrency: None,
                parallel_branches: true,
            },
            ..Default::default()
        };
        assert!(!options.parallel_branches());

        Scanner::new(&directory, options).run().unwrap();

        assert!(directory
            .threads()
            .iter()
            .all(|(worker, _)| worker.is_none()));
    }

    #[test]
    fn test_branches_run_inside_sized_pool() {
        let graph = InMemoryDirectory::from_edges([("A", "B"), ("A", "C"), ("A", "D")]);
        let directory = InstrumentedDirectory::new(graph, Duration::ZERO);
        let options = ScanOptions {
            parallel: ParallelConfig {
                enabled: true,
                max_concurrency: Some(2),
                parallel_branches: true,
            },
            ..Default::default()
        };
        assert!(options.parallel_branches());

        Scanner::new(&directory, options).run().unwrap();

        let threads = directory.threads();
        assert_eq!(threads.len(), 4 + 3);
        assert!(threads
            .iter()
            .all(|(worker, size)| worker.is_some() && *size == 2));
    }

    #[test]
    fn test_scan_directory_uses_config_depth() {
        let directory = InMemoryDirectory::from_edges([("A", "B"), ("B", "C")]);
        let config = GroupnestConfig {
            max_depth: 1,
            parallel: ParallelConfig::sequential(),
            ..Default::default()
        };

        let report = scan_directory(&directory, &config).unwrap();

        // [A, B] from root A and [B, C] from root B.
        assert_eq!(report.depth_violation_count(), 2);
    }
}
