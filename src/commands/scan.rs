use crate::analyzer::{LoggingAnomalySink, ScanOptions, ScanReport, Scanner};
use crate::cli::SummaryFormat;
use crate::config::{self, GroupnestConfig, ReportFormat, RetryConfig};
use crate::directory::{load_snapshot, RetryingDirectory};
use crate::io::{
    default_report_path, failure_records, write_failure_report, ReportOutcome, TerminalSummary,
};
use crate::observability::{init_logging, LoggingConfig};
use crate::progress::{ProgressConfig, ProgressManager, TEMPLATE_ROOT_SCAN};
use anyhow::{Context, Result};
use std::io::Write;
use std::path::PathBuf;

/// Options of `groupnest scan`, straight from the command line.
#[derive(Debug, Clone, Default)]
pub struct ScanConfig {
    pub snapshot: PathBuf,
    pub config: Option<PathBuf>,
    pub max_depth: Option<usize>,
    pub jobs: Option<usize>,
    pub no_parallel: bool,
    pub parallel_branches: bool,
    pub deadline: Option<u64>,
    pub report_format: Option<ReportFormat>,
    pub output: Option<PathBuf>,
    pub summary: Option<SummaryFormat>,
    pub no_retry: bool,
    pub quiet: bool,
    pub plain: bool,
    pub log_json: bool,
    pub verbosity: u8,
}

impl ScanConfig {
    /// Command-line values win over the file.
    pub fn apply_overrides(&self, mut base: GroupnestConfig) -> GroupnestConfig {
        if let Some(max_depth) = self.max_depth {
            base.max_depth = max_depth;
        }
        if let Some(deadline) = self.deadline {
            base.deadline_seconds = Some(deadline);
        }
        if let Some(jobs) = self.jobs {
            base.parallel.max_concurrency = Some(jobs);
        }
        if self.no_parallel {
            base.parallel.enabled = false;
        }
        if self.parallel_branches {
            base.parallel.parallel_branches = true;
        }
        if self.no_retry {
            base.retry = RetryConfig::disabled();
        }
        if let Some(format) = self.report_format {
            base.report.format = format;
        }
        if let Some(output) = &self.output {
            base.report.output = Some(output.clone());
        }
        base
    }

    fn base_config(&self) -> Result<GroupnestConfig> {
        match &self.config {
            Some(path) => Ok(config::load_config_from(path)?),
            None => Ok(config::load_config()),
        }
    }

    /// File or discovered config with overrides applied, then validated.
    pub fn resolve(&self) -> Result<GroupnestConfig> {
        let resolved = self.apply_overrides(self.base_config()?);
        resolved.validate()?;
        Ok(resolved)
    }
}

pub fn handle_scan(scan: ScanConfig) -> Result<()> {
    init_logging(&LoggingConfig::from_verbosity(scan.verbosity).with_json(scan.log_json));
    if scan.plain {
        colored::control::set_override(false);
    }

    let settings = scan.resolve()?;
    let manager = ProgressManager::new(ProgressConfig::from_env(scan.quiet, scan.verbosity));

    let spinner = manager.create_spinner("Loading directory snapshot");
    let snapshot = load_snapshot(&scan.snapshot);
    spinner.finish_and_clear();
    let snapshot = snapshot
        .with_context(|| format!("Failed to load snapshot {}", scan.snapshot.display()))?;
    tracing::info!(
        groups = snapshot.group_count(),
        snapshot = %scan.snapshot.display(),
        "loaded directory snapshot"
    );

    let directory = RetryingDirectory::new(snapshot, settings.retry.clone());
    let bar = manager.create_bar(0, TEMPLATE_ROOT_SCAN);
    bar.set_message("Scanning");
    let sink = LoggingAnomalySink::with_progress(bar.clone());

    let report = Scanner::new(&directory, ScanOptions::from(&settings))
        .with_sink(&sink)
        .with_progress(bar)
        .run()?;
    let _ = manager.clear();

    let outcome = publish_failures(&report, &settings)?;

    let stdout = std::io::stdout();
    match scan.summary.unwrap_or(SummaryFormat::Terminal) {
        SummaryFormat::Terminal => {
            TerminalSummary::new(stdout.lock()).write_summary(&report, &outcome)
        }
        SummaryFormat::Json => write_json_summary(stdout.lock(), &report),
    }
}

/// Persist lookup failures of `report`, or report all-clear.
pub fn publish_failures(report: &ScanReport, settings: &GroupnestConfig) -> Result<ReportOutcome> {
    let failures = failure_records(report, &settings.report.path_separator);
    let format = settings.report.format;
    let path = settings
        .report
        .output
        .clone()
        .unwrap_or_else(|| default_report_path(format, report.started_at));

    let outcome = write_failure_report(&failures, format, &path)?;
    if let ReportOutcome::Written { count, path } = &outcome {
        tracing::info!(count, path = %path.display(), "wrote lookup failure report");
    }
    Ok(outcome)
}

fn write_json_summary<W: Write>(mut writer: W, report: &ScanReport) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, report)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
