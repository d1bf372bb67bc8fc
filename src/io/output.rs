//! Durable failure reports.
//!
//! Lookup failures are the only anomalies that need follow-up outside the
//! scan (fix permissions, clean up dangling references), so they are the
//! ones persisted. Each becomes one [`FailureRecord`].

use super::writers::{CsvReportSink, JsonReportSink};
use crate::analyzer::ScanReport;
use crate::config::ReportFormat;
use crate::core::Anomaly;
use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureRecord {
    #[serde(rename = "GroupName")]
    pub group_name: String,
    #[serde(rename = "FullPath")]
    pub full_path: String,
    #[serde(rename = "ErrorDetail")]
    pub error_detail: String,
}

impl FailureRecord {
    /// `None` unless `anomaly` is a lookup failure.
    pub fn from_anomaly(anomaly: &Anomaly, separator: &str) -> Option<Self> {
        match anomaly {
            Anomaly::LookupFailure {
                group,
                path,
                detail,
                ..
            } => Some(Self {
                group_name: group.to_string(),
                full_path: path.render(separator),
                error_detail: detail.clone(),
            }),
            _ => None,
        }
    }
}

/// Lookup failures of `report`, in report order.
pub fn failure_records(report: &ScanReport, separator: &str) -> Vec<FailureRecord> {
    report
        .anomalies
        .iter()
        .filter_map(|anomaly| FailureRecord::from_anomaly(anomaly, separator))
        .collect()
}

/// Receives the final collection of failure records.
pub trait ReportSink {
    fn write_failures(&mut self, failures: &[FailureRecord]) -> anyhow::Result<()>;
}

pub fn create_sink<'a, W: Write + 'a>(
    format: ReportFormat,
    writer: W,
) -> Box<dyn ReportSink + 'a> {
    match format {
        ReportFormat::Csv => Box::new(CsvReportSink::new(writer)),
        ReportFormat::Json => Box::new(JsonReportSink::new(writer)),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportOutcome {
    /// Nothing to report; no file was written.
    AllClear,
    Written { count: usize, path: PathBuf },
}

/// `group_lookup_failures_<YYYYmmdd_HHMMSS>.<ext>`
pub fn default_report_path(format: ReportFormat, at: DateTime<Utc>) -> PathBuf {
    PathBuf::from(format!(
        "group_lookup_failures_{}.{}",
        at.format("%Y%m%d_%H%M%S"),
        format.extension()
    ))
}

/// Write `failures` to `path` in `format`. The file is only created when
/// there is at least one failure.
pub fn write_failure_report(
    failures: &[FailureRecord],
    format: ReportFormat,
    path: &Path,
) -> anyhow::Result<ReportOutcome> {
    if failures.is_empty() {
        return Ok(ReportOutcome::AllClear);
    }

    let file = File::create(path)
        .with_context(|| format!("Failed to create report file {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    create_sink(format, &mut writer).write_failures(failures)?;
    writer
        .flush()
        .with_context(|| format!("Failed to write report file {}", path.display()))?;

    Ok(ReportOutcome::Written {
        count: failures.len(),
        path: path.to_path_buf(),
    })
}
