//! Report output: failure files and the terminal summary.

pub mod output;
pub mod writers;

pub use output::{
    create_sink, default_report_path, failure_records, write_failure_report, FailureRecord,
    ReportOutcome, ReportSink,
};
pub use writers::{CsvReportSink, JsonReportSink, TerminalSummary};
