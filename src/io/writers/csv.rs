use crate::io::output::{FailureRecord, ReportSink};
use std::io::Write;

pub const CSV_HEADER: [&str; 3] = ["GroupName", "FullPath", "ErrorDetail"];

/// Writes failure records as RFC 4180 CSV with a header row.
pub struct CsvReportSink<W: Write> {
    writer: W,
}

impl<W: Write> CsvReportSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> ReportSink for CsvReportSink<W> {
    fn write_failures(&mut self, failures: &[FailureRecord]) -> anyhow::Result<()> {
        writeln!(self.writer, "{}", CSV_HEADER.join(","))?;
        for record in failures {
            writeln!(
                self.writer,
                "{},{},{}",
                escape_csv_field(&record.group_name),
                escape_csv_field(&record.full_path),
                escape_csv_field(&record.error_detail)
            )?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

fn escape_csv_field(field: &str) -> String {
    // Group names are user-controlled; keep spreadsheets from evaluating them.
    let first_non_space = field.trim_start_matches([' ', '\t']).chars().next();
    let safe_field = if matches!(first_non_space, Some('=' | '+' | '-' | '@')) {
        format!("'{field}")
    } else {
        field.to_string()
    };

    if safe_field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", safe_field.replace('"', "\"\""))
    } else {
        safe_field
    }
}
