use crate::analyzer::ScanReport;
use crate::io::output::ReportOutcome;
use colored::*;
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use std::io::Write;

/// Human-readable end-of-scan summary.
pub struct TerminalSummary<W: Write> {
    writer: W,
}

impl<W: Write> TerminalSummary<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn write_summary(
        &mut self,
        report: &ScanReport,
        outcome: &ReportOutcome,
    ) -> anyhow::Result<()> {
        writeln!(self.writer)?;
        writeln!(
            self.writer,
            "{}",
            "═══════════════════════════════════════════".blue()
        )?;
        writeln!(
            self.writer,
            "{}",
            "         GROUP NESTING SCAN REPORT".bold().blue()
        )?;
        writeln!(
            self.writer,
            "{}",
            "═══════════════════════════════════════════".blue()
        )?;
        writeln!(self.writer, "{}", summary_table(report))?;

        if report.truncated {
            writeln!(
                self.writer,
                "{} deadline reached: {} of {} groups fully scanned, {} cut short; results are partial",
                "⏱".yellow(),
                report.roots_completed(),
                report.roots_total,
                report.roots_partial
            )?;
        }

        match outcome {
            ReportOutcome::AllClear => writeln!(
                self.writer,
                "{} {}",
                "✓".green(),
                "No lookup failures. Every group's membership was resolved.".green()
            )?,
            ReportOutcome::Written { count, path } => writeln!(
                self.writer,
                "{} {} lookup failure(s) written to {}",
                "⚠".yellow(),
                count,
                path.display()
            )?,
        }
        self.writer.flush()?;
        Ok(())
    }
}

fn count_cell(count: usize) -> Cell {
    let cell = Cell::new(count);
    if count == 0 {
        cell.fg(Color::Green)
    } else {
        cell.fg(Color::Yellow)
    }
}

fn summary_table(report: &ScanReport) -> Table {
    let cycles = match report.distinct_cycles() {
        0 => Cell::new(0).fg(Color::Green),
        distinct => Cell::new(format!(
            "{} ({} distinct)",
            report.cycle_count(),
            distinct
        ))
        .fg(Color::Red),
    };

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Check", "Result"])
        .add_row(vec![
            Cell::new("Groups scanned"),
            Cell::new(format!("{} / {}", report.roots_scanned, report.roots_total)),
        ])
        .add_row(vec![Cell::new("Depth limit"), Cell::new(report.max_depth)])
        .add_row(vec![Cell::new("Circular nesting"), cycles])
        .add_row(vec![
            Cell::new("Depth exceeded"),
            count_cell(report.depth_violation_count()),
        ])
        .add_row(vec![
            Cell::new("Lookup failures"),
            count_cell(report.lookup_failure_count()),
        ])
        .add_row(vec![
            Cell::new("Elapsed"),
            Cell::new(format!("{:.2}s", report.elapsed_ms as f64 / 1000.0)),
        ]);
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Anomaly, GroupId, LookupErrorKind};
    use chrono::Utc;
    use std::path::PathBuf;

    fn report(anomalies: Vec<Anomaly>, truncated: bool) -> ScanReport {
        ScanReport {
            started_at: Utc::now(),
            elapsed_ms: 1250,
            max_depth: 5,
            roots_total: 4,
            roots_scanned: if truncated { 2 } else { 4 },
            roots_partial: usize::from(truncated),
            truncated,
            anomalies,
        }
    }

    fn render(report: &ScanReport, outcome: &ReportOutcome) -> String {
        let mut buffer = Vec::new();
        TerminalSummary::new(&mut buffer)
            .write_summary(report, outcome)
            .unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_all_clear_summary() {
        let output = render(&report(vec![], false), &ReportOutcome::AllClear);

        assert!(output.contains("Groups scanned"));
        assert!(output.contains("4 / 4"));
        assert!(output.contains("No lookup failures"));
        assert!(!output.contains("partial"));
    }

    #[test]
    fn test_written_summary_names_report_file() {
        let failure = Anomaly::LookupFailure {
            group: GroupId::from("Ghost"),
            path: ["Ops", "Ghost"].into_iter().collect(),
            error_kind: LookupErrorKind::GroupNotFound,
            detail: "group Ghost not found".into(),
        };
        let outcome = ReportOutcome::Written {
            count: 1,
            path: PathBuf::from("failures.csv"),
        };

        let output = render(&report(vec![failure], false), &outcome);

        assert!(output.contains("lookup failure(s) written to failures.csv"));
    }

    #[test]
    fn test_truncated_scan_is_flagged() {
        let output = render(&report(vec![], true), &ReportOutcome::AllClear);

        assert!(output.contains("results are partial"));
        assert!(output.contains("2 / 4"));
        assert!(output.contains("1 of 4 groups fully scanned, 1 cut short"));
    }
}
