use crate::io::output::{FailureRecord, ReportSink};
use std::io::Write;

/// Writes failure records as a pretty-printed JSON array.
pub struct JsonReportSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonReportSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> ReportSink for JsonReportSink<W> {
    fn write_failures(&mut self, failures: &[FailureRecord]) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(failures)?;
        self.writer.write_all(json.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}
