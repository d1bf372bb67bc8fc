pub mod csv;
pub mod json;
pub mod terminal;

pub use self::csv::CsvReportSink;
pub use json::JsonReportSink;
pub use terminal::TerminalSummary;
