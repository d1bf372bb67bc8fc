// Export modules for library usage
pub mod analyzer;
pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod directory;
pub mod errors;
pub mod io;
pub mod observability;
pub mod progress;

// Re-export commonly used types
pub use crate::core::{Anomaly, CycleSignature, GroupId, GroupPath, LookupErrorKind, Trail};

pub use crate::analyzer::{
    scan_directory, AnomalySink, LoggingAnomalySink, NestingAnalyzer, RecordingAnomalySink,
    ScanOptions, ScanReport, Scanner, SilentAnomalySink,
};

pub use crate::config::{load_config, GroupnestConfig, ParallelConfig, RetryConfig};

pub use crate::directory::{
    load_snapshot, DirectoryMember, DirectorySource, InMemoryDirectory, MemberKind,
    RetryingDirectory,
};

pub use crate::errors::{ConfigError, DirectoryError, ScanError, SnapshotError};

pub use crate::io::{FailureRecord, ReportOutcome, ReportSink};
