use super::parallel::ParallelConfig;
use super::retry::RetryConfig;
use crate::core::PATH_SEPARATOR;
use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_MAX_DEPTH: usize = 5;

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

fn default_path_separator() -> String {
    PATH_SEPARATOR.to_string()
}

/// Root configuration, read from `.groupnest.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupnestConfig {
    /// Longest allowed containment chain below a root (default: 5)
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Stop starting new work after this many seconds
    #[serde(default)]
    pub deadline_seconds: Option<u64>,

    #[serde(default)]
    pub parallel: ParallelConfig,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub report: ReportConfig,
}

impl Default for GroupnestConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            deadline_seconds: None,
            parallel: ParallelConfig::default(),
            retry: RetryConfig::default(),
            report: ReportConfig::default(),
        }
    }
}

impl GroupnestConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::invalid("max_depth", "must be at least 1"));
        }
        if self.deadline_seconds == Some(0) {
            return Err(ConfigError::invalid(
                "deadline_seconds",
                "must be at least 1 when set",
            ));
        }
        if !(0.0..=1.0).contains(&self.retry.jitter_factor) {
            return Err(ConfigError::invalid(
                "retry.jitter_factor",
                "must be between 0.0 and 1.0",
            ));
        }
        if self.report.path_separator.is_empty() {
            return Err(ConfigError::invalid(
                "report.path_separator",
                "must not be empty",
            ));
        }
        Ok(())
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_seconds.map(Duration::from_secs)
    }
}

/// Durable failure report format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Csv,
    Json,
}

impl ReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default)]
    pub format: ReportFormat,

    /// Report file; a timestamped name in the working directory when unset
    #[serde(default)]
    pub output: Option<PathBuf>,

    /// Joins groups in the `FullPath` column
    #[serde(default = "default_path_separator")]
    pub path_separator: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: ReportFormat::default(),
            output: None,
            path_separator: default_path_separator(),
        }
    }
}
