//! Error types for groupnest.
//!
//! Library code returns these typed errors; the command layer wraps them in
//! `anyhow` with context. Only [`ScanError`] and snapshot/config load errors
//! ever end a run. Per-group [`DirectoryError`]s are converted into
//! [`Anomaly::LookupFailure`](crate::core::Anomaly) records by the analyzer.

use crate::core::{GroupId, LookupErrorKind};
use std::path::PathBuf;
use thiserror::Error;

/// Failure reported by a [`DirectorySource`](crate::directory::DirectorySource).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    /// The group catalog itself cannot be listed.
    #[error("directory unavailable: {message}")]
    Unavailable { message: String },

    #[error("group not found: {group}")]
    GroupNotFound { group: GroupId },

    #[error("access denied reading members of {group}")]
    AccessDenied { group: GroupId },

    #[error("transient directory error reading {group}: {message}")]
    Transient { group: GroupId, message: String },

    #[error("lookup of {group} timed out after {elapsed_ms}ms")]
    TimedOut { group: GroupId, elapsed_ms: u64 },
}

impl DirectoryError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn not_found(group: impl Into<GroupId>) -> Self {
        Self::GroupNotFound {
            group: group.into(),
        }
    }

    pub fn access_denied(group: impl Into<GroupId>) -> Self {
        Self::AccessDenied {
            group: group.into(),
        }
    }

    pub fn transient(group: impl Into<GroupId>, message: impl Into<String>) -> Self {
        Self::Transient {
            group: group.into(),
            message: message.into(),
        }
    }

    /// Lookup category used in anomaly records.
    ///
    /// `Unavailable` only ever comes from catalog enumeration, but if a
    /// source returns it for a single group it is treated as transient.
    pub fn kind(&self) -> LookupErrorKind {
        match self {
            Self::GroupNotFound { .. } => LookupErrorKind::GroupNotFound,
            Self::AccessDenied { .. } => LookupErrorKind::AccessDenied,
            Self::TimedOut { .. } => LookupErrorKind::TimedOut,
            Self::Transient { .. } | Self::Unavailable { .. } => LookupErrorKind::Transient,
        }
    }

    /// Whether a retry could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Transient { .. } | Self::TimedOut { .. } | Self::Unavailable { .. }
        )
    }
}

/// Fatal scan errors.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Without an initial group list there is nothing to scan.
    #[error("cannot enumerate groups: {0}")]
    DirectoryUnavailable(#[source] DirectoryError),

    #[error("failed to start worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for `{field}`: {message}")]
    Invalid { field: String, message: String },

    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Errors loading a directory snapshot file.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to read snapshot {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported snapshot format `{extension}` (expected json, yaml, yml or toml)")]
    UnsupportedFormat { extension: String },

    #[error("failed to parse snapshot {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("group `{group}` is defined more than once")]
    DuplicateGroup { group: GroupId },
}
