//! Directory snapshot files.
//!
//! A snapshot is an offline export of every group and its direct members.
//! The format is chosen by file extension:
//!
//! ```json
//! {
//!   "groups": [
//!     { "id": "Tier0 Admins", "members": [ { "id": "Helpdesk" }, { "id": "alice", "kind": "user" } ] },
//!     { "id": "Helpdesk", "access_denied": true },
//!     { "id": "Branch Office", "transient_failures": 1 }
//!   ]
//! }
//! ```

use super::{DirectoryMember, InMemoryDirectory};
use crate::core::GroupId;
use crate::errors::{DirectoryError, SnapshotError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    Json,
    Yaml,
    Toml,
}

impl SnapshotFormat {
    pub fn from_path(path: &Path) -> Result<Self, SnapshotError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            "toml" => Ok(Self::Toml),
            _ => Err(SnapshotError::UnsupportedFormat { extension }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectorySnapshot {
    #[serde(default)]
    pub groups: Vec<SnapshotGroup>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotGroup {
    pub id: String,
    /// The exporting account could not read this group's members.
    #[serde(default)]
    pub access_denied: bool,
    /// Lookups that time out before the group answers, as seen during export.
    #[serde(default)]
    pub transient_failures: usize,
    #[serde(default)]
    pub members: Vec<DirectoryMember>,
}

impl DirectorySnapshot {
    pub fn parse(contents: &str, format: SnapshotFormat) -> Result<Self, String> {
        match format {
            SnapshotFormat::Json => serde_json::from_str(contents).map_err(|e| e.to_string()),
            SnapshotFormat::Yaml => serde_yaml::from_str(contents).map_err(|e| e.to_string()),
            SnapshotFormat::Toml => toml::from_str(contents).map_err(|e| e.to_string()),
        }
    }

    /// Build the directory the snapshot describes.
    pub fn into_directory(self) -> Result<InMemoryDirectory, SnapshotError> {
        let mut seen = HashSet::new();
        self.groups.into_iter().try_fold(
            InMemoryDirectory::new(),
            |directory, group| {
                if !seen.insert(group.id.clone()) {
                    return Err(SnapshotError::DuplicateGroup {
                        group: GroupId::from(group.id),
                    });
                }
                let directory = directory
                    .with_members(&group.id, group.members)
                    .with_transient_failures(&group.id, group.transient_failures);
                Ok(if group.access_denied {
                    let denied = DirectoryError::access_denied(group.id.as_str());
                    directory.with_failure(&group.id, denied)
                } else {
                    directory
                })
            },
        )
    }
}

/// Read and parse a snapshot file into a directory source.
pub fn load_snapshot(path: &Path) -> Result<InMemoryDirectory, SnapshotError> {
    let format = SnapshotFormat::from_path(path)?;
    let contents = fs::read_to_string(path).map_err(|source| SnapshotError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let snapshot =
        DirectorySnapshot::parse(&contents, format).map_err(|message| SnapshotError::Parse {
            path: path.to_path_buf(),
            message,
        })?;

    tracing::debug!(
        path = %path.display(),
        groups = snapshot.groups.len(),
        "loaded directory snapshot"
    );
    snapshot.into_directory()
}
