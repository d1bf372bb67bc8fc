//! Directory access as a narrow capability interface.
//!
//! The analyzer only needs two reads from the directory: the full list of
//! groups, and the direct members of one group. [`DirectorySource`] captures
//! exactly that so the analyzer can run against a live client, a snapshot
//! file, or an in-memory fixture graph.
//!
//! # Thread Safety
//!
//! Sources must be `Send + Sync`; root scans and (optionally) sibling
//! branches call them concurrently from rayon workers. Lookups are read-only
//! and idempotent.

pub mod memory;
pub mod retry;
pub mod snapshot;

pub use memory::InMemoryDirectory;
pub use retry::RetryingDirectory;
pub use snapshot::{load_snapshot, DirectorySnapshot};

use crate::core::GroupId;
use crate::errors::DirectoryError;
use serde::{Deserialize, Serialize};

/// Object class of a group member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
    #[default]
    Group,
    User,
    Computer,
    Contact,
    #[serde(other)]
    Other,
}

/// A direct member of a group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DirectoryMember {
    pub id: String,
    #[serde(default)]
    pub kind: MemberKind,
}

impl DirectoryMember {
    pub fn group(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: MemberKind::Group,
        }
    }

    pub fn new(id: impl Into<String>, kind: MemberKind) -> Self {
        Self {
            id: id.into(),
            kind,
        }
    }

    pub fn is_group(&self) -> bool {
        self.kind == MemberKind::Group
    }
}

/// Read-only view of a directory's group containment graph.
pub trait DirectorySource: Send + Sync {
    /// Every group in the directory, in a deterministic order.
    ///
    /// # Errors
    ///
    /// A failure here is fatal to the whole run.
    fn list_all_groups(&self) -> Result<Vec<GroupId>, DirectoryError>;

    /// Direct members of `group`, of any object class.
    ///
    /// # Errors
    ///
    /// `GroupNotFound`, `AccessDenied`, `Transient`, or `TimedOut`. The
    /// analyzer turns all of them into lookup-failure anomalies.
    fn list_members(&self, group: &GroupId) -> Result<Vec<DirectoryMember>, DirectoryError>;

    /// Direct members of `group` that are themselves groups.
    fn list_child_groups(&self, group: &GroupId) -> Result<Vec<GroupId>, DirectoryError> {
        Ok(self
            .list_members(group)?
            .into_iter()
            .filter(DirectoryMember::is_group)
            .map(|member| GroupId::from(member.id))
            .collect())
    }
}

impl<T: DirectorySource + ?Sized> DirectorySource for &T {
    fn list_all_groups(&self) -> Result<Vec<GroupId>, DirectoryError> {
        (**self).list_all_groups()
    }

    fn list_members(&self, group: &GroupId) -> Result<Vec<DirectoryMember>, DirectoryError> {
        (**self).list_members(group)
    }

    fn list_child_groups(&self, group: &GroupId) -> Result<Vec<GroupId>, DirectoryError> {
        (**self).list_child_groups(group)
    }
}

impl<T: DirectorySource + ?Sized> DirectorySource for std::sync::Arc<T> {
    fn list_all_groups(&self) -> Result<Vec<GroupId>, DirectoryError> {
        (**self).list_all_groups()
    }

    fn list_members(&self, group: &GroupId) -> Result<Vec<DirectoryMember>, DirectoryError> {
        (**self).list_members(group)
    }

    fn list_child_groups(&self, group: &GroupId) -> Result<Vec<GroupId>, DirectoryError> {
        (**self).list_child_groups(group)
    }
}
