//! In-memory directory used for snapshots and fixture graphs.

use super::{DirectoryMember, DirectorySource};
use crate::core::GroupId;
use crate::errors::DirectoryError;
use parking_lot::Mutex;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
struct GroupEntry {
    members: Vec<DirectoryMember>,
    failure: Option<DirectoryError>,
    /// Lookups that fail transiently before the group answers.
    transient_failures: usize,
}

/// Directory backed by a map of group id to members.
///
/// Groups are enumerated in insertion order. Member ids that were never
/// defined as groups resolve to [`DirectoryError::GroupNotFound`], which is
/// how a dangling reference in an exported snapshot shows up.
///
/// # Example
///
/// ```rust
/// use groupnest::directory::{DirectorySource, InMemoryDirectory};
/// use groupnest::core::GroupId;
///
/// let directory = InMemoryDirectory::from_edges([("A", "B"), ("B", "C")]);
/// let children = directory.list_child_groups(&GroupId::from("A")).unwrap();
/// assert_eq!(children, vec![GroupId::from("B")]);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    order: Vec<GroupId>,
    groups: HashMap<GroupId, GroupEntry>,
    catalog_failure: Option<DirectoryError>,
    lookups: Mutex<HashMap<GroupId, usize>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a fully-defined graph from `(parent, child)` group edges.
    pub fn from_edges<'a>(edges: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        edges
            .into_iter()
            .fold(Self::new(), |dir, (parent, child)| {
                dir.with_child(parent, child).with_group(child)
            })
    }

    fn entry(&mut self, id: &str) -> &mut GroupEntry {
        let id = GroupId::from(id);
        if !self.groups.contains_key(&id) {
            self.order.push(id.clone());
        }
        self.groups.entry(id).or_default()
    }

    /// Define a group with no members (no-op if it already exists).
    pub fn with_group(mut self, id: &str) -> Self {
        self.entry(id);
        self
    }

    /// Append members to a group, defining it if needed.
    pub fn with_members(mut self, id: &str, members: Vec<DirectoryMember>) -> Self {
        self.entry(id).members.extend(members);
        self
    }

    /// Add a child group edge. The child is not defined as a group.
    pub fn with_child(mut self, parent: &str, child: &str) -> Self {
        self.entry(parent).members.push(DirectoryMember::group(child));
        self
    }

    /// Make member lookups of `id` fail with `error`.
    pub fn with_failure(mut self, id: &str, error: DirectoryError) -> Self {
        self.entry(id).failure = Some(error);
        self
    }

    /// Make the first `attempts` member lookups of `id` fail transiently.
    pub fn with_transient_failures(mut self, id: &str, attempts: usize) -> Self {
        self.entry(id).transient_failures = attempts;
        self
    }

    /// Make catalog enumeration fail.
    pub fn unavailable(mut self, message: &str) -> Self {
        self.catalog_failure = Some(DirectoryError::unavailable(message));
        self
    }

    pub fn group_count(&self) -> usize {
        self.order.len()
    }

    /// How many times members of `group` have been requested.
    pub fn lookup_count(&self, group: &str) -> usize {
        self.lookups
            .lock()
            .get(&GroupId::from(group))
            .copied()
            .unwrap_or(0)
    }

    pub fn total_lookups(&self) -> usize {
        self.lookups.lock().values().sum()
    }
}

impl DirectorySource for InMemoryDirectory {
    fn list_all_groups(&self) -> Result<Vec<GroupId>, DirectoryError> {
        match &self.catalog_failure {
            Some(error) => Err(error.clone()),
            None => Ok(self.order.clone()),
        }
    }

    fn list_members(&self, group: &GroupId) -> Result<Vec<DirectoryMember>, DirectoryError> {
        let attempt = {
            let mut lookups = self.lookups.lock();
            let count = lookups.entry(group.clone()).or_insert(0);
            *count += 1;
            *count
        };

        let entry = self
            .groups
            .get(group)
            .ok_or_else(|| DirectoryError::not_found(group.clone()))?;

        if attempt <= entry.transient_failures {
            return Err(DirectoryError::transient(
                group.clone(),
                format!("lookup {attempt} of {} refused", entry.transient_failures),
            ));
        }

        match &entry.failure {
            Some(error) => Err(error.clone()),
            None => Ok(entry.members.clone()),
        }
    }
}
