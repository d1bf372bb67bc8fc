//! Group identifiers and traversal trails.
//!
//! A [`Trail`] is the path from a scan root to the group currently being
//! explored, together with the set of groups on that path. Both halves are
//! persistent `im` containers, so descending into a child is an O(log n)
//! structural copy and sibling branches never observe each other's state.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Separator used when rendering a path for humans.
pub const PATH_SEPARATOR: &str = " -> ";

/// Directory-unique identifier of a security group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(Arc<str>);

impl GroupId {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GroupId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for GroupId {
    fn from(id: String) -> Self {
        Self(Arc::from(id))
    }
}

impl AsRef<str> for GroupId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Ordered chain of containment from a scan root to the current group.
///
/// The same group may appear twice; that is how a cycle is recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct GroupPath(im::Vector<GroupId>);

impl GroupPath {
    pub fn new() -> Self {
        Self(im::Vector::new())
    }

    /// Nesting depth at the end of this path.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns a new path with `group` appended. `self` is left untouched.
    #[must_use]
    pub fn with(&self, group: GroupId) -> Self {
        let mut next = self.0.clone();
        next.push_back(group);
        Self(next)
    }

    pub fn last(&self) -> Option<&GroupId> {
        self.0.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GroupId> {
        self.0.iter()
    }

    pub fn to_vec(&self) -> Vec<GroupId> {
        self.0.iter().cloned().collect()
    }

    /// Human-readable chain, e.g. `A -> B -> C`.
    pub fn render(&self, separator: &str) -> String {
        self.0
            .iter()
            .map(GroupId::as_str)
            .collect::<Vec<_>>()
            .join(separator)
    }
}

impl fmt::Display for GroupPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(PATH_SEPARATOR))
    }
}

impl FromIterator<GroupId> for GroupPath {
    fn from_iter<I: IntoIterator<Item = GroupId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> FromIterator<&'a str> for GroupPath {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        iter.into_iter().map(GroupId::from).collect()
    }
}

/// Path plus the set of groups on it.
///
/// Invariant: `visited` always equals the set of elements in `path`. The
/// only way to grow a trail is [`Trail::descend`], which maintains it.
#[derive(Debug, Clone, Default)]
pub struct Trail {
    path: GroupPath,
    visited: im::HashSet<GroupId>,
}

impl Trail {
    /// Empty trail for a fresh scan root.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn path(&self) -> &GroupPath {
        &self.path
    }

    pub fn depth(&self) -> usize {
        self.path.len()
    }

    pub fn contains(&self, group: &GroupId) -> bool {
        self.visited.contains(group)
    }

    /// Snapshot for a child branch with `group` appended.
    #[must_use]
    pub fn descend(&self, group: &GroupId) -> Self {
        Self {
            path: self.path.with(group.clone()),
            visited: self.visited.update(group.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_id_display_and_eq() {
        let a = GroupId::from("Domain Admins");
        let b = GroupId::from(String::from("Domain Admins"));
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "Domain Admins");
    }

    #[test]
    fn test_group_id_serde_is_plain_string() {
        let id: GroupId = serde_json::from_str("\"Tier0 Admins\"").unwrap();
        assert_eq!(id, GroupId::from("Tier0 Admins"));
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"Tier0 Admins\"");
    }

    #[test]
    fn test_path_with_leaves_original_untouched() {
        let base: GroupPath = ["A", "B"].into_iter().collect();
        let extended = base.with(GroupId::from("C"));

        assert_eq!(base.len(), 2);
        assert_eq!(extended.len(), 3);
        assert_eq!(extended.last(), Some(&GroupId::from("C")));
    }

    #[test]
    fn test_path_render() {
        let path: GroupPath = ["A", "B", "C", "A"].into_iter().collect();
        assert_eq!(path.render(PATH_SEPARATOR), "A -> B -> C -> A");
        assert_eq!(path.render("/"), "A/B/C/A");
        assert_eq!(GroupPath::new().render(PATH_SEPARATOR), "");
    }

    #[test]
    fn test_trail_descend_is_copy_on_write() {
        let root = Trail::root();
        let a = GroupId::from("A");
        let b = GroupId::from("B");
        let c = GroupId::from("C");

        let after_a = root.descend(&a);
        let via_b = after_a.descend(&b);
        let via_c = after_a.descend(&c);

        assert!(!root.contains(&a));
        assert_eq!(after_a.depth(), 1);
        assert!(via_b.contains(&b));
        assert!(!via_c.contains(&b), "sibling branches must not share state");
        assert!(!after_a.contains(&b));
    }

    #[test]
    fn test_trail_visited_matches_path() {
        let trail = ["X", "Y", "Z"]
            .iter()
            .map(|g| GroupId::from(*g))
            .fold(Trail::root(), |t, g| t.descend(&g));

        assert_eq!(trail.depth(), 3);
        for group in trail.path().iter() {
            assert!(trail.contains(group));
        }
        assert!(!trail.contains(&GroupId::from("W")));
    }

    #[test]
    fn test_path_serializes_as_list() {
        let path: GroupPath = ["A", "B"].into_iter().collect();
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, r#"["A","B"]"#);
    }
}
