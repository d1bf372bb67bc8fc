//! Anomalies produced by the nesting analyzer.

use super::group::{GroupId, GroupPath};
use serde::Serialize;
use std::fmt;

/// Category of a failed child-group lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupErrorKind {
    GroupNotFound,
    AccessDenied,
    Transient,
    TimedOut,
}

impl LookupErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GroupNotFound => "Group not found",
            Self::AccessDenied => "Access denied",
            Self::Transient => "Transient directory error",
            Self::TimedOut => "Timed out",
        }
    }
}

impl fmt::Display for LookupErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structural or operational problem found while walking one branch.
///
/// Every variant terminates the branch it was found on. Records are
/// immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Anomaly {
    /// The containment chain returned to a group already on the path.
    /// The path ends with the repeated group.
    CircularNesting { path: GroupPath },
    /// The chain reached `limit` ancestors; the path ends with the group
    /// that was not expanded.
    DepthExceeded { path: GroupPath, limit: usize },
    /// Child groups of `group` could not be resolved.
    LookupFailure {
        group: GroupId,
        path: GroupPath,
        error_kind: LookupErrorKind,
        detail: String,
    },
}

impl Anomaly {
    pub fn path(&self) -> &GroupPath {
        match self {
            Self::CircularNesting { path }
            | Self::DepthExceeded { path, .. }
            | Self::LookupFailure { path, .. } => path,
        }
    }

    /// Cycles and depth violations, as opposed to lookup failures.
    pub fn is_structural(&self) -> bool {
        !matches!(self, Self::LookupFailure { .. })
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::CircularNesting { .. } => "circular nesting",
            Self::DepthExceeded { .. } => "depth exceeded",
            Self::LookupFailure { .. } => "lookup failure",
        }
    }
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CircularNesting { path } => write!(f, "circular nesting: {path}"),
            Self::DepthExceeded { path, limit } => {
                write!(f, "nesting depth exceeds {limit}: {path}")
            }
            Self::LookupFailure {
                group,
                path,
                detail,
                ..
            } => write!(f, "failed to resolve members of {group} ({path}): {detail}"),
        }
    }
}

/// Canonical form of a cycle, independent of where the scan entered it.
///
/// The closing repetition is dropped and the loop is rotated so that it
/// starts at its smallest group id. `A -> B -> C -> A` seen from root `A`
/// and `B -> C -> A -> B` seen from root `B` share one signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CycleSignature(Vec<GroupId>);

impl CycleSignature {
    /// Returns `None` unless `anomaly` is a [`Anomaly::CircularNesting`].
    pub fn of(anomaly: &Anomaly) -> Option<Self> {
        let Anomaly::CircularNesting { path } = anomaly else {
            return None;
        };
        let repeated = path.last()?;
        let members = path.to_vec();
        let start = members.iter().position(|g| g == repeated)?;
        let mut cycle = members[start..members.len() - 1].to_vec();
        if cycle.is_empty() {
            return None;
        }

        let pivot = cycle
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.cmp(b))
            .map(|(idx, _)| idx)
            .unwrap_or(0);
        cycle.rotate_left(pivot);
        Some(Self(cycle))
    }

    pub fn groups(&self) -> &[GroupId] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(ids: &[&str]) -> GroupPath {
        ids.iter().copied().collect()
    }

    #[test]
    fn test_structural_classification() {
        let cycle = Anomaly::CircularNesting {
            path: path(&["A", "A"]),
        };
        let depth = Anomaly::DepthExceeded {
            path: path(&["A", "B"]),
            limit: 1,
        };
        let lookup = Anomaly::LookupFailure {
            group: GroupId::from("A"),
            path: path(&["A"]),
            error_kind: LookupErrorKind::GroupNotFound,
            detail: "group not found: A".into(),
        };

        assert!(cycle.is_structural());
        assert!(depth.is_structural());
        assert!(!lookup.is_structural());
    }

    #[test]
    fn test_display_formats() {
        let depth = Anomaly::DepthExceeded {
            path: path(&["A", "B", "C", "D"]),
            limit: 3,
        };
        assert_eq!(
            depth.to_string(),
            "nesting depth exceeds 3: A -> B -> C -> D"
        );
    }

    #[test]
    fn test_cycle_signature_is_rotation_invariant() {
        let from_a = Anomaly::CircularNesting {
            path: path(&["A", "B", "C", "A"]),
        };
        let from_b = Anomaly::CircularNesting {
            path: path(&["B", "C", "A", "B"]),
        };
        let entered_late = Anomaly::CircularNesting {
            path: path(&["X", "C", "A", "B", "C"]),
        };

        let sig = CycleSignature::of(&from_a).unwrap();
        assert_eq!(sig, CycleSignature::of(&from_b).unwrap());
        assert_eq!(sig, CycleSignature::of(&entered_late).unwrap());
        assert_eq!(
            sig.groups(),
            &[GroupId::from("A"), GroupId::from("B"), GroupId::from("C")]
        );
    }

    #[test]
    fn test_cycle_signature_self_nesting() {
        let selfish = Anomaly::CircularNesting {
            path: path(&["Root", "Loop", "Loop"]),
        };
        let sig = CycleSignature::of(&selfish).unwrap();
        assert_eq!(sig.groups(), &[GroupId::from("Loop")]);
    }

    #[test]
    fn test_cycle_signature_ignores_other_kinds() {
        let depth = Anomaly::DepthExceeded {
            path: path(&["A", "B"]),
            limit: 1,
        };
        assert!(CycleSignature::of(&depth).is_none());
    }

    #[test]
    fn test_anomaly_serializes_with_kind_tag() {
        let cycle = Anomaly::CircularNesting {
            path: path(&["A", "A"]),
        };
        let json = serde_json::to_value(&cycle).unwrap();
        assert_eq!(json["kind"], "circular_nesting");
        assert_eq!(json["path"], serde_json::json!(["A", "A"]));
    }
}
