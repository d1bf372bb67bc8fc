//! Core data model: group ids, containment paths, and anomaly records.

pub mod anomaly;
pub mod group;

pub use anomaly::{Anomaly, CycleSignature, LookupErrorKind};
pub use group::{GroupId, GroupPath, Trail, PATH_SEPARATOR};
