//! Parent → child relationship records.
//!
//! A relationship is a directed edge from a parent to a child. A child may
//! have several parents and a parent several children; the edge set as a
//! whole is an arbitrary directed graph and may contain cycles.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::person::PersonId;

/// Stable relationship identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationshipId(pub String);

impl RelationshipId {
    /// Create a new RelationshipId.
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RelationshipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RelationshipId {
    #[inline]
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for RelationshipId {
    #[inline]
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A directed parent → child edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub id: RelationshipId,
    pub parent_id: PersonId,
    pub child_id: PersonId,
}

impl Relationship {
    pub fn new(
        id: impl Into<RelationshipId>,
        parent_id: impl Into<PersonId>,
        child_id: impl Into<PersonId>,
    ) -> Self {
        Self {
            id: id.into(),
            parent_id: parent_id.into(),
            child_id: child_id.into(),
        }
    }

    /// True when the edge names the same person as parent and child.
    #[inline]
    pub fn is_self_loop(&self) -> bool {
        self.parent_id == self.child_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relationship_id() {
        let id = RelationshipId::new("r1");
        assert_eq!(id.as_str(), "r1");
        assert_eq!(format!("{}", id), "r1");
    }

    #[test]
    fn test_self_loop() {
        assert!(Relationship::new("r1", "a", "a").is_self_loop());
        assert!(!Relationship::new("r2", "a", "b").is_self_loop());
    }

    #[test]
    fn test_decode_camel_case() {
        let json = r#"{"id": "r1", "parentId": "a", "childId": "b", "createdBy": "u1"}"#;
        let rel: Relationship = serde_json::from_str(json).unwrap();
        assert_eq!(rel, Relationship::new("r1", "a", "b"));
    }
}
