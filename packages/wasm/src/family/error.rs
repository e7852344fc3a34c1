//! Error types for family graph editing and snapshot decoding.
//!
//! The layout itself never fails; these errors only come from operations that
//! change or decode family data.

use thiserror::Error;

use super::person::PersonId;
use super::relationship::RelationshipId;

/// Reasons an edit or decode is rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FamilyError {
    /// A person must have a non-blank first name
    #[error("first name is required")]
    MissingFirstName,

    /// No person with this id
    #[error("unknown person: {0}")]
    UnknownPerson(PersonId),

    /// A person with this id already exists
    #[error("person already exists: {0}")]
    DuplicatePerson(PersonId),

    /// Parent and child are the same person
    #[error("a person cannot be their own parent: {0}")]
    SelfParentage(PersonId),

    /// The ordered parent/child pair is already linked
    #[error("relationship already exists: {parent} -> {child}")]
    DuplicateRelationship {
        /// Parent side of the existing edge
        parent: PersonId,
        /// Child side of the existing edge
        child: PersonId,
    },

    /// No relationship with this id
    #[error("unknown relationship: {0}")]
    UnknownRelationship(RelationshipId),

    /// The snapshot payload could not be decoded
    #[error("invalid family snapshot: {0}")]
    InvalidSnapshot(String),
}

/// Result type alias for family operations
pub type Result<T> = std::result::Result<T, FamilyError>;
