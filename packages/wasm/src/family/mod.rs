//! Family data: people, parent → child relationships and the editable graph.
//!
//! The record types mirror the JSON the embedding application stores and
//! serves (`camelCase` fields, nullable optionals). [`FamilyGraph`] is an
//! in-memory working copy that enforces the relationship invariants.

mod error;
mod graph;
mod person;
mod relationship;
mod snapshot;

pub use error::{FamilyError, Result};
pub use graph::FamilyGraph;
pub use person::{Gender, Person, PersonDraft, PersonId};
pub use relationship::{Relationship, RelationshipId};
pub use snapshot::FamilySnapshot;
