//! FamilyGraph - editable in-memory family graph.
//!
//! The FamilyGraph stores the family topology using petgraph's StableGraph so
//! person and relationship indices survive removals. It enforces the
//! relationship invariants (no self-parentage, no duplicate ordered pairs,
//! both ends known) and hands out [`FamilySnapshot`]s for layout.

use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableGraph};
use petgraph::visit::EdgeRef;
use petgraph::{Directed, Direction};
use std::collections::{HashMap, HashSet};

use super::error::{FamilyError, Result};
use super::person::{Person, PersonDraft, PersonId};
use super::relationship::{Relationship, RelationshipId};
use super::snapshot::FamilySnapshot;
use crate::layout::{compute_forest_layout, ForestLayout, PedigreeLayoutConfig};

/// Node weight: the person plus its insertion sequence.
///
/// StableGraph reuses vacant slots, so index order is not insertion order.
#[derive(Debug, Clone)]
struct PersonSlot {
    person: Person,
    seq: u64,
}

/// Edge weight: the relationship id plus its insertion sequence.
#[derive(Debug, Clone)]
struct RelationshipSlot {
    id: RelationshipId,
    seq: u64,
}

/// The editable family graph.
///
/// This struct manages:
/// - Family topology via petgraph
/// - ID mapping between stable ids and internal indices
/// - Id generation for new people and relationships
pub struct FamilyGraph {
    /// The underlying graph structure.
    graph: StableGraph<PersonSlot, RelationshipSlot, Directed>,

    /// Map from PersonId to petgraph NodeIndex
    person_index: HashMap<PersonId, NodeIndex>,

    /// Map from RelationshipId to petgraph EdgeIndex
    relationship_index: HashMap<RelationshipId, EdgeIndex>,

    /// Next insertion sequence number
    next_seq: u64,

    /// Counter for generated person ids
    next_person_id: u64,

    /// Counter for generated relationship ids
    next_relationship_id: u64,
}

impl FamilyGraph {
    /// Create a new empty family graph.
    pub fn new() -> Self {
        Self {
            graph: StableGraph::new(),
            person_index: HashMap::new(),
            relationship_index: HashMap::new(),
            next_seq: 0,
            next_person_id: 1,
            next_relationship_id: 1,
        }
    }

    /// Load a snapshot.
    ///
    /// Stored ids are kept. Records that the graph would reject (a repeated
    /// person id, a self-loop, a duplicate pair, an edge to an unknown person)
    /// are skipped. The layout skips the same records, with one difference: an
    /// edge from an unknown parent still keeps its child out of the root set
    /// there, while here the child becomes an ordinary root.
    pub fn from_snapshot(snapshot: FamilySnapshot) -> Self {
        let mut family = Self::new();

        for person in snapshot.people {
            let id = person.id.clone();
            if let Err(err) = family.insert_record(person) {
                tracing::debug!(person = %id, %err, "skipping person while loading snapshot");
            }
        }

        for rel in snapshot.relationships {
            let Relationship {
                id,
                parent_id,
                child_id,
            } = rel;
            if family.relationship_index.contains_key(&id) {
                tracing::debug!(relationship = %id, "skipping repeated relationship id");
                continue;
            }
            if let Err(err) = family.link(id.clone(), &parent_id, &child_id) {
                tracing::debug!(
                    relationship = %id,
                    %err,
                    "skipping relationship while loading snapshot"
                );
            }
        }

        family
    }

    // =========================================================================
    // Person Operations
    // =========================================================================

    /// Add a person with a generated id.
    pub fn insert_person(&mut self, draft: PersonDraft) -> Result<PersonId> {
        let id = self.generate_person_id();
        self.insert_person_with_id(id, draft)
    }

    /// Add a person under a caller-chosen id.
    pub fn insert_person_with_id(&mut self, id: PersonId, draft: PersonDraft) -> Result<PersonId> {
        if draft.first_name.trim().is_empty() {
            return Err(FamilyError::MissingFirstName);
        }
        self.insert_record(Person::from_draft(id.clone(), draft))?;
        Ok(id)
    }

    /// Replace a person's descriptive fields. The id is unchanged.
    pub fn update_person(&mut self, id: &PersonId, draft: PersonDraft) -> Result<&Person> {
        if draft.first_name.trim().is_empty() {
            return Err(FamilyError::MissingFirstName);
        }
        let index = self.index_of(id)?;
        let slot = self
            .graph
            .node_weight_mut(index)
            .ok_or_else(|| FamilyError::UnknownPerson(id.clone()))?;
        slot.person = Person::from_draft(id.clone(), draft);
        Ok(&slot.person)
    }

    /// Remove a person and every relationship that references them.
    pub fn remove_person(&mut self, id: &PersonId) -> Result<Person> {
        let index = self.index_of(id)?;

        let edges: Vec<EdgeIndex> = self
            .graph
            .edges_directed(index, Direction::Outgoing)
            .chain(self.graph.edges_directed(index, Direction::Incoming))
            .map(|e| e.id())
            .collect();
        for edge_index in edges {
            if let Some(slot) = self.graph.remove_edge(edge_index) {
                self.relationship_index.remove(&slot.id);
            }
        }

        self.person_index.remove(id);
        self.graph
            .remove_node(index)
            .map(|slot| slot.person)
            .ok_or_else(|| FamilyError::UnknownPerson(id.clone()))
    }

    /// Look up a person.
    pub fn person(&self, id: &PersonId) -> Option<&Person> {
        self.person_index
            .get(id)
            .and_then(|&index| self.graph.node_weight(index))
            .map(|slot| &slot.person)
    }

    /// Get the number of people.
    pub fn person_count(&self) -> u32 {
        self.graph.node_count() as u32
    }

    /// All people in insertion order.
    pub fn people(&self) -> Vec<&Person> {
        let mut slots: Vec<&PersonSlot> = self
            .graph
            .node_indices()
            .filter_map(|i| self.graph.node_weight(i))
            .collect();
        slots.sort_by_key(|slot| slot.seq);
        slots.into_iter().map(|slot| &slot.person).collect()
    }

    // =========================================================================
    // Relationship Operations
    // =========================================================================

    /// Link a parent to a child.
    pub fn add_relationship(
        &mut self,
        parent: &PersonId,
        child: &PersonId,
    ) -> Result<RelationshipId> {
        self.check_link(parent, child)?;
        let id = self.generate_relationship_id();
        self.link(id.clone(), parent, child)?;
        Ok(id)
    }

    /// Remove a relationship.
    pub fn remove_relationship(&mut self, id: &RelationshipId) -> Result<Relationship> {
        let edge_index = self
            .relationship_index
            .remove(id)
            .ok_or_else(|| FamilyError::UnknownRelationship(id.clone()))?;
        let relationship = self.relationship_at(edge_index);
        self.graph.remove_edge(edge_index);
        relationship.ok_or_else(|| FamilyError::UnknownRelationship(id.clone()))
    }

    /// Get the number of relationships.
    pub fn relationship_count(&self) -> u32 {
        self.graph.edge_count() as u32
    }

    /// All relationships in insertion order.
    pub fn relationships(&self) -> Vec<Relationship> {
        let mut edges: Vec<(u64, EdgeIndex)> = self
            .graph
            .edge_indices()
            .filter_map(|e| self.graph.edge_weight(e).map(|slot| (slot.seq, e)))
            .collect();
        edges.sort_unstable_by_key(|&(seq, _)| seq);
        edges
            .into_iter()
            .filter_map(|(_, e)| self.relationship_at(e))
            .collect()
    }

    /// Parents of a person, in the order the links were made.
    pub fn parents_of(&self, id: &PersonId) -> Result<Vec<&Person>> {
        self.neighbors(id, Direction::Incoming)
    }

    /// Children of a person, in the order the links were made.
    pub fn children_of(&self, id: &PersonId) -> Result<Vec<&Person>> {
        self.neighbors(id, Direction::Outgoing)
    }

    /// People who could still be linked to `id` as a parent or a child:
    /// everyone except the person and their current parents and children.
    pub fn available_relatives(&self, id: &PersonId) -> Result<Vec<&Person>> {
        let index = self.index_of(id)?;
        let related: HashSet<NodeIndex> = self
            .graph
            .neighbors_undirected(index)
            .chain(std::iter::once(index))
            .collect();

        Ok(self
            .people()
            .into_iter()
            .filter(|person| {
                self.person_index
                    .get(&person.id)
                    .is_some_and(|i| !related.contains(i))
            })
            .collect())
    }

    // =========================================================================
    // Snapshot & Layout
    // =========================================================================

    /// Current people and relationships, both in insertion order.
    pub fn snapshot(&self) -> FamilySnapshot {
        FamilySnapshot::new(
            self.people().into_iter().cloned().collect(),
            self.relationships(),
        )
    }

    /// Build and lay out the forest for the current data.
    pub fn layout(&self, config: &PedigreeLayoutConfig) -> ForestLayout {
        compute_forest_layout(&self.snapshot(), config)
    }

    /// Clear all people and relationships, resetting the graph to its initial state.
    pub fn clear(&mut self) {
        self.graph.clear();
        self.person_index.clear();
        self.relationship_index.clear();
        self.next_seq = 0;
        self.next_person_id = 1;
        self.next_relationship_id = 1;
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn insert_record(&mut self, person: Person) -> Result<()> {
        if self.person_index.contains_key(&person.id) {
            return Err(FamilyError::DuplicatePerson(person.id));
        }
        let id = person.id.clone();
        let seq = self.bump_seq();
        let index = self.graph.add_node(PersonSlot { person, seq });
        self.person_index.insert(id, index);
        Ok(())
    }

    fn link(&mut self, id: RelationshipId, parent: &PersonId, child: &PersonId) -> Result<()> {
        let (parent_index, child_index) = self.check_link(parent, child)?;
        let seq = self.bump_seq();
        let edge_index = self.graph.add_edge(
            parent_index,
            child_index,
            RelationshipSlot {
                id: id.clone(),
                seq,
            },
        );
        self.relationship_index.insert(id, edge_index);
        Ok(())
    }

    fn check_link(&self, parent: &PersonId, child: &PersonId) -> Result<(NodeIndex, NodeIndex)> {
        if parent == child {
            return Err(FamilyError::SelfParentage(parent.clone()));
        }
        let parent_index = self.index_of(parent)?;
        let child_index = self.index_of(child)?;

        if self.graph.find_edge(parent_index, child_index).is_some() {
            return Err(FamilyError::DuplicateRelationship {
                parent: parent.clone(),
                child: child.clone(),
            });
        }
        Ok((parent_index, child_index))
    }

    fn neighbors(&self, id: &PersonId, direction: Direction) -> Result<Vec<&Person>> {
        let index = self.index_of(id)?;
        let mut linked: Vec<(u64, NodeIndex)> = self
            .graph
            .edges_directed(index, direction)
            .map(|e| {
                let other = match direction {
                    Direction::Incoming => e.source(),
                    Direction::Outgoing => e.target(),
                };
                (e.weight().seq, other)
            })
            .collect();
        linked.sort_unstable_by_key(|&(seq, _)| seq);

        Ok(linked
            .into_iter()
            .filter_map(|(_, n)| self.graph.node_weight(n).map(|slot| &slot.person))
            .collect())
    }

    fn relationship_at(&self, edge_index: EdgeIndex) -> Option<Relationship> {
        let (source, target) = self.graph.edge_endpoints(edge_index)?;
        let slot = self.graph.edge_weight(edge_index)?;
        let parent = self.graph.node_weight(source)?;
        let child = self.graph.node_weight(target)?;
        Some(Relationship {
            id: slot.id.clone(),
            parent_id: parent.person.id.clone(),
            child_id: child.person.id.clone(),
        })
    }

    fn index_of(&self, id: &PersonId) -> Result<NodeIndex> {
        self.person_index
            .get(id)
            .copied()
            .ok_or_else(|| FamilyError::UnknownPerson(id.clone()))
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    fn generate_person_id(&mut self) -> PersonId {
        loop {
            let id = PersonId(format!("p{}", self.next_person_id));
            self.next_person_id += 1;
            if !self.person_index.contains_key(&id) {
                return id;
            }
        }
    }

    fn generate_relationship_id(&mut self) -> RelationshipId {
        loop {
            let id = RelationshipId(format!("r{}", self.next_relationship_id));
            self.next_relationship_id += 1;
            if !self.relationship_index.contains_key(&id) {
                return id;
            }
        }
    }
}

impl Default for FamilyGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(people: &[&Person]) -> Vec<String> {
        people.iter().map(|p| p.first_name.clone()).collect()
    }

    fn family() -> (FamilyGraph, PersonId, PersonId, PersonId) {
        let mut family = FamilyGraph::new();
        let anna = family.insert_person(PersonDraft::new("Anna")).unwrap();
        let bo = family.insert_person(PersonDraft::new("Bo")).unwrap();
        let carl = family.insert_person(PersonDraft::new("Carl")).unwrap();
        (family, anna, bo, carl)
    }

    #[test]
    fn test_insert_person() {
        let (family, anna, _, _) = family();
        assert_eq!(family.person_count(), 3);
        assert_eq!(anna, PersonId::from("p1"));
        assert_eq!(family.person(&anna).unwrap().first_name, "Anna");
    }

    #[test]
    fn test_blank_first_name_rejected() {
        let mut family = FamilyGraph::new();
        let err = family.insert_person(PersonDraft::new("   ")).unwrap_err();
        assert_eq!(err, FamilyError::MissingFirstName);
        assert_eq!(family.person_count(), 0);
    }

    #[test]
    fn test_duplicate_person_id_rejected() {
        let mut family = FamilyGraph::new();
        let id = PersonId::from("x");
        family.insert_person_with_id(id.clone(), PersonDraft::new("A")).unwrap();
        let err = family.insert_person_with_id(id.clone(), PersonDraft::new("B")).unwrap_err();
        assert_eq!(err, FamilyError::DuplicatePerson(id));
    }

    #[test]
    fn test_update_person() {
        let (mut family, anna, _, _) = family();
        family
            .update_person(&anna, PersonDraft::new("Anne").with_last_name("Holm"))
            .unwrap();
        assert_eq!(family.person(&anna).unwrap().display_name(), "Anne Holm");

        let err = family.update_person(&PersonId::from("nope"), PersonDraft::new("X"));
        assert!(matches!(err, Err(FamilyError::UnknownPerson(_))));
    }

    #[test]
    fn test_add_relationship() {
        let (mut family, anna, bo, _) = family();
        let rel = family.add_relationship(&anna, &bo).unwrap();

        assert_eq!(rel, RelationshipId::from("r1"));
        assert_eq!(family.relationship_count(), 1);
        assert_eq!(names(&family.children_of(&anna).unwrap()), vec!["Bo"]);
        assert_eq!(names(&family.parents_of(&bo).unwrap()), vec!["Anna"]);
    }

    #[test]
    fn test_relationship_validation() {
        let (mut family, anna, bo, _) = family();

        assert_eq!(
            family.add_relationship(&anna, &anna),
            Err(FamilyError::SelfParentage(anna.clone()))
        );

        family.add_relationship(&anna, &bo).unwrap();
        assert_eq!(
            family.add_relationship(&anna, &bo),
            Err(FamilyError::DuplicateRelationship {
                parent: anna.clone(),
                child: bo.clone(),
            })
        );

        let ghost = PersonId::from("ghost");
        assert_eq!(
            family.add_relationship(&ghost, &bo),
            Err(FamilyError::UnknownPerson(ghost))
        );

        // The reverse direction is a different ordered pair; cycles are allowed.
        assert!(family.add_relationship(&bo, &anna).is_ok());
        assert_eq!(family.relationship_count(), 2);
    }

    #[test]
    fn test_multiple_parents_in_link_order() {
        let (mut family, anna, bo, carl) = family();
        family.add_relationship(&bo, &carl).unwrap();
        family.add_relationship(&anna, &carl).unwrap();

        assert_eq!(names(&family.parents_of(&carl).unwrap()), vec!["Bo", "Anna"]);
    }

    #[test]
    fn test_remove_person_cascades() {
        let (mut family, anna, bo, carl) = family();
        family.add_relationship(&anna, &bo).unwrap();
        family.add_relationship(&bo, &carl).unwrap();
        family.add_relationship(&anna, &carl).unwrap();

        let removed = family.remove_person(&bo).unwrap();
        assert_eq!(removed.first_name, "Bo");
        assert_eq!(family.person_count(), 2);
        assert_eq!(family.relationship_count(), 1);
        assert_eq!(names(&family.children_of(&anna).unwrap()), vec!["Carl"]);
        assert!(
            family
                .snapshot()
                .relationships
                .iter()
                .all(|r| r.parent_id != bo && r.child_id != bo)
        );
    }

    #[test]
    fn test_remove_relationship() {
        let (mut family, anna, bo, _) = family();
        let rel = family.add_relationship(&anna, &bo).unwrap();

        let removed = family.remove_relationship(&rel).unwrap();
        assert_eq!(removed, Relationship::new("r1", anna.as_str(), bo.as_str()));
        assert_eq!(family.relationship_count(), 0);
        assert_eq!(
            family.remove_relationship(&rel),
            Err(FamilyError::UnknownRelationship(rel))
        );
    }

    #[test]
    fn test_available_relatives() {
        let (mut family, anna, bo, carl) = family();
        let dora = family.insert_person(PersonDraft::new("Dora")).unwrap();
        family.add_relationship(&anna, &bo).unwrap();
        family.add_relationship(&carl, &anna).unwrap();

        let available = family.available_relatives(&anna).unwrap();
        assert_eq!(names(&available), vec!["Dora"]);
        assert!(family.available_relatives(&dora).unwrap().len() == 3);
    }

    #[test]
    fn test_people_keep_insertion_order_after_removal() {
        let (mut family, anna, _, _) = family();
        family.remove_person(&anna).unwrap();
        family.insert_person(PersonDraft::new("Dora")).unwrap();

        // Dora may reuse Anna's vacant slot but must still come last.
        assert_eq!(names(&family.people()), vec!["Bo", "Carl", "Dora"]);
    }

    #[test]
    fn test_from_snapshot_skips_invalid_records() {
        let snapshot = FamilySnapshot::new(
            vec![
                Person::new("a", "Anna"),
                Person::new("b", "Bo"),
                Person::new("a", "Impostor"),
            ],
            vec![
                Relationship::new("r1", "a", "b"),
                Relationship::new("r2", "a", "a"),
                Relationship::new("r3", "a", "b"),
                Relationship::new("r4", "a", "ghost"),
                Relationship::new("r5", "b", "a"),
            ],
        );
        let family = FamilyGraph::from_snapshot(snapshot);

        assert_eq!(family.person_count(), 2);
        assert_eq!(family.person(&PersonId::from("a")).unwrap().first_name, "Anna");
        let ids: Vec<String> = family
            .relationships()
            .into_iter()
            .map(|r| r.id.0)
            .collect();
        assert_eq!(ids, vec!["r1", "r5"]);
    }

    #[test]
    fn test_generated_ids_skip_loaded_ones() {
        let snapshot = FamilySnapshot::new(vec![Person::new("p1", "Anna")], vec![]);
        let mut family = FamilyGraph::from_snapshot(snapshot);
        let id = family.insert_person(PersonDraft::new("Bo")).unwrap();
        assert_eq!(id, PersonId::from("p2"));
    }

    #[test]
    fn test_clear() {
        let (mut family, anna, bo, _) = family();
        family.add_relationship(&anna, &bo).unwrap();

        family.clear();
        assert_eq!(family.person_count(), 0);
        assert_eq!(family.relationship_count(), 0);
        assert_eq!(
            family.insert_person(PersonDraft::new("Eva")).unwrap(),
            PersonId::from("p1")
        );
    }

    #[test]
    fn test_layout_from_graph() {
        let (mut family, anna, bo, _) = family();
        family.add_relationship(&anna, &bo).unwrap();

        let layout = family.layout(&PedigreeLayoutConfig::default());
        assert_eq!(layout.placements.len(), 3);
        assert_eq!(layout.connectors.len(), 1);
    }
}
