//! Forest construction: flat people + parent → child edges into rooted trees.
//!
//! # Algorithm Overview
//!
//! 1. **Normalise edges:** drop self-loops, edges naming an unknown person and
//!    repeated ordered pairs (first one wins).
//! 2. **Pick roots:** every person who is nobody's child, in people order.
//!    The child set comes from the raw edges minus self-loops, so an edge
//!    from an unknown parent still keeps its child from being a root.
//! 3. **Expand:** walk the children map depth-first from each root. One
//!    visited set is shared by the whole pass, so a person reachable along
//!    several paths (a second parent, a cycle) is attached only where the
//!    walk first reaches them.
//! 4. **Detached people:** anyone still unvisited (cycle members with no entry
//!    point and their descendants) becomes a standalone singleton tree.
//!
//! Construction never fails and is deterministic for a fixed input order.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::family::{Person, PersonId, Relationship};

/// How a tree entered the forest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TreeOrigin {
    /// Grown from a person who is nobody's child.
    Rooted,
    /// A person unreachable from every root, placed on their own.
    Detached,
}

/// A person and the children placed beneath them.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode<'a> {
    pub person: &'a Person,
    /// Children in edge insertion order.
    pub children: Vec<TreeNode<'a>>,
}

impl<'a> TreeNode<'a> {
    /// A node with no children.
    pub fn leaf(person: &'a Person) -> Self {
        Self {
            person,
            children: Vec::new(),
        }
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of nodes in this subtree, including itself.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(TreeNode::size).sum::<usize>()
    }

    /// Visit the subtree depth-first, parents before children.
    pub fn walk<F: FnMut(&TreeNode<'a>)>(&self, f: &mut F) {
        f(self);
        for child in &self.children {
            child.walk(f);
        }
    }
}

/// One tree of the forest.
#[derive(Debug, Clone, PartialEq)]
pub struct ForestTree<'a> {
    pub root: TreeNode<'a>,
    pub origin: TreeOrigin,
}

/// The people arranged as an ordered forest.
#[derive(Debug, Clone, Default)]
pub struct Forest<'a> {
    trees: Vec<ForestTree<'a>>,
    edges: Vec<&'a Relationship>,
    skipped_edges: usize,
}

impl<'a> Forest<'a> {
    /// Trees in placement order: rooted trees first, then detached singletons.
    pub fn trees(&self) -> &[ForestTree<'a>] {
        &self.trees
    }

    /// Edges that survived normalisation, in input order.
    pub fn edges(&self) -> &[&'a Relationship] {
        &self.edges
    }

    /// How many input edges were dropped during normalisation.
    pub fn skipped_edges(&self) -> usize {
        self.skipped_edges
    }

    /// Total number of person nodes across all trees.
    pub fn node_count(&self) -> usize {
        self.trees.iter().map(|tree| tree.root.size()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }
}

/// State for one construction pass.
///
/// Owns the visited set; it lives exactly as long as one [`build_forest`] call.
struct TraversalContext<'a> {
    people: HashMap<&'a PersonId, &'a Person>,
    children: HashMap<&'a PersonId, Vec<&'a PersonId>>,
    visited: HashSet<&'a PersonId>,
}

impl<'a> TraversalContext<'a> {
    /// Expand `id` into a subtree, or `None` if already placed or unknown.
    fn expand(&mut self, id: &'a PersonId) -> Option<TreeNode<'a>> {
        if !self.visited.insert(id) {
            return None;
        }
        let person = *self.people.get(id)?;

        // Clone the id list to avoid a borrow conflict during recursion
        let child_ids = self.children.get(id).cloned().unwrap_or_default();
        let children = child_ids
            .into_iter()
            .filter_map(|child_id| self.expand(child_id))
            .collect();

        Some(TreeNode { person, children })
    }
}

/// Arrange people into a forest of trees.
///
/// Every distinct person id appears exactly once in the result. When two
/// records share an id the first one is used.
pub fn build_forest<'a>(people: &'a [Person], relationships: &'a [Relationship]) -> Forest<'a> {
    let mut person_map: HashMap<&PersonId, &Person> = HashMap::with_capacity(people.len());
    for person in people {
        if person_map.contains_key(&person.id) {
            tracing::debug!(person = %person.id, "ignoring repeated person id");
            continue;
        }
        person_map.insert(&person.id, person);
    }

    let (edges, skipped_edges) = normalize_edges(&person_map, relationships);

    // Build adjacency: parent → children
    let mut children: HashMap<&PersonId, Vec<&PersonId>> = HashMap::new();
    for rel in edges.iter().copied() {
        children.entry(&rel.parent_id).or_default().push(&rel.child_id);
    }

    let child_ids: HashSet<&PersonId> = relationships
        .iter()
        .filter(|rel| !rel.is_self_loop())
        .map(|rel| &rel.child_id)
        .collect();

    let mut ctx = TraversalContext {
        people: person_map,
        children,
        visited: HashSet::with_capacity(people.len()),
    };

    let mut trees = Vec::new();
    for person in people.iter().filter(|p| !child_ids.contains(&p.id)) {
        if let Some(root) = ctx.expand(&person.id) {
            trees.push(ForestTree {
                root,
                origin: TreeOrigin::Rooted,
            });
        }
    }

    for person in people {
        if ctx.visited.insert(&person.id) {
            tracing::debug!(
                person = %person.id,
                "person unreachable from any root, placing standalone"
            );
            trees.push(ForestTree {
                root: TreeNode::leaf(person),
                origin: TreeOrigin::Detached,
            });
        }
    }

    Forest {
        trees,
        edges,
        skipped_edges,
    }
}

/// Drop self-loops, dangling edges and repeated pairs. Returns the kept edges
/// and the number dropped.
fn normalize_edges<'a>(
    people: &HashMap<&PersonId, &Person>,
    relationships: &'a [Relationship],
) -> (Vec<&'a Relationship>, usize) {
    let mut seen: HashSet<(&PersonId, &PersonId)> = HashSet::with_capacity(relationships.len());
    let mut kept = Vec::with_capacity(relationships.len());
    let mut skipped = 0;

    for rel in relationships {
        let reason = if rel.is_self_loop() {
            Some("self-loop")
        } else if !people.contains_key(&rel.parent_id) || !people.contains_key(&rel.child_id) {
            Some("unknown person")
        } else if !seen.insert((&rel.parent_id, &rel.child_id)) {
            Some("duplicate pair")
        } else {
            None
        };

        match reason {
            Some(reason) => {
                tracing::debug!(relationship = %rel.id, reason, "skipping relationship");
                skipped += 1;
            }
            None => kept.push(rel),
        }
    }

    (kept, skipped)
}
