//! Pedigree layout: recursive subtree-width centering for a family forest.
//!
//! Every person box has the same size. A subtree is as wide as its children's
//! subtrees laid side by side (with a fixed gap between them), and never
//! narrower than one box. Parents sit centered over the combined span of their
//! children; children go one level down.
//!
//! # Algorithm Overview
//!
//! 1. **Measure (bottom-up):** compute every subtree's width once, stored in
//!    pre-order so the placement pass can find each child's measure in O(1).
//! 2. **Place (top-down):** start the first child at the left edge of the
//!    parent's children span and advance by child width plus gap.
//! 3. **Forest:** trees go left to right, separated by a multiple of the
//!    horizontal gap.
//! 4. **Connectors:** one curve per parent → child edge whose endpoints are
//!    both placed, including second-parent edges that the tree walk did not
//!    follow.
//!
//! Coordinates: `x` is the horizontal center of a box, `y` its top edge.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::connector::Connector;
use super::forest::{build_forest, Forest, TreeNode, TreeOrigin};
use crate::family::{FamilySnapshot, Person, PersonId, RelationshipId};

/// Configuration for the pedigree layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PedigreeLayoutConfig {
    /// Width of a person box.
    pub node_width: f32,
    /// Height of a person box.
    pub node_height: f32,
    /// Horizontal gap between sibling subtrees.
    pub horizontal_gap: f32,
    /// Vertical gap between generations.
    pub vertical_gap: f32,
    /// Empty border around the whole drawing.
    pub margin: f32,
    /// Trees are separated by `tree_gap_factor * horizontal_gap`.
    pub tree_gap_factor: f32,
}

impl Default for PedigreeLayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 160.0,
            node_height: 70.0,
            horizontal_gap: 20.0,
            vertical_gap: 80.0,
            margin: 40.0,
            tree_gap_factor: 3.0,
        }
    }
}

/// A placed person.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodePlacement {
    pub person: Person,
    /// Horizontal center of the box.
    pub x: f32,
    /// Top edge of the box.
    pub y: f32,
    /// Generation within its tree (root = 0).
    pub depth: u32,
    /// Index of the tree in the forest.
    pub tree_index: usize,
    pub origin: TreeOrigin,
}

/// Result of laying out a family forest.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForestLayout {
    /// Placements, depth-first per tree, trees in forest order.
    pub placements: Vec<NodePlacement>,
    /// One connector per drawable edge, in edge order.
    pub connectors: Vec<Connector>,
    /// Edges whose endpoints are both detached singletons; not drawn.
    pub suppressed_edges: Vec<RelationshipId>,
    /// Canvas width.
    pub width: f32,
    /// Canvas height.
    pub height: f32,
    pub node_width: f32,
    pub node_height: f32,
}

impl ForestLayout {
    /// The placeholder layout used when there is nobody to draw.
    pub fn empty() -> Self {
        Self {
            placements: Vec::new(),
            connectors: Vec::new(),
            suppressed_edges: Vec::new(),
            width: 0.0,
            height: 0.0,
            node_width: 0.0,
            node_height: 0.0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Find the placement of a person.
    pub fn placement(&self, id: &PersonId) -> Option<&NodePlacement> {
        self.placements.iter().find(|p| &p.person.id == id)
    }

    /// Box of a placement as `(min_x, min_y, max_x, max_y)`.
    pub fn node_box(&self, placement: &NodePlacement) -> (f32, f32, f32, f32) {
        let half = self.node_width / 2.0;
        (
            placement.x - half,
            placement.y,
            placement.x + half,
            placement.y + self.node_height,
        )
    }
}

/// Width and node count of one measured subtree.
#[derive(Debug, Clone, Copy)]
struct Measure {
    width: f32,
    size: usize,
}

/// Tree-wide values carried down the placement recursion.
#[derive(Debug, Clone, Copy)]
struct TreeTag {
    index: usize,
    origin: TreeOrigin,
}

/// The pedigree layout engine.
pub struct PedigreeLayout {
    config: PedigreeLayoutConfig,
}

impl PedigreeLayout {
    /// Create a new pedigree layout with the given configuration.
    pub fn new(config: PedigreeLayoutConfig) -> Self {
        Self { config }
    }

    /// Create a pedigree layout with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(PedigreeLayoutConfig::default())
    }

    pub fn config(&self) -> &PedigreeLayoutConfig {
        &self.config
    }

    /// Horizontal space a subtree needs.
    pub fn subtree_width(&self, node: &TreeNode<'_>) -> f32 {
        let mut measures = Vec::with_capacity(node.size());
        let root = self.measure(node, &mut measures);
        measures[root].width
    }

    /// Lay out a whole forest.
    pub fn compute(&self, forest: &Forest<'_>) -> ForestLayout {
        if forest.is_empty() {
            return ForestLayout::empty();
        }

        let cfg = &self.config;
        let mut placements = Vec::with_capacity(forest.node_count());
        let mut measures = Vec::new();
        let mut offset_x = 0.0f32;

        for (index, tree) in forest.trees().iter().enumerate() {
            measures.clear();
            let root = self.measure(&tree.root, &mut measures);
            let width = measures[root].width;

            let tag = TreeTag {
                index,
                origin: tree.origin,
            };
            self.place(
                &tree.root,
                root,
                offset_x + width / 2.0 + cfg.margin,
                cfg.margin,
                0,
                &measures,
                tag,
                &mut placements,
            );

            offset_x += width + cfg.horizontal_gap * cfg.tree_gap_factor;
        }

        let (connectors, suppressed_edges) = self.connect(forest, &placements);

        let mut max_x = f32::NEG_INFINITY;
        let mut max_y = f32::NEG_INFINITY;
        for p in &placements {
            max_x = max_x.max(p.x + cfg.node_width / 2.0);
            max_y = max_y.max(p.y + cfg.node_height);
        }

        ForestLayout {
            placements,
            connectors,
            suppressed_edges,
            width: max_x + cfg.margin,
            height: max_y + cfg.margin,
            node_width: cfg.node_width,
            node_height: cfg.node_height,
        }
    }

    /// Bottom-up measure pass. Pushes one entry per node in pre-order and
    /// returns the index of `node`'s entry.
    fn measure(&self, node: &TreeNode<'_>, out: &mut Vec<Measure>) -> usize {
        let idx = out.len();
        out.push(Measure {
            width: self.config.node_width,
            size: 1,
        });
        if node.is_leaf() {
            return idx;
        }

        let mut size = 1;
        for child in &node.children {
            let child_idx = self.measure(child, out);
            size += out[child_idx].size;
        }

        let span = self.children_span(node, idx, out);
        out[idx] = Measure {
            width: span.max(self.config.node_width),
            size,
        };
        idx
    }

    /// Combined width of a node's child subtrees including the gaps between them.
    fn children_span(&self, node: &TreeNode<'_>, idx: usize, measures: &[Measure]) -> f32 {
        let mut child_idx = idx + 1;
        let mut span = 0.0f32;
        for i in 0..node.children.len() {
            if i > 0 {
                span += self.config.horizontal_gap;
            }
            span += measures[child_idx].width;
            child_idx += measures[child_idx].size;
        }
        span
    }

    /// Top-down placement pass.
    #[allow(clippy::too_many_arguments)]
    fn place(
        &self,
        node: &TreeNode<'_>,
        idx: usize,
        x: f32,
        y: f32,
        depth: u32,
        measures: &[Measure],
        tag: TreeTag,
        placements: &mut Vec<NodePlacement>,
    ) {
        placements.push(NodePlacement {
            person: node.person.clone(),
            x,
            y,
            depth,
            tree_index: tag.index,
            origin: tag.origin,
        });

        if node.is_leaf() {
            return;
        }

        let total_width = self.children_span(node, idx, measures);
        let child_y = y + self.config.node_height + self.config.vertical_gap;
        let mut current_x = x - total_width / 2.0;
        let mut child_idx = idx + 1;

        for child in &node.children {
            let child_width = measures[child_idx].width;
            self.place(
                child,
                child_idx,
                current_x + child_width / 2.0,
                child_y,
                depth + 1,
                measures,
                tag,
                placements,
            );
            current_x += child_width + self.config.horizontal_gap;
            child_idx += measures[child_idx].size;
        }
    }

    /// Build connectors for every normalised edge with both endpoints placed.
    fn connect(
        &self,
        forest: &Forest<'_>,
        placements: &[NodePlacement],
    ) -> (Vec<Connector>, Vec<RelationshipId>) {
        let by_id: HashMap<&PersonId, &NodePlacement> =
            placements.iter().map(|p| (&p.person.id, p)).collect();

        let mut connectors = Vec::with_capacity(forest.edges().len());
        let mut suppressed = Vec::new();

        for rel in forest.edges() {
            let (Some(parent), Some(child)) =
                (by_id.get(&rel.parent_id), by_id.get(&rel.child_id))
            else {
                continue;
            };

            if parent.origin == TreeOrigin::Detached && child.origin == TreeOrigin::Detached {
                tracing::warn!(
                    relationship = %rel.id,
                    parent = %rel.parent_id,
                    child = %rel.child_id,
                    "relationship lies on a cycle with no root, connector suppressed"
                );
                suppressed.push(rel.id.clone());
                continue;
            }

            connectors.push(Connector {
                relationship_id: rel.id.clone(),
                parent_id: rel.parent_id.clone(),
                child_id: rel.child_id.clone(),
                x1: parent.x,
                y1: parent.y + self.config.node_height,
                x2: child.x,
                y2: child.y,
                bend: self.config.vertical_gap / 2.0,
            });
        }

        (connectors, suppressed)
    }
}

/// Build the forest for a snapshot and lay it out.
pub fn compute_forest_layout(
    snapshot: &FamilySnapshot,
    config: &PedigreeLayoutConfig,
) -> ForestLayout {
    if snapshot.is_empty() {
        return ForestLayout::empty();
    }
    let forest = build_forest(&snapshot.people, &snapshot.relationships);
    PedigreeLayout::new(config.clone()).compute(&forest)
}
