//! R-tree of person boxes using the rstar crate.
//!
//! Provides O(log n) queries for:
//! - The box under a point
//! - Boxes intersecting a rectangle
//! - Nearest box to a point

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use crate::family::PersonId;
use crate::layout::ForestLayout;

/// A laid-out person box.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonBox {
    pub id: PersonId,
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl PersonBox {
    pub fn new(id: PersonId, min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self {
            id,
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }
}

impl RTreeObject for PersonBox {
    type Envelope = AABB<[f32; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners([self.min_x, self.min_y], [self.max_x, self.max_y])
    }
}

impl PointDistance for PersonBox {
    /// Squared distance to the nearest point of the box; zero inside it.
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        let dx = (self.min_x - point[0]).max(0.0).max(point[0] - self.max_x);
        let dy = (self.min_y - point[1]).max(0.0).max(point[1] - self.max_y);
        dx * dx + dy * dy
    }

    /// Half-open: the min edges are inside, the max edges are not.
    fn contains_point(&self, point: &[f32; 2]) -> bool {
        point[0] >= self.min_x
            && point[0] < self.max_x
            && point[1] >= self.min_y
            && point[1] < self.max_y
    }
}

/// Spatial index over person boxes.
pub struct SpatialIndex {
    tree: RTree<PersonBox>,
}

impl SpatialIndex {
    /// Create a new empty spatial index.
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// Bulk-load the boxes of a layout.
    pub fn from_layout(layout: &ForestLayout) -> Self {
        let mut index = Self::new();
        index.rebuild(layout);
        index
    }

    /// Replace the contents with the boxes of `layout`.
    pub fn rebuild(&mut self, layout: &ForestLayout) {
        let boxes: Vec<_> = layout
            .placements
            .iter()
            .map(|placement| {
                let (min_x, min_y, max_x, max_y) = layout.node_box(placement);
                PersonBox::new(placement.person.id.clone(), min_x, min_y, max_x, max_y)
            })
            .collect();

        self.tree = RTree::bulk_load(boxes);
    }

    /// The person whose box contains the point.
    ///
    /// Boxes are half-open, so boxes that touch (a zero horizontal gap) never
    /// both claim the shared edge.
    pub fn person_at(&self, x: f32, y: f32) -> Option<&PersonId> {
        self.tree
            .locate_in_envelope_intersecting(&AABB::from_point([x, y]))
            .find(|b| b.contains_point(&[x, y]))
            .map(|b| &b.id)
    }

    /// Everyone whose box intersects the rectangle.
    pub fn people_in_rect(
        &self,
        min_x: f32,
        min_y: f32,
        max_x: f32,
        max_y: f32,
    ) -> Vec<&PersonId> {
        let envelope = AABB::from_corners([min_x, min_y], [max_x, max_y]);
        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|b| &b.id)
            .collect()
    }

    /// The person whose box is closest to the point.
    pub fn nearest(&self, x: f32, y: f32) -> Option<&PersonId> {
        self.tree.nearest_neighbor(&[x, y]).map(|b| &b.id)
    }

    /// The closest person, if their box is within `max_distance` of the point.
    pub fn nearest_within(&self, x: f32, y: f32, max_distance: f32) -> Option<&PersonId> {
        let max_distance_sq = max_distance * max_distance;
        self.tree
            .nearest_neighbor(&[x, y])
            .filter(|b| b.distance_2(&[x, y]) <= max_distance_sq)
            .map(|b| &b.id)
    }

    /// Clear all boxes from the index.
    pub fn clear(&mut self) {
        self.tree = RTree::new();
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new()
    }
}
