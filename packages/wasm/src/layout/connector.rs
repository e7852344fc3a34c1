//! Connector curves between a parent's box and a child's box.

use serde::Serialize;

use crate::family::{PersonId, RelationshipId};

/// A cubic connector for one parent → child edge.
///
/// Starts at the bottom-center of the parent's box and ends at the top-center
/// of the child's box. Both control points are pulled vertically by `bend`, so
/// the curve leaves and enters the boxes straight.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Connector {
    pub relationship_id: RelationshipId,
    pub parent_id: PersonId,
    pub child_id: PersonId,
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    /// Vertical control point offset (half the vertical gap).
    pub bend: f32,
}

impl Connector {
    /// First control point.
    #[inline]
    pub fn control_start(&self) -> (f32, f32) {
        (self.x1, self.y1 + self.bend)
    }

    /// Second control point.
    #[inline]
    pub fn control_end(&self) -> (f32, f32) {
        (self.x2, self.y2 - self.bend)
    }

    /// SVG path data: `M x1 y1 C cx1 cy1, cx2 cy2, x2 y2`.
    pub fn svg_path(&self) -> String {
        let (c1x, c1y) = self.control_start();
        let (c2x, c2y) = self.control_end();
        format!(
            "M {} {} C {} {}, {} {}, {} {}",
            self.x1, self.y1, c1x, c1y, c2x, c2y, self.x2, self.y2
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connector() -> Connector {
        Connector {
            relationship_id: RelationshipId::from("r1"),
            parent_id: PersonId::from("a"),
            child_id: PersonId::from("b"),
            x1: 120.0,
            y1: 110.0,
            x2: 60.5,
            y2: 190.0,
            bend: 40.0,
        }
    }

    #[test]
    fn test_control_points() {
        let c = connector();
        assert_eq!(c.control_start(), (120.0, 150.0));
        assert_eq!(c.control_end(), (60.5, 150.0));
    }

    #[test]
    fn test_svg_path() {
        assert_eq!(
            connector().svg_path(),
            "M 120 110 C 120 150, 60.5 150, 60.5 190"
        );
    }
}
