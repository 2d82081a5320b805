use std::fmt;

use geo::{BoundingRect, Contains, Coord, Intersects, Line, MultiLineString, MultiPolygon, Rect};
use serde::{Deserialize, Serialize};

use super::buffer::buffer_linework;
use super::outline::vertices;

/// Stable identifier of a boundary curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BoundaryId(pub u32);

impl fmt::Display for BoundaryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The outline of one obstacle part, clipped to the walking buffer.
///
/// Walkable geometry only ever accumulates along these curves.
#[derive(Debug, Clone)]
pub struct BoundaryCurve {
    id: BoundaryId,
    lines: MultiLineString<f64>,
    corridor: MultiPolygon<f64>,
    bounds: Option<Rect<f64>>,
}

impl BoundaryCurve {
    /// Builds a curve and its acceptance corridor, the linework buffered by
    /// `containment` with round joins.
    #[must_use]
    pub fn new(id: BoundaryId, lines: MultiLineString<f64>, containment: f64) -> Self {
        let corridor = buffer_linework(&lines, containment);
        let bounds = lines.bounding_rect();
        Self {
            id,
            lines,
            corridor,
            bounds,
        }
    }

    #[must_use]
    pub fn id(&self) -> BoundaryId {
        self.id
    }

    #[must_use]
    pub fn lines(&self) -> &MultiLineString<f64> {
        &self.lines
    }

    /// Returns `true` if the straight segment stays within the corridor
    /// around this curve.
    #[must_use]
    pub fn accepts(&self, segment: &Line<f64>) -> bool {
        self.corridor.contains(segment)
    }

    /// Returns `true` if the bounding box of this curve overlaps `other`.
    #[must_use]
    pub fn may_touch(&self, other: &Rect<f64>) -> bool {
        self.bounds.is_some_and(|b| b.intersects(other))
    }

    /// Vertices of the curve in order.
    #[must_use]
    pub fn vertices(&self) -> Vec<Coord<f64>> {
        vertices(&self.lines)
    }
}
