use geo::Coord;

use crate::geometry::BoundaryId;

slotmap::new_key_type! {
    /// Unique identifier for a vertex in the frontier store.
    pub struct VertexId;
}

/// A boundary point reached during relaxation, with the budget left over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrontierVertex {
    pub position: Coord<f64>,
    /// Pass that discovered the vertex; 1 for vertices seen from the origin.
    pub iteration: u32,
    /// The vertex whose expansion discovered this one.
    pub prev_id: Option<VertexId>,
    pub remaining_budget: f64,
    pub boundary_id: BoundaryId,
}

impl FrontierVertex {
    /// Returns `true` if the vertex belongs to `iteration` and still has more
    /// than `threshold` budget to spend.
    #[must_use]
    pub fn is_expandable(&self, iteration: u32, threshold: f64) -> bool {
        self.iteration == iteration && self.remaining_budget > threshold
    }

    /// Returns `true` if `other` lies in the square cell of half-width
    /// `half_width` centred on this vertex.
    #[must_use]
    pub fn shares_cell(&self, other: Coord<f64>, half_width: f64) -> bool {
        (self.position.x - other.x).abs() <= half_width
            && (self.position.y - other.y).abs() <= half_width
    }
}
