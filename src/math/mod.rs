pub mod polygon_2d;

use geo::Coord;

/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Converts a `geo` coordinate into an `nalgebra` point.
#[must_use]
pub fn point_from_coord(c: Coord<f64>) -> Point2 {
    Point2::new(c.x, c.y)
}

/// Converts an `nalgebra` point into a `geo` coordinate.
#[must_use]
pub fn coord_from_point(p: &Point2) -> Coord<f64> {
    Coord { x: p.x, y: p.y }
}

/// Straight-line distance between two coordinates.
#[must_use]
pub fn hop_length(a: Coord<f64>, b: Coord<f64>) -> f64 {
    nalgebra::distance(&point_from_coord(a), &point_from_coord(b))
}

/// Sum of the hop lengths along an open coordinate sequence.
#[must_use]
pub fn polyline_length(coords: &[Coord<f64>]) -> f64 {
    coords.windows(2).map(|w| hop_length(w[0], w[1])).sum()
}
