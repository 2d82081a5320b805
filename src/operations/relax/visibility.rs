use geo::{BoundingRect, Coord, Intersects, Line, MultiPolygon, Polygon, Rect};

/// The eroded obstacle interior that a straight hop must not touch.
///
/// Eroding first lets hops run along an obstacle's outline and end on it
/// without counting as blocked.
#[derive(Debug, Clone, Default)]
pub struct BlockingSurface {
    parts: Vec<(Rect<f64>, Polygon<f64>)>,
}

impl BlockingSurface {
    #[must_use]
    pub fn new(interior: MultiPolygon<f64>) -> Self {
        let parts = interior
            .0
            .into_iter()
            .filter_map(|p| p.bounding_rect().map(|r| (r, p)))
            .collect();
        Self { parts }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Returns `true` if the straight hop `from`-`to` touches the surface.
    #[must_use]
    pub fn blocks(&self, from: Coord<f64>, to: Coord<f64>) -> bool {
        let hop = Line::new(from, to);
        let hop_bounds = Rect::new(from, to);
        self.parts
            .iter()
            .any(|(bounds, part)| bounds.intersects(&hop_bounds) && part.intersects(&hop))
    }

    /// Returns `true` if `to` can be reached from `from` in a straight line.
    #[must_use]
    pub fn is_visible(&self, from: Coord<f64>, to: Coord<f64>) -> bool {
        !self.blocks(from, to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::buffer::erode;
    use geo::{coord, LineString};

    fn surface() -> BlockingSurface {
        let block = MultiPolygon::new(vec![Polygon::new(
            LineString::from(vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0)]),
            Vec::new(),
        )]);
        BlockingSurface::new(erode(&block, 0.05))
    }

    #[test]
    fn hop_through_obstacle_is_blocked() {
        let s = surface();
        assert!(s.blocks(coord! { x: -1.0, y: 5.0 }, coord! { x: 11.0, y: 5.0 }));
        assert!(!s.is_visible(coord! { x: 5.0, y: -1.0 }, coord! { x: 5.0, y: 11.0 }));
    }

    #[test]
    fn hop_along_outline_is_visible() {
        let s = surface();
        assert!(s.is_visible(coord! { x: 0.0, y: 0.0 }, coord! { x: 10.0, y: 0.0 }));
        assert!(s.is_visible(coord! { x: -3.0, y: 12.0 }, coord! { x: 0.0, y: 10.0 }));
    }

    #[test]
    fn hop_ending_on_far_corner_through_interior_is_blocked() {
        let s = surface();
        assert!(s.blocks(coord! { x: 0.0, y: 0.0 }, coord! { x: 10.0, y: 10.0 }));
    }

    #[test]
    fn hop_outside_bounds_is_visible() {
        let s = surface();
        assert!(s.is_visible(coord! { x: 20.0, y: 0.0 }, coord! { x: 20.0, y: 10.0 }));
        assert!(BlockingSurface::default().is_empty());
    }
}
