use geo::{
    Area, BooleanOps, Coord, LineString, MultiPolygon, Polygon, RemoveRepeatedPoints,
};

use crate::math::TOLERANCE;

/// Repairs a polygon into a valid region.
///
/// Rings lose repeated and non-finite coordinates and are closed. The
/// cleaned polygon is then normalised through the overlay engine, which
/// resolves self-intersections and splits bow-ties into separate parts.
/// Parts left enclosing no area are dropped afterwards, so a twisted ring
/// whose lobes cancel out in signed area still survives.
#[must_use]
pub fn repair_polygon(polygon: &Polygon<f64>) -> MultiPolygon<f64> {
    let Some(exterior) = clean_ring(polygon.exterior()) else {
        return MultiPolygon::new(Vec::new());
    };
    let interiors = polygon.interiors().iter().filter_map(clean_ring).collect();
    let resolved = MultiPolygon::new(vec![Polygon::new(exterior, interiors)])
        .union(&MultiPolygon::new(Vec::new()));
    resolved
        .into_iter()
        .filter(|part| part.unsigned_area() > TOLERANCE)
        .collect()
}

/// Repairs every polygon and flattens the results into single parts.
#[must_use]
pub fn repair_polygons(polygons: &[Polygon<f64>]) -> Vec<Polygon<f64>> {
    polygons
        .iter()
        .flat_map(|p| repair_polygon(p).0)
        .collect()
}

/// Repairs every part of a region.
#[must_use]
pub fn repair_region(region: &MultiPolygon<f64>) -> MultiPolygon<f64> {
    MultiPolygon::new(repair_polygons(&region.0))
}

/// Drops repeated and non-finite coordinates from a line.
///
/// Returns `None` if fewer than two vertices remain.
#[must_use]
pub fn clean_line(line: &LineString<f64>) -> Option<LineString<f64>> {
    let coords: Vec<Coord<f64>> = line.0.iter().copied().filter(is_finite).collect();
    let cleaned = LineString::new(coords).remove_repeated_points();
    (cleaned.0.len() >= 2).then_some(cleaned)
}

fn clean_ring(ring: &LineString<f64>) -> Option<LineString<f64>> {
    let mut cleaned = clean_line(ring)?;
    cleaned.close();
    (cleaned.0.len() >= 4).then_some(cleaned)
}

fn is_finite(c: &Coord<f64>) -> bool {
    c.x.is_finite() && c.y.is_finite()
}
