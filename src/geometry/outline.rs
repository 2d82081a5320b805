use geo::{Coord, LineString, MultiLineString, Polygon, RemoveRepeatedPoints};

/// Extracts the rings of one polygon as closed line strings.
#[must_use]
pub fn polygon_outline(polygon: &Polygon<f64>) -> Vec<LineString<f64>> {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .filter(|ring| ring.0.len() >= 2)
        .cloned()
        .collect()
}

/// Closes each input line into a polygon ring.
///
/// Lines with fewer than three distinct vertices enclose no area and are
/// dropped.
#[must_use]
pub fn lines_to_polygons(lines: &[LineString<f64>]) -> Vec<Polygon<f64>> {
    lines
        .iter()
        .filter_map(|line| {
            let mut ring = line.remove_repeated_points();
            if ring.is_closed() && ring.0.len() > 1 {
                ring.0.pop();
            }
            (ring.0.len() >= 3).then(|| Polygon::new(ring, Vec::new()))
        })
        .collect()
}

/// Collects the vertices of `lines` in order, skipping consecutive repeats.
#[must_use]
pub fn vertices(lines: &MultiLineString<f64>) -> Vec<Coord<f64>> {
    let mut out: Vec<Coord<f64>> = Vec::new();
    for line in &lines.0 {
        for &c in &line.0 {
            if out.last() != Some(&c) {
                out.push(c);
            }
        }
    }
    out
}
