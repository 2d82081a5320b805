use geo::{Coord, LineString, LinesIter, MultiLineString, MultiPolygon, Point, Polygon};
use geo_buf::buffer_multi_polygon_rounded;

use super::boolean::union_all;
use crate::math::polygon_2d::{left_normal, segment_direction};
use crate::math::{coord_from_point, point_from_coord, TOLERANCE};

/// Buffers a point into a regular polygon with `segments` vertices
/// approximating a disk.
///
/// A non-positive radius yields an empty result.
#[must_use]
pub fn buffer_point(center: Coord<f64>, radius: f64, segments: usize) -> MultiPolygon<f64> {
    if !radius.is_finite() || radius <= TOLERANCE {
        return MultiPolygon::new(Vec::new());
    }
    let disk = geo_buf::buffer_point(&Point::from(center), radius, segments.max(3));
    MultiPolygon::new(vec![disk])
}

/// Thickens the straight segment `a`-`b` by `half_width` on both sides,
/// stopping square at the end points.
///
/// A zero-length segment thickens to nothing.
#[must_use]
pub fn thicken_segment(a: Coord<f64>, b: Coord<f64>, half_width: f64) -> Option<Polygon<f64>> {
    if !half_width.is_finite() || half_width <= TOLERANCE {
        return None;
    }
    let pa = point_from_coord(a);
    let pb = point_from_coord(b);
    let dir = segment_direction(&pa, &pb).ok()?;
    let n = left_normal(dir) * half_width;
    let ring: Vec<Coord<f64>> = [pa - n, pb - n, pb + n, pa + n]
        .iter()
        .map(coord_from_point)
        .collect();
    Some(Polygon::new(LineString::new(ring), Vec::new()))
}

/// Buffers `lines` by `radius` with round joins.
///
/// The linework is first thickened into flat strips of half the radius,
/// which are then offset outward by the other half with rounded corners.
#[must_use]
pub fn buffer_linework(lines: &MultiLineString<f64>, radius: f64) -> MultiPolygon<f64> {
    if !radius.is_finite() || radius <= TOLERANCE {
        return MultiPolygon::new(Vec::new());
    }
    let half = radius / 2.0;
    let strips = union_all(
        lines
            .lines_iter()
            .filter_map(|line| thicken_segment(line.start, line.end, half)),
    );
    dilate(&strips, radius - half)
}

/// Grows `region` outward by `distance` with round joins.
#[must_use]
pub fn dilate(region: &MultiPolygon<f64>, distance: f64) -> MultiPolygon<f64> {
    if distance <= TOLERANCE || region.0.is_empty() {
        return region.clone();
    }
    buffer_multi_polygon_rounded(region, distance)
}

/// Shrinks `region` inward by `distance`, removing every point closer than
/// `distance` to its outline.
#[must_use]
pub fn erode(region: &MultiPolygon<f64>, distance: f64) -> MultiPolygon<f64> {
    if distance <= TOLERANCE || region.0.is_empty() {
        return region.clone();
    }
    buffer_multi_polygon_rounded(region, -distance)
}
