use geo::{Area, BooleanOps, MultiPolygon, Polygon};

/// Unions any number of polygons into one region.
///
/// Pieces are merged pairwise in a balanced tree so that each boolean
/// operation works on inputs of similar size.
#[must_use]
pub fn union_all<I>(polygons: I) -> MultiPolygon<f64>
where
    I: IntoIterator<Item = Polygon<f64>>,
{
    let layer: Vec<MultiPolygon<f64>> = polygons
        .into_iter()
        .map(|p| MultiPolygon::new(vec![p]))
        .collect();
    union_layers(layer)
}

/// Unions a sequence of regions into one.
#[must_use]
pub fn union_regions<I>(regions: I) -> MultiPolygon<f64>
where
    I: IntoIterator<Item = MultiPolygon<f64>>,
{
    union_layers(regions.into_iter().filter(|r| !r.0.is_empty()).collect())
}

fn union_layers(mut layer: Vec<MultiPolygon<f64>>) -> MultiPolygon<f64> {
    match layer.len() {
        0 => return MultiPolygon::new(Vec::new()),
        // A lone region is still passed through the overlay so that
        // self-overlaps are resolved.
        1 => return layer[0].union(&MultiPolygon::new(Vec::new())),
        _ => {}
    }
    while layer.len() > 1 {
        let mut next = Vec::with_capacity(layer.len().div_ceil(2));
        let mut pieces = layer.into_iter();
        while let Some(a) = pieces.next() {
            match pieces.next() {
                Some(b) => next.push(a.union(&b)),
                None => next.push(a),
            }
        }
        layer = next;
    }
    layer.pop().unwrap_or_else(|| MultiPolygon::new(Vec::new()))
}

/// Dissolves polygons into one region and splits it back into connected
/// single-part polygons. Touching inputs come out as one part.
#[must_use]
pub fn dissolve_to_parts<I>(polygons: I) -> Vec<Polygon<f64>>
where
    I: IntoIterator<Item = Polygon<f64>>,
{
    explode(union_all(polygons))
}

/// Splits a multi-part region into its single-part polygons.
#[must_use]
pub fn explode(region: MultiPolygon<f64>) -> Vec<Polygon<f64>> {
    region.0
}

/// Removes interior rings whose area is below `min_area`.
///
/// A `min_area` of zero or less removes every hole.
#[must_use]
pub fn fill_holes(region: &MultiPolygon<f64>, min_area: f64) -> MultiPolygon<f64> {
    let polygons = region
        .0
        .iter()
        .map(|polygon| {
            let kept = polygon
                .interiors()
                .iter()
                .filter(|ring| {
                    min_area > 0.0
                        && Polygon::new((*ring).clone(), Vec::new()).unsigned_area() >= min_area
                })
                .cloned()
                .collect();
            Polygon::new(polygon.exterior().clone(), kept)
        })
        .collect();
    MultiPolygon::new(polygons)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use geo::LineString;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Polygon<f64> {
        Polygon::new(
            LineString::from(vec![(x0, y0), (x1, y0), (x1, y1), (x0, y1), (x0, y0)]),
            Vec::new(),
        )
    }

    #[test]
    fn union_all_merges_touching() {
        let merged = union_all(vec![rect(0.0, 0.0, 1.0, 1.0), rect(1.0, 0.0, 2.0, 1.0)]);
        assert_eq!(merged.0.len(), 1);
        assert_relative_eq!(merged.unsigned_area(), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn union_all_keeps_disjoint_parts() {
        let parts = dissolve_to_parts(vec![
            rect(0.0, 0.0, 1.0, 1.0),
            rect(5.0, 5.0, 6.0, 6.0),
            rect(0.5, 0.5, 1.5, 1.5),
        ]);
        assert_eq!(parts.len(), 2);
    }

    #[test]
    fn union_all_empty() {
        assert!(union_all(Vec::new()).0.is_empty());
        assert!(union_regions(Vec::new()).0.is_empty());
    }

    #[test]
    fn union_of_odd_count() {
        let merged = union_all(vec![
            rect(0.0, 0.0, 1.0, 1.0),
            rect(1.0, 0.0, 2.0, 1.0),
            rect(2.0, 0.0, 3.0, 1.0),
        ]);
        assert_relative_eq!(merged.unsigned_area(), 3.0, epsilon = 1e-9);
    }

    #[test]
    fn fill_all_holes() {
        let holed = Polygon::new(
            rect(0.0, 0.0, 10.0, 10.0).exterior().clone(),
            vec![
                rect(2.0, 2.0, 3.0, 3.0).exterior().clone(),
                rect(5.0, 5.0, 8.0, 8.0).exterior().clone(),
            ],
        );
        let region = MultiPolygon::new(vec![holed]);
        assert_relative_eq!(fill_holes(&region, 0.0).unsigned_area(), 100.0, epsilon = 1e-9);
        let partial = fill_holes(&region, 4.0);
        assert_eq!(partial.0[0].interiors().len(), 1);
        assert_relative_eq!(partial.unsigned_area(), 91.0, epsilon = 1e-9);
    }
}
