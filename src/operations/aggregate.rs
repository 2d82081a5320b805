use geo::{BooleanOps, Coord, LinesIter, MultiLineString};
use tracing::{info, warn};

use super::prepare::PreparedObstacles;
use super::relax::WalkableNetwork;
use crate::error::Result;
use crate::geometry::boolean::union_regions;
use crate::geometry::repair::repair_region;
use crate::math::{hop_length, polyline_length};
use crate::output::WalkableFeature;
use crate::task::CancelToken;

/// The walkable boundary network and its measured size.
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    pub network: Vec<WalkableFeature>,
    pub total_length: f64,
    pub ic: u64,
}

/// Cuts each boundary curve down to its walkable parts and measures them.
pub struct AggregateCatchment<'a> {
    prepared: &'a PreparedObstacles,
    walkable: &'a WalkableNetwork,
}

impl<'a> AggregateCatchment<'a> {
    #[must_use]
    pub fn new(prepared: &'a PreparedObstacles, walkable: &'a WalkableNetwork) -> Self {
        Self { prepared, walkable }
    }

    /// Executes the aggregation.
    ///
    /// # Errors
    ///
    /// Returns `CatchmentError::Canceled` if `cancel` is raised.
    pub fn execute(&self, cancel: &CancelToken) -> Result<Aggregation> {
        // Step 1: Repair every walkable region and merge them.
        let mut repaired = Vec::with_capacity(self.walkable.len());
        for (_, geometry) in self.walkable.iter() {
            cancel.check()?;
            repaired.push(repair_region(geometry));
        }
        let overlay = union_regions(repaired);
        if overlay.0.is_empty() {
            info!(ic = 0, "No walkable boundary found");
            return Ok(Aggregation::default());
        }

        // Step 2: Keep the parts of each boundary that lie in the overlay.
        let mut network = Vec::new();
        for boundary in &self.prepared.boundaries {
            cancel.check()?;
            let clipped = overlay.clip(boundary.lines(), false);
            let lines = MultiLineString::new(
                clipped.0.into_iter().filter(|l| l.0.len() >= 2).collect(),
            );
            if lines.0.is_empty() {
                continue;
            }
            let length = measured_length(&lines);
            network.push(WalkableFeature {
                boundary_id: boundary.id(),
                geometry: lines,
                length,
            });
        }

        // Step 3: Sum and round.
        let total_length: f64 = network.iter().map(|f| f.length).sum();
        let ic = catchment_index(total_length);
        info!(
            ic,
            total_length,
            features = network.len(),
            "Interface catchment measured"
        );
        Ok(Aggregation {
            network,
            total_length,
            ic,
        })
    }
}

/// Rounds a total length to the catchment index, halves going to even.
///
/// Non-finite or non-positive totals give zero.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn catchment_index(total_length: f64) -> u64 {
    if !total_length.is_finite() || total_length <= 0.0 {
        return 0;
    }
    total_length.round_ties_even() as u64
}

fn measured_length(lines: &MultiLineString<f64>) -> f64 {
    let length: f64 = lines.0.iter().map(|l| polyline_length(&l.0)).sum();
    if length.is_finite() {
        return length;
    }
    warn!("Length attribute is not finite, recomputing from the geometry");
    lines
        .lines_iter()
        .filter(|l| is_finite(l.start) && is_finite(l.end))
        .map(|l| hop_length(l.start, l.end))
        .filter(|len| len.is_finite())
        .sum()
}

fn is_finite(c: Coord<f64>) -> bool {
    c.x.is_finite() && c.y.is_finite()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::{BoundaryId, SameCrs};
    use crate::operations::{PrepareObstacles, RelaxVisibility};
    use crate::params::{CatchmentParams, ObstacleInput};
    use approx::assert_relative_eq;
    use geo::{LineString, Point, Polygon};

    fn block(x0: f64, y0: f64, x1: f64, y1: f64) -> Polygon<f64> {
        Polygon::new(
            LineString::from(vec![(x0, y0), (x1, y0), (x1, y1), (x0, y1), (x0, y0)]),
            Vec::new(),
        )
    }

    fn aggregate(params: &CatchmentParams) -> Aggregation {
        let cancel = CancelToken::new();
        let prepared = PrepareObstacles::new(params, &SameCrs).execute(&cancel).unwrap();
        let relaxed = RelaxVisibility::new(&prepared, params.tolerances, params.resolution)
            .execute(&cancel)
            .unwrap();
        AggregateCatchment::new(&prepared, &relaxed.walkable)
            .execute(&cancel)
            .unwrap()
    }

    #[test]
    fn index_rounds_half_to_even() {
        assert_eq!(catchment_index(0.0), 0);
        assert_eq!(catchment_index(-3.0), 0);
        assert_eq!(catchment_index(f64::NAN), 0);
        assert_eq!(catchment_index(2.4), 2);
        assert_eq!(catchment_index(2.5), 2);
        assert_eq!(catchment_index(3.5), 4);
        assert_eq!(catchment_index(80.0), 80);
    }

    #[test]
    fn non_finite_segments_are_skipped() {
        let lines = MultiLineString::new(vec![
            LineString::from(vec![(0.0, 0.0), (3.0, 4.0)]),
            LineString::from(vec![(0.0, 0.0), (f64::INFINITY, 0.0)]),
        ]);
        assert_relative_eq!(measured_length(&lines), 5.0);
    }

    #[test]
    fn visible_face_of_a_block() {
        // From (5, 13) only the top face is in view; the budget reaches
        // both top corners and only a short way round them.
        let params = CatchmentParams::new(
            ObstacleInput::Polygons(vec![block(0.0, 0.0, 10.0, 10.0)]),
            Point::new(5.0, 13.0),
            6.0,
        );
        let agg = aggregate(&params);
        assert_eq!(agg.network.len(), 1);
        assert_eq!(agg.network[0].boundary_id, BoundaryId(1));
        assert!(agg.total_length > 10.0);
        assert!(agg.total_length < 11.0);
        assert_eq!(agg.ic, 10);
    }

    #[test]
    fn nothing_walkable_gives_zero() {
        let params = CatchmentParams::new(
            ObstacleInput::Polygons(vec![block(0.0, 0.0, 10.0, 10.0)]),
            Point::new(5.0, 13.0),
            0.0,
        );
        let agg = aggregate(&params);
        assert!(agg.network.is_empty());
        assert_eq!(agg.ic, 0);
    }
}
