use geo::{BooleanOps, Coord, Intersects, LineString, MultiLineString, MultiPolygon, Polygon};
use tracing::{debug, info};

use super::relax::BlockingSurface;
use crate::error::{PreconditionError, Result};
use crate::geometry::boolean::{dissolve_to_parts, fill_holes};
use crate::geometry::buffer::{buffer_point, dilate, erode};
use crate::geometry::outline::{lines_to_polygons, polygon_outline};
use crate::geometry::repair::{clean_line, repair_polygons};
use crate::geometry::reproject::reproject;
use crate::geometry::{BoundaryCurve, BoundaryId, Reproject};
use crate::params::{CatchmentParams, ObstacleInput};
use crate::task::CancelToken;

/// Obstacles reduced to what the relaxation needs, in the analysis reference.
#[derive(Debug, Clone)]
pub struct PreparedObstacles {
    pub origin: Coord<f64>,
    pub walking_budget: f64,
    /// Disk of radius `walking_budget` around the origin.
    pub walking_buffer: MultiPolygon<f64>,
    /// Dissolved obstacle parts near the origin.
    pub region: MultiPolygon<f64>,
    pub blocking: BlockingSurface,
    /// One curve per obstacle part, clipped to the walking buffer.
    pub boundaries: Vec<BoundaryCurve>,
}

impl PreparedObstacles {
    fn unreachable(origin: Coord<f64>, walking_budget: f64) -> Self {
        Self {
            origin,
            walking_budget,
            walking_buffer: MultiPolygon::new(Vec::new()),
            region: MultiPolygon::new(Vec::new()),
            blocking: BlockingSurface::default(),
            boundaries: Vec::new(),
        }
    }

    /// Returns `true` if no boundary lies within the walking buffer.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.boundaries.is_empty()
    }
}

/// Turns raw obstacle features into boundary curves and a blocking surface.
pub struct PrepareObstacles<'a> {
    params: &'a CatchmentParams,
    reprojector: &'a dyn Reproject,
}

impl<'a> PrepareObstacles<'a> {
    #[must_use]
    pub fn new(params: &'a CatchmentParams, reprojector: &'a dyn Reproject) -> Self {
        Self {
            params,
            reprojector,
        }
    }

    /// Executes the preparation pipeline.
    ///
    /// # Errors
    ///
    /// Returns `PreconditionError::MissingOrigin` without a starting point,
    /// a `ReprojectionError` if the inputs cannot be moved into the analysis
    /// reference, or `CatchmentError::Canceled` if `cancel` is raised.
    pub fn execute(&self, cancel: &CancelToken) -> Result<PreparedObstacles> {
        let params = self.params;
        let resolution = params.resolution;
        let tolerances = params.tolerances;
        let origin_input = params
            .origin
            .as_ref()
            .ok_or(PreconditionError::MissingOrigin)?;

        // Step 1: Move the origin into the analysis reference, once.
        let origin = reproject(
            self.reprojector,
            &origin_input.point,
            &origin_input.crs,
            &params.analysis_crs,
        )?
        .0;

        // Step 2: Clean and reproject the obstacle features.
        let features = self.reprojected_features()?;
        cancel.check()?;

        // Step 3: Walking buffer around the origin.
        let walking_buffer = buffer_point(origin, params.walking_budget, resolution.walking_buffer_segments);
        let Some(disk) = walking_buffer.0.first() else {
            info!("Walking buffer is empty, nothing is reachable");
            return Ok(PreparedObstacles::unreachable(origin, params.walking_budget));
        };

        // Step 4: Keep the features near the origin, as polygons.
        let nearby = match features {
            ObstacleInput::Polygons(polygons) => polygons
                .into_iter()
                .filter(|p| disk.intersects(p))
                .collect::<Vec<_>>(),
            ObstacleInput::Lines(lines) => {
                let near: Vec<LineString<f64>> =
                    lines.into_iter().filter(|l| l.intersects(disk)).collect();
                lines_to_polygons(&near)
            }
        };
        debug!(features = nearby.len(), "Obstacle features intersect the walking buffer");
        cancel.check()?;

        // Step 5: Repair and dissolve into connected parts.
        let mut parts = dissolve_to_parts(repair_polygons(&nearby));
        cancel.check()?;

        // Step 6: Optionally close notches narrower than the buffer distance.
        if params.remove_dead_ends {
            parts = self.close_dead_ends(parts, cancel)?;
        }
        info!(parts = parts.len(), "Obstacle region dissolved");

        // Step 7: Each part's outline within the buffer becomes a boundary.
        let mut boundaries = Vec::new();
        for (index, part) in (1_u32..).zip(&parts) {
            cancel.check()?;
            let lines = walking_buffer.clip(&MultiLineString::new(polygon_outline(part)), false);
            if lines.0.is_empty() {
                continue;
            }
            boundaries.push(BoundaryCurve::new(
                BoundaryId(index),
                lines,
                tolerances.boundary_containment,
            ));
        }
        info!(boundaries = boundaries.len(), "Boundary curves extracted");

        // Step 8: Erode the region to get the surface that blocks hops.
        let region = MultiPolygon::new(parts);
        let blocking = BlockingSurface::new(erode(&region, tolerances.erosion));
        cancel.check()?;

        Ok(PreparedObstacles {
            origin,
            walking_budget: params.walking_budget,
            walking_buffer,
            region,
            blocking,
            boundaries,
        })
    }

    fn reprojected_features(&self) -> Result<ObstacleInput> {
        let obstacles = &self.params.obstacles;
        let to = &self.params.analysis_crs;
        let features = match &obstacles.features {
            ObstacleInput::Polygons(polygons) => {
                let repaired = repair_polygons(polygons);
                let moved = repaired
                    .iter()
                    .map(|p| reproject(self.reprojector, p, &obstacles.crs, to))
                    .collect::<Result<Vec<Polygon<f64>>>>()?;
                ObstacleInput::Polygons(moved)
            }
            ObstacleInput::Lines(lines) => {
                let moved = lines
                    .iter()
                    .filter_map(clean_line)
                    .map(|l| reproject(self.reprojector, &l, &obstacles.crs, to))
                    .collect::<Result<Vec<LineString<f64>>>>()?;
                ObstacleInput::Lines(moved)
            }
        };
        Ok(features)
    }

    /// Morphological closing per part: dilate, erode by the same distance,
    /// then fill holes. Closed parts that now touch are dissolved again.
    fn close_dead_ends(&self, parts: Vec<Polygon<f64>>, cancel: &CancelToken) -> Result<Vec<Polygon<f64>>> {
        let distance = self.params.buffer_distance / 2.0;
        let mut closed = Vec::with_capacity(parts.len());
        for part in parts {
            cancel.check()?;
            let part = MultiPolygon::new(vec![part]);
            let grown = dilate(&part, distance);
            let shrunk = erode(&grown, distance);
            closed.extend(fill_holes(&shrunk, 0.0).0);
        }
        debug!(distance, parts = closed.len(), "Dead ends closed");
        Ok(dissolve_to_parts(closed))
    }
}
