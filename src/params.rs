use geo::{LineString, Point, Polygon};
use serde::{Deserialize, Serialize};

use crate::error::{PreconditionError, Result};
use crate::geometry::Crs;

/// Raw blocking features, either as areas or as closed outlines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ObstacleInput {
    Polygons(Vec<Polygon<f64>>),
    /// Each line is closed into a polygon before use.
    Lines(Vec<LineString<f64>>),
}

impl ObstacleInput {
    /// Number of input features.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Polygons(p) => p.len(),
            Self::Lines(l) => l.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Obstacle features and the reference they are expressed in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacles {
    pub features: ObstacleInput,
    pub crs: Crs,
}

/// The starting point and the reference it is expressed in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Origin {
    pub point: Point<f64>,
    pub crs: Crs,
}

/// Small fixed distances that absorb floating-point error from the
/// geometry engine. All values are in map units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tolerances {
    /// Half-width of the square cell within which two frontier vertices
    /// count as the same location.
    pub proximity: f64,
    /// Half-width of a thickened walkable segment.
    pub thickening: f64,
    /// Width of the corridor around a boundary curve that a walkable
    /// segment must stay inside.
    pub boundary_containment: f64,
    /// Inward erosion of the obstacle region used for hop tests.
    pub erosion: f64,
    /// Frontier vertices at or below this remaining budget are not expanded.
    pub min_remaining_budget: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            proximity: 0.005,
            thickening: 0.01,
            boundary_containment: 0.1,
            erosion: 0.05,
            min_remaining_budget: 0.001,
        }
    }
}

impl Tolerances {
    /// Checks that every tolerance is finite and positive.
    ///
    /// # Errors
    ///
    /// Returns `PreconditionError::InvalidTolerance` naming the first bad value.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("proximity", self.proximity),
            ("thickening", self.thickening),
            ("boundary_containment", self.boundary_containment),
            ("erosion", self.erosion),
            ("min_remaining_budget", self.min_remaining_budget),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value <= 0.0 {
                return Err(PreconditionError::InvalidTolerance { name, value }.into());
            }
        }
        Ok(())
    }
}

/// Segment counts used when curves are approximated by polygons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Resolution {
    /// Segments around the full walking buffer circle.
    pub walking_buffer_segments: usize,
    /// Segments around a frontier vertex's reach disk.
    pub reach_disk_segments: usize,
}

impl Default for Resolution {
    fn default() -> Self {
        Self {
            walking_buffer_segments: 360,
            reach_disk_segments: 180,
        }
    }
}

impl Resolution {
    /// Checks the segment counts against their minimums.
    ///
    /// # Errors
    ///
    /// Returns `PreconditionError::InvalidResolution` naming the first bad value.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("walking_buffer_segments", self.walking_buffer_segments, 8),
            ("reach_disk_segments", self.reach_disk_segments, 8),
        ];
        for (name, value, min) in fields {
            if value < min {
                return Err(PreconditionError::InvalidResolution { name, value, min }.into());
            }
        }
        Ok(())
    }
}

/// Immutable input record for one catchment run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatchmentParams {
    pub obstacles: Obstacles,
    pub origin: Option<Origin>,
    /// Reference every computation and output is expressed in.
    pub analysis_crs: Crs,
    /// Maximum total length of the straight hops from the origin.
    pub walking_budget: f64,
    /// Close narrow notches in the obstacles before extracting boundaries.
    pub remove_dead_ends: bool,
    /// Width below which notches are closed; halved internally.
    pub buffer_distance: f64,
    #[serde(default)]
    pub tolerances: Tolerances,
    #[serde(default)]
    pub resolution: Resolution,
}

impl CatchmentParams {
    /// Creates a record with obstacles, origin, and analysis all in one
    /// local planar reference and default tuning.
    #[must_use]
    pub fn new(obstacles: ObstacleInput, origin: Point<f64>, walking_budget: f64) -> Self {
        Self {
            obstacles: Obstacles {
                features: obstacles,
                crs: Crs::local(),
            },
            origin: Some(Origin {
                point: origin,
                crs: Crs::local(),
            }),
            analysis_crs: Crs::local(),
            walking_budget,
            remove_dead_ends: false,
            buffer_distance: 0.0,
            tolerances: Tolerances::default(),
            resolution: Resolution::default(),
        }
    }

    /// Enables dead-end closing for notches narrower than `buffer_distance`.
    #[must_use]
    pub fn with_dead_end_removal(mut self, buffer_distance: f64) -> Self {
        self.remove_dead_ends = true;
        self.buffer_distance = buffer_distance;
        self
    }

    /// Sets the references of the obstacles, origin, and analysis.
    #[must_use]
    pub fn with_references(mut self, obstacles: Crs, origin: Crs, analysis: Crs) -> Self {
        self.obstacles.crs = obstacles;
        if let Some(o) = self.origin.as_mut() {
            o.crs = origin;
        }
        self.analysis_crs = analysis;
        self
    }

    #[must_use]
    pub fn with_tolerances(mut self, tolerances: Tolerances) -> Self {
        self.tolerances = tolerances;
        self
    }

    #[must_use]
    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }

    /// Checks every precondition of a run.
    ///
    /// A zero budget is valid and produces an empty catchment.
    ///
    /// # Errors
    ///
    /// Returns a `PreconditionError` describing the first violation.
    pub fn validate(&self) -> Result<()> {
        if self.obstacles.features.is_empty() {
            return Err(PreconditionError::EmptyObstacles.into());
        }
        let origin = self.origin.as_ref().ok_or(PreconditionError::MissingOrigin)?;
        let (x, y) = origin.point.x_y();
        if !x.is_finite() || !y.is_finite() {
            return Err(PreconditionError::NonFiniteOrigin { x, y }.into());
        }
        if !self.walking_budget.is_finite() || self.walking_budget < 0.0 {
            return Err(PreconditionError::InvalidBudget(self.walking_budget).into());
        }
        if self.remove_dead_ends
            && (!self.buffer_distance.is_finite() || self.buffer_distance <= 0.0)
        {
            return Err(PreconditionError::InvalidBufferDistance(self.buffer_distance).into());
        }
        self.tolerances.validate()?;
        self.resolution.validate()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::CatchmentError;

    fn square() -> Polygon<f64> {
        Polygon::new(
            LineString::from(vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.0, 0.0)]),
            Vec::new(),
        )
    }

    fn params() -> CatchmentParams {
        CatchmentParams::new(
            ObstacleInput::Polygons(vec![square()]),
            Point::new(5.0, 5.0),
            10.0,
        )
    }

    #[test]
    fn defaults_validate() {
        assert!(params().validate().is_ok());
        assert!(CatchmentParams { walking_budget: 0.0, ..params() }.validate().is_ok());
    }

    #[test]
    fn empty_obstacles_rejected() {
        let p = CatchmentParams {
            obstacles: Obstacles {
                features: ObstacleInput::Lines(Vec::new()),
                crs: Crs::local(),
            },
            ..params()
        };
        assert!(matches!(
            p.validate(),
            Err(CatchmentError::Precondition(PreconditionError::EmptyObstacles))
        ));
    }

    #[test]
    fn missing_origin_rejected() {
        let p = CatchmentParams { origin: None, ..params() };
        assert!(matches!(
            p.validate(),
            Err(CatchmentError::Precondition(PreconditionError::MissingOrigin))
        ));
    }

    #[test]
    fn bad_budget_rejected() {
        for budget in [-1.0, f64::NAN, f64::INFINITY] {
            let p = CatchmentParams { walking_budget: budget, ..params() };
            assert!(p.validate().is_err(), "budget {budget} accepted");
        }
    }

    #[test]
    fn dead_end_distance_checked_only_when_enabled() {
        assert!(params().validate().is_ok());
        assert!(params().with_dead_end_removal(0.0).validate().is_err());
        assert!(params().with_dead_end_removal(2.0).validate().is_ok());
    }

    #[test]
    fn bad_tolerance_named() {
        let p = params().with_tolerances(Tolerances {
            erosion: 0.0,
            ..Tolerances::default()
        });
        let msg = p.validate().unwrap_err().to_string();
        assert!(msg.contains("erosion"));
    }

    #[test]
    fn bad_resolution_named() {
        let p = params().with_resolution(Resolution {
            reach_disk_segments: 3,
            ..Resolution::default()
        });
        assert!(matches!(
            p.validate(),
            Err(CatchmentError::Precondition(PreconditionError::InvalidResolution {
                name: "reach_disk_segments",
                ..
            }))
        ));
    }

    #[test]
    fn tuning_defaults_fill_in_from_json() {
        let json = r#"{ "proximity": 0.01 }"#;
        let t: Tolerances = serde_json::from_str(json).unwrap();
        assert!((t.proximity - 0.01).abs() < 1e-12);
        assert!((t.erosion - 0.05).abs() < 1e-12);
    }

    #[test]
    fn params_json_round_trip() {
        let p = params().with_dead_end_removal(3.0);
        let json = serde_json::to_string(&p).unwrap();
        let back: CatchmentParams = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }
}
