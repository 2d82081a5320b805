use std::time::Duration;

use geo::{MultiLineString, Point};
use serde::{Deserialize, Serialize};

use crate::frontier::FrontierStore;
use crate::geometry::{BoundaryId, Crs};

/// The walkable part of one boundary curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalkableFeature {
    pub boundary_id: BoundaryId,
    pub geometry: MultiLineString<f64>,
    /// Planar length of `geometry` in map units.
    pub length: f64,
}

/// Display hint for a result layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerStyle {
    /// Colour as a CSS name or `#rrggbb`.
    pub color: String,
    /// Line width; `None` keeps the renderer's default.
    pub width: Option<f64>,
}

impl LayerStyle {
    /// Red with the renderer's default width.
    #[must_use]
    pub fn highlight() -> Self {
        Self {
            color: "red".to_owned(),
            width: None,
        }
    }
}

/// Counters collected while a run executes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    pub iterations: u32,
    pub vertices_inserted: usize,
    pub vertices_replaced: usize,
    pub candidates_rejected: usize,
    pub elapsed: Duration,
}

/// The outcome of a completed run.
#[derive(Debug)]
pub struct CatchmentResult {
    pub network: Vec<WalkableFeature>,
    /// Interface catchment: total walkable boundary length, rounded.
    pub ic: u64,
    /// The starting point in the analysis reference.
    pub origin: Point<f64>,
    pub crs: Crs,
    pub network_style: LayerStyle,
    pub origin_style: LayerStyle,
    /// The wavefront as it stood when the run converged.
    pub frontier: FrontierStore,
    pub stats: RunStats,
}

impl CatchmentResult {
    /// Layer label of the result, `IC_<ic>`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("IC_{}", self.ic)
    }

    /// Unrounded sum of the feature lengths.
    #[must_use]
    pub fn total_length(&self) -> f64 {
        self.network.iter().map(|f| f.length).sum()
    }

    /// The walkable part of boundary `id`, if any.
    #[must_use]
    pub fn feature(&self, id: BoundaryId) -> Option<&WalkableFeature> {
        self.network.iter().find(|f| f.boundary_id == id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use geo::LineString;

    fn result(ic: u64) -> CatchmentResult {
        let feature = |id, len: f64| WalkableFeature {
            boundary_id: BoundaryId(id),
            geometry: MultiLineString::new(vec![LineString::from(vec![(0.0, 0.0), (len, 0.0)])]),
            length: len,
        };
        CatchmentResult {
            network: vec![feature(1, 2.25), feature(4, 3.5)],
            ic,
            origin: Point::new(0.0, 0.0),
            crs: Crs::local(),
            network_style: LayerStyle::highlight(),
            origin_style: LayerStyle::highlight(),
            frontier: FrontierStore::new(0.005),
            stats: RunStats::default(),
        }
    }

    #[test]
    fn label_and_totals() {
        let r = result(6);
        assert_eq!(r.label(), "IC_6");
        assert!((r.total_length() - 5.75).abs() < 1e-12);
        assert!(r.feature(BoundaryId(4)).is_some());
        assert!(r.feature(BoundaryId(2)).is_none());
    }

    #[test]
    fn feature_serializes() {
        let r = result(6);
        let json = serde_json::to_string(&r.network[0]).unwrap();
        let back: WalkableFeature = serde_json::from_str(&json).unwrap();
        assert_eq!(back, r.network[0]);
        assert!(json.contains("boundary_id"));
    }
}
