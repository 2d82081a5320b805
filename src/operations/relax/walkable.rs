use std::collections::{BTreeMap, HashMap, HashSet};

use geo::{BooleanOps, Line, MultiPolygon};
use tracing::debug;

use crate::geometry::boolean::union_all;
use crate::geometry::buffer::thicken_segment;
use crate::geometry::BoundaryId;

type SegmentKey = [u64; 4];

/// Direction-independent identity of a segment.
fn segment_key(segment: &Line<f64>) -> SegmentKey {
    let (a, b) = if (segment.start.x, segment.start.y) <= (segment.end.x, segment.end.y) {
        (segment.start, segment.end)
    } else {
        (segment.end, segment.start)
    };
    [a.x.to_bits(), a.y.to_bits(), b.x.to_bits(), b.y.to_bits()]
}

/// Distinct segments gathered for one boundary during a pass.
#[derive(Debug, Default)]
pub struct SegmentSet {
    seen: HashSet<SegmentKey>,
    segments: Vec<Line<f64>>,
}

impl SegmentSet {
    /// Adds `segment` unless it, or its reverse, is already present.
    pub fn insert(&mut self, segment: Line<f64>) -> bool {
        let fresh = self.seen.insert(segment_key(&segment));
        if fresh {
            self.segments.push(segment);
        }
        fresh
    }

    #[must_use]
    pub fn contains(&self, segment: &Line<f64>) -> bool {
        self.seen.contains(&segment_key(segment))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    #[must_use]
    pub fn into_segments(self) -> Vec<Line<f64>> {
        self.segments
    }
}

/// Thin polygons along boundary curves that are known to be walkable,
/// one region per boundary.
#[derive(Debug, Clone)]
pub struct WalkableNetwork {
    geometries: BTreeMap<BoundaryId, MultiPolygon<f64>>,
    merged: HashMap<BoundaryId, HashSet<SegmentKey>>,
    thickening: f64,
}

impl WalkableNetwork {
    /// Creates an empty network whose segments are thickened by `thickening`
    /// on each side.
    #[must_use]
    pub fn new(thickening: f64) -> Self {
        Self {
            geometries: BTreeMap::new(),
            merged: HashMap::new(),
            thickening,
        }
    }

    #[must_use]
    pub fn get(&self, id: BoundaryId) -> Option<&MultiPolygon<f64>> {
        self.geometries.get(&id)
    }

    /// Returns `true` if `segment` was already merged into the region of `id`.
    #[must_use]
    pub fn is_merged(&self, id: BoundaryId, segment: &Line<f64>) -> bool {
        self.merged
            .get(&id)
            .is_some_and(|keys| keys.contains(&segment_key(segment)))
    }

    /// Thickens `segments` with flat caps and unions them into the region
    /// of boundary `id`. Returns how many new segments were merged.
    pub fn merge<I>(&mut self, id: BoundaryId, segments: I) -> usize
    where
        I: IntoIterator<Item = Line<f64>>,
    {
        let keys = self.merged.entry(id).or_default();
        let pieces: Vec<_> = segments
            .into_iter()
            .filter(|s| keys.insert(segment_key(s)))
            .filter_map(|s| thicken_segment(s.start, s.end, self.thickening))
            .collect();
        let count = pieces.len();
        if count == 0 {
            return 0;
        }

        let fresh = union_all(pieces);
        let region = match self.geometries.remove(&id) {
            Some(existing) => existing.union(&fresh),
            None => fresh,
        };
        debug!(boundary = %id, segments = count, parts = region.0.len(), "walkable geometry merged");
        self.geometries.insert(id, region);
        count
    }

    /// Number of boundaries that carry walkable geometry.
    #[must_use]
    pub fn len(&self) -> usize {
        self.geometries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.geometries.is_empty()
    }

    /// Regions in boundary order.
    pub fn iter(&self) -> impl Iterator<Item = (BoundaryId, &MultiPolygon<f64>)> {
        self.geometries.iter().map(|(id, g)| (*id, g))
    }
}
