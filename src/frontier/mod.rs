mod batch;
pub mod vertex;

pub use batch::{FrontierBatch, Offer};
pub use vertex::{FrontierVertex, VertexId};

use geo::Coord;
use rstar::primitives::GeomWithData;
use rstar::{RTree, AABB};
use slotmap::SlotMap;

type IndexEntry = GeomWithData<[f64; 2], VertexId>;

/// Counts of what one or more commits did to the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitSummary {
    pub inserted: usize,
    /// Committed vertices deleted in favour of a better candidate.
    pub replaced: usize,
    /// Candidates that lost to a vertex already in their cell.
    pub rejected: usize,
    /// Pending candidates displaced by a later, better candidate in the same batch.
    pub superseded: usize,
}

impl CommitSummary {
    /// Adds the counts of `other` to this summary.
    pub fn absorb(&mut self, other: CommitSummary) {
        self.inserted += other.inserted;
        self.replaced += other.replaced;
        self.rejected += other.rejected;
        self.superseded += other.superseded;
    }
}

/// Arena of live frontier vertices with a spatial index over their positions.
///
/// At most one vertex survives per proximity cell: see [`FrontierBatch::offer`].
/// Vertices are never edited, only inserted and deleted.
#[derive(Debug)]
pub struct FrontierStore {
    vertices: SlotMap<VertexId, FrontierVertex>,
    index: RTree<IndexEntry>,
    proximity: f64,
}

impl FrontierStore {
    /// Creates an empty store whose cells have half-width `proximity`.
    #[must_use]
    pub fn new(proximity: f64) -> Self {
        Self {
            vertices: SlotMap::with_key(),
            index: RTree::new(),
            proximity,
        }
    }

    /// Half-width of a proximity cell.
    #[must_use]
    pub fn proximity(&self) -> f64 {
        self.proximity
    }

    #[must_use]
    pub fn get(&self, id: VertexId) -> Option<&FrontierVertex> {
        self.vertices.get(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Iterates over all live vertices.
    pub fn iter(&self) -> impl Iterator<Item = (VertexId, &FrontierVertex)> {
        self.vertices.iter()
    }

    /// Live vertices inside the square cell of half-width [`Self::proximity`]
    /// centred on `at`, edges included.
    pub fn in_cell(&self, at: Coord<f64>) -> impl Iterator<Item = (VertexId, &FrontierVertex)> {
        let h = self.proximity;
        let envelope = AABB::from_corners([at.x - h, at.y - h], [at.x + h, at.y + h]);
        self.index
            .locate_in_envelope(&envelope)
            .filter_map(|entry| self.vertices.get(entry.data).map(|v| (entry.data, v)))
    }

    /// Ids of the vertices that drive the next pass: discovered in
    /// `iteration` with more than `threshold` budget left.
    #[must_use]
    pub fn generation(&self, iteration: u32, threshold: f64) -> Vec<VertexId> {
        self.vertices
            .iter()
            .filter(|(_, v)| v.is_expandable(iteration, threshold))
            .map(|(id, _)| id)
            .collect()
    }

    /// Follows `prev_id` links from `id` back towards the origin.
    ///
    /// The walk stops at the first vertex that is no longer live.
    #[must_use]
    pub fn chain(&self, id: VertexId) -> Vec<VertexId> {
        let mut out = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let Some(v) = self.vertices.get(current) else {
                break;
            };
            out.push(current);
            cursor = v.prev_id;
        }
        out
    }

    /// Starts a batch of pending changes.
    #[must_use]
    pub fn begin(&self) -> FrontierBatch {
        FrontierBatch::new()
    }

    /// Applies a batch: deletes displaced vertices, then inserts survivors.
    pub fn commit(&mut self, batch: FrontierBatch) -> CommitSummary {
        let parts = batch.into_parts();
        let mut summary = CommitSummary {
            rejected: parts.rejected,
            superseded: parts.superseded,
            ..CommitSummary::default()
        };

        for id in parts.doomed {
            if let Some(v) = self.vertices.remove(id) {
                self.index
                    .remove(&GeomWithData::new([v.position.x, v.position.y], id));
                summary.replaced += 1;
            }
        }
        for v in parts.pending {
            let id = self.vertices.insert(v);
            self.index
                .insert(GeomWithData::new([v.position.x, v.position.y], id));
            summary.inserted += 1;
        }
        summary
    }
}
