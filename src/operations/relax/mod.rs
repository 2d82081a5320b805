mod visibility;
mod walkable;

pub use visibility::BlockingSurface;
pub use walkable::{SegmentSet, WalkableNetwork};

use std::collections::BTreeMap;

use geo::{BooleanOps, BoundingRect, Coord, Line};
use tracing::info;

use super::prepare::PreparedObstacles;
use crate::error::Result;
use crate::frontier::{CommitSummary, FrontierStore, FrontierVertex, VertexId};
use crate::geometry::buffer::buffer_point;
use crate::geometry::outline::vertices;
use crate::geometry::{BoundaryCurve, BoundaryId};
use crate::math::{hop_length, TOLERANCE};
use crate::params::{Resolution, Tolerances};
use crate::task::CancelToken;

/// Where a micro-expansion starts from.
#[derive(Debug, Clone, Copy)]
struct Source {
    position: Coord<f64>,
    parent: Option<VertexId>,
    budget: f64,
    iteration: u32,
}

/// Everything the relaxation loop leaves behind.
#[derive(Debug)]
pub struct Relaxation {
    pub walkable: WalkableNetwork,
    pub frontier: FrontierStore,
    /// Number of the last iteration that ran; the seed phase is iteration 1.
    pub iterations: u32,
    pub commits: CommitSummary,
}

/// Expands a wavefront along the prepared boundary curves until no
/// frontier vertex has budget left to spend.
///
/// Each pass takes the vertices discovered in the previous pass, clips the
/// boundaries to the disk each vertex can still reach, and keeps the curve
/// vertices it can see in a straight line. Pairs of mutually visible points
/// that stay on one boundary become walkable segments.
#[derive(Debug)]
pub struct RelaxVisibility<'a> {
    prepared: &'a PreparedObstacles,
    tolerances: Tolerances,
    resolution: Resolution,
}

impl<'a> RelaxVisibility<'a> {
    #[must_use]
    pub fn new(prepared: &'a PreparedObstacles, tolerances: Tolerances, resolution: Resolution) -> Self {
        Self {
            prepared,
            tolerances,
            resolution,
        }
    }

    /// Runs the seed phase and then expansion passes until the frontier is spent.
    ///
    /// # Errors
    ///
    /// Returns `CatchmentError::Canceled` if `cancel` is raised.
    pub fn execute(&self, cancel: &CancelToken) -> Result<Relaxation> {
        let mut state = Relaxation {
            walkable: WalkableNetwork::new(self.tolerances.thickening),
            frontier: FrontierStore::new(self.tolerances.proximity),
            iterations: 0,
            commits: CommitSummary::default(),
        };
        if self.prepared.is_empty() {
            info!("No boundary lies within reach of the origin");
            return Ok(state);
        }

        self.seed(&mut state, cancel)?;
        state.iterations = 1;
        info!(
            vertices = state.frontier.len(),
            boundaries = state.walkable.len(),
            "Seed phase finished"
        );

        loop {
            let generation = state
                .frontier
                .generation(state.iterations, self.tolerances.min_remaining_budget);
            if generation.is_empty() {
                break;
            }
            let next = state.iterations + 1;
            info!(iteration = next, frontier = generation.len(), "Expanding frontier");
            self.expand(&mut state, next, &generation, cancel)?;
            state.iterations = next;
        }

        info!(
            iterations = state.iterations,
            vertices = state.frontier.len(),
            replaced = state.commits.replaced,
            "Relaxation converged"
        );
        Ok(state)
    }

    /// Iteration 1: every curve vertex seen from the origin becomes a frontier vertex.
    fn seed(&self, state: &mut Relaxation, cancel: &CancelToken) -> Result<()> {
        let source = Source {
            position: self.prepared.origin,
            parent: None,
            budget: self.prepared.walking_budget,
            iteration: 1,
        };
        for boundary in &self.prepared.boundaries {
            cancel.check()?;
            let candidates = boundary.vertices();
            let visible = self.discover(state, boundary, &source, &candidates, cancel)?;
            let mut found = SegmentSet::default();
            pair_segments(boundary, &visible, &state.walkable, &mut found, cancel)?;
            state.walkable.merge(boundary.id(), found.into_segments());
        }
        Ok(())
    }

    /// One pass over `generation`; new vertices are tagged with `iteration`.
    fn expand(
        &self,
        state: &mut Relaxation,
        iteration: u32,
        generation: &[VertexId],
        cancel: &CancelToken,
    ) -> Result<()> {
        let mut found: BTreeMap<BoundaryId, SegmentSet> = BTreeMap::new();

        for &id in generation {
            cancel.check()?;
            // Replaced earlier in this pass by a better vertex in its cell.
            let Some(local) = state.frontier.get(id).copied() else {
                continue;
            };
            let reach = buffer_point(local.position, local.remaining_budget, self.resolution.reach_disk_segments);
            let Some(reach_bounds) = reach.bounding_rect() else {
                continue;
            };
            let source = Source {
                position: local.position,
                parent: Some(id),
                budget: local.remaining_budget,
                iteration,
            };

            for boundary in &self.prepared.boundaries {
                cancel.check()?;
                if !boundary.may_touch(&reach_bounds) {
                    continue;
                }
                let within = reach.clip(boundary.lines(), false);
                let candidates = vertices(&within);
                if candidates.is_empty() {
                    continue;
                }
                let visible = self.discover(state, boundary, &source, &candidates, cancel)?;
                let set = found.entry(boundary.id()).or_default();
                pair_segments(boundary, &visible, &state.walkable, set, cancel)?;
            }
        }

        for (boundary, set) in found {
            state.walkable.merge(boundary, set.into_segments());
        }
        Ok(())
    }

    /// Offers every candidate visible from `source` to the frontier and
    /// returns the source position followed by the visible candidates.
    ///
    /// Candidates beyond the remaining budget are not offered but still
    /// take part in segment pairing.
    fn discover(
        &self,
        state: &mut Relaxation,
        boundary: &BoundaryCurve,
        source: &Source,
        candidates: &[Coord<f64>],
        cancel: &CancelToken,
    ) -> Result<Vec<Coord<f64>>> {
        let mut batch = state.frontier.begin();
        let mut visible = vec![source.position];
        for &point in candidates {
            cancel.check()?;
            if !self.prepared.blocking.is_visible(source.position, point) {
                continue;
            }
            let remaining = source.budget - hop_length(source.position, point);
            if remaining >= 0.0 {
                batch.offer(
                    &state.frontier,
                    FrontierVertex {
                        position: point,
                        iteration: source.iteration,
                        prev_id: source.parent,
                        remaining_budget: remaining,
                        boundary_id: boundary.id(),
                    },
                );
            }
            visible.push(point);
        }
        let summary = state.frontier.commit(batch);
        state.commits.absorb(summary);
        Ok(visible)
    }
}

/// Collects the segments between pairs of `points` that stay on `boundary`.
fn pair_segments(
    boundary: &BoundaryCurve,
    points: &[Coord<f64>],
    walkable: &WalkableNetwork,
    found: &mut SegmentSet,
    cancel: &CancelToken,
) -> Result<()> {
    for (i, &a) in points.iter().enumerate() {
        for &b in &points[i + 1..] {
            cancel.check()?;
            if hop_length(a, b) <= TOLERANCE {
                continue;
            }
            let segment = Line::new(a, b);
            if found.contains(&segment) || walkable.is_merged(boundary.id(), &segment) {
                continue;
            }
            if boundary.accepts(&segment) {
                found.insert(segment);
            }
        }
    }
    Ok(())
}
