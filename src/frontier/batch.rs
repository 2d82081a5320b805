use tracing::trace;

use super::{FrontierStore, FrontierVertex, VertexId};

/// Result of offering a candidate to a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Offer {
    /// The candidate will be written.
    Accepted,
    /// A vertex in the cell keeps the location.
    Rejected,
}

/// Pending inserts and deletes against a [`FrontierStore`].
///
/// Candidates are resolved against the committed vertices and against
/// candidates already pending in this batch. Nothing changes in the store
/// until [`FrontierStore::commit`].
#[derive(Debug, Default)]
pub struct FrontierBatch {
    pending: Vec<FrontierVertex>,
    doomed: Vec<VertexId>,
    rejected: usize,
    superseded: usize,
}

impl FrontierBatch {
    pub(super) fn new() -> Self {
        Self::default()
    }

    /// Offers a candidate vertex.
    ///
    /// Every vertex in the candidate's cell with a smaller remaining budget
    /// is deleted. The candidate is written only if no vertex in the cell has
    /// a remaining budget at least as large; on a tie the existing vertex wins.
    pub fn offer(&mut self, store: &FrontierStore, candidate: FrontierVertex) -> Offer {
        let mut write = true;

        for (id, existing) in store.in_cell(candidate.position) {
            if self.doomed.contains(&id) {
                continue;
            }
            if candidate.remaining_budget > existing.remaining_budget {
                trace!(
                    x = existing.position.x,
                    y = existing.position.y,
                    old = existing.remaining_budget,
                    new = candidate.remaining_budget,
                    "frontier vertex replaced"
                );
                self.doomed.push(id);
            } else {
                write = false;
            }
        }

        let half_width = store.proximity();
        let before = self.pending.len();
        self.pending.retain(|p| {
            if !p.shares_cell(candidate.position, half_width) {
                return true;
            }
            if candidate.remaining_budget > p.remaining_budget {
                false
            } else {
                write = false;
                true
            }
        });
        self.superseded += before - self.pending.len();

        if write {
            self.pending.push(candidate);
            Offer::Accepted
        } else {
            self.rejected += 1;
            Offer::Rejected
        }
    }

    /// Number of candidates waiting to be inserted.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub(super) fn into_parts(self) -> BatchParts {
        BatchParts {
            pending: self.pending,
            doomed: self.doomed,
            rejected: self.rejected,
            superseded: self.superseded,
        }
    }
}

pub(super) struct BatchParts {
    pub pending: Vec<FrontierVertex>,
    pub doomed: Vec<VertexId>,
    pub rejected: usize,
    pub superseded: usize,
}
