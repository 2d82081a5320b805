//! Interface catchment: how much obstacle outline a pedestrian can walk
//! along within a distance budget of a starting point.
//!
//! A run prepares the obstacles near the origin ([`operations::prepare`]),
//! grows a wavefront of visible boundary vertices until the budget is spent
//! ([`operations::relax`]), and measures the walkable boundary parts
//! ([`operations::aggregate`]). [`CatchmentTask`] runs the three steps in
//! order, on the calling thread or in the background.

pub mod error;
pub mod frontier;
pub mod geometry;
pub mod math;
pub mod operations;
pub mod output;
pub mod params;
pub mod task;

pub use error::{CatchmentError, Result};
pub use output::{CatchmentResult, WalkableFeature};
pub use params::{CatchmentParams, ObstacleInput, Resolution, Tolerances};
pub use task::{CancelToken, CatchmentTask, TaskHandle, TaskOutcome};

#[cfg(test)]
mod scenarios;
