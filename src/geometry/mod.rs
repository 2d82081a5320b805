//! Planar geometry capabilities used by a catchment run, built on `geo`.

pub mod boolean;
pub mod boundary_curve;
pub mod buffer;
pub mod outline;
pub mod repair;
pub mod reproject;

pub use boundary_curve::{BoundaryCurve, BoundaryId};
pub use reproject::{AffineReprojector, Crs, Reproject, SameCrs};
