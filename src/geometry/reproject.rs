use std::fmt;

use geo::{AffineTransform, Coord, MapCoords};
use serde::{Deserialize, Serialize};

use crate::error::{ReprojectionError, Result};

/// Identifier of a planar coordinate reference, e.g. `EPSG:27700`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Crs(String);

impl Crs {
    /// Creates a reference from its authority code.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// An unnamed local planar frame.
    #[must_use]
    pub fn local() -> Self {
        Self::new("LOCAL")
    }

    /// Returns the authority code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.0
    }
}

impl Default for Crs {
    fn default() -> Self {
        Self::local()
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Moves coordinates from one reference into another.
pub trait Reproject {
    /// Transforms a single coordinate.
    ///
    /// # Errors
    ///
    /// Returns a `ReprojectionError` if no transform between the two
    /// references is known or the coordinate cannot be transformed.
    fn reproject_coord(&self, coord: Coord<f64>, from: &Crs, to: &Crs) -> Result<Coord<f64>>;
}

/// Reprojects every coordinate of `geometry`.
///
/// # Errors
///
/// Propagates the first coordinate that fails to transform.
pub fn reproject<G>(
    reprojector: &dyn Reproject,
    geometry: &G,
    from: &Crs,
    to: &Crs,
) -> Result<G::Output>
where
    G: MapCoords<f64, f64>,
{
    geometry.try_map_coords(|c| reprojector.reproject_coord(c, from, to))
}

/// Accepts only geometry that is already in the target reference.
#[derive(Debug, Clone, Copy, Default)]
pub struct SameCrs;

impl Reproject for SameCrs {
    fn reproject_coord(&self, coord: Coord<f64>, from: &Crs, to: &Crs) -> Result<Coord<f64>> {
        if from == to {
            Ok(coord)
        } else {
            Err(ReprojectionError::Unsupported {
                from: from.to_string(),
                to: to.to_string(),
            }
            .into())
        }
    }
}

/// Reprojects between planar references related by affine transforms.
///
/// A registered transform is also used in reverse when it is invertible.
#[derive(Debug, Clone, Default)]
pub struct AffineReprojector {
    transforms: Vec<(Crs, Crs, AffineTransform<f64>)>,
}

impl AffineReprojector {
    /// Creates a reprojector with no registered transforms.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the transform taking `from` coordinates into `to`.
    #[must_use]
    pub fn with(mut self, from: Crs, to: Crs, transform: AffineTransform<f64>) -> Self {
        self.transforms.push((from, to, transform));
        self
    }

    fn lookup(&self, from: &Crs, to: &Crs) -> Option<AffineTransform<f64>> {
        self.transforms.iter().find_map(|(f, t, transform)| {
            if f == from && t == to {
                Some(*transform)
            } else if f == to && t == from {
                transform.inverse()
            } else {
                None
            }
        })
    }
}

impl Reproject for AffineReprojector {
    fn reproject_coord(&self, coord: Coord<f64>, from: &Crs, to: &Crs) -> Result<Coord<f64>> {
        if from == to {
            return Ok(coord);
        }
        let transform = self
            .lookup(from, to)
            .ok_or_else(|| ReprojectionError::Unsupported {
                from: from.to_string(),
                to: to.to_string(),
            })?;
        let out = transform.apply(coord);
        if out.x.is_finite() && out.y.is_finite() {
            Ok(out)
        } else {
            Err(ReprojectionError::Failed(format!(
                "({}, {}) maps to a non-finite coordinate",
                coord.x, coord.y
            ))
            .into())
        }
    }
}
