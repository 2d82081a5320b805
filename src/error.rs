use thiserror::Error;

/// Top-level error type for a catchment run.
#[derive(Debug, Error)]
pub enum CatchmentError {
    #[error(transparent)]
    Precondition(#[from] PreconditionError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Reprojection(#[from] ReprojectionError),

    /// The run observed a cancellation request and stopped.
    #[error("run canceled by request")]
    Canceled,

    /// An unexpected failure captured at the run boundary.
    #[error("internal fault: {0}")]
    Fault(String),
}

impl CatchmentError {
    /// Returns `true` if this value reports a cancellation rather than a failure.
    #[must_use]
    pub fn is_canceled(&self) -> bool {
        matches!(self, Self::Canceled)
    }
}

/// Input that cannot be run at all.
#[derive(Debug, Error)]
pub enum PreconditionError {
    #[error("obstacle input is empty")]
    EmptyObstacles,

    #[error("no starting point was supplied")]
    MissingOrigin,

    #[error("starting point ({x}, {y}) is not finite")]
    NonFiniteOrigin { x: f64, y: f64 },

    #[error("walking budget {0} must be finite and non-negative")]
    InvalidBudget(f64),

    #[error("dead-end buffer distance {0} must be finite and positive")]
    InvalidBufferDistance(f64),

    #[error("tolerance `{name}` = {value} must be finite and positive")]
    InvalidTolerance { name: &'static str, value: f64 },

    #[error("resolution `{name}` = {value} is below the minimum of {min}")]
    InvalidResolution {
        name: &'static str,
        value: usize,
        min: usize,
    },
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("zero-length vector")]
    ZeroVector,
}

/// Errors raised while moving geometry between coordinate references.
#[derive(Debug, Error)]
pub enum ReprojectionError {
    #[error("no transform from {from} to {to}")]
    Unsupported { from: String, to: String },

    #[error("reprojection failed: {0}")]
    Failed(String),
}

/// Convenience type alias for results using [`CatchmentError`].
pub type Result<T> = std::result::Result<T, CatchmentError>;
