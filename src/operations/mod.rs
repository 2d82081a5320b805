pub mod aggregate;
pub mod prepare;
pub mod relax;

pub use aggregate::{AggregateCatchment, Aggregation};
pub use prepare::{PrepareObstacles, PreparedObstacles};
pub use relax::{RelaxVisibility, Relaxation};
