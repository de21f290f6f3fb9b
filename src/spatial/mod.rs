pub mod blocking;
pub mod field;
pub mod sparse_hash;

pub use blocking::{BlockedCells, ObstacleKind};
pub use field::{FallOutcome, Field};
pub use sparse_hash::SparseHashGrid;
