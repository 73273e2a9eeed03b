pub mod error;
pub mod pg;
pub mod pool;

pub use error::{PoolError, Result};
pub use pg::{PgState, PlacementGroup};
pub use pool::Pool;
