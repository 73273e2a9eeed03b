mod error;
mod rados;
mod types;

pub use error::{RadosError, Result};
pub use rados::{checksum_hex, Rados};
pub use types::{ObjectSummary, PutResult};
