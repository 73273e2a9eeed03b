pub mod error;
pub mod store;
pub mod types;

pub use error::{OsdError, Result};
pub use store::Osd;
pub use types::{HeartbeatStatus, ObjectMetadata, OsdSeed, OsdState};
