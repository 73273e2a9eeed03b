pub mod error;
pub mod monitor;
pub mod types;

pub use error::{MonitorError, Result};
pub use monitor::Monitor;
pub use types::{ClusterConfig, ClusterStatus, DetailedStatus, OsdSummary, PoolSeed, PoolSummary};
