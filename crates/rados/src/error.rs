use thiserror::Error;

#[derive(Error, Debug)]
pub enum RadosError {
    #[error("pool not found: {0}")]
    PoolNotFound(String),

    #[error("placement group missing: {0}")]
    PgMissing(String),

    #[error("placement group inactive: {0}")]
    PgInactive(String),

    #[error("replication below minimum: needed {required}, got {got}")]
    ReplicationBelowMin { required: usize, got: usize },

    #[error("monitor error: {0}")]
    Monitor(#[from] monitor::MonitorError),
}

pub type Result<T> = std::result::Result<T, RadosError>;
