use thiserror::Error;

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("pool already exists: {0}")]
    DuplicatePool(String),

    #[error("osd.{0} not found")]
    OsdNotFound(u64),

    #[error("pool {0} not found")]
    PoolNotFound(u64),

    #[error("invalid OSD state: {0}")]
    InvalidOsdState(String),

    #[error("invalid pool config: {0}")]
    InvalidPoolConfig(#[from] pool::PoolError),
}

pub type Result<T> = std::result::Result<T, MonitorError>;
