use thiserror::Error;

#[derive(Error, Debug)]
pub enum PoolError {
    #[error("invalid pool config: size={size}, min_size={min_size} (require 1 <= min_size <= size)")]
    InvalidSize { size: u32, min_size: u32 },
}

pub type Result<T> = std::result::Result<T, PoolError>;
