use thiserror::Error;

#[derive(Error, Debug)]
pub enum CrushError {
    #[error("replica count must be at least 1, got {0}")]
    InvalidReplicaCount(usize),
}

pub type Result<T> = std::result::Result<T, CrushError>;
