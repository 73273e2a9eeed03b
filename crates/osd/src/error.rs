use thiserror::Error;

#[derive(Error, Debug)]
pub enum OsdError {
    #[error("osd.{0} is not up")]
    NotUp(u64),

    #[error("storage error on osd.{osd_id}: {message}")]
    Io { osd_id: u64, message: String },
}

pub type Result<T> = std::result::Result<T, OsdError>;
