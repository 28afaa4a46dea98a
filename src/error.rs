use thiserror::Error;

/// Error taxonomy for the booking engine, the session layer, and configuration loading.
///
/// Mirrors the small negative-errno scheme of the reference implementation, but as
/// distinct variants instead of raw integers.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("bad message: {0}")]
    BadMessage(String),

    #[error("seat {seat} is out of range (max {max})")]
    OutOfRange { seat: u32, max: u32 },

    #[error("out of memory: {0}")]
    OutOfMemory(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
