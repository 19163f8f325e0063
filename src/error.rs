use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("session not found: {0}")]
    NotFound(String),

    #[error("invalid operation: {0}")]
    InvalidOperation(&'static str),

    #[error("{0}")]
    Validation(String),

    /// Storage or serialization failure. Contained inside the persistence
    /// gateway; callers above it only ever see logged warnings.
    #[error("persistence failure: {0}")]
    Persistence(String),
}
