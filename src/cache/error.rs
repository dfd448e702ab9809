use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("remote cache unavailable: {0}")]
    Unavailable(String),
    #[error("remote cache operation timed out")]
    Timeout,
    #[error("remote cache operation failed: {0}")]
    Operation(String),
}

impl CacheError {
    pub fn unavailable(err: impl std::fmt::Display) -> Self {
        Self::Unavailable(err.to_string())
    }

    pub fn operation(err: impl std::fmt::Display) -> Self {
        Self::Operation(err.to_string())
    }
}
