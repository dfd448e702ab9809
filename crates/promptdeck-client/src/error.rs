use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server responded with {status}: {message}")]
    Status { status: u16, message: String },
    #[error("failed to decode response: {0}")]
    Decode(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl ClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::Status { status: 404, .. })
    }
}
