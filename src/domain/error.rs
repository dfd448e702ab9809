use thiserror::Error;

/// Rejections of user input. The display strings are the exact messages
/// returned to API clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PromptValidationError {
    #[error("Title is required")]
    MissingTitle,
    #[error("Description is required")]
    MissingDescription,
    #[error("Content is required")]
    MissingContent,
    #[error("At least one tag is required")]
    MissingTags,
    #[error("delta must be 1 or -1")]
    InvalidDelta,
}

#[derive(Debug, Error)]
pub enum DomainError {
    #[error(transparent)]
    Validation(#[from] PromptValidationError),
    #[error("domain invariant violated: {message}")]
    Invariant { message: String },
}

impl DomainError {
    pub fn invariant(message: impl Into<String>) -> Self {
        Self::Invariant {
            message: message.into(),
        }
    }
}
