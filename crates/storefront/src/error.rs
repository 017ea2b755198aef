use adapter::ApiError;
use domain::DomainError;
use thiserror::Error;

/// Failure of a discrete user action (create, reply, sort change).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("Invalid input: {0}")]
    Invalid(#[from] DomainError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Unknown review: {0}")]
    UnknownReview(String),

    #[error("Unknown comment: {0}")]
    UnknownComment(String),
}
