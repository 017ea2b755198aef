use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Rating must be between 1 and 5, got {0}")]
    InvalidRating(u8),

    #[error("Content cannot be empty")]
    EmptyContent,

    #[error("Unknown sort option: {0}")]
    InvalidSortOption(String),
}
