mod error;
mod models;
mod optimistic;
mod params;
pub mod protocol;
mod reaction;

pub use error::DomainError;
pub use models::{
    Comment, CommentId, CreateComment, CreateCommentResponse, CreateReview, CreateReviewResponse,
    Page, Pagination, Review, ReviewId, User,
};
pub use optimistic::Optimistic;
pub use params::{page_window, Direction, ReviewParams, SortField, SortOption, SORT_OPTIONS};
pub use reaction::{Reactable, Reaction, Reactions};
