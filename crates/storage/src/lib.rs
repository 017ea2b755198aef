mod cell;
mod comments;
mod notifications;
mod reviews;
#[cfg(test)]
mod testing;

pub use cell::{StateCell, Subscription};
pub use comments::{CommentCache, CommentThread, LoadMore, DEFAULT_COMMENT_LIMIT};
pub use notifications::{Notifications, Toast, ToastDurations, ToastKind};
pub use reviews::{ReviewStore, ReviewsState, FETCH_FAILED_MESSAGE};
