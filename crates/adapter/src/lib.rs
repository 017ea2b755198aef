mod auth;
mod error;
mod http;
mod session;
mod traits;

pub use auth::Authenticated;
pub use error::ApiError;
pub use http::{HttpReviewsApi, REVIEWS_PATH};
pub use session::{Session, SessionState};
pub use traits::ReviewsApi;
