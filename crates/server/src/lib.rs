mod catalog;
pub mod config;
mod error;
pub mod http;
mod state;

pub use catalog::{Author, Catalog, MAX_PAGE_SIZE};
pub use error::AppError;
pub use http::router::build_router;
pub use state::AppState;
