use axum::http::{header::AUTHORIZATION, HeaderMap};

use crate::catalog::Author;
use crate::error::AppError;

pub mod comments;
pub mod reviews;

fn bearer(headers: &HeaderMap) -> Option<Author> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .and_then(Author::from_token)
}

/// Caller of a protected route.
pub(crate) fn author(headers: &HeaderMap) -> Result<Author, AppError> {
    bearer(headers).ok_or(AppError::Unauthorized)
}

/// Caller of a public route, used only for the `*ByMe` flags.
pub(crate) fn viewer(headers: &HeaderMap) -> Option<String> {
    bearer(headers).map(|a| a.id)
}
