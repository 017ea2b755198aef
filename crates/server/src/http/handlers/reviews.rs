use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use domain::{CreateReview, CreateReviewResponse, Page, Reaction, Review, ReviewId, ReviewParams};
use tracing::info;

use super::{author, viewer};
use crate::error::AppError;
use crate::state::AppState;

pub async fn list_reviews(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(product_code): Path<String>,
    Query(params): Query<ReviewParams>,
) -> Json<Page<Review>> {
    let viewer = viewer(&headers);
    Json(
        state
            .catalog
            .list_reviews(&product_code, &params, viewer.as_deref()),
    )
}

pub async fn create_review(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateReview>,
) -> Result<(StatusCode, Json<CreateReviewResponse>), AppError> {
    let user = author(&headers)?;
    let created = state.catalog.create_review(&user, payload)?;
    info!("{} reviewed {}", user.id, created.review_id);
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn delete_review(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(review_id): Path<ReviewId>,
) -> Result<StatusCode, AppError> {
    let user = author(&headers)?;
    state.catalog.delete_review(&review_id, &user)?;
    info!("{} deleted review {}", user.id, review_id);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn like_review(
    state: State<AppState>,
    headers: HeaderMap,
    review_id: Path<ReviewId>,
) -> Result<StatusCode, AppError> {
    react(state, headers, review_id, Reaction::Like)
}

pub async fn dislike_review(
    state: State<AppState>,
    headers: HeaderMap,
    review_id: Path<ReviewId>,
) -> Result<StatusCode, AppError> {
    react(state, headers, review_id, Reaction::Dislike)
}

fn react(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(review_id): Path<ReviewId>,
    reaction: Reaction,
) -> Result<StatusCode, AppError> {
    let user = author(&headers)?;
    state.catalog.react_to_review(&review_id, &user, reaction)?;
    Ok(StatusCode::OK)
}
