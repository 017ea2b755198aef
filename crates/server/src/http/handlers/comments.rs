use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use domain::{Comment, CommentId, CreateComment, CreateCommentResponse, Reaction, ReviewId};
use serde::Deserialize;
use tracing::info;

use super::{author, viewer};
use crate::error::AppError;
use crate::state::AppState;

const MAX_LIMIT: u32 = 100;

#[derive(Deserialize)]
pub struct CommentWindow {
    #[serde(default)]
    pub skip: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    5
}

pub async fn list_comments(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(review_id): Path<ReviewId>,
    Query(window): Query<CommentWindow>,
) -> Result<Json<Vec<Comment>>, AppError> {
    let viewer = viewer(&headers);
    let comments = state.catalog.list_comments(
        &review_id,
        window.skip,
        window.limit.min(MAX_LIMIT),
        viewer.as_deref(),
    )?;
    Ok(Json(comments))
}

pub async fn post_comment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(review_id): Path<ReviewId>,
    Json(payload): Json<CreateComment>,
) -> Result<(StatusCode, Json<CreateCommentResponse>), AppError> {
    let user = author(&headers)?;
    let created = state.catalog.create_comment(&review_id, &user, payload)?;
    info!("{} commented {} on {}", user.id, created.comment_id, review_id);
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((review_id, comment_id)): Path<(ReviewId, CommentId)>,
) -> Result<StatusCode, AppError> {
    let user = author(&headers)?;
    state
        .catalog
        .delete_comment(&review_id, &comment_id, &user)?;
    info!("{} deleted comment {}", user.id, comment_id);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn like_comment(
    state: State<AppState>,
    headers: HeaderMap,
    ids: Path<(ReviewId, CommentId)>,
) -> Result<StatusCode, AppError> {
    react(state, headers, ids, Reaction::Like)
}

pub async fn dislike_comment(
    state: State<AppState>,
    headers: HeaderMap,
    ids: Path<(ReviewId, CommentId)>,
) -> Result<StatusCode, AppError> {
    react(state, headers, ids, Reaction::Dislike)
}

fn react(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((review_id, comment_id)): Path<(ReviewId, CommentId)>,
    reaction: Reaction,
) -> Result<StatusCode, AppError> {
    let user = author(&headers)?;
    state
        .catalog
        .react_to_comment(&review_id, &comment_id, &user, reaction)?;
    Ok(StatusCode::OK)
}
