use super::handlers::{comments, reviews};
use crate::state::AppState;
use axum::{
    http::{HeaderValue, Method},
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub const REVIEWS_PATH: &str = "/reviews/api/v1/reviews";

const METHODS: [Method; 3] = [Method::GET, Method::POST, Method::DELETE];

pub fn build_router(state: AppState, allowed_origins: &str) -> Router {
    let cors = if allowed_origins == "*" {
        CorsLayer::new()
            .allow_methods(METHODS)
            .allow_origin(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .filter_map(|s| s.parse::<HeaderValue>().ok())
            .collect();

        if origins.is_empty() {
            tracing::warn!("CORS config is invalid or empty, falling back to allow ANY.");
            CorsLayer::new()
                .allow_methods(METHODS)
                .allow_origin(Any)
                .allow_headers(Any)
        } else {
            tracing::info!("CORS enabled for origins: {:?}", origins);
            CorsLayer::new()
                .allow_methods(METHODS)
                .allow_origin(origins)
                .allow_headers(Any)
        }
    };

    let route = |path: &str| format!("{}{}", REVIEWS_PATH, path);

    Router::new()
        .route(REVIEWS_PATH, post(reviews::create_review))
        .route(&route("/product/:product_code"), get(reviews::list_reviews))
        .route(&route("/:review_id"), delete(reviews::delete_review))
        .route(&route("/:review_id/like"), post(reviews::like_review))
        .route(&route("/:review_id/dislike"), post(reviews::dislike_review))
        .route(
            &route("/:review_id/comments"),
            get(comments::list_comments).post(comments::post_comment),
        )
        .route(
            &route("/:review_id/comments/:comment_id"),
            delete(comments::delete_comment),
        )
        .route(
            &route("/:review_id/comments/:comment_id/like"),
            post(comments::like_comment),
        )
        .route(
            &route("/:review_id/comments/:comment_id/dislike"),
            post(comments::dislike_comment),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
