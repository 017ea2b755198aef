use async_trait::async_trait;
use domain::{
    Comment, CommentId, CreateComment, CreateCommentResponse, CreateReview, CreateReviewResponse,
    Page, Reaction, Review, ReviewId, ReviewParams,
};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::session::Session;
use crate::traits::ReviewsApi;

pub const REVIEWS_PATH: &str = "/reviews/api/v1/reviews";

#[derive(Serialize)]
struct CommentWindow {
    skip: u32,
    limit: u32,
}

/// `ReviewsApi` over the REST backend.
#[derive(Clone)]
pub struct HttpReviewsApi {
    client: reqwest::Client,
    base_url: String,
    session: Session,
}

impl HttpReviewsApi {
    pub fn new(api_url: &str, timeout: Duration, session: Session) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: format!("{}{}", api_url.trim_end_matches('/'), REVIEWS_PATH),
            session,
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let req = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        match self.session.token() {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn send(&self, req: RequestBuilder) -> Result<Response, ApiError> {
        let resp = req.send().await.map_err(|e| {
            warn!("Reviews backend unreachable: {}", e);
            ApiError::from(e)
        })?;
        let status = resp.status();
        debug!("{} {}", status, resp.url());

        if status.is_success() {
            return Ok(resp);
        }
        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthenticated);
        }
        let message = resp.text().await.unwrap_or_default();
        warn!("Reviews backend rejected request ({}): {}", status, message);
        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl ReviewsApi for HttpReviewsApi {
    async fn list_reviews(
        &self,
        product_code: &str,
        params: &ReviewParams,
    ) -> Result<Page<Review>, ApiError> {
        let req = self
            .request(Method::GET, &format!("/product/{}", product_code))
            .query(params);
        Ok(self.send(req).await?.json().await?)
    }

    async fn react_to_review(
        &self,
        review_id: &ReviewId,
        reaction: Reaction,
    ) -> Result<(), ApiError> {
        let path = format!("/{}/{}", review_id, reaction.as_path());
        self.send(self.request(Method::POST, &path)).await?;
        Ok(())
    }

    async fn react_to_comment(
        &self,
        review_id: &ReviewId,
        comment_id: &CommentId,
        reaction: Reaction,
    ) -> Result<(), ApiError> {
        let path = format!(
            "/{}/comments/{}/{}",
            review_id,
            comment_id,
            reaction.as_path()
        );
        self.send(self.request(Method::POST, &path)).await?;
        Ok(())
    }

    async fn list_comments(
        &self,
        review_id: &ReviewId,
        skip: u32,
        limit: u32,
    ) -> Result<Vec<Comment>, ApiError> {
        let req = self
            .request(Method::GET, &format!("/{}/comments", review_id))
            .query(&CommentWindow { skip, limit });
        Ok(self.send(req).await?.json().await?)
    }

    async fn create_review(
        &self,
        request: &CreateReview,
    ) -> Result<CreateReviewResponse, ApiError> {
        let req = self.request(Method::POST, "").json(request);
        Ok(self.send(req).await?.json().await?)
    }

    async fn create_comment(
        &self,
        review_id: &ReviewId,
        request: &CreateComment,
    ) -> Result<CreateCommentResponse, ApiError> {
        let req = self
            .request(Method::POST, &format!("/{}/comments", review_id))
            .json(request);
        Ok(self.send(req).await?.json().await?)
    }

    async fn delete_review(&self, review_id: &ReviewId) -> Result<(), ApiError> {
        self.send(self.request(Method::DELETE, &format!("/{}", review_id)))
            .await?;
        Ok(())
    }

    async fn delete_comment(
        &self,
        review_id: &ReviewId,
        comment_id: &CommentId,
    ) -> Result<(), ApiError> {
        let path = format!("/{}/comments/{}", review_id, comment_id);
        self.send(self.request(Method::DELETE, &path)).await?;
        Ok(())
    }
}
