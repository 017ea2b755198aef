use async_trait::async_trait;
use domain::{
    Comment, CommentId, CreateComment, CreateCommentResponse, CreateReview, CreateReviewResponse,
    Page, Reaction, Review, ReviewId, ReviewParams,
};

use std::sync::Arc;

use crate::error::ApiError;

/// The reviews backend, as consumed by the stores and coordinators.
#[async_trait]
pub trait ReviewsApi: Send + Sync {
    async fn list_reviews(
        &self,
        product_code: &str,
        params: &ReviewParams,
    ) -> Result<Page<Review>, ApiError>;

    async fn react_to_review(&self, review_id: &ReviewId, reaction: Reaction)
        -> Result<(), ApiError>;

    async fn react_to_comment(
        &self,
        review_id: &ReviewId,
        comment_id: &CommentId,
        reaction: Reaction,
    ) -> Result<(), ApiError>;

    async fn list_comments(
        &self,
        review_id: &ReviewId,
        skip: u32,
        limit: u32,
    ) -> Result<Vec<Comment>, ApiError>;

    async fn create_review(&self, request: &CreateReview)
        -> Result<CreateReviewResponse, ApiError>;

    async fn create_comment(
        &self,
        review_id: &ReviewId,
        request: &CreateComment,
    ) -> Result<CreateCommentResponse, ApiError>;

    async fn delete_review(&self, review_id: &ReviewId) -> Result<(), ApiError>;

    async fn delete_comment(
        &self,
        review_id: &ReviewId,
        comment_id: &CommentId,
    ) -> Result<(), ApiError>;
}

#[async_trait]
impl<T: ReviewsApi + ?Sized> ReviewsApi for Arc<T> {
    async fn list_reviews(
        &self,
        product_code: &str,
        params: &ReviewParams,
    ) -> Result<Page<Review>, ApiError> {
        (**self).list_reviews(product_code, params).await
    }

    async fn react_to_review(
        &self,
        review_id: &ReviewId,
        reaction: Reaction,
    ) -> Result<(), ApiError> {
        (**self).react_to_review(review_id, reaction).await
    }

    async fn react_to_comment(
        &self,
        review_id: &ReviewId,
        comment_id: &CommentId,
        reaction: Reaction,
    ) -> Result<(), ApiError> {
        (**self)
            .react_to_comment(review_id, comment_id, reaction)
            .await
    }

    async fn list_comments(
        &self,
        review_id: &ReviewId,
        skip: u32,
        limit: u32,
    ) -> Result<Vec<Comment>, ApiError> {
        (**self).list_comments(review_id, skip, limit).await
    }

    async fn create_review(
        &self,
        request: &CreateReview,
    ) -> Result<CreateReviewResponse, ApiError> {
        (**self).create_review(request).await
    }

    async fn create_comment(
        &self,
        review_id: &ReviewId,
        request: &CreateComment,
    ) -> Result<CreateCommentResponse, ApiError> {
        (**self).create_comment(review_id, request).await
    }

    async fn delete_review(&self, review_id: &ReviewId) -> Result<(), ApiError> {
        (**self).delete_review(review_id).await
    }

    async fn delete_comment(
        &self,
        review_id: &ReviewId,
        comment_id: &CommentId,
    ) -> Result<(), ApiError> {
        (**self).delete_comment(review_id, comment_id).await
    }
}
