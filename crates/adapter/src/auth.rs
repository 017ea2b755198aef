use async_trait::async_trait;
use domain::{
    Comment, CommentId, CreateComment, CreateCommentResponse, CreateReview, CreateReviewResponse,
    Page, Reaction, Review, ReviewId, ReviewParams,
};

use crate::error::ApiError;
use crate::session::Session;
use crate::traits::ReviewsApi;

/// Guards the protected operations of any `ReviewsApi`: without a signed-in
/// user they fail with `Unauthenticated` and raise a sign-in request instead
/// of reaching the backend. Listing stays public.
pub struct Authenticated<A> {
    inner: A,
    session: Session,
}

impl<A> Authenticated<A> {
    pub fn new(inner: A, session: Session) -> Self {
        Self { inner, session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn guard(&self) -> Result<(), ApiError> {
        self.session.require_user().map(|_| ())
    }

    fn observe<T>(&self, result: Result<T, ApiError>) -> Result<T, ApiError> {
        if matches!(result, Err(ApiError::Unauthenticated)) {
            self.session.request_sign_in();
        }
        result
    }
}

#[async_trait]
impl<A: ReviewsApi> ReviewsApi for Authenticated<A> {
    async fn list_reviews(
        &self,
        product_code: &str,
        params: &ReviewParams,
    ) -> Result<Page<Review>, ApiError> {
        self.inner.list_reviews(product_code, params).await
    }

    async fn react_to_review(
        &self,
        review_id: &ReviewId,
        reaction: Reaction,
    ) -> Result<(), ApiError> {
        self.guard()?;
        let result = self.inner.react_to_review(review_id, reaction).await;
        self.observe(result)
    }

    async fn react_to_comment(
        &self,
        review_id: &ReviewId,
        comment_id: &CommentId,
        reaction: Reaction,
    ) -> Result<(), ApiError> {
        self.guard()?;
        let result = self
            .inner
            .react_to_comment(review_id, comment_id, reaction)
            .await;
        self.observe(result)
    }

    async fn list_comments(
        &self,
        review_id: &ReviewId,
        skip: u32,
        limit: u32,
    ) -> Result<Vec<Comment>, ApiError> {
        self.inner.list_comments(review_id, skip, limit).await
    }

    async fn create_review(
        &self,
        request: &CreateReview,
    ) -> Result<CreateReviewResponse, ApiError> {
        self.guard()?;
        let result = self.inner.create_review(request).await;
        self.observe(result)
    }

    async fn create_comment(
        &self,
        review_id: &ReviewId,
        request: &CreateComment,
    ) -> Result<CreateCommentResponse, ApiError> {
        self.guard()?;
        let result = self.inner.create_comment(review_id, request).await;
        self.observe(result)
    }

    async fn delete_review(&self, review_id: &ReviewId) -> Result<(), ApiError> {
        self.guard()?;
        let result = self.inner.delete_review(review_id).await;
        self.observe(result)
    }

    async fn delete_comment(
        &self,
        review_id: &ReviewId,
        comment_id: &CommentId,
    ) -> Result<(), ApiError> {
        self.guard()?;
        let result = self.inner.delete_comment(review_id, comment_id).await;
        self.observe(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::User;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingApi {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ReviewsApi for CountingApi {
        async fn list_reviews(&self, _: &str, _: &ReviewParams) -> Result<Page<Review>, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Page::default())
        }
        async fn react_to_review(&self, _: &ReviewId, _: Reaction) -> Result<(), ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(ApiError::Unauthenticated)
        }
        async fn react_to_comment(
            &self,
            _: &ReviewId,
            _: &CommentId,
            _: Reaction,
        ) -> Result<(), ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        async fn list_comments(&self, _: &ReviewId, _: u32, _: u32) -> Result<Vec<Comment>, ApiError> {
            Ok(Vec::new())
        }
        async fn create_review(&self, _: &CreateReview) -> Result<CreateReviewResponse, ApiError> {
            Err(ApiError::Transport("unused".into()))
        }
        async fn create_comment(
            &self,
            _: &ReviewId,
            _: &CreateComment,
        ) -> Result<CreateCommentResponse, ApiError> {
            Err(ApiError::Transport("unused".into()))
        }
        async fn delete_review(&self, _: &ReviewId) -> Result<(), ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        async fn delete_comment(&self, _: &ReviewId, _: &CommentId) -> Result<(), ApiError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn anonymous_protected_call_never_reaches_backend() {
        let session = Session::anonymous();
        let api = Authenticated::new(CountingApi::default(), session.clone());

        let err = api.delete_review(&ReviewId::new("r1")).await.unwrap_err();
        assert_eq!(err, ApiError::Unauthenticated);
        assert!(session.sign_in_requested());
        assert_eq!(api.inner.calls.load(Ordering::SeqCst), 0);

        api.list_reviews("P-1", &ReviewParams::default()).await.unwrap();
        assert_eq!(api.inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn backend_401_raises_sign_in_request() {
        let user = User {
            id: "u1".into(),
            name: "Ana".into(),
        };
        let session = Session::signed_in(user, None);
        let api = Authenticated::new(CountingApi::default(), session.clone());

        let err = api
            .react_to_review(&ReviewId::new("r1"), Reaction::Like)
            .await
            .unwrap_err();
        assert_eq!(err, ApiError::Unauthenticated);
        assert!(session.sign_in_requested());
    }
}
