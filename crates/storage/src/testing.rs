use adapter::{ApiError, ReviewsApi};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use domain::{
    Comment, CommentId, CreateComment, CreateCommentResponse, CreateReview, CreateReviewResponse,
    Page, Pagination, Reaction, Reactions, Review, ReviewId, ReviewParams,
};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub(crate) fn review(id: &str, total_comments: u32) -> Review {
    Review {
        review_id: ReviewId::new(id),
        product_id: "p1".into(),
        customer_id: "u1".into(),
        customer_name: "Ana".into(),
        content: format!("review {}", id),
        rating: 4,
        reactions: Reactions::default(),
        total_comments,
        created_at: NaiveDateTime::default(),
    }
}

pub(crate) fn comment(id: &str) -> Comment {
    Comment {
        comment_id: CommentId::new(id),
        review_id: None,
        customer_id: "u2".into(),
        customer_name: "Bo".into(),
        content: format!("comment {}", id),
        parent_comment_id: None,
        mentioned_user_id: None,
        mentioned_user_name: None,
        reactions: Reactions::default(),
        total_replies: 0,
        created_at: NaiveDateTime::default(),
    }
}

#[derive(Default)]
pub(crate) struct FakeApi {
    pub reviews: Mutex<HashMap<String, Vec<Review>>>,
    pub comments: Mutex<HashMap<ReviewId, Vec<Comment>>>,
    pub delays: Mutex<VecDeque<Duration>>,
    pub fail: AtomicBool,
    pub comment_requests: Mutex<Vec<(ReviewId, u32, u32)>>,
}

impl FakeApi {
    pub fn with_comments(review_id: &str, count: usize) -> Self {
        let api = Self::default();
        let list = (0..count).map(|i| comment(&format!("c{}", i))).collect();
        api.comments
            .lock()
            .unwrap()
            .insert(ReviewId::new(review_id), list);
        api
    }

    async fn pause(&self) {
        let delay = self.delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn check(&self) -> Result<(), ApiError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(ApiError::Transport("connection reset".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl ReviewsApi for FakeApi {
    async fn list_reviews(
        &self,
        product_code: &str,
        _params: &ReviewParams,
    ) -> Result<Page<Review>, ApiError> {
        self.pause().await;
        self.check()?;
        let data = self
            .reviews
            .lock()
            .unwrap()
            .get(product_code)
            .cloned()
            .unwrap_or_default();
        let total = data.len() as u64;
        Ok(Page {
            data,
            pagination: Pagination {
                page: 0,
                size: 5,
                total_elements: total,
                total_pages: 1,
            },
        })
    }

    async fn react_to_review(&self, _: &ReviewId, _: Reaction) -> Result<(), ApiError> {
        self.check()
    }

    async fn react_to_comment(
        &self,
        _: &ReviewId,
        _: &CommentId,
        _: Reaction,
    ) -> Result<(), ApiError> {
        self.check()
    }

    async fn list_comments(
        &self,
        review_id: &ReviewId,
        skip: u32,
        limit: u32,
    ) -> Result<Vec<Comment>, ApiError> {
        self.comment_requests
            .lock()
            .unwrap()
            .push((review_id.clone(), skip, limit));
        self.pause().await;
        self.check()?;
        Ok(self
            .comments
            .lock()
            .unwrap()
            .get(review_id)
            .map(|all| {
                all.iter()
                    .skip(skip as usize)
                    .take(limit as usize)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn create_review(&self, _: &CreateReview) -> Result<CreateReviewResponse, ApiError> {
        Err(ApiError::Transport("not scripted".into()))
    }

    async fn create_comment(
        &self,
        _: &ReviewId,
        _: &CreateComment,
    ) -> Result<CreateCommentResponse, ApiError> {
        Err(ApiError::Transport("not scripted".into()))
    }

    async fn delete_review(&self, _: &ReviewId) -> Result<(), ApiError> {
        self.check()
    }

    async fn delete_comment(&self, _: &ReviewId, _: &CommentId) -> Result<(), ApiError> {
        self.check()
    }
}
