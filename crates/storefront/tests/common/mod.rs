#![allow(dead_code)]

use adapter::{ApiError, ReviewsApi, Session};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use domain::{
    Comment, CommentId, CreateComment, CreateCommentResponse, CreateReview, CreateReviewResponse,
    Page, Pagination, Reaction, Reactions, Review, ReviewId, ReviewParams, User,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use storage::Notifications;
use storefront::{PageOptions, ReviewsPage};

pub const PRODUCT: &str = "SKU-1";

pub fn review(id: &str, total_comments: u32) -> Review {
    Review {
        review_id: ReviewId::new(id),
        product_id: PRODUCT.into(),
        customer_id: "u1".into(),
        customer_name: "Ana".into(),
        content: format!("review {}", id),
        rating: 4,
        reactions: Reactions::default(),
        total_comments,
        created_at: NaiveDateTime::default(),
    }
}

pub fn comment(id: &str, author: &str) -> Comment {
    Comment {
        comment_id: CommentId::new(id),
        review_id: None,
        customer_id: format!("id-{}", author),
        customer_name: author.into(),
        content: format!("comment {}", id),
        parent_comment_id: None,
        mentioned_user_id: None,
        mentioned_user_name: None,
        reactions: Reactions::default(),
        total_replies: 0,
        created_at: NaiveDateTime::default(),
    }
}

/// What the backend was asked to do, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List(ReviewParams),
    ReactStart(String),
    ReactEnd(String),
    Comments(ReviewId, u32, u32),
    CreateReview(CreateReview),
    CreateComment(ReviewId, CreateComment),
    DeleteReview(ReviewId),
    DeleteComment(ReviewId, CommentId),
}

/// In-memory backend with scriptable latency and failures.
#[derive(Default)]
pub struct ScriptedApi {
    pub reviews: Mutex<Vec<Review>>,
    pub comments: Mutex<HashMap<ReviewId, Vec<Comment>>>,
    pub calls: Mutex<Vec<Call>>,
    pub react_delay: Mutex<Option<Duration>>,
    pub fail_reactions: AtomicBool,
    pub fail_deletes: AtomicBool,
    pub fail_comments: AtomicBool,
    pub reject_unauthenticated: AtomicBool,
    next_id: AtomicU32,
}

impl ScriptedApi {
    pub fn with_reviews(reviews: Vec<Review>) -> Arc<Self> {
        let api = Self::default();
        *api.reviews.lock().unwrap() = reviews;
        Arc::new(api)
    }

    pub fn seed_comments(&self, review_id: &str, count: usize) {
        let list = (0..count)
            .map(|i| comment(&format!("{}-c{}", review_id, i), "Bo"))
            .collect();
        self.comments
            .lock()
            .unwrap()
            .insert(ReviewId::new(review_id), list);
        self.sync_totals();
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn comment_calls(&self) -> Vec<(u32, u32)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Comments(_, skip, limit) => Some((skip, limit)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn sync_totals(&self) {
        let comments = self.comments.lock().unwrap();
        for r in self.reviews.lock().unwrap().iter_mut() {
            r.total_comments = comments.get(&r.review_id).map_or(0, |c| c.len() as u32);
        }
    }

    fn auth(&self) -> Result<(), ApiError> {
        if self.reject_unauthenticated.load(Ordering::SeqCst) {
            return Err(ApiError::Unauthenticated);
        }
        Ok(())
    }

    async fn react(&self, key: String, fail: bool) -> Result<(), ApiError> {
        self.record(Call::ReactStart(key.clone()));
        let delay = *self.react_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.record(Call::ReactEnd(key));
        self.auth()?;
        if fail {
            return Err(ApiError::Status {
                status: 500,
                message: "boom".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ReviewsApi for ScriptedApi {
    async fn list_reviews(
        &self,
        _product_code: &str,
        params: &ReviewParams,
    ) -> Result<Page<Review>, ApiError> {
        self.record(Call::List(*params));
        let all = self.reviews.lock().unwrap().clone();
        let size = params.size.unwrap_or(5).max(1);
        let page = params.page.unwrap_or(0);
        let total_pages = (all.len() as u32).div_ceil(size);
        Ok(Page {
            pagination: Pagination {
                page,
                size,
                total_elements: all.len() as u64,
                total_pages,
            },
            data: all
                .into_iter()
                .skip((page * size) as usize)
                .take(size as usize)
                .collect(),
        })
    }

    async fn react_to_review(
        &self,
        review_id: &ReviewId,
        reaction: Reaction,
    ) -> Result<(), ApiError> {
        let key = format!("{}/{}", review_id, reaction.as_path());
        self.react(key, self.fail_reactions.load(Ordering::SeqCst))
            .await
    }

    async fn react_to_comment(
        &self,
        review_id: &ReviewId,
        comment_id: &CommentId,
        reaction: Reaction,
    ) -> Result<(), ApiError> {
        let key = format!("{}/{}/{}", review_id, comment_id, reaction.as_path());
        self.react(key, self.fail_reactions.load(Ordering::SeqCst))
            .await
    }

    async fn list_comments(
        &self,
        review_id: &ReviewId,
        skip: u32,
        limit: u32,
    ) -> Result<Vec<Comment>, ApiError> {
        self.record(Call::Comments(review_id.clone(), skip, limit));
        self.auth()?;
        if self.fail_comments.load(Ordering::SeqCst) {
            return Err(ApiError::Transport("timed out".into()));
        }
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

    async fn create_review(
        &self,
        request: &CreateReview,
    ) -> Result<CreateReviewResponse, ApiError> {
        self.record(Call::CreateReview(request.clone()));
        self.auth()?;
        let id = format!("new-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        let mut created = review(&id, 0);
        created.rating = request.rating;
        created.content = request.content.clone().unwrap_or_default();
        self.reviews.lock().unwrap().insert(0, created);
        Ok(CreateReviewResponse {
            review_id: ReviewId::new(id),
            product_id: None,
            customer_id: "u1".into(),
            customer_name: "Ana".into(),
            content: request.content.clone(),
            rating: request.rating,
        })
    }

    async fn create_comment(
        &self,
        review_id: &ReviewId,
        request: &CreateComment,
    ) -> Result<CreateCommentResponse, ApiError> {
        self.record(Call::CreateComment(review_id.clone(), request.clone()));
        self.auth()?;
        let id = format!("reply-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        let mut created = comment(&id, "Ana");
        created.content = request.content.clone();
        created.parent_comment_id = request.parent_comment_id.clone();
        created.mentioned_user_name = request.mentioned_user_name.clone();
        self.comments
            .lock()
            .unwrap()
            .entry(review_id.clone())
            .or_default()
            .push(created);
        self.sync_totals();
        Ok(CreateCommentResponse {
            comment_id: CommentId::new(id),
            content: request.content.clone(),
        })
    }

    async fn delete_review(&self, review_id: &ReviewId) -> Result<(), ApiError> {
        self.record(Call::DeleteReview(review_id.clone()));
        self.auth()?;
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(ApiError::Status {
                status: 500,
                message: "boom".into(),
            });
        }
        self.reviews
            .lock()
            .unwrap()
            .retain(|r| &r.review_id != review_id);
        self.comments.lock().unwrap().remove(review_id);
        Ok(())
    }

    async fn delete_comment(
        &self,
        review_id: &ReviewId,
        comment_id: &CommentId,
    ) -> Result<(), ApiError> {
        self.record(Call::DeleteComment(review_id.clone(), comment_id.clone()));
        self.auth()?;
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(ApiError::Status {
                status: 500,
                message: "boom".into(),
            });
        }
        if let Some(list) = self.comments.lock().unwrap().get_mut(review_id) {
            list.retain(|c| &c.comment_id != comment_id);
        }
        self.sync_totals();
        Ok(())
    }
}

pub fn signed_in() -> Session {
    Session::signed_in(
        User {
            id: "u1".into(),
            name: "Ana".into(),
        },
        Some("u1:Ana".into()),
    )
}

pub fn unmounted(api: Arc<ScriptedApi>, session: Session) -> ReviewsPage {
    ReviewsPage::new(
        PRODUCT,
        api,
        session,
        Notifications::default(),
        PageOptions::default(),
    )
}

pub async fn mounted(api: Arc<ScriptedApi>, session: Session) -> ReviewsPage {
    let page = unmounted(api, session);
    page.mount().await;
    page
}
