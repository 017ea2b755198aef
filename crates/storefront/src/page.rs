use adapter::{ApiError, ReviewsApi, Session};
use domain::{
    page_window, CommentId, CreateComment, CreateReview, Review, ReviewId, ReviewParams,
    SortOption,
};
use std::sync::Arc;
use storage::{CommentCache, LoadMore, Notifications, ReviewStore, DEFAULT_COMMENT_LIMIT};
use tracing::{info, warn};

use crate::deletion::{DeleteTarget, DeletionCoordinator, DeletionOutcome};
use crate::error::ActionError;
use crate::reactions::{ReactOutcome, ReactionCoordinator};

pub const REVIEW_CREATED_MESSAGE: &str = "Review submitted.";
pub const REVIEW_FAILED_MESSAGE: &str = "Could not submit your review.";
pub const REPLY_SENT_MESSAGE: &str = "Reply sent.";
pub const REPLY_FAILED_MESSAGE: &str = "Could not send your reply.";
pub const COMMENTS_FAILED_MESSAGE: &str = "Could not load comments.";
pub const PARENT_MISSING_MESSAGE: &str = "The comment you are replying to is no longer loaded.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageOptions {
    pub page_size: u32,
    pub comment_limit: u32,
    /// Narrow layouts show a shorter page window.
    pub compact: bool,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            page_size: ReviewParams::DEFAULT_PAGE_SIZE,
            comment_limit: DEFAULT_COMMENT_LIMIT,
            compact: false,
        }
    }
}

/// The reviews section of a product page: the stores, the coordinators, and
/// the handlers the view wires its events to.
pub struct ReviewsPage {
    product_code: String,
    options: PageOptions,
    api: Arc<dyn ReviewsApi>,
    session: Session,
    reviews: Arc<ReviewStore>,
    comments: Arc<CommentCache>,
    notifications: Notifications,
    reactions: Arc<ReactionCoordinator>,
    deletion: DeletionCoordinator,
}

impl ReviewsPage {
    pub fn new(
        product_code: impl Into<String>,
        api: Arc<dyn ReviewsApi>,
        session: Session,
        notifications: Notifications,
        options: PageOptions,
    ) -> Self {
        let reviews = Arc::new(ReviewStore::new(api.clone()));
        let comments = Arc::new(CommentCache::new(api.clone(), options.comment_limit));
        let reactions = Arc::new(ReactionCoordinator::new(
            api.clone(),
            reviews.clone(),
            comments.clone(),
            notifications.clone(),
        ));
        let deletion = DeletionCoordinator::new(
            api.clone(),
            reviews.clone(),
            comments.clone(),
            notifications.clone(),
        );
        Self {
            product_code: product_code.into(),
            options,
            api,
            session,
            reviews,
            comments,
            notifications,
            reactions,
            deletion,
        }
    }

    pub fn product_code(&self) -> &str {
        &self.product_code
    }

    pub fn reviews(&self) -> &ReviewStore {
        &self.reviews
    }

    pub fn comments(&self) -> &CommentCache {
        &self.comments
    }

    pub fn reactions(&self) -> &Arc<ReactionCoordinator> {
        &self.reactions
    }

    pub fn deletion(&self) -> &DeletionCoordinator {
        &self.deletion
    }

    pub fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn params(&self) -> ReviewParams {
        self.reviews.state().read(|s| s.params)
    }

    pub async fn mount(&self) {
        let params = ReviewParams::with_page_size(self.options.page_size);
        self.reviews.fetch(&self.product_code, params).await;
    }

    pub async fn fetch(&self, params: ReviewParams) {
        self.reviews.fetch(&self.product_code, params).await;
    }

    /// Applies a `field.DIRECTION` sort option and goes back to the first page.
    pub async fn change_sort(&self, value: &str) -> Result<(), ActionError> {
        let option: SortOption = value.parse()?;
        let params = self.params().sorted(option.field, option.direction);
        self.fetch(params).await;
        Ok(())
    }

    pub async fn change_page(&self, page: u32) {
        let params = self.params().at_page(page);
        self.fetch(params).await;
    }

    pub fn page_numbers(&self) -> Vec<u32> {
        let pagination = self.reviews.state().read(|s| s.reviews.pagination);
        page_window(pagination.page, pagination.total_pages, self.options.compact)
    }

    pub fn can_delete_review(&self, review: &Review) -> bool {
        self.session.owns(&review.customer_id)
    }

    pub async fn like(&self, review_id: &ReviewId, comment_id: Option<&CommentId>) -> ReactOutcome {
        self.reactions.react(review_id, comment_id, true).await
    }

    pub async fn dislike(
        &self,
        review_id: &ReviewId,
        comment_id: Option<&CommentId>,
    ) -> ReactOutcome {
        self.reactions.react(review_id, comment_id, false).await
    }

    pub async fn load_comments(&self, review_id: &ReviewId) -> Result<LoadMore, ActionError> {
        let review = self.review(review_id)?;
        self.comments
            .load_more(&review)
            .await
            .map_err(|e| self.comment_failure(e))
    }

    /// Opens (or reopens from scratch) the comment thread of a review.
    pub async fn toggle_comments(&self, review_id: &ReviewId) -> Result<LoadMore, ActionError> {
        let review = self.review(review_id)?;
        self.comments
            .reopen(&review)
            .await
            .map_err(|e| self.comment_failure(e))
    }

    pub fn collapse_comments(&self, review_id: &ReviewId) -> bool {
        self.comments.collapse(review_id)
    }

    pub fn show_less_comments(&self, review_id: &ReviewId) -> bool {
        self.comments.show_less(review_id)
    }

    pub async fn submit_review(
        &self,
        content: Option<&str>,
        rating: u8,
    ) -> Result<ReviewId, ActionError> {
        let request = match CreateReview::new(self.product_code.as_str(), content, rating) {
            Ok(request) => request,
            Err(e) => {
                self.notifications.show_error(&e.to_string());
                return Err(e.into());
            }
        };

        match self.api.create_review(&request).await {
            Ok(created) => {
                info!("Review {} created for {}", created.review_id, self.product_code);
                self.notifications.show_success(REVIEW_CREATED_MESSAGE);
                self.reviews.refresh().await;
                Ok(created.review_id)
            }
            Err(e) => Err(self.action_failure(e, REVIEW_FAILED_MESSAGE)),
        }
    }

    /// Posts a top-level comment, or a reply mentioning the author of `parent`.
    pub async fn submit_reply(
        &self,
        review_id: &ReviewId,
        content: &str,
        parent: Option<&CommentId>,
    ) -> Result<CommentId, ActionError> {
        let parent = match parent {
            Some(id) => match self.comments.find_comment(review_id, id) {
                Some(comment) => Some(comment),
                None => {
                    warn!("Reply target {} is not loaded under {}", id, review_id);
                    self.notifications.show_error(PARENT_MISSING_MESSAGE);
                    return Err(ActionError::UnknownComment(id.to_string()));
                }
            },
            None => None,
        };
        let request = match &parent {
            Some(parent) => CreateComment::reply_to(content, parent),
            None => CreateComment::top_level(content),
        };
        let request = match request {
            Ok(request) => request,
            Err(e) => {
                self.notifications.show_error(&e.to_string());
                return Err(e.into());
            }
        };

        match self.api.create_comment(review_id, &request).await {
            Ok(created) => {
                self.notifications.show_success(REPLY_SENT_MESSAGE);
                if self.reviews.refresh().await {
                    let settled = self.reviews.settled().await;
                    if let Some(review) = settled
                        .reviews
                        .data
                        .iter()
                        .find(|r| &r.review_id == review_id)
                    {
                        if let Err(e) = self.comments.reopen(review).await {
                            self.comment_failure(e);
                        }
                    }
                }
                Ok(created.comment_id)
            }
            Err(e) => Err(self.action_failure(e, REPLY_FAILED_MESSAGE)),
        }
    }

    pub fn request_delete_review(&self, review_id: &ReviewId) -> bool {
        self.deletion.request_delete(DeleteTarget::Review {
            review_id: review_id.clone(),
        })
    }

    pub fn request_delete_comment(&self, review_id: &ReviewId, comment_id: &CommentId) -> bool {
        self.deletion.request_delete(DeleteTarget::Comment {
            review_id: review_id.clone(),
            comment_id: comment_id.clone(),
        })
    }

    pub async fn confirm_delete(&self) -> DeletionOutcome {
        self.deletion.confirm().await
    }

    pub fn cancel_delete(&self) -> bool {
        self.deletion.cancel()
    }

    fn review(&self, review_id: &ReviewId) -> Result<Review, ActionError> {
        self.reviews
            .find(review_id)
            .ok_or_else(|| ActionError::UnknownReview(review_id.to_string()))
    }

    fn comment_failure(&self, e: ApiError) -> ActionError {
        if e != ApiError::Unauthenticated {
            self.notifications.show_error(COMMENTS_FAILED_MESSAGE);
        }
        e.into()
    }

    fn action_failure(&self, e: ApiError, message: &str) -> ActionError {
        warn!("{}: {}", message, e);
        if e != ApiError::Unauthenticated {
            self.notifications.show_error(message);
        }
        e.into()
    }
}
