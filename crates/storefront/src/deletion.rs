use adapter::{ApiError, ReviewsApi};
use domain::{CommentId, ReviewId};
use std::sync::Arc;
use storage::{CommentCache, Notifications, ReviewStore, StateCell};
use tracing::{info, warn};

pub const REVIEW_DELETED_MESSAGE: &str = "Review deleted.";
pub const COMMENT_DELETED_MESSAGE: &str = "Comment deleted.";
pub const DELETE_FAILED_MESSAGE: &str = "Could not delete. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteTarget {
    Review {
        review_id: ReviewId,
    },
    Comment {
        review_id: ReviewId,
        comment_id: CommentId,
    },
}

impl DeleteTarget {
    pub fn review_id(&self) -> &ReviewId {
        match self {
            Self::Review { review_id } | Self::Comment { review_id, .. } => review_id,
        }
    }
}

/// Confirmation flow:
/// `Idle → PendingConfirmation → (Confirmed → InFlight → Succeeded | Failed) | Cancelled`.
/// The terminal states fall back to `Idle` straight after being published.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DeletionPhase {
    #[default]
    Idle,
    PendingConfirmation(DeleteTarget),
    Confirmed(DeleteTarget),
    InFlight(DeleteTarget),
    Succeeded(DeleteTarget),
    Failed(DeleteTarget),
    Cancelled(DeleteTarget),
}

impl DeletionPhase {
    pub fn is_prompt_open(&self) -> bool {
        matches!(self, Self::PendingConfirmation(_))
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Confirmed(_) | Self::InFlight(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletionOutcome {
    NothingPending,
    Deleted(DeleteTarget),
    Failed(DeleteTarget, ApiError),
}

pub struct DeletionCoordinator {
    api: Arc<dyn ReviewsApi>,
    reviews: Arc<ReviewStore>,
    comments: Arc<CommentCache>,
    notifications: Notifications,
    phase: StateCell<DeletionPhase>,
}

impl DeletionCoordinator {
    pub fn new(
        api: Arc<dyn ReviewsApi>,
        reviews: Arc<ReviewStore>,
        comments: Arc<CommentCache>,
        notifications: Notifications,
    ) -> Self {
        Self {
            api,
            reviews,
            comments,
            notifications,
            phase: StateCell::default(),
        }
    }

    pub fn phase(&self) -> &StateCell<DeletionPhase> {
        &self.phase
    }

    /// Stages `target` for confirmation. Refused while a deletion is running.
    pub fn request_delete(&self, target: DeleteTarget) -> bool {
        self.phase.update_if(|phase| {
            if phase.is_busy() {
                return false;
            }
            *phase = DeletionPhase::PendingConfirmation(target);
            true
        })
    }

    pub fn cancel(&self) -> bool {
        let cancelled = self.phase.update_if(|phase| match std::mem::take(phase) {
            DeletionPhase::PendingConfirmation(target) => {
                *phase = DeletionPhase::Cancelled(target);
                true
            }
            other => {
                *phase = other;
                false
            }
        });
        if cancelled {
            self.phase.replace(DeletionPhase::Idle);
        }
        cancelled
    }

    pub async fn confirm(&self) -> DeletionOutcome {
        let mut staged = None;
        self.phase.update_if(|phase| match std::mem::take(phase) {
            DeletionPhase::PendingConfirmation(target) => {
                staged = Some(target.clone());
                *phase = DeletionPhase::Confirmed(target);
                true
            }
            other => {
                *phase = other;
                false
            }
        });
        let Some(target) = staged else {
            return DeletionOutcome::NothingPending;
        };

        self.phase.replace(DeletionPhase::InFlight(target.clone()));
        let result = match &target {
            DeleteTarget::Review { review_id } => self.api.delete_review(review_id).await,
            DeleteTarget::Comment {
                review_id,
                comment_id,
            } => self.api.delete_comment(review_id, comment_id).await,
        };

        match result {
            Ok(()) => {
                info!("Deleted {:?}", target);
                self.reconcile(&target).await;
                self.phase.replace(DeletionPhase::Succeeded(target.clone()));
                self.phase.replace(DeletionPhase::Idle);
                self.notifications.show_success(match &target {
                    DeleteTarget::Review { .. } => REVIEW_DELETED_MESSAGE,
                    DeleteTarget::Comment { .. } => COMMENT_DELETED_MESSAGE,
                });
                DeletionOutcome::Deleted(target)
            }
            Err(e) => {
                warn!("Deleting {:?} failed: {}", target, e);
                self.phase.replace(DeletionPhase::Failed(target.clone()));
                self.phase.replace(DeletionPhase::Idle);
                if e != ApiError::Unauthenticated {
                    self.notifications.show_error(DELETE_FAILED_MESSAGE);
                }
                DeletionOutcome::Failed(target, e)
            }
        }
    }

    async fn reconcile(&self, target: &DeleteTarget) {
        match target {
            DeleteTarget::Review { review_id } => {
                self.comments.collapse(review_id);
                self.reviews.refresh().await;
            }
            DeleteTarget::Comment { review_id, .. } => {
                let refreshed = if self.reviews.refresh().await {
                    self.reviews
                        .settled()
                        .await
                        .reviews
                        .data
                        .into_iter()
                        .find(|r| &r.review_id == review_id)
                } else {
                    None
                };
                match refreshed {
                    Some(review) => {
                        if let Err(e) = self.comments.reopen(&review).await {
                            warn!("Reloading comments of {} failed: {}", review_id, e);
                        }
                    }
                    None => {
                        self.comments.collapse(review_id);
                    }
                }
            }
        }
    }
}
