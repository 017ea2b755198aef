use adapter::{ApiError, ReviewsApi};
use domain::{CommentId, Optimistic, Reactable, Reaction, Reactions, ReviewId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use storage::{CommentCache, Notifications, ReviewStore};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

pub const REACTION_FAILED_MESSAGE: &str = "Could not register your reaction.";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReactionTarget {
    Review(ReviewId),
    Comment(ReviewId, CommentId),
}

impl ReactionTarget {
    pub fn new(review_id: &ReviewId, comment_id: Option<&CommentId>) -> Self {
        match comment_id {
            Some(comment_id) => Self::Comment(review_id.clone(), comment_id.clone()),
            None => Self::Review(review_id.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReactOutcome {
    /// Target not on the current page / not in an open thread.
    NotFound,
    Committed,
    RolledBack(ApiError),
}

type Lane = Arc<tokio::sync::Mutex<()>>;

/// Optimistic like/dislike toggling.
///
/// Reactions on the same target run one after another; different targets
/// proceed concurrently.
pub struct ReactionCoordinator {
    api: Arc<dyn ReviewsApi>,
    reviews: Arc<ReviewStore>,
    comments: Arc<CommentCache>,
    notifications: Notifications,
    lanes: Mutex<HashMap<ReactionTarget, Lane>>,
}

fn toggle_on<R: Reactable>(item: &mut R, reaction: Reaction) -> Optimistic<Reactions> {
    Optimistic::apply(item.reactions_mut(), |r| r.toggle(reaction))
}

impl ReactionCoordinator {
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
            lanes: Mutex::new(HashMap::new()),
        }
    }

    pub async fn react(
        &self,
        review_id: &ReviewId,
        comment_id: Option<&CommentId>,
        is_like: bool,
    ) -> ReactOutcome {
        let target = ReactionTarget::new(review_id, comment_id);
        let reaction = Reaction::from_is_like(is_like);

        let lane = self.lane(&target);
        let outcome = {
            let _turn = lane.lock().await;
            self.run(&target, reaction).await
        };
        self.release(&target, lane);
        outcome
    }

    /// Fire-and-forget variant for event handlers.
    pub fn spawn_react(
        self: &Arc<Self>,
        review_id: ReviewId,
        comment_id: Option<CommentId>,
        is_like: bool,
    ) -> JoinHandle<ReactOutcome> {
        let this = self.clone();
        tokio::spawn(async move { this.react(&review_id, comment_id.as_ref(), is_like).await })
    }

    async fn run(&self, target: &ReactionTarget, reaction: Reaction) -> ReactOutcome {
        let Some(pending) = self.apply(target, reaction) else {
            debug!("Reaction target {:?} not loaded, ignoring", target);
            return ReactOutcome::NotFound;
        };

        let result = match target {
            ReactionTarget::Review(review_id) => {
                self.api.react_to_review(review_id, reaction).await
            }
            ReactionTarget::Comment(review_id, comment_id) => {
                self.api
                    .react_to_comment(review_id, comment_id, reaction)
                    .await
            }
        };

        match result {
            Ok(()) => {
                pending.commit();
                ReactOutcome::Committed
            }
            Err(e) => {
                warn!("Reaction on {:?} failed, rolling back: {}", target, e);
                self.restore(target, pending);
                if e != ApiError::Unauthenticated {
                    self.notifications.show_error(REACTION_FAILED_MESSAGE);
                }
                ReactOutcome::RolledBack(e)
            }
        }
    }

    fn apply(&self, target: &ReactionTarget, reaction: Reaction) -> Option<Optimistic<Reactions>> {
        let mut pending = None;
        match target {
            ReactionTarget::Review(review_id) => {
                self.reviews
                    .update_review(review_id, |r| pending = Some(toggle_on(r, reaction)));
            }
            ReactionTarget::Comment(review_id, comment_id) => {
                self.comments.update_comment(review_id, comment_id, |c| {
                    pending = Some(toggle_on(c, reaction))
                });
            }
        }
        pending
    }

    fn restore(&self, target: &ReactionTarget, pending: Optimistic<Reactions>) {
        let restored = match target {
            ReactionTarget::Review(review_id) => self
                .reviews
                .update_review(review_id, |r| pending.rollback(r.reactions_mut())),
            ReactionTarget::Comment(review_id, comment_id) => self
                .comments
                .update_comment(review_id, comment_id, |c| {
                    pending.rollback(c.reactions_mut())
                }),
        };
        if !restored {
            debug!("Reaction target {:?} gone before rollback", target);
        }
    }

    fn lane(&self, target: &ReactionTarget) -> Lane {
        let mut lanes = self.lanes.lock().unwrap_or_else(PoisonError::into_inner);
        lanes.entry(target.clone()).or_default().clone()
    }

    fn release(&self, target: &ReactionTarget, lane: Lane) {
        let mut lanes = self.lanes.lock().unwrap_or_else(PoisonError::into_inner);
        // map + ours: nobody else is queued on this target
        if Arc::strong_count(&lane) == 2 {
            lanes.remove(target);
        }
    }
}
