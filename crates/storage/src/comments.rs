use adapter::{ApiError, ReviewsApi};
use domain::{Comment, CommentId, Review, ReviewId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::cell::StateCell;

pub const DEFAULT_COMMENT_LIMIT: u32 = 5;

/// Incrementally loaded comment thread of one review.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentThread {
    pub comments: Vec<Comment>,
    pub skip: u32,
    pub limit: u32,
    pub total: u32,
    pub loading: bool,
    pub has_more: bool,
    epoch: u64,
}

impl CommentThread {
    fn new(epoch: u64, limit: u32, total: u32) -> Self {
        Self {
            comments: Vec::new(),
            skip: 0,
            limit,
            total,
            loading: false,
            has_more: true,
            epoch,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMore {
    /// Already loading or nothing left; no request was made.
    Skipped,
    Fetched(usize),
    /// The thread was collapsed while the request was in flight.
    Stale,
}

pub struct CommentCache {
    api: Arc<dyn ReviewsApi>,
    threads: StateCell<HashMap<ReviewId, CommentThread>>,
    limit: u32,
    epochs: AtomicU64,
}

impl CommentCache {
    pub fn new(api: Arc<dyn ReviewsApi>, limit: u32) -> Self {
        Self {
            api,
            threads: StateCell::default(),
            limit: limit.max(1),
            epochs: AtomicU64::new(0),
        }
    }

    pub fn state(&self) -> &StateCell<HashMap<ReviewId, CommentThread>> {
        &self.threads
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn thread(&self, review_id: &ReviewId) -> Option<CommentThread> {
        self.threads.read(|t| t.get(review_id).cloned())
    }

    pub fn is_open(&self, review_id: &ReviewId) -> bool {
        self.threads.read(|t| t.contains_key(review_id))
    }

    pub fn find_comment(&self, review_id: &ReviewId, comment_id: &CommentId) -> Option<Comment> {
        self.threads.read(|t| {
            t.get(review_id)?
                .comments
                .iter()
                .find(|c| &c.comment_id == comment_id)
                .cloned()
        })
    }

    /// Mutates one cached comment in place. Returns false if the thread or
    /// the comment is not cached.
    pub fn update_comment(
        &self,
        review_id: &ReviewId,
        comment_id: &CommentId,
        f: impl FnOnce(&mut Comment),
    ) -> bool {
        self.threads.update_if(|threads| {
            let found = threads
                .get_mut(review_id)
                .and_then(|t| t.comments.iter_mut().find(|c| &c.comment_id == comment_id));
            match found {
                Some(comment) => {
                    f(comment);
                    true
                }
                None => false,
            }
        })
    }

    /// Fetches the next window of the review's comments, creating the
    /// thread on first use.
    pub async fn load_more(&self, review: &Review) -> Result<LoadMore, ApiError> {
        let review_id = review.review_id.clone();
        let mut request = None;

        self.threads.update_if(|threads| {
            let mut created = false;
            let thread = threads.entry(review_id.clone()).or_insert_with(|| {
                created = true;
                CommentThread::new(
                    self.epochs.fetch_add(1, Ordering::SeqCst),
                    self.limit,
                    review.total_comments,
                )
            });
            if thread.loading || !thread.has_more {
                return created;
            }
            thread.loading = true;
            request = Some((thread.epoch, thread.skip, thread.limit));
            true
        });

        let Some((epoch, skip, limit)) = request else {
            return Ok(LoadMore::Skipped);
        };

        debug!("Loading comments of {} (skip {}, limit {})", review_id, skip, limit);
        let result = self.api.list_comments(&review_id, skip, limit).await;

        let mut outcome = LoadMore::Stale;
        self.threads.update_if(|threads| {
            let Some(thread) = threads.get_mut(&review_id).filter(|t| t.epoch == epoch) else {
                return false;
            };
            thread.loading = false;
            if let Ok(batch) = &result {
                let fetched = batch.len();
                thread.comments.extend(batch.iter().cloned().map(|mut c| {
                    c.review_id = Some(review_id.clone());
                    c
                }));
                thread.skip += fetched as u32;
                thread.has_more = fetched > 0 && (thread.comments.len() as u32) < thread.total;
                outcome = LoadMore::Fetched(fetched);
            }
            true
        });

        match result {
            Ok(_) => Ok(outcome),
            Err(e) => {
                warn!("Failed to load comments of {}: {}", review_id, e);
                Err(e)
            }
        }
    }

    /// Drops the thread entirely; the next `load_more` starts from offset 0.
    pub fn collapse(&self, review_id: &ReviewId) -> bool {
        self.threads.update_if(|threads| threads.remove(review_id).is_some())
    }

    /// Collapses and reloads the first window.
    pub async fn reopen(&self, review: &Review) -> Result<LoadMore, ApiError> {
        self.collapse(&review.review_id);
        self.load_more(review).await
    }

    /// Trims an open thread back to its first window.
    pub fn show_less(&self, review_id: &ReviewId) -> bool {
        let limit = self.limit;
        self.threads.update_if(|threads| match threads.get_mut(review_id) {
            Some(thread) if thread.comments.len() > limit as usize => {
                thread.comments.truncate(limit as usize);
                thread.skip = limit;
                thread.has_more = true;
                true
            }
            _ => false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{review, FakeApi};
    use std::time::Duration;

    fn cache_with(api: FakeApi) -> (Arc<FakeApi>, Arc<CommentCache>) {
        let api = Arc::new(api);
        let cache = Arc::new(CommentCache::new(api.clone(), DEFAULT_COMMENT_LIMIT));
        (api, cache)
    }

    #[tokio::test]
    async fn twelve_comments_load_in_windows_of_five() {
        let (api, cache) = cache_with(FakeApi::with_comments("r1", 12));
        let r1 = review("r1", 12);

        let mut fetched = Vec::new();
        let mut has_more = Vec::new();
        for _ in 0..3 {
            fetched.push(cache.load_more(&r1).await.unwrap());
            has_more.push(cache.thread(&r1.review_id).unwrap().has_more);
        }

        assert_eq!(
            fetched,
            vec![LoadMore::Fetched(5), LoadMore::Fetched(5), LoadMore::Fetched(2)]
        );
        assert_eq!(has_more, vec![true, true, false]);

        let thread = cache.thread(&r1.review_id).unwrap();
        assert_eq!(thread.skip, 12);
        assert_eq!(thread.comments.len(), 12);
        assert!(thread
            .comments
            .iter()
            .all(|c| c.review_id.as_ref() == Some(&r1.review_id)));

        let windows: Vec<(u32, u32)> = api
            .comment_requests
            .lock()
            .unwrap()
            .iter()
            .map(|(_, s, l)| (*s, *l))
            .collect();
        assert_eq!(windows, vec![(0, 5), (5, 5), (10, 5)]);
    }

    #[tokio::test]
    async fn exhausted_thread_makes_no_request() {
        let (api, cache) = cache_with(FakeApi::with_comments("r1", 2));
        let r1 = review("r1", 2);
        cache.load_more(&r1).await.unwrap();

        let before = cache.thread(&r1.review_id).unwrap();
        assert!(!before.has_more);
        let mut rx = cache.state().subscribe();
        rx.borrow_and_update();

        assert_eq!(cache.load_more(&r1).await.unwrap(), LoadMore::Skipped);
        assert_eq!(api.comment_requests.lock().unwrap().len(), 1);
        assert_eq!(cache.thread(&r1.review_id).unwrap(), before);
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn collapse_restarts_from_offset_zero() {
        let api = FakeApi::with_comments("r1", 12);
        let (api, cache) = cache_with(api);
        let r1 = review("r1", 12);
        cache.load_more(&r1).await.unwrap();
        cache.load_more(&r1).await.unwrap();

        assert!(cache.collapse(&r1.review_id));
        assert!(!cache.is_open(&r1.review_id));

        api.delays.lock().unwrap().push_back(Duration::from_millis(50));
        let pending = tokio::spawn({
            let cache = cache.clone();
            let r1 = r1.clone();
            async move { cache.load_more(&r1).await }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;

        let thread = cache.thread(&r1.review_id).unwrap();
        assert_eq!(thread.skip, 0);
        assert!(thread.comments.is_empty());
        assert!(thread.loading);

        assert_eq!(pending.await.unwrap().unwrap(), LoadMore::Fetched(5));
        assert_eq!(api.comment_requests.lock().unwrap().last().unwrap().1, 0);
    }

    #[tokio::test]
    async fn response_for_collapsed_thread_is_dropped() {
        let api = FakeApi::with_comments("r1", 12);
        api.delays.lock().unwrap().push_back(Duration::from_millis(50));
        let (_api, cache) = cache_with(api);
        let r1 = review("r1", 12);

        let pending = tokio::spawn({
            let cache = cache.clone();
            let r1 = r1.clone();
            async move { cache.load_more(&r1).await }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        cache.collapse(&r1.review_id);

        assert_eq!(pending.await.unwrap().unwrap(), LoadMore::Stale);
        assert!(cache.thread(&r1.review_id).is_none());
    }

    #[tokio::test]
    async fn failed_load_clears_loading_flag() {
        let api = FakeApi::with_comments("r1", 12);
        api.fail.store(true, Ordering::SeqCst);
        let (api, cache) = cache_with(api);
        let r1 = review("r1", 12);

        assert!(cache.load_more(&r1).await.is_err());
        let thread = cache.thread(&r1.review_id).unwrap();
        assert!(!thread.loading);
        assert!(thread.has_more);

        api.fail.store(false, Ordering::SeqCst);
        assert_eq!(cache.load_more(&r1).await.unwrap(), LoadMore::Fetched(5));
    }

    #[tokio::test]
    async fn empty_window_stops_paging() {
        let (_api, cache) = cache_with(FakeApi::with_comments("r1", 3));
        let r1 = review("r1", 9);
        cache.load_more(&r1).await.unwrap();
        assert!(cache.thread(&r1.review_id).unwrap().has_more);
        assert_eq!(cache.load_more(&r1).await.unwrap(), LoadMore::Fetched(0));
        assert!(!cache.thread(&r1.review_id).unwrap().has_more);
    }

    #[tokio::test]
    async fn show_less_trims_to_first_window() {
        let (_api, cache) = cache_with(FakeApi::with_comments("r1", 12));
        let r1 = review("r1", 12);
        cache.load_more(&r1).await.unwrap();
        assert!(!cache.show_less(&r1.review_id));
        cache.load_more(&r1).await.unwrap();

        assert!(cache.show_less(&r1.review_id));
        let thread = cache.thread(&r1.review_id).unwrap();
        assert_eq!(thread.comments.len(), 5);
        assert_eq!(thread.skip, 5);
        assert!(thread.has_more);
    }

    #[tokio::test]
    async fn update_comment_touches_only_cached_items() {
        let (_api, cache) = cache_with(FakeApi::with_comments("r1", 3));
        let r1 = review("r1", 3);
        cache.load_more(&r1).await.unwrap();

        let c1 = CommentId::new("c1");
        assert!(cache.update_comment(&r1.review_id, &c1, |c| c.reactions.likes = 9));
        assert_eq!(
            cache.find_comment(&r1.review_id, &c1).unwrap().reactions.likes,
            9
        );
        assert!(!cache.update_comment(&ReviewId::new("r2"), &c1, |_| {}));
    }
}
