use adapter::{ApiError, ReviewsApi};
use domain::{Page, Review, ReviewId, ReviewParams};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::cell::StateCell;

pub const FETCH_FAILED_MESSAGE: &str = "Could not load reviews.";

#[derive(Debug, Clone, PartialEq)]
pub struct ReviewsState {
    pub loading: bool,
    pub reviews: Page<Review>,
    pub error: Option<String>,
    pub product_code: Option<String>,
    pub params: ReviewParams,
}

impl Default for ReviewsState {
    fn default() -> Self {
        Self {
            loading: true,
            reviews: Page::default(),
            error: None,
            product_code: None,
            params: ReviewParams::default(),
        }
    }
}

/// One page of reviews for a product.
///
/// Every `fetch` takes a new generation number; a response is only applied
/// if no later fetch was issued in the meantime, so the most recently issued
/// request is the one that ends up in the state.
pub struct ReviewStore {
    api: Arc<dyn ReviewsApi>,
    state: StateCell<ReviewsState>,
    generation: AtomicU64,
}

impl ReviewStore {
    pub fn new(api: Arc<dyn ReviewsApi>) -> Self {
        Self {
            api,
            state: StateCell::default(),
            generation: AtomicU64::new(0),
        }
    }

    pub fn state(&self) -> &StateCell<ReviewsState> {
        &self.state
    }

    pub fn snapshot(&self) -> ReviewsState {
        self.state.snapshot()
    }

    pub fn find(&self, review_id: &ReviewId) -> Option<Review> {
        self.state.read(|s| {
            s.reviews
                .data
                .iter()
                .find(|r| &r.review_id == review_id)
                .cloned()
        })
    }

    pub fn total_elements(&self) -> u64 {
        self.state.read(|s| s.reviews.pagination.total_elements)
    }

    /// Mutates one review in place. Returns false (and notifies no one) if
    /// the review is not on the current page.
    pub fn update_review(&self, review_id: &ReviewId, f: impl FnOnce(&mut Review)) -> bool {
        self.state.update_if(|s| {
            match s.reviews.data.iter_mut().find(|r| &r.review_id == review_id) {
                Some(review) => {
                    f(review);
                    true
                }
                None => false,
            }
        })
    }

    pub async fn fetch(&self, product_code: &str, params: ReviewParams) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.update(|s| {
            s.loading = true;
            s.product_code = Some(product_code.to_string());
            s.params = params;
        });

        let result = self.api.list_reviews(product_code, &params).await;

        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(
                "Discarding stale review page for {} (generation {})",
                product_code, generation
            );
            return;
        }

        match result {
            Ok(page) => {
                info!(
                    "Loaded {} review(s) for {} (page {})",
                    page.data.len(),
                    product_code,
                    page.pagination.page
                );
                self.state.update(|s| {
                    s.loading = false;
                    s.reviews = page;
                    s.error = None;
                });
            }
            Err(e) => {
                warn!("Failed to load reviews for {}: {}", product_code, e);
                let message = failure_message(&e);
                self.state.update(|s| {
                    s.loading = false;
                    s.reviews = Page::default();
                    s.error = Some(message);
                });
            }
        }
    }

    /// Refetches with the last product code and params. Returns false if
    /// nothing was ever fetched.
    pub async fn refresh(&self) -> bool {
        let current = self.state.read(|s| s.product_code.clone().map(|c| (c, s.params)));
        match current {
            Some((product_code, params)) => {
                self.fetch(&product_code, params).await;
                true
            }
            None => false,
        }
    }

    /// Resolves once no fetch is in flight. A store that was never fetched
    /// resolves immediately.
    pub async fn settled(&self) -> ReviewsState {
        let mut rx = self.state.subscribe();
        let settled = match rx
            .wait_for(|s| !s.loading || s.product_code.is_none())
            .await
        {
            Ok(state) => state.clone(),
            Err(_) => self.snapshot(),
        };
        settled
    }
}

fn failure_message(e: &ApiError) -> String {
    match e {
        ApiError::Status { message, .. } if !message.trim().is_empty() => message.clone(),
        ApiError::Status { .. } => FETCH_FAILED_MESSAGE.to_string(),
        other => other.to_string(),
    }
}
