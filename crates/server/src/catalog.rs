use chrono::{Duration, NaiveDateTime, Utc};
use domain::{
    Comment, CommentId, CreateComment, CreateCommentResponse, CreateReview, CreateReviewResponse,
    Direction, Page, Pagination, Reaction, Reactions, Review, ReviewId, ReviewParams, SortField,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::AppError;

/// Caller identity taken from the bearer token (`id` or `id:Display Name`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub id: String,
    pub name: String,
}

impl Author {
    pub fn from_token(token: &str) -> Option<Self> {
        let token = token.trim();
        if token.is_empty() {
            return None;
        }
        let (id, name) = token.split_once(':').unwrap_or((token, token));
        Some(Self {
            id: id.to_string(),
            name: name.to_string(),
        })
    }
}

#[derive(Default)]
struct Votes {
    likers: HashSet<String>,
    dislikers: HashSet<String>,
}

impl Votes {
    fn toggle(&mut self, user_id: &str, reaction: Reaction) {
        let (mine, other) = match reaction {
            Reaction::Like => (&mut self.likers, &mut self.dislikers),
            Reaction::Dislike => (&mut self.dislikers, &mut self.likers),
        };
        if !mine.remove(user_id) {
            mine.insert(user_id.to_string());
            other.remove(user_id);
        }
    }

    fn view(&self, viewer: Option<&str>) -> Reactions {
        Reactions {
            likes: self.likers.len() as u32,
            dislikes: self.dislikers.len() as u32,
            liked_by_me: viewer.is_some_and(|v| self.likers.contains(v)),
            disliked_by_me: viewer.is_some_and(|v| self.dislikers.contains(v)),
        }
    }
}

struct StoredReview {
    id: ReviewId,
    product_code: String,
    author: Author,
    content: String,
    rating: u8,
    created_at: NaiveDateTime,
    votes: Votes,
}

struct StoredComment {
    id: CommentId,
    author: Author,
    content: String,
    parent: Option<CommentId>,
    mentioned_user_id: Option<String>,
    mentioned_user_name: Option<String>,
    created_at: NaiveDateTime,
    votes: Votes,
}

#[derive(Default)]
struct Inner {
    reviews: Vec<StoredReview>,
    comments: HashMap<ReviewId, Vec<StoredComment>>,
}

impl Inner {
    fn review_mut(&mut self, id: &ReviewId) -> Result<&mut StoredReview, AppError> {
        self.reviews
            .iter_mut()
            .find(|r| &r.id == id)
            .ok_or_else(|| AppError::NotFound(format!("review {}", id)))
    }

    fn comment_mut(
        &mut self,
        review_id: &ReviewId,
        comment_id: &CommentId,
    ) -> Result<&mut StoredComment, AppError> {
        self.comments
            .get_mut(review_id)
            .and_then(|list| list.iter_mut().find(|c| &c.id == comment_id))
            .ok_or_else(|| AppError::NotFound(format!("comment {}", comment_id)))
    }

    fn render_review(&self, r: &StoredReview, viewer: Option<&str>) -> Review {
        Review {
            review_id: r.id.clone(),
            product_id: r.product_code.clone(),
            customer_id: r.author.id.clone(),
            customer_name: r.author.name.clone(),
            content: r.content.clone(),
            rating: r.rating,
            reactions: r.votes.view(viewer),
            total_comments: self.comments.get(&r.id).map_or(0, |c| c.len() as u32),
            created_at: r.created_at,
        }
    }
}

fn render_comment(list: &[StoredComment], c: &StoredComment, viewer: Option<&str>) -> Comment {
    Comment {
        comment_id: c.id.clone(),
        review_id: None,
        customer_id: c.author.id.clone(),
        customer_name: c.author.name.clone(),
        content: c.content.clone(),
        parent_comment_id: c.parent.clone(),
        mentioned_user_id: c.mentioned_user_id.clone(),
        mentioned_user_name: c.mentioned_user_name.clone(),
        reactions: c.votes.view(viewer),
        total_replies: list
            .iter()
            .filter(|other| other.parent.as_ref() == Some(&c.id))
            .count() as u32,
        created_at: c.created_at,
    }
}

/// Largest review page served, whatever the client asks for.
pub const MAX_PAGE_SIZE: u32 = 100;

fn new_id() -> String {
    format!("{:x}", rand::random::<u64>())
}

/// In-memory reviews backend.
#[derive(Clone, Default)]
pub struct Catalog {
    inner: Arc<Mutex<Inner>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn list_reviews(
        &self,
        product_code: &str,
        params: &ReviewParams,
        viewer: Option<&str>,
    ) -> Page<Review> {
        let inner = self.lock();
        let mut matching: Vec<&StoredReview> = inner
            .reviews
            .iter()
            .filter(|r| r.product_code == product_code)
            .collect();

        match params.sort_field.unwrap_or_default() {
            SortField::CreatedAt => matching.sort_by_key(|r| r.created_at),
            SortField::Rating => matching.sort_by_key(|r| (r.rating, r.created_at)),
        }
        if params.direction.unwrap_or_default() == Direction::Desc {
            matching.reverse();
        }

        let size = params
            .size
            .unwrap_or(ReviewParams::DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        let page = params.page.unwrap_or(0);
        let total_elements = matching.len() as u64;
        let total_pages = matching.len().div_ceil(size as usize) as u32;
        let data = matching
            .into_iter()
            .skip((page as usize).saturating_mul(size as usize))
            .take(size as usize)
            .map(|r| inner.render_review(r, viewer))
            .collect();

        Page {
            data,
            pagination: Pagination {
                page,
                size,
                total_elements,
                total_pages,
            },
        }
    }

    pub fn react_to_review(
        &self,
        review_id: &ReviewId,
        user: &Author,
        reaction: Reaction,
    ) -> Result<(), AppError> {
        let mut inner = self.lock();
        inner.review_mut(review_id)?.votes.toggle(&user.id, reaction);
        Ok(())
    }

    pub fn react_to_comment(
        &self,
        review_id: &ReviewId,
        comment_id: &CommentId,
        user: &Author,
        reaction: Reaction,
    ) -> Result<(), AppError> {
        let mut inner = self.lock();
        inner
            .comment_mut(review_id, comment_id)?
            .votes
            .toggle(&user.id, reaction);
        Ok(())
    }

    pub fn list_comments(
        &self,
        review_id: &ReviewId,
        skip: u32,
        limit: u32,
        viewer: Option<&str>,
    ) -> Result<Vec<Comment>, AppError> {
        let inner = self.lock();
        if !inner.reviews.iter().any(|r| &r.id == review_id) {
            return Err(AppError::NotFound(format!("review {}", review_id)));
        }
        let list = inner
            .comments
            .get(review_id)
            .map(Vec::as_slice)
            .unwrap_or_default();
        Ok(list
            .iter()
            .skip(skip as usize)
            .take(limit as usize)
            .map(|c| render_comment(list, c, viewer))
            .collect())
    }

    pub fn create_review(
        &self,
        user: &Author,
        request: CreateReview,
    ) -> Result<CreateReviewResponse, AppError> {
        let request = CreateReview::new(
            request.product_code,
            request.content.as_deref(),
            request.rating,
        )
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

        let review = StoredReview {
            id: ReviewId::new(new_id()),
            product_code: request.product_code,
            author: user.clone(),
            content: request.content.clone().unwrap_or_default(),
            rating: request.rating,
            created_at: Utc::now().naive_utc(),
            votes: Votes::default(),
        };
        let response = CreateReviewResponse {
            review_id: review.id.clone(),
            product_id: None,
            customer_id: user.id.clone(),
            customer_name: user.name.clone(),
            content: request.content,
            rating: review.rating,
        };
        self.lock().reviews.push(review);
        Ok(response)
    }

    pub fn create_comment(
        &self,
        review_id: &ReviewId,
        user: &Author,
        request: CreateComment,
    ) -> Result<CreateCommentResponse, AppError> {
        let content = request.content.trim().to_string();
        if content.is_empty() {
            return Err(AppError::BadRequest("Content cannot be empty".into()));
        }

        let mut inner = self.lock();
        inner.review_mut(review_id)?;
        if let Some(parent) = &request.parent_comment_id {
            inner.comment_mut(review_id, parent)?;
        }

        let comment = StoredComment {
            id: CommentId::new(new_id()),
            author: user.clone(),
            content: content.clone(),
            parent: request.parent_comment_id,
            mentioned_user_id: request.mentioned_user_id,
            mentioned_user_name: request.mentioned_user_name,
            created_at: Utc::now().naive_utc(),
            votes: Votes::default(),
        };
        let response = CreateCommentResponse {
            comment_id: comment.id.clone(),
            content,
        };
        inner
            .comments
            .entry(review_id.clone())
            .or_default()
            .push(comment);
        Ok(response)
    }

    pub fn delete_review(&self, review_id: &ReviewId, user: &Author) -> Result<(), AppError> {
        let mut inner = self.lock();
        if inner.review_mut(review_id)?.author.id != user.id {
            return Err(AppError::Forbidden);
        }
        inner.reviews.retain(|r| &r.id != review_id);
        inner.comments.remove(review_id);
        Ok(())
    }

    /// Removes a comment together with its replies.
    pub fn delete_comment(
        &self,
        review_id: &ReviewId,
        comment_id: &CommentId,
        user: &Author,
    ) -> Result<(), AppError> {
        let mut inner = self.lock();
        if inner.comment_mut(review_id, comment_id)?.author.id != user.id {
            return Err(AppError::Forbidden);
        }
        if let Some(list) = inner.comments.get_mut(review_id) {
            list.retain(|c| &c.id != comment_id && c.parent.as_ref() != Some(comment_id));
        }
        Ok(())
    }

    /// A small product catalogue for local runs.
    pub fn seed_demo(&self) {
        let now = Utc::now().naive_utc();
        let ana = Author {
            id: "u-ana".into(),
            name: "Ana Souza".into(),
        };
        let bo = Author {
            id: "u-bo".into(),
            name: "Bo Lindqvist".into(),
        };

        let mut inner = self.lock();
        for (i, (author, rating, text)) in [
            (&ana, 5, "Fits perfectly, great fabric."),
            (&bo, 3, "Decent, runs a bit small."),
            (&ana, 4, "Second pair, still happy."),
        ]
        .into_iter()
        .enumerate()
        {
            inner.reviews.push(StoredReview {
                id: ReviewId::new(format!("demo-r{}", i + 1)),
                product_code: "DEMO-1".into(),
                author: author.clone(),
                content: text.into(),
                rating,
                created_at: now - Duration::hours(i as i64 + 1),
                votes: Votes::default(),
            });
        }

        let thread: Vec<StoredComment> = (0..7)
            .map(|i| {
                let author = if i % 2 == 0 { &bo } else { &ana };
                StoredComment {
                    id: CommentId::new(format!("demo-c{}", i + 1)),
                    author: author.clone(),
                    content: format!("Comment number {} @AnaSouza", i + 1),
                    parent: None,
                    mentioned_user_id: None,
                    mentioned_user_name: None,
                    created_at: now - Duration::minutes(60 - i),
                    votes: Votes::default(),
                }
            })
            .collect();
        inner.comments.insert(ReviewId::new("demo-r1"), thread);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn author(id: &str) -> Author {
        Author::from_token(id).unwrap()
    }

    fn seeded() -> (Catalog, ReviewId) {
        let catalog = Catalog::new();
        let created = catalog
            .create_review(
                &author("u1:Ana"),
                CreateReview::new("P-1", Some("good"), 4).unwrap(),
            )
            .unwrap();
        (catalog, created.review_id)
    }

    #[test]
    fn token_parsing() {
        assert_eq!(
            Author::from_token("u1:Ana Souza"),
            Some(Author {
                id: "u1".into(),
                name: "Ana Souza".into()
            })
        );
        assert_eq!(Author::from_token("u2").unwrap().name, "u2");
        assert_eq!(Author::from_token("  "), None);
    }

    #[test]
    fn reactions_are_per_user_toggles() {
        let (catalog, id) = seeded();
        let bo = author("u2");
        catalog.react_to_review(&id, &bo, Reaction::Dislike).unwrap();
        catalog.react_to_review(&id, &bo, Reaction::Like).unwrap();

        let page = catalog.list_reviews("P-1", &ReviewParams::default(), Some("u2"));
        let r = &page.data[0].reactions;
        assert_eq!((r.likes, r.dislikes, r.liked_by_me, r.disliked_by_me), (1, 0, true, false));

        let anonymous = catalog.list_reviews("P-1", &ReviewParams::default(), None);
        assert!(!anonymous.data[0].reactions.liked_by_me);
    }

    #[test]
    fn pages_and_sorts() {
        let catalog = Catalog::new();
        for rating in [2, 5, 3, 1, 4, 5] {
            catalog
                .create_review(&author("u1"), CreateReview::new("P-1", None, rating).unwrap())
                .unwrap();
        }
        let params = ReviewParams::default().sorted(SortField::Rating, Direction::Desc);
        let first = catalog.list_reviews("P-1", &params, None);
        assert_eq!(first.pagination.total_elements, 6);
        assert_eq!(first.pagination.total_pages, 2);
        assert_eq!(
            first.data.iter().map(|r| r.rating).collect::<Vec<_>>(),
            vec![5, 5, 4, 3, 2]
        );
        let second = catalog.list_reviews("P-1", &params.at_page(1), None);
        assert_eq!(second.data.len(), 1);
        assert_eq!(second.data[0].rating, 1);
    }

    #[test]
    fn huge_page_requests_are_clamped() {
        let (catalog, _) = seeded();
        let params = ReviewParams {
            page: Some(u32::MAX),
            size: Some(u32::MAX),
            ..ReviewParams::default()
        };
        let page = catalog.list_reviews("P-1", &params, None);
        assert!(page.data.is_empty());
        assert_eq!(page.pagination.size, MAX_PAGE_SIZE);
        assert_eq!(page.pagination.total_pages, 1);

        let first = catalog.list_reviews("P-1", &params.at_page(0), None);
        assert_eq!(first.data.len(), 1);
    }

    #[test]
    fn deleting_a_comment_drops_replies_and_updates_total() {
        let (catalog, id) = seeded();
        let bo = author("u2:Bo");
        let parent = catalog
            .create_comment(&id, &bo, CreateComment::top_level("first").unwrap())
            .unwrap();
        let comments = catalog.list_comments(&id, 0, 10, None).unwrap();
        let reply = CreateComment::reply_to("answer", &comments[0]).unwrap();
        catalog.create_comment(&id, &author("u1"), reply).unwrap();

        let listed = catalog.list_comments(&id, 0, 10, None).unwrap();
        assert_eq!(listed[0].total_replies, 1);
        assert_eq!(listed[1].mentioned_user_name.as_deref(), Some("Bo"));

        assert_eq!(
            catalog.delete_comment(&id, &parent.comment_id, &author("u1")),
            Err(AppError::Forbidden)
        );
        catalog.delete_comment(&id, &parent.comment_id, &bo).unwrap();
        let page = catalog.list_reviews("P-1", &ReviewParams::default(), None);
        assert_eq!(page.data[0].total_comments, 0);
    }
}
