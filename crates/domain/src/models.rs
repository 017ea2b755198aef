use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;
use crate::protocol::reply_mention_name;
use crate::reaction::Reactions;

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

string_id!(ReviewId);
string_id!(CommentId);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub review_id: ReviewId,
    #[serde(default)]
    pub product_id: String,
    pub customer_id: String,
    pub customer_name: String,
    #[serde(default)]
    pub content: String,
    pub rating: u8,
    #[serde(flatten)]
    pub reactions: Reactions,
    #[serde(default)]
    pub total_comments: u32,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub comment_id: CommentId,
    /// Owning review. The comments endpoint omits it; the comment cache fills it in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_id: Option<ReviewId>,
    pub customer_id: String,
    pub customer_name: String,
    pub content: String,
    #[serde(default)]
    pub parent_comment_id: Option<CommentId>,
    #[serde(default)]
    pub mentioned_user_id: Option<String>,
    #[serde(default)]
    pub mentioned_user_name: Option<String>,
    #[serde(flatten)]
    pub reactions: Reactions,
    #[serde(default)]
    pub total_replies: u32,
    pub created_at: NaiveDateTime,
}

impl Comment {
    pub fn is_reply(&self) -> bool {
        self.parent_comment_id.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReview {
    pub product_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub rating: u8,
}

impl CreateReview {
    pub fn new(
        product_code: impl Into<String>,
        content: Option<&str>,
        rating: u8,
    ) -> Result<Self, DomainError> {
        if !(1..=5).contains(&rating) {
            return Err(DomainError::InvalidRating(rating));
        }
        let content = content
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string);
        Ok(Self {
            product_code: product_code.into(),
            content,
            rating,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewResponse {
    pub review_id: ReviewId,
    #[serde(default)]
    pub product_id: Option<i64>,
    pub customer_id: String,
    pub customer_name: String,
    #[serde(default)]
    pub content: Option<String>,
    pub rating: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateComment {
    pub content: String,
    pub parent_comment_id: Option<CommentId>,
    pub mentioned_user_id: Option<String>,
    pub mentioned_user_name: Option<String>,
}

impl CreateComment {
    pub fn top_level(content: &str) -> Result<Self, DomainError> {
        Ok(Self {
            content: non_empty(content)?,
            parent_comment_id: None,
            mentioned_user_id: None,
            mentioned_user_name: None,
        })
    }

    /// A reply to `parent`, mentioning its author.
    pub fn reply_to(content: &str, parent: &Comment) -> Result<Self, DomainError> {
        Ok(Self {
            content: non_empty(content)?,
            parent_comment_id: Some(parent.comment_id.clone()),
            mentioned_user_id: Some(parent.customer_id.clone()),
            mentioned_user_name: Some(reply_mention_name(&parent.customer_name)),
        })
    }
}

fn non_empty(content: &str) -> Result<String, DomainError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(DomainError::EmptyContent);
    }
    Ok(content.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentResponse {
    pub comment_id: CommentId,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub size: u32,
    pub total_elements: u64,
    pub total_pages: u32,
}

/// Paginated envelope shared by every list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            pagination: Pagination::default(),
        }
    }
}

impl<T> Page<T> {
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
