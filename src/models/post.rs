use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CommentId, PostId, UserId};
use crate::string_enum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostKind {
    Text,
    Photo,
}

string_enum!(PostKind, "post kind", {
    Text => "text",
    Photo => "photo",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub author_id: UserId,
    pub kind: PostKind,
    pub content: String,
    pub image_url: Option<String>,
    #[serde(skip)]
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub author_id: UserId,
    pub kind: PostKind,
    pub content: String,
    pub image_url: Option<String>,
}

/// Partial update; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostChanges {
    pub content: Option<String>,
    pub image_url: Option<Option<String>>,
}

/// Post as shown in feeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostView {
    #[serde(flatten)]
    pub post: Post,
    pub author_name: String,
    pub like_count: i64,
    pub comment_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,
    pub author_id: UserId,
    pub content: String,
    #[serde(skip)]
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentView {
    #[serde(flatten)]
    pub comment: Comment,
    pub author_name: String,
    pub like_count: i64,
}

/// One page of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
}

impl PageRequest {
    pub const DEFAULT_PER_PAGE: u32 = 10;
    pub const MAX_PER_PAGE: u32 = 100;

    /// Clamp raw query values into a valid page request.
    pub fn new(page: Option<u32>, per_page: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page
                .unwrap_or(Self::DEFAULT_PER_PAGE)
                .clamp(1, Self::MAX_PER_PAGE),
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.per_page)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
    pub total_pages: u64,
}

impl Pagination {
    pub fn new(request: PageRequest, total: u64) -> Self {
        Self {
            page: request.page,
            per_page: request.per_page,
            total,
            total_pages: total.div_ceil(u64::from(request.per_page)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}
