use async_trait::async_trait;

use crate::domain::error::DomainError;
use crate::domain::pagination::PageWindow;
use crate::domain::post::Post;

#[derive(Debug, Clone)]
pub(crate) struct NewPost {
    pub(crate) text: String,
    pub(crate) author_id: i64,
    pub(crate) group_id: Option<i64>,
    pub(crate) image: Option<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct PostPatch {
    pub(crate) text: String,
    pub(crate) group_id: Option<i64>,
    /// `None` keeps the current image.
    pub(crate) image: Option<String>,
}

/// Which posts a listing shows. Every variant is ordered newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PostFilter {
    All,
    Group(i64),
    Author(i64),
    /// Posts whose author is followed by the given user.
    FollowedBy(i64),
}

impl PostFilter {
    pub(crate) fn group_id(&self) -> Option<i64> {
        match self {
            PostFilter::Group(id) => Some(*id),
            _ => None,
        }
    }

    pub(crate) fn author_id(&self) -> Option<i64> {
        match self {
            PostFilter::Author(id) => Some(*id),
            _ => None,
        }
    }

    pub(crate) fn follower_id(&self) -> Option<i64> {
        match self {
            PostFilter::FollowedBy(id) => Some(*id),
            _ => None,
        }
    }
}

/// Row window of one listing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Pagination {
    pub(crate) limit: i64,
    pub(crate) offset: i64,
}

impl From<PageWindow> for Pagination {
    fn from(window: PageWindow) -> Self {
        Self {
            limit: i64::from(window.per_page),
            offset: window.offset(),
        }
    }
}

#[async_trait]
pub(crate) trait PostRepository: Send + Sync {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError>;
    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError>;
    async fn update_post_owned(
        &self,
        post_id: i64,
        owner_id: i64,
        patch: PostPatch,
    ) -> Result<Option<Post>, DomainError>;
    async fn list_posts(
        &self,
        filter: PostFilter,
        pagination: Pagination,
    ) -> Result<Vec<Post>, DomainError>;
    async fn count_posts(&self, filter: PostFilter) -> Result<i64, DomainError>;
}
