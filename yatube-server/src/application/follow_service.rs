use std::sync::Arc;

use tracing::{debug, info};

use crate::application::blog_service::{find_author, paginate_posts};
use crate::data::Repositories;
use crate::data::follow_repository::FollowRepository;
use crate::data::post_repository::{PostFilter, PostRepository};
use crate::data::user_repository::UserRepository;
use crate::domain::error::DomainError;
use crate::domain::pagination::{Page, Paginator};
use crate::domain::post::Post;
use crate::domain::user::User;

pub(crate) struct FollowService {
    users: Arc<dyn UserRepository>,
    posts: Arc<dyn PostRepository>,
    follows: Arc<dyn FollowRepository>,
    paginator: Paginator,
}

impl FollowService {
    pub(crate) fn new(repos: &Repositories, paginator: Paginator) -> Self {
        Self {
            users: repos.users.clone(),
            posts: repos.posts.clone(),
            follows: repos.follows.clone(),
            paginator,
        }
    }

    /// Subscribes `user_id` to `username`. Following yourself or someone you
    /// already follow changes nothing.
    pub(crate) async fn follow(&self, user_id: i64, username: &str) -> Result<User, DomainError> {
        let author = find_author(self.users.as_ref(), username).await?;
        if author.id == user_id {
            debug!(user_id, "self-follow ignored");
            return Ok(author);
        }

        if self.follows.follow(user_id, author.id).await? {
            info!(user_id, author_id = author.id, "follow created");
        }
        Ok(author)
    }

    pub(crate) async fn unfollow(&self, user_id: i64, username: &str) -> Result<User, DomainError> {
        let author = find_author(self.users.as_ref(), username).await?;
        if self.follows.unfollow(user_id, author.id).await? {
            info!(user_id, author_id = author.id, "follow removed");
        }
        Ok(author)
    }

    pub(crate) async fn is_following(
        &self,
        user_id: i64,
        author_id: i64,
    ) -> Result<bool, DomainError> {
        self.follows.is_following(user_id, author_id).await
    }

    /// Posts by every author `user_id` follows, newest first.
    pub(crate) async fn feed(
        &self,
        user_id: i64,
        page: Option<&str>,
    ) -> Result<Page<Post>, DomainError> {
        paginate_posts(
            self.posts.as_ref(),
            self.paginator,
            PostFilter::FollowedBy(user_id),
            page,
        )
        .await
    }
}
