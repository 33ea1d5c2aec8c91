use async_trait::async_trait;

use crate::domain::error::DomainError;

#[async_trait]
pub(crate) trait FollowRepository: Send + Sync {
    /// Inserts the `(user, author)` edge unless it already exists.
    /// Returns `true` when a new edge was created.
    async fn follow(&self, user_id: i64, author_id: i64) -> Result<bool, DomainError>;
    /// Returns `true` when an edge was removed.
    async fn unfollow(&self, user_id: i64, author_id: i64) -> Result<bool, DomainError>;
    async fn is_following(&self, user_id: i64, author_id: i64) -> Result<bool, DomainError>;
}
