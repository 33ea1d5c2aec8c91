use async_trait::async_trait;

use crate::domain::error::DomainError;
use crate::domain::group::Group;

#[async_trait]
pub(crate) trait GroupRepository: Send + Sync {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, DomainError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Group>, DomainError>;
    /// All groups ordered by title, for the post form's group selector.
    async fn list_groups(&self) -> Result<Vec<Group>, DomainError>;
}
