use std::sync::Arc;

use sqlx::PgPool;

use self::comment_repository::CommentRepository;
use self::follow_repository::FollowRepository;
use self::group_repository::GroupRepository;
use self::post_repository::PostRepository;
use self::repositories::postgres::{
    comment_repository::PostgresCommentRepository, follow_repository::PostgresFollowRepository,
    group_repository::PostgresGroupRepository, post_repository::PostgresPostRepository,
    user_repository::PostgresUserRepository,
};
use self::user_repository::UserRepository;

pub(crate) mod comment_repository;
pub(crate) mod follow_repository;
pub(crate) mod group_repository;
pub(crate) mod post_repository;
pub(crate) mod repositories;
pub(crate) mod user_repository;

/// One handle per aggregate, shared by the application services.
#[derive(Clone)]
pub(crate) struct Repositories {
    pub(crate) users: Arc<dyn UserRepository>,
    pub(crate) groups: Arc<dyn GroupRepository>,
    pub(crate) posts: Arc<dyn PostRepository>,
    pub(crate) comments: Arc<dyn CommentRepository>,
    pub(crate) follows: Arc<dyn FollowRepository>,
}

impl Repositories {
    pub(crate) fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PostgresUserRepository::new(pool.clone())),
            groups: Arc::new(PostgresGroupRepository::new(pool.clone())),
            posts: Arc::new(PostgresPostRepository::new(pool.clone())),
            comments: Arc::new(PostgresCommentRepository::new(pool.clone())),
            follows: Arc::new(PostgresFollowRepository::new(pool)),
        }
    }
}
