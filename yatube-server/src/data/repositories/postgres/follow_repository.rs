use async_trait::async_trait;
use sqlx::PgPool;

use crate::data::follow_repository::FollowRepository;
use crate::domain::error::DomainError;

#[derive(Debug, Clone)]
pub(crate) struct PostgresFollowRepository {
    pool: PgPool,
}

impl PostgresFollowRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FollowRepository for PostgresFollowRepository {
    async fn follow(&self, user_id: i64, author_id: i64) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO follows (user_id, author_id)
            VALUES ($1, $2)
            ON CONFLICT ON CONSTRAINT follows_user_author_key DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(author_id)
        .execute(&self.pool)
        .await
        .map_err(map_follow_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn unfollow(&self, user_id: i64, author_id: i64) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            DELETE FROM follows
            WHERE user_id = $1 AND author_id = $2
            "#,
        )
        .bind(user_id)
        .bind(author_id)
        .execute(&self.pool)
        .await
        .map_err(map_follow_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn is_following(&self, user_id: i64, author_id: i64) -> Result<bool, DomainError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM follows
                WHERE user_id = $1 AND author_id = $2
            )
            "#,
        )
        .bind(user_id)
        .bind(author_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_follow_db_error)?;

        Ok(exists)
    }
}

fn map_follow_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.code().as_deref() {
            Some("23503") => return DomainError::NotFound("user".to_string()),
            Some("23514") => {
                return DomainError::Validation {
                    field: "author",
                    message: "users cannot follow themselves",
                };
            }
            _ => {}
        }
    }
    DomainError::Unexpected(err.to_string())
}
