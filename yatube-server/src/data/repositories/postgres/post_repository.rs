use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::data::post_repository::{NewPost, Pagination, PostFilter, PostPatch, PostRepository};
use crate::domain::error::DomainError;
use crate::domain::post::{AuthorRef, GroupRef, Post};

#[derive(Debug, Clone)]
pub(crate) struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// A post row joined with its author and (optional) group.
#[derive(FromRow)]
struct PostRow {
    id: i64,
    text: String,
    pub_date: DateTime<Utc>,
    image: Option<String>,
    author_id: i64,
    author_username: String,
    group_id: Option<i64>,
    group_title: Option<String>,
    group_slug: Option<String>,
}

const POST_COLUMNS: &str = r#"
    p.id,
    p.text,
    p.pub_date,
    p.image,
    p.author_id,
    u.username AS author_username,
    g.id AS group_id,
    g.title AS group_title,
    g.slug AS group_slug
"#;

// $1 group, $2 author, $3 follower; a NULL parameter disables its predicate.
const FILTER_CLAUSE: &str = r#"
    WHERE ($1::BIGINT IS NULL OR p.group_id = $1)
      AND ($2::BIGINT IS NULL OR p.author_id = $2)
      AND ($3::BIGINT IS NULL OR EXISTS (
            SELECT 1 FROM follows f
            WHERE f.user_id = $3 AND f.author_id = p.author_id
          ))
"#;

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let sql = format!(
            r#"
            WITH p AS (
                INSERT INTO posts (text, author_id, group_id, image)
                VALUES ($1, $2, $3, $4)
                RETURNING *
            )
            SELECT {POST_COLUMNS}
            FROM p
            JOIN users u ON u.id = p.author_id
            LEFT JOIN groups g ON g.id = p.group_id
            "#
        );
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(&input.text)
            .bind(input.author_id)
            .bind(input.group_id)
            .bind(&input.image)
            .fetch_one(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        map_row_to_post(row)
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        let sql = format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts p
            JOIN users u ON u.id = p.author_id
            LEFT JOIN groups g ON g.id = p.group_id
            WHERE p.id = $1
            "#
        );
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        row.map(map_row_to_post).transpose()
    }

    async fn update_post_owned(
        &self,
        post_id: i64,
        owner_id: i64,
        patch: PostPatch,
    ) -> Result<Option<Post>, DomainError> {
        let sql = format!(
            r#"
            WITH p AS (
                UPDATE posts
                SET text = $3,
                    group_id = $4,
                    image = COALESCE($5, image)
                WHERE id = $1 AND author_id = $2
                RETURNING *
            )
            SELECT {POST_COLUMNS}
            FROM p
            JOIN users u ON u.id = p.author_id
            LEFT JOIN groups g ON g.id = p.group_id
            "#
        );
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(post_id)
            .bind(owner_id)
            .bind(&patch.text)
            .bind(patch.group_id)
            .bind(&patch.image)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        row.map(map_row_to_post).transpose()
    }

    async fn list_posts(
        &self,
        filter: PostFilter,
        pagination: Pagination,
    ) -> Result<Vec<Post>, DomainError> {
        let sql = format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts p
            JOIN users u ON u.id = p.author_id
            LEFT JOIN groups g ON g.id = p.group_id
            {FILTER_CLAUSE}
            ORDER BY p.pub_date DESC, p.id DESC
            LIMIT $4
            OFFSET $5
            "#
        );
        let rows = sqlx::query_as::<_, PostRow>(&sql)
            .bind(filter.group_id())
            .bind(filter.author_id())
            .bind(filter.follower_id())
            .bind(pagination.limit)
            .bind(pagination.offset)
            .fetch_all(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        rows.into_iter().map(map_row_to_post).collect()
    }

    async fn count_posts(&self, filter: PostFilter) -> Result<i64, DomainError> {
        let sql = format!(
            r#"
            SELECT COUNT(*)
            FROM posts p
            {FILTER_CLAUSE}
            "#
        );
        let count = sqlx::query_scalar::<_, i64>(&sql)
            .bind(filter.group_id())
            .bind(filter.author_id())
            .bind(filter.follower_id())
            .fetch_one(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        Ok(count)
    }
}

fn map_row_to_post(row: PostRow) -> Result<Post, DomainError> {
    let author = AuthorRef {
        id: row.author_id,
        username: row.author_username,
    };
    let group = match (row.group_id, row.group_title, row.group_slug) {
        (Some(id), Some(title), Some(slug)) => Some(GroupRef { id, title, slug }),
        _ => None,
    };

    Post::new(row.id, row.text, row.pub_date, author, group, row.image)
        .map_err(|err| DomainError::Unexpected(err.to_string()))
}

fn map_post_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.code().as_deref() == Some("23503")
    {
        let resource = match db_err.constraint() {
            Some("posts_group_id_fkey") => "group",
            _ => "author",
        };
        return DomainError::NotFound(resource.to_string());
    }
    DomainError::Unexpected(err.to_string())
}
