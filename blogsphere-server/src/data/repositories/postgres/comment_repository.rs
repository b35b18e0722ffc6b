use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::data::comment_repository::{CommentRepository, NewComment};
use crate::domain::comment::Comment;
use crate::domain::error::DomainError;

#[derive(Debug, Clone)]
pub(crate) struct PostgresCommentRepository {
    pool: PgPool,
}

impl PostgresCommentRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: Uuid,
    post_id: Uuid,
    user_id: Uuid,
    parent_comment_id: Option<Uuid>,
    body: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Comment {
            id: row.id,
            post_id: row.post_id,
            user_id: row.user_id,
            parent_comment_id: row.parent_comment_id,
            body: row.body,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn create_comment(&self, input: NewComment) -> Result<Comment, DomainError> {
        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            INSERT INTO comments (post_id, user_id, parent_comment_id, body)
            VALUES ($1, $2, $3, $4)
            RETURNING id, post_id, user_id, parent_comment_id, body, created_at, updated_at
            "#,
        )
        .bind(input.post_id)
        .bind(input.user_id)
        .bind(input.parent_comment_id)
        .bind(input.body)
        .fetch_one(&self.pool)
        .await
        .map_err(map_comment_db_error)?;

        Ok(Comment::from(row))
    }

    async fn get_comment(&self, id: Uuid) -> Result<Option<Comment>, DomainError> {
        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT id, post_id, user_id, parent_comment_id, body, created_at, updated_at
            FROM comments
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_comment_db_error)?;

        Ok(row.map(Comment::from))
    }

    async fn update_comment(&self, id: Uuid, body: &str) -> Result<Option<Comment>, DomainError> {
        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            UPDATE comments
            SET body = $2,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, post_id, user_id, parent_comment_id, body, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(body)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_comment_db_error)?;

        Ok(row.map(Comment::from))
    }

    async fn delete_comment(&self, id: Uuid) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            DELETE FROM comments
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_comment_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_by_post_slug(&self, slug: &str) -> Result<Vec<Comment>, DomainError> {
        let rows = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT c.id, c.post_id, c.user_id, c.parent_comment_id, c.body,
                   c.created_at, c.updated_at
            FROM comments c
            JOIN posts p ON p.id = c.post_id
            WHERE p.slug = $1
            ORDER BY c.created_at ASC, c.id ASC
            "#,
        )
        .bind(slug)
        .fetch_all(&self.pool)
        .await
        .map_err(map_comment_db_error)?;

        Ok(rows.into_iter().map(Comment::from).collect())
    }
}

fn map_comment_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.code().as_deref() == Some("23503")
    {
        let resource = match db_err.constraint() {
            Some("comments_parent_comment_id_fkey") => "parent comment",
            Some("comments_user_id_fkey") => "user",
            _ => "post",
        };
        return DomainError::NotFound(resource.to_string());
    }
    DomainError::Unexpected(err.to_string())
}
