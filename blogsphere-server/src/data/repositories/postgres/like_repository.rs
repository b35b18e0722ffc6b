use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::data::like_repository::LikeRepository;
use crate::domain::error::DomainError;

#[derive(Debug, Clone)]
pub(crate) struct PostgresLikeRepository {
    pool: PgPool,
}

impl PostgresLikeRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LikeRepository for PostgresLikeRepository {
    async fn has_like(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, DomainError> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM post_likes WHERE post_id = $1 AND user_id = $2
            )
            "#,
        )
        .bind(post_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| DomainError::Unexpected(format!("check existing like: {err}")))
    }

    async fn insert_like(&self, post_id: Uuid, user_id: Uuid) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO post_likes (post_id, user_id)
            VALUES ($1, $2)
            "#,
        )
        .bind(post_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(map_like_db_error)?;

        Ok(())
    }

    async fn delete_like(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            DELETE FROM post_likes
            WHERE post_id = $1 AND user_id = $2
            "#,
        )
        .bind(post_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|err| DomainError::Unexpected(format!("unlike post: {err}")))?;

        Ok(result.rows_affected() > 0)
    }
}

fn map_like_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.code().as_deref() {
            Some("23505") => return DomainError::AlreadyExists("like".to_string()),
            Some("23503") => return DomainError::NotFound("post".to_string()),
            _ => {}
        }
    }
    DomainError::Unexpected(format!("like post: {err}"))
}
