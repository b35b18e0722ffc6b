use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::post_repository::{PostRow, map_post_db_error};
use crate::data::post_repository::NewPost;
use crate::data::transaction::{UnitOfWork, WriteTransaction};
use crate::domain::error::DomainError;
use crate::domain::post::Post;

#[derive(Debug, Clone)]
pub(crate) struct PostgresUnitOfWork {
    pool: PgPool,
}

impl PostgresUnitOfWork {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Holds one pooled connection until commit or rollback. Dropping it without
/// either rolls back.
pub(crate) struct PostgresWriteTransaction {
    tx: Option<Transaction<'static, Postgres>>,
}

impl PostgresWriteTransaction {
    fn active(&mut self) -> Result<&mut Transaction<'static, Postgres>, DomainError> {
        self.tx
            .as_mut()
            .ok_or_else(|| DomainError::Unexpected("transaction already finished".to_string()))
    }

    fn finish(&mut self) -> Result<Transaction<'static, Postgres>, DomainError> {
        self.tx
            .take()
            .ok_or_else(|| DomainError::Unexpected("transaction already finished".to_string()))
    }
}

#[async_trait]
impl UnitOfWork for PostgresUnitOfWork {
    type Tx = PostgresWriteTransaction;

    async fn begin(&self) -> Result<Self::Tx, DomainError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|err| DomainError::Unexpected(format!("begin transaction: {err}")))?;
        Ok(PostgresWriteTransaction { tx: Some(tx) })
    }
}

#[async_trait]
impl WriteTransaction for PostgresWriteTransaction {
    async fn insert_post(&mut self, input: NewPost) -> Result<Post, DomainError> {
        let tx = self.active()?;
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            INSERT INTO posts (title, slug, body, author_id, is_published)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, author_id, title, slug, body, is_published, created_at, updated_at
            "#,
        )
        .bind(input.title)
        .bind(input.slug)
        .bind(input.body)
        .bind(input.author_id)
        .bind(input.is_published)
        .fetch_one(&mut **tx)
        .await
        .map_err(map_post_db_error)?;

        Ok(Post::from(row))
    }

    async fn link_categories(
        &mut self,
        post_id: Uuid,
        category_ids: &[Uuid],
    ) -> Result<(), DomainError> {
        if category_ids.is_empty() {
            return Ok(());
        }
        let post_ids = vec![post_id; category_ids.len()];

        let tx = self.active()?;
        sqlx::query(
            r#"
            INSERT INTO post_categories (post_id, category_id)
            SELECT * FROM UNNEST($1::uuid[], $2::uuid[])
            "#,
        )
        .bind(post_ids)
        .bind(category_ids)
        .execute(&mut **tx)
        .await
        .map_err(map_post_db_error)?;

        Ok(())
    }

    async fn commit(&mut self) -> Result<(), DomainError> {
        self.finish()?
            .commit()
            .await
            .map_err(|err| DomainError::Unexpected(format!("commit transaction: {err}")))
    }

    async fn rollback(&mut self) -> Result<(), DomainError> {
        self.finish()?
            .rollback()
            .await
            .map_err(|err| DomainError::Unexpected(format!("rollback transaction: {err}")))
    }
}
