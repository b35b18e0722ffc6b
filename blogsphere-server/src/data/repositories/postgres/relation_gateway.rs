use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::user_repository::UserRow;
use crate::data::relation_gateway::{PostCategoryRow, PostCount, RelationGateway};
use crate::domain::category::Category;
use crate::domain::error::DomainError;
use crate::domain::user::User;

/// Each call checks its own connection out of the shared pool, so the engine
/// can run several of them at once.
#[derive(Debug, Clone)]
pub(crate) struct PostgresRelationGateway {
    pool: PgPool,
}

impl PostgresRelationGateway {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CategoryLinkRow {
    post_id: Uuid,
    id: Uuid,
    name: String,
    slug: String,
    description: Option<String>,
    icon: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct CountRow {
    post_id: Uuid,
    count: i64,
}

#[async_trait]
impl RelationGateway for PostgresRelationGateway {
    async fn users_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, DomainError> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, google_id, username, email, avatar_url, description,
                   created_at, updated_at
            FROM users
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|err| DomainError::Unexpected(format!("get users by ids: {err}")))?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn categories_by_post_ids(
        &self,
        post_ids: &[Uuid],
    ) -> Result<Vec<PostCategoryRow>, DomainError> {
        let rows = sqlx::query_as::<_, CategoryLinkRow>(
            r#"
            SELECT pc.post_id, c.id, c.name, c.slug, c.description, c.icon, c.created_at
            FROM post_categories pc
            JOIN categories c ON c.id = pc.category_id
            WHERE pc.post_id = ANY($1)
            ORDER BY c.name
            "#,
        )
        .bind(post_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|err| DomainError::Unexpected(format!("get categories by post ids: {err}")))?;

        Ok(rows
            .into_iter()
            .map(|row| PostCategoryRow {
                post_id: row.post_id,
                category: Category {
                    id: row.id,
                    name: row.name,
                    slug: row.slug,
                    description: row.description,
                    icon: row.icon,
                    created_at: row.created_at,
                },
            })
            .collect())
    }

    async fn like_counts_by_post_ids(
        &self,
        post_ids: &[Uuid],
    ) -> Result<Vec<PostCount>, DomainError> {
        let rows = sqlx::query_as::<_, CountRow>(
            r#"
            SELECT post_id, COUNT(*) AS count
            FROM post_likes
            WHERE post_id = ANY($1)
            GROUP BY post_id
            "#,
        )
        .bind(post_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|err| DomainError::Unexpected(format!("get like counts by post ids: {err}")))?;

        Ok(rows.into_iter().map(into_post_count).collect())
    }

    async fn comment_counts_by_post_ids(
        &self,
        post_ids: &[Uuid],
    ) -> Result<Vec<PostCount>, DomainError> {
        let rows = sqlx::query_as::<_, CountRow>(
            r#"
            SELECT post_id, COUNT(*) AS count
            FROM comments
            WHERE post_id = ANY($1)
            GROUP BY post_id
            "#,
        )
        .bind(post_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|err| {
            DomainError::Unexpected(format!("get comment counts by post ids: {err}"))
        })?;

        Ok(rows.into_iter().map(into_post_count).collect())
    }

    async fn liked_post_ids(
        &self,
        user_id: Uuid,
        post_ids: &[Uuid],
    ) -> Result<Vec<Uuid>, DomainError> {
        sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT post_id
            FROM post_likes
            WHERE user_id = $1 AND post_id = ANY($2)
            "#,
        )
        .bind(user_id)
        .bind(post_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|err| DomainError::Unexpected(format!("get liked post ids: {err}")))
    }
}

fn into_post_count(row: CountRow) -> PostCount {
    PostCount {
        post_id: row.post_id,
        count: row.count,
    }
}
