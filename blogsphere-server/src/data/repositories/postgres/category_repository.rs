use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::data::category_repository::CategoryRepository;
use crate::domain::category::Category;
use crate::domain::error::DomainError;

#[derive(Debug, Clone)]
pub(crate) struct PostgresCategoryRepository {
    pool: PgPool,
}

impl PostgresCategoryRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: Uuid,
    name: String,
    slug: String,
    description: Option<String>,
    icon: Option<String>,
    created_at: DateTime<Utc>,
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn list_categories(&self) -> Result<Vec<Category>, DomainError> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            r#"
            SELECT id, name, slug, description, icon, created_at
            FROM categories
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|err| DomainError::Unexpected(err.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|row| Category {
                id: row.id,
                name: row.name,
                slug: row.slug,
                description: row.description,
                icon: row.icon,
                created_at: row.created_at,
            })
            .collect())
    }
}
