use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::data::post_repository::{Pagination, PostPatch, PostRepository};
use crate::domain::error::DomainError;
use crate::domain::post::{Post, PostFilter};

#[derive(Debug, Clone)]
pub(crate) struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
pub(super) struct PostRow {
    id: Uuid,
    author_id: Uuid,
    title: String,
    slug: String,
    body: String,
    is_published: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Post {
            id: row.id,
            author_id: row.author_id,
            title: row.title,
            slug: row.slug,
            body: row.body,
            is_published: row.is_published,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn list_posts(
        &self,
        filter: &PostFilter,
        pagination: Pagination,
    ) -> Result<Vec<Post>, DomainError> {
        let rows = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT p.id, p.author_id, p.title, p.slug, p.body, p.is_published,
                   p.created_at, p.updated_at
            FROM posts p
            WHERE p.is_published
              AND ($1::text IS NULL OR p.title ILIKE '%' || $1 || '%' OR p.body ILIKE '%' || $1 || '%')
              AND ($2::text IS NULL OR EXISTS (
                    SELECT 1
                    FROM post_categories pc
                    JOIN categories c ON c.id = pc.category_id
                    WHERE pc.post_id = p.id AND c.slug = $2
              ))
            ORDER BY p.created_at DESC, p.id DESC
            LIMIT $3
            OFFSET $4
            "#,
        )
        .bind(filter.search.as_deref())
        .bind(filter.category_slug.as_deref())
        .bind(i64::from(pagination.limit))
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        Ok(rows.into_iter().map(Post::from).collect())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Post>, DomainError> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, author_id, title, slug, body, is_published, created_at, updated_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        Ok(row.map(Post::from))
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Post>, DomainError> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, author_id, title, slug, body, is_published, created_at, updated_at
            FROM posts
            WHERE slug = $1
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        Ok(row.map(Post::from))
    }

    async fn list_by_author_username(&self, username: &str) -> Result<Vec<Post>, DomainError> {
        let rows = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT p.id, p.author_id, p.title, p.slug, p.body, p.is_published,
                   p.created_at, p.updated_at
            FROM posts p
            JOIN users u ON u.id = p.author_id
            WHERE u.username = $1
            ORDER BY p.created_at DESC, p.id DESC
            "#,
        )
        .bind(username)
        .fetch_all(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        Ok(rows.into_iter().map(Post::from).collect())
    }

    async fn list_liked_by_username(&self, username: &str) -> Result<Vec<Post>, DomainError> {
        let rows = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT p.id, p.author_id, p.title, p.slug, p.body, p.is_published,
                   p.created_at, p.updated_at
            FROM posts p
            JOIN post_likes pl ON pl.post_id = p.id
            JOIN users u ON u.id = pl.user_id
            WHERE u.username = $1
            ORDER BY pl.created_at DESC, p.id DESC
            "#,
        )
        .bind(username)
        .fetch_all(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        Ok(rows.into_iter().map(Post::from).collect())
    }

    async fn update_post_owned(
        &self,
        post_id: Uuid,
        owner_id: Uuid,
        patch: PostPatch,
    ) -> Result<Option<Post>, DomainError> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            UPDATE posts
            SET title = $3,
                body = $4,
                updated_at = NOW()
            WHERE id = $1 AND author_id = $2
            RETURNING id, author_id, title, slug, body, is_published, created_at, updated_at
            "#,
        )
        .bind(post_id)
        .bind(owner_id)
        .bind(patch.title)
        .bind(patch.body)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        Ok(row.map(Post::from))
    }

    async fn delete_post(&self, id: Uuid) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            DELETE FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        Ok(result.rows_affected() > 0)
    }
}

pub(super) fn map_post_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.code().as_deref() {
            Some("23503") => {
                let resource = match db_err.constraint() {
                    Some("post_categories_category_id_fkey") => "category",
                    _ => "author",
                };
                return DomainError::NotFound(resource.to_string());
            }
            Some("23505") => return DomainError::AlreadyExists("post slug".to_string()),
            _ => {}
        }
    }
    DomainError::Unexpected(err.to_string())
}
