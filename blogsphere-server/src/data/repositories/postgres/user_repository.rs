use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::data::user_repository::UserRepository;
use crate::domain::error::DomainError;
use crate::domain::user::{NewUser, User};

#[derive(Debug, Clone)]
pub(crate) struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
pub(super) struct UserRow {
    id: Uuid,
    google_id: String,
    username: Option<String>,
    email: String,
    avatar_url: Option<String>,
    description: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            google_id: row.google_id,
            username: row.username,
            email: row.email,
            avatar_url: row.avatar_url,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create_user(&self, input: NewUser) -> Result<User, DomainError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (google_id, username, email, avatar_url)
            VALUES ($1, $2, $3, $4)
            RETURNING id, google_id, username, email, avatar_url, description,
                      created_at, updated_at
            "#,
        )
        .bind(input.google_id)
        .bind(input.username)
        .bind(input.email)
        .bind(input.avatar_url)
        .fetch_one(&self.pool)
        .await
        .map_err(map_user_db_error)?;

        Ok(User::from(row))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, google_id, username, email, avatar_url, description,
                   created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_user_db_error)?;

        Ok(row.map(User::from))
    }

    async fn find_by_google_id(&self, google_id: &str) -> Result<Option<User>, DomainError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, google_id, username, email, avatar_url, description,
                   created_at, updated_at
            FROM users
            WHERE google_id = $1
            "#,
        )
        .bind(google_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_user_db_error)?;

        Ok(row.map(User::from))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, google_id, username, email, avatar_url, description,
                   created_at, updated_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_user_db_error)?;

        Ok(row.map(User::from))
    }

    async fn update_description(
        &self,
        id: Uuid,
        description: Option<String>,
    ) -> Result<Option<User>, DomainError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET description = $2,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, google_id, username, email, avatar_url, description,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(description)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_user_db_error)?;

        Ok(row.map(User::from))
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            DELETE FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_user_db_error)?;

        Ok(result.rows_affected() > 0)
    }
}

fn map_user_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.code().as_deref() == Some("23505")
    {
        let resource = match db_err.constraint() {
            Some("users_username_key") => "username",
            Some("users_google_id_key") => "google account",
            _ => "user",
        };
        return DomainError::AlreadyExists(resource.to_string());
    }
    DomainError::Unexpected(err.to_string())
}
