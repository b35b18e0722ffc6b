use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::user::{NewUser, User};

#[async_trait]
pub(crate) trait UserRepository: Send + Sync {
    async fn create_user(&self, input: NewUser) -> Result<User, DomainError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError>;
    async fn find_by_google_id(&self, google_id: &str) -> Result<Option<User>, DomainError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError>;
    async fn update_description(
        &self,
        id: Uuid,
        description: Option<String>,
    ) -> Result<Option<User>, DomainError>;
    async fn delete_user(&self, id: Uuid) -> Result<bool, DomainError>;
}
