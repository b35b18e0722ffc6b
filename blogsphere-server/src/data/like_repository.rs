use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::error::DomainError;

#[async_trait]
pub(crate) trait LikeRepository: Send + Sync {
    async fn has_like(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, DomainError>;
    /// Fails with `AlreadyExists` when the (post, user) pair is already present
    /// and with `NotFound` when the post does not exist.
    async fn insert_like(&self, post_id: Uuid, user_id: Uuid) -> Result<(), DomainError>;
    async fn delete_like(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, DomainError>;
}
