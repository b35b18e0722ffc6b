use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::category::Category;
use crate::domain::error::DomainError;
use crate::domain::user::User;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PostCategoryRow {
    pub(crate) post_id: Uuid,
    pub(crate) category: Category,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PostCount {
    pub(crate) post_id: Uuid,
    pub(crate) count: i64,
}

/// Batch-by-key reads used to enrich primary rows. Results come back in no
/// particular order relative to the key list, and keys without a match are
/// simply absent.
#[async_trait]
pub(crate) trait RelationGateway: Send + Sync {
    async fn users_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, DomainError>;
    async fn categories_by_post_ids(
        &self,
        post_ids: &[Uuid],
    ) -> Result<Vec<PostCategoryRow>, DomainError>;
    async fn like_counts_by_post_ids(&self, post_ids: &[Uuid])
    -> Result<Vec<PostCount>, DomainError>;
    async fn comment_counts_by_post_ids(
        &self,
        post_ids: &[Uuid],
    ) -> Result<Vec<PostCount>, DomainError>;
    async fn liked_post_ids(&self, user_id: Uuid, post_ids: &[Uuid])
    -> Result<Vec<Uuid>, DomainError>;
}
