use async_trait::async_trait;
use uuid::Uuid;

use crate::data::post_repository::NewPost;
use crate::domain::error::DomainError;
use crate::domain::post::Post;

/// Statements that run on one exclusively held connection. Nothing written
/// through it is visible to other callers until `commit` succeeds.
#[async_trait]
pub(crate) trait WriteTransaction: Send {
    async fn insert_post(&mut self, input: NewPost) -> Result<Post, DomainError>;
    /// One multi-row insert over parallel post-id/category-id arrays.
    async fn link_categories(
        &mut self,
        post_id: Uuid,
        category_ids: &[Uuid],
    ) -> Result<(), DomainError>;
    async fn commit(&mut self) -> Result<(), DomainError>;
    async fn rollback(&mut self) -> Result<(), DomainError>;
}

#[async_trait]
pub(crate) trait UnitOfWork: Send + Sync {
    type Tx: WriteTransaction;

    async fn begin(&self) -> Result<Self::Tx, DomainError>;
}
