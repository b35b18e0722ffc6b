use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::comment::Comment;
use crate::domain::error::DomainError;

#[derive(Debug, Clone)]
pub(crate) struct NewComment {
    pub(crate) post_id: Uuid,
    pub(crate) user_id: Uuid,
    pub(crate) parent_comment_id: Option<Uuid>,
    pub(crate) body: String,
}

#[async_trait]
pub(crate) trait CommentRepository: Send + Sync {
    async fn create_comment(&self, input: NewComment) -> Result<Comment, DomainError>;
    async fn get_comment(&self, id: Uuid) -> Result<Option<Comment>, DomainError>;
    async fn update_comment(&self, id: Uuid, body: &str) -> Result<Option<Comment>, DomainError>;
    async fn delete_comment(&self, id: Uuid) -> Result<bool, DomainError>;
    async fn list_by_post_slug(&self, slug: &str) -> Result<Vec<Comment>, DomainError>;
}
