use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::post::{Post, PostFilter};

#[derive(Debug, Clone)]
pub(crate) struct NewPost {
    pub(crate) title: String,
    pub(crate) slug: String,
    pub(crate) body: String,
    pub(crate) author_id: Uuid,
    pub(crate) is_published: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct PostPatch {
    pub(crate) title: String,
    pub(crate) body: String,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Pagination {
    pub(crate) page: u32,
    pub(crate) limit: u32,
}

impl Pagination {
    pub(crate) const DEFAULT_LIMIT: u32 = 20;
    pub(crate) const MAX_LIMIT: u32 = 100;

    /// Out-of-range values fall back to page 1 and the default limit.
    pub(crate) fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        let page = page.filter(|p| *p >= 1).unwrap_or(1);
        let limit = limit
            .filter(|l| (1..=Self::MAX_LIMIT).contains(l))
            .unwrap_or(Self::DEFAULT_LIMIT);
        Self { page, limit }
    }

    pub(crate) fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.limit)
    }
}

#[async_trait]
pub(crate) trait PostRepository: Send + Sync {
    async fn list_posts(
        &self,
        filter: &PostFilter,
        pagination: Pagination,
    ) -> Result<Vec<Post>, DomainError>;
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Post>, DomainError>;
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Post>, DomainError>;
    async fn list_by_author_username(&self, username: &str) -> Result<Vec<Post>, DomainError>;
    async fn list_liked_by_username(&self, username: &str) -> Result<Vec<Post>, DomainError>;
    async fn update_post_owned(
        &self,
        post_id: Uuid,
        owner_id: Uuid,
        patch: PostPatch,
    ) -> Result<Option<Post>, DomainError>;
    async fn delete_post(&self, id: Uuid) -> Result<bool, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::Pagination;

    #[test]
    fn pagination_clamps_out_of_range_values() {
        let p = Pagination::new(Some(0), Some(500));
        assert_eq!(p.page, 1);
        assert_eq!(p.limit, Pagination::DEFAULT_LIMIT);

        let p = Pagination::new(Some(3), Some(10));
        assert_eq!(p.offset(), 20);
    }
}
