use async_trait::async_trait;

use crate::domain::category::Category;
use crate::domain::error::DomainError;

#[async_trait]
pub(crate) trait CategoryRepository: Send + Sync {
    async fn list_categories(&self) -> Result<Vec<Category>, DomainError>;
}
