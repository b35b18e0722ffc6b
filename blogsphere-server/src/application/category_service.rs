use crate::data::category_repository::CategoryRepository;
use crate::domain::category::Category;
use crate::domain::error::DomainError;

pub(crate) struct CategoryService<C> {
    repo: C,
}

impl<C: CategoryRepository> CategoryService<C> {
    pub(crate) fn new(repo: C) -> Self {
        Self { repo }
    }

    pub(crate) async fn list_categories(&self) -> Result<Vec<Category>, DomainError> {
        self.repo.list_categories().await
    }
}
