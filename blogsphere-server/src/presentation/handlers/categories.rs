use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::category::Category;
use crate::presentation::AppState;
use crate::presentation::app_error::AppResult;

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CategoryDto {
    pub(crate) id: Uuid,
    pub(crate) name: String,
    pub(crate) slug: String,
    pub(crate) description: Option<String>,
    pub(crate) icon: Option<String>,
    pub(crate) created_at: DateTime<Utc>,
}

impl From<Category> for CategoryDto {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
            slug: category.slug,
            description: category.description,
            icon: category.icon,
            created_at: category.created_at,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/categories",
    tag = "categories",
    responses(
        (status = 200, description = "All categories by name", body = [CategoryDto]),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_categories(
    State(state): State<AppState>,
) -> AppResult<(StatusCode, Json<Vec<CategoryDto>>)> {
    let categories = state.category_service.list_categories().await?;

    Ok((
        StatusCode::OK,
        Json(categories.into_iter().map(CategoryDto::from).collect()),
    ))
}
