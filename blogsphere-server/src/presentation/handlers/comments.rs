use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::domain::comment::CreateCommentRequest;
use crate::domain::feed::CommentView;
use crate::presentation::AppState;
use crate::presentation::app_error::AppResult;
use crate::presentation::handlers::posts::AuthorDto;
use crate::presentation::middleware::auth::AuthenticatedUser;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct CreateCommentDto {
    pub(crate) post_id: Uuid,
    pub(crate) parent_comment_id: Option<Uuid>,
    #[validate(length(min = 1, max = 5000))]
    pub(crate) body: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct UpdateCommentDto {
    #[validate(length(min = 1, max = 5000))]
    pub(crate) body: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CommentDto {
    pub(crate) id: Uuid,
    pub(crate) post_id: Uuid,
    pub(crate) user_id: Uuid,
    pub(crate) parent_comment_id: Option<Uuid>,
    pub(crate) body: String,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
    pub(crate) author: AuthorDto,
}

impl From<CommentView> for CommentDto {
    fn from(view: CommentView) -> Self {
        Self {
            id: view.id,
            post_id: view.post_id,
            user_id: view.user_id,
            parent_comment_id: view.parent_comment_id,
            body: view.body,
            created_at: view.created_at,
            updated_at: view.updated_at,
            author: view.author.into(),
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/comments",
    tag = "comments",
    security(
        ("bearer_auth" = [])
    ),
    request_body = CreateCommentDto,
    responses(
        (status = 201, description = "Comment created", body = CommentDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn create_comment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(dto): Json<CreateCommentDto>,
) -> AppResult<(StatusCode, Json<CommentDto>)> {
    dto.validate()?;

    let req = CreateCommentRequest {
        post_id: dto.post_id,
        parent_comment_id: dto.parent_comment_id,
        body: dto.body,
    };
    let view = state
        .comment_service
        .create_comment(user.principal, req)
        .await?;

    Ok((StatusCode::CREATED, Json(CommentDto::from(view))))
}

#[utoipa::path(
    patch,
    path = "/api/v1/comments/{id}",
    tag = "comments",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = Uuid, Path, description = "Comment id")
    ),
    request_body = UpdateCommentDto,
    responses(
        (status = 200, description = "Comment updated", body = CommentDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Comment not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn update_comment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(dto): Json<UpdateCommentDto>,
) -> AppResult<(StatusCode, Json<CommentDto>)> {
    dto.validate()?;

    let view = state
        .comment_service
        .update_comment(user.principal, id, &dto.body)
        .await?;

    Ok((StatusCode::OK, Json(CommentDto::from(view))))
}

#[utoipa::path(
    delete,
    path = "/api/v1/comments/{id}",
    tag = "comments",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = Uuid, Path, description = "Comment id")
    ),
    responses(
        (status = 204, description = "Comment deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Comment not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn delete_comment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state
        .comment_service
        .delete_comment(user.principal, id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
