use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::domain::user::{UpdateDescriptionRequest, User};
use crate::presentation::AppState;
use crate::presentation::app_error::AppResult;
use crate::presentation::cookies::{ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE};
use crate::presentation::handlers::posts::PostCardDto;
use crate::presentation::middleware::auth::{AuthenticatedUser, OptionalViewer};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct UpdateUserDto {
    #[validate(length(max = 500))]
    pub(crate) description: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct UserDto {
    pub(crate) id: Uuid,
    pub(crate) username: Option<String>,
    pub(crate) email: String,
    pub(crate) avatar_url: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            avatar_url: user.avatar_url,
            description: user.description,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    tag = "users",
    params(
        ("id" = Uuid, Path, description = "User id")
    ),
    responses(
        (status = 200, description = "User found", body = UserDto),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn get_user_by_id(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<(StatusCode, Json<UserDto>)> {
    let user = state.user_service.get_user_by_id(id).await?;

    Ok((StatusCode::OK, Json(UserDto::from(user))))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/u/{username}",
    tag = "users",
    params(
        ("username" = String, Path, description = "Username")
    ),
    responses(
        (status = 200, description = "User found", body = UserDto),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn get_user_by_username(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<(StatusCode, Json<UserDto>)> {
    let user = state.user_service.get_user_by_username(&username).await?;

    Ok((StatusCode::OK, Json(UserDto::from(user))))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/u/{username}/posts",
    tag = "users",
    params(
        ("username" = String, Path, description = "Username")
    ),
    responses(
        (status = 200, description = "Posts written by the user", body = [PostCardDto]),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn get_user_posts(
    State(state): State<AppState>,
    OptionalViewer(viewer): OptionalViewer,
    Path(username): Path<String>,
) -> AppResult<(StatusCode, Json<Vec<PostCardDto>>)> {
    let posts = state
        .user_service
        .posts_by_username(&username, viewer)
        .await?;

    Ok((
        StatusCode::OK,
        Json(posts.into_iter().map(PostCardDto::from).collect()),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/u/{username}/liked-posts",
    tag = "users",
    params(
        ("username" = String, Path, description = "Username")
    ),
    responses(
        (status = 200, description = "Posts liked by the user", body = [PostCardDto]),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn get_liked_posts(
    State(state): State<AppState>,
    OptionalViewer(viewer): OptionalViewer,
    Path(username): Path<String>,
) -> AppResult<(StatusCode, Json<Vec<PostCardDto>>)> {
    let posts = state
        .user_service
        .liked_posts_by_username(&username, viewer)
        .await?;

    Ok((
        StatusCode::OK,
        Json(posts.into_iter().map(PostCardDto::from).collect()),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    tag = "users",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Current user", body = UserDto),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn get_current_user(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> AppResult<(StatusCode, Json<UserDto>)> {
    let user = state.user_service.current_user(user.principal).await?;

    Ok((StatusCode::OK, Json(UserDto::from(user))))
}

#[utoipa::path(
    patch,
    path = "/api/v1/users/{id}",
    tag = "users",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = Uuid, Path, description = "User id")
    ),
    request_body = UpdateUserDto,
    responses(
        (status = 200, description = "User updated", body = UserDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the same user"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn update_user(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(dto): Json<UpdateUserDto>,
) -> AppResult<(StatusCode, Json<UserDto>)> {
    dto.validate()?;

    let req = UpdateDescriptionRequest {
        description: dto.description,
    };
    let updated = state
        .user_service
        .update_description(user.principal, id, req)
        .await?;

    Ok((StatusCode::OK, Json(UserDto::from(updated))))
}

#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    tag = "users",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = Uuid, Path, description = "User id")
    ),
    responses(
        (status = 204, description = "Account deleted, credential cookies cleared"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the same user"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn delete_user(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<(StatusCode, HeaderMap)> {
    state.user_service.delete_user(user.principal, id).await?;

    let mut headers = HeaderMap::new();
    for name in [ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE] {
        if let Some(cookie) = state.cookies.expire(name) {
            headers.append(SET_COOKIE, cookie);
        }
    }
    Ok((StatusCode::NO_CONTENT, headers))
}
