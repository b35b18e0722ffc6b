use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::application::blog_service::FeedPage;
use crate::data::post_repository::Pagination;
use crate::domain::feed::{AuthorProfile, CategoryTag, PostCard};
use crate::domain::post::{CreatePostRequest, PostFilter, UpdatePostRequest};
use crate::presentation::AppState;
use crate::presentation::app_error::AppResult;
use crate::presentation::handlers::comments::CommentDto;
use crate::presentation::middleware::auth::{AuthenticatedUser, OptionalViewer};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct CreatePostDto {
    #[validate(length(min = 1, max = 255))]
    pub(crate) title: String,
    #[validate(length(min = 1))]
    pub(crate) body: String,
    #[serde(default)]
    pub(crate) category_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct UpdatePostDto {
    #[validate(length(min = 1, max = 255))]
    pub(crate) title: String,
    #[validate(length(min = 1))]
    pub(crate) body: String,
}

/// Out-of-range `page`/`limit` values fall back to the defaults.
#[derive(Debug, Deserialize, IntoParams)]
pub(crate) struct ListPostsQuery {
    pub(crate) page: Option<u32>,
    pub(crate) limit: Option<u32>,
    pub(crate) search: Option<String>,
    pub(crate) category: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct AuthorDto {
    pub(crate) id: Uuid,
    pub(crate) google_id: String,
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) avatar_url: String,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CategoryTagDto {
    pub(crate) id: Uuid,
    pub(crate) name: String,
    pub(crate) slug: String,
    pub(crate) created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostCardDto {
    pub(crate) id: Uuid,
    pub(crate) author_id: Uuid,
    pub(crate) title: String,
    pub(crate) slug: String,
    pub(crate) body: String,
    pub(crate) is_published: bool,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
    pub(crate) author: AuthorDto,
    pub(crate) categories: Vec<CategoryTagDto>,
    pub(crate) like_count: i64,
    pub(crate) comment_count: i64,
    pub(crate) user_has_liked: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct FeedPageDto {
    pub(crate) posts: Vec<PostCardDto>,
    pub(crate) page: u32,
    pub(crate) limit: u32,
    #[serde(rename = "hasMore")]
    pub(crate) has_more: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct LikeToggleDto {
    pub(crate) liked: bool,
}

impl From<AuthorProfile> for AuthorDto {
    fn from(author: AuthorProfile) -> Self {
        Self {
            id: author.id,
            google_id: author.google_id,
            username: author.username,
            email: author.email,
            avatar_url: author.avatar_url,
            created_at: author.created_at,
            updated_at: author.updated_at,
        }
    }
}

impl From<CategoryTag> for CategoryTagDto {
    fn from(tag: CategoryTag) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
            slug: tag.slug,
            created_at: tag.created_at,
        }
    }
}

impl From<PostCard> for PostCardDto {
    fn from(card: PostCard) -> Self {
        Self {
            id: card.id,
            author_id: card.author_id,
            title: card.title,
            slug: card.slug,
            body: card.body,
            is_published: card.is_published,
            created_at: card.created_at,
            updated_at: card.updated_at,
            author: card.author.into(),
            categories: card.categories.into_iter().map(CategoryTagDto::from).collect(),
            like_count: card.like_count,
            comment_count: card.comment_count,
            user_has_liked: card.user_has_liked,
        }
    }
}

impl From<FeedPage> for FeedPageDto {
    fn from(page: FeedPage) -> Self {
        Self {
            posts: page.posts.into_iter().map(PostCardDto::from).collect(),
            page: page.page,
            limit: page.limit,
            has_more: page.has_more,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/posts",
    tag = "posts",
    params(ListPostsQuery),
    responses(
        (status = 200, description = "Posts listed, newest first", body = FeedPageDto),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_posts(
    State(state): State<AppState>,
    OptionalViewer(viewer): OptionalViewer,
    Query(query): Query<ListPostsQuery>,
) -> AppResult<(StatusCode, Json<FeedPageDto>)> {
    let filter = PostFilter::new(query.search, query.category);
    let pagination = Pagination::new(query.page, query.limit);

    let page = state
        .blog_service
        .list_posts(filter, pagination, viewer)
        .await?;

    Ok((StatusCode::OK, Json(FeedPageDto::from(page))))
}

#[utoipa::path(
    get,
    path = "/api/v1/posts/{slug}",
    tag = "posts",
    params(
        ("slug" = String, Path, description = "Post slug")
    ),
    responses(
        (status = 200, description = "Post found", body = PostCardDto),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn get_post(
    State(state): State<AppState>,
    OptionalViewer(viewer): OptionalViewer,
    Path(slug): Path<String>,
) -> AppResult<(StatusCode, Json<PostCardDto>)> {
    let card = state.blog_service.get_post(&slug, viewer).await?;

    Ok((StatusCode::OK, Json(PostCardDto::from(card))))
}

#[utoipa::path(
    get,
    path = "/api/v1/posts/{slug}/comments",
    tag = "posts",
    params(
        ("slug" = String, Path, description = "Post slug")
    ),
    responses(
        (status = 200, description = "Comments, oldest first", body = [CommentDto]),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_post_comments(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<(StatusCode, Json<Vec<CommentDto>>)> {
    let comments = state.comment_service.comments_for_post(&slug).await?;

    Ok((
        StatusCode::OK,
        Json(comments.into_iter().map(CommentDto::from).collect()),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/posts",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    request_body = CreatePostDto,
    responses(
        (status = 201, description = "Post created", body = PostCardDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Unknown category"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn create_post(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(dto): Json<CreatePostDto>,
) -> AppResult<(StatusCode, Json<PostCardDto>)> {
    dto.validate()?;

    let req = CreatePostRequest {
        title: dto.title,
        body: dto.body,
        category_ids: dto.category_ids,
    };
    let card = state.blog_service.create_post(user.principal, req).await?;

    Ok((StatusCode::CREATED, Json(PostCardDto::from(card))))
}

#[utoipa::path(
    put,
    path = "/api/v1/posts/{id}",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = Uuid, Path, description = "Post id")
    ),
    request_body = UpdatePostDto,
    responses(
        (status = 200, description = "Post updated", body = PostCardDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn update_post(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(dto): Json<UpdatePostDto>,
) -> AppResult<(StatusCode, Json<PostCardDto>)> {
    dto.validate()?;

    let req = UpdatePostRequest {
        title: dto.title,
        body: dto.body,
    };
    let card = state
        .blog_service
        .update_post(user.principal, id, req)
        .await?;

    Ok((StatusCode::OK, Json(PostCardDto::from(card))))
}

#[utoipa::path(
    delete,
    path = "/api/v1/posts/{id}",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = Uuid, Path, description = "Post id")
    ),
    responses(
        (status = 204, description = "Post deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn delete_post(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.blog_service.delete_post(user.principal, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/v1/posts/{id}/likes",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = Uuid, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Like toggled", body = LikeToggleDto),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn toggle_like(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<(StatusCode, Json<LikeToggleDto>)> {
    let state_after = state.blog_service.toggle_like(id, user.principal).await?;

    Ok((
        StatusCode::OK,
        Json(LikeToggleDto {
            liked: state_after.is_liked(),
        }),
    ))
}
