use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::presentation::handlers::auth::{RefreshDto, RefreshResponseDto};
use crate::presentation::handlers::categories::CategoryDto;
use crate::presentation::handlers::comments::{CommentDto, CreateCommentDto, UpdateCommentDto};
use crate::presentation::handlers::posts::{
    AuthorDto, CategoryTagDto, CreatePostDto, FeedPageDto, LikeToggleDto, PostCardDto,
    UpdatePostDto,
};
use crate::presentation::handlers::users::{UpdateUserDto, UserDto};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::presentation::handlers::auth::google_login,
        crate::presentation::handlers::auth::google_callback,
        crate::presentation::handlers::auth::refresh,
        crate::presentation::handlers::auth::logout,
        crate::presentation::handlers::posts::list_posts,
        crate::presentation::handlers::posts::get_post,
        crate::presentation::handlers::posts::list_post_comments,
        crate::presentation::handlers::posts::create_post,
        crate::presentation::handlers::posts::update_post,
        crate::presentation::handlers::posts::delete_post,
        crate::presentation::handlers::posts::toggle_like,
        crate::presentation::handlers::comments::create_comment,
        crate::presentation::handlers::comments::update_comment,
        crate::presentation::handlers::comments::delete_comment,
        crate::presentation::handlers::users::get_user_by_id,
        crate::presentation::handlers::users::get_user_by_username,
        crate::presentation::handlers::users::get_user_posts,
        crate::presentation::handlers::users::get_liked_posts,
        crate::presentation::handlers::users::get_current_user,
        crate::presentation::handlers::users::update_user,
        crate::presentation::handlers::users::delete_user,
        crate::presentation::handlers::categories::list_categories
    ),
    components(
        schemas(
            RefreshDto,
            RefreshResponseDto,
            CreatePostDto,
            UpdatePostDto,
            AuthorDto,
            CategoryTagDto,
            PostCardDto,
            FeedPageDto,
            LikeToggleDto,
            CreateCommentDto,
            UpdateCommentDto,
            CommentDto,
            UserDto,
            UpdateUserDto,
            CategoryDto
        )
    ),
    tags(
        (name = "auth", description = "Google sign-in and session cookies"),
        (name = "posts", description = "Feed, posts and likes"),
        (name = "comments", description = "Comment endpoints"),
        (name = "users", description = "Profiles and per-user feeds"),
        (name = "categories", description = "Category catalogue")
    ),
    modifiers(&SecurityAddon)
)]
pub(crate) struct ApiDoc;

pub(crate) struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let mut components = openapi.components.take().unwrap_or_default();
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
        openapi.components = Some(components);
    }
}

#[cfg(test)]
mod tests {
    use utoipa::OpenApi;

    use super::ApiDoc;

    #[test]
    fn document_lists_versioned_routes_and_bearer_scheme() {
        let doc = ApiDoc::openapi();

        for path in [
            "/api/v1/posts",
            "/api/v1/posts/{id}/likes",
            "/api/v1/users/me",
            "/api/v1/auth/google/callback",
            "/api/v1/categories",
        ] {
            assert!(doc.paths.paths.contains_key(path), "{path} must be documented");
        }
        let components = doc.components.expect("components must exist");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
