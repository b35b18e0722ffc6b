use axum::Router;
use axum::middleware;
use axum::routing::{get, post, put};

use crate::presentation::AppState;
use crate::presentation::handlers::posts::{
    create_post, delete_post, get_post, list_post_comments, list_posts, toggle_like, update_post,
};
use crate::presentation::middleware::auth::jwt_auth_middleware;

// `{key}` is a slug on reads and an id on writes.
pub(crate) fn router(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/", get(list_posts))
        .route("/{key}", get(get_post))
        .route("/{key}/comments", get(list_post_comments));

    let protected = Router::new()
        .route("/", post(create_post))
        .route("/{key}", put(update_post).delete(delete_post))
        .route("/{key}/likes", post(toggle_like))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_middleware,
        ));

    public.merge(protected)
}
