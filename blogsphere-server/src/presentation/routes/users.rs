use axum::Router;
use axum::middleware;
use axum::routing::{get, patch};

use crate::presentation::AppState;
use crate::presentation::handlers::users::{
    delete_user, get_current_user, get_liked_posts, get_user_by_id, get_user_by_username,
    get_user_posts, update_user,
};
use crate::presentation::middleware::auth::jwt_auth_middleware;

pub(crate) fn router(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/u/{username}", get(get_user_by_username))
        .route("/u/{username}/posts", get(get_user_posts))
        .route("/u/{username}/liked-posts", get(get_liked_posts))
        .route("/{id}", get(get_user_by_id));

    let protected = Router::new()
        .route("/me", get(get_current_user))
        .route("/{id}", patch(update_user).delete(delete_user))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_middleware,
        ));

    public.merge(protected)
}
