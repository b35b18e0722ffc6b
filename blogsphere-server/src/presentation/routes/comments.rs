use axum::Router;
use axum::middleware;
use axum::routing::{patch, post};

use crate::presentation::AppState;
use crate::presentation::handlers::comments::{create_comment, delete_comment, update_comment};
use crate::presentation::middleware::auth::jwt_auth_middleware;

pub(crate) fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", post(create_comment))
        .route("/{id}", patch(update_comment).delete(delete_comment))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_middleware,
        ))
}
