use axum::{
    Router,
    routing::{get, post},
};

use crate::presentation::AppState;
use crate::presentation::handlers::auth::{google_callback, google_login, logout, refresh};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/google", get(google_login))
        .route("/google/callback", get(google_callback))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
}
