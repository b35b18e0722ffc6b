use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::domain::principal::Principal;
use crate::presentation::AppState;
use crate::presentation::app_error::AppError;
use crate::presentation::cookies::{ACCESS_TOKEN_COOKIE, read_cookie};

#[derive(Debug, Clone, Copy)]
pub(crate) struct AuthenticatedUser {
    pub(crate) principal: Principal,
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .copied()
            .ok_or(AppError::Unauthorized)
    }
}

/// Viewer on public routes; `None` for anonymous callers and for any credential
/// that fails to verify.
#[derive(Debug, Clone, Copy)]
pub(crate) struct OptionalViewer(pub(crate) Option<Principal>);

impl FromRequestParts<AppState> for OptionalViewer {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = access_token(&parts.headers).ok().flatten();
        let viewer = state.auth_service.resolve_viewer(token.as_deref()).await;
        Ok(OptionalViewer(viewer))
    }
}

pub(crate) async fn jwt_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = access_token(request.headers())?.ok_or(AppError::Unauthorized)?;

    let principal = state
        .auth_service
        .authenticate(&token)
        .await
        .map_err(|_| AppError::Unauthorized)?;

    request
        .extensions_mut()
        .insert(AuthenticatedUser { principal });

    Ok(next.run(request).await)
}

/// Bearer header first, then the `access_token` cookie. A present but malformed
/// Authorization header is an error rather than a fallback.
fn access_token(headers: &HeaderMap) -> Result<Option<String>, AppError> {
    let Some(auth_header) = headers.get(header::AUTHORIZATION) else {
        return Ok(read_cookie(headers, ACCESS_TOKEN_COOKIE));
    };
    let auth_header = auth_header.to_str().map_err(|_| AppError::Unauthorized)?;

    let mut parts = auth_header.split_whitespace();
    let scheme = parts.next().ok_or(AppError::Unauthorized)?;
    let token = parts.next().ok_or(AppError::Unauthorized)?;
    if parts.next().is_some() {
        return Err(AppError::Unauthorized);
    }
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AppError::Unauthorized);
    }

    Ok(Some(token.to_string()))
}
