use axum::{
    Json,
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::{IntoParams, ToSchema};

use crate::presentation::AppState;
use crate::presentation::app_error::{AppError, AppResult};
use crate::presentation::cookies::{
    ACCESS_TOKEN_COOKIE, OAUTH_STATE_COOKIE, OAUTH_STATE_TTL_SECONDS, REFRESH_TOKEN_COOKIE,
    read_cookie,
};

#[derive(Debug, Deserialize, IntoParams)]
pub(crate) struct OAuthCallbackQuery {
    pub(crate) state: Option<String>,
    pub(crate) code: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct RefreshDto {
    pub(crate) refresh_token: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct RefreshResponseDto {
    pub(crate) access_token: String,
    pub(crate) expires_in: i64,
}

fn set_cookie(headers: &mut HeaderMap, cookie: Option<axum::http::HeaderValue>) -> AppResult<()> {
    let cookie = cookie.ok_or_else(|| AppError::Internal(anyhow::anyhow!("invalid cookie value")))?;
    headers.append(SET_COOKIE, cookie);
    Ok(())
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/google",
    tag = "auth",
    responses(
        (status = 307, description = "Redirect to the Google consent screen"),
        (status = 502, description = "Identity provider misconfigured")
    )
)]
pub(crate) async fn google_login(State(state): State<AppState>) -> AppResult<Response> {
    let start = state.auth_service.begin_login()?;

    let mut headers = HeaderMap::new();
    set_cookie(
        &mut headers,
        state
            .cookies
            .build(OAUTH_STATE_COOKIE, &start.state, OAUTH_STATE_TTL_SECONDS),
    )?;

    Ok((headers, Redirect::temporary(&start.redirect_url)).into_response())
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/google/callback",
    tag = "auth",
    params(OAuthCallbackQuery),
    responses(
        (status = 307, description = "Signed in, credential cookies set"),
        (status = 400, description = "Missing authorization code"),
        (status = 401, description = "State mismatch"),
        (status = 502, description = "Identity provider error")
    )
)]
pub(crate) async fn google_callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<OAuthCallbackQuery>,
) -> AppResult<Response> {
    let expected_state = read_cookie(&headers, OAUTH_STATE_COOKIE);

    let outcome = state
        .auth_service
        .complete_login(
            expected_state.as_deref(),
            query.state.as_deref(),
            query.code.as_deref(),
        )
        .await?;

    let mut out = HeaderMap::new();
    set_cookie(
        &mut out,
        state.cookies.build(
            ACCESS_TOKEN_COOKIE,
            &outcome.tokens.access_token,
            outcome.tokens.access_ttl_seconds,
        ),
    )?;
    set_cookie(
        &mut out,
        state.cookies.build(
            REFRESH_TOKEN_COOKIE,
            &outcome.tokens.refresh_token,
            outcome.tokens.refresh_ttl_seconds,
        ),
    )?;
    set_cookie(&mut out, state.cookies.expire(OAUTH_STATE_COOKIE))?;

    Ok((out, Redirect::temporary(&state.oauth_success_redirect)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/refresh",
    tag = "auth",
    request_body(content = RefreshDto, description = "Takes precedence over the refresh_token cookie; optional when the cookie is sent"),
    responses(
        (status = 200, description = "New access token", body = RefreshResponseDto),
        (status = 401, description = "Missing or invalid refresh token"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<(StatusCode, HeaderMap, Json<RefreshResponseDto>)> {
    let token = refresh_token_from_request(&headers, &body)?;

    let refreshed = state.auth_service.refresh(&token).await?;

    let mut out = HeaderMap::new();
    set_cookie(
        &mut out,
        state.cookies.build(
            ACCESS_TOKEN_COOKIE,
            &refreshed.access_token,
            refreshed.expires_in,
        ),
    )?;

    Ok((
        StatusCode::OK,
        out,
        Json(RefreshResponseDto {
            access_token: refreshed.access_token,
            expires_in: refreshed.expires_in,
        }),
    ))
}

/// A token in the body wins over the cookie, so a client can replace a stale
/// cookie explicitly.
fn refresh_token_from_request(headers: &HeaderMap, body: &[u8]) -> AppResult<String> {
    refresh_token_from_body(body)
        .or_else(|| read_cookie(headers, REFRESH_TOKEN_COOKIE))
        .ok_or(AppError::Unauthorized)
}

/// An empty or unparsable body carries no token.
fn refresh_token_from_body(body: &[u8]) -> Option<String> {
    if body.is_empty() {
        return None;
    }
    serde_json::from_slice::<RefreshDto>(body)
        .ok()
        .and_then(|dto| dto.refresh_token)
        .filter(|token| !token.trim().is_empty())
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    tag = "auth",
    responses(
        (status = 204, description = "Credential cookies cleared")
    )
)]
pub(crate) async fn logout(State(state): State<AppState>) -> (StatusCode, HeaderMap) {
    let mut out = HeaderMap::new();
    for name in [ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE] {
        match state.cookies.expire(name) {
            Some(cookie) => {
                out.append(SET_COOKIE, cookie);
            }
            None => warn!(cookie = name, "failed to build expiring cookie"),
        }
    }
    (StatusCode::NO_CONTENT, out)
}
