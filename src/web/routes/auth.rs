//! Sign-in, OAuth callback, sign-out, and the profile endpoint.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::header::{HeaderMap, SET_COOKIE};
use axum::response::{AppendHeaders, IntoResponse, Redirect};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::web::extract::{
    clear_cookie_value, cookie_value, require_session, set_cookie_value,
};
use crate::web::{ApiError, AppContext};

/// Short-lived cookie carrying the OAuth CSRF state between the redirect
/// to Google and the callback.
const STATE_COOKIE: &str = "tracectrl_oauth_state";
const STATE_COOKIE_MAX_AGE_SECS: i64 = 600;

/// `GET /auth/login` — redirect the browser to Google's consent page.
pub async fn login(State(ctx): State<Arc<AppContext>>) -> impl IntoResponse {
    let (url, state) = ctx.oauth.authorization_url();

    let headers = AppendHeaders([(
        SET_COOKIE,
        set_cookie_value(STATE_COOKIE, state.secret(), STATE_COOKIE_MAX_AGE_SECS),
    )]);

    (headers, Redirect::to(url.as_str()))
}

/// Query parameters Google sends to the callback.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

/// `GET /auth/callback` — exchange the code, fetch the profile, set the
/// signed session cookie, and land back on the dashboard.
pub async fn callback(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    Query(query): Query<CallbackQuery>,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(error) = query.error {
        return Err(ApiError::BadRequest(format!("consent denied: {}", error)));
    }

    let code = query
        .code
        .ok_or_else(|| ApiError::BadRequest("missing authorization code".to_string()))?;
    let state = query
        .state
        .ok_or_else(|| ApiError::BadRequest("missing state parameter".to_string()))?;

    let expected = cookie_value(&headers, STATE_COOKIE)
        .ok_or_else(|| ApiError::Unauthorized("missing state cookie".to_string()))?;
    if state != expected {
        return Err(ApiError::Unauthorized("state mismatch".to_string()));
    }

    let tokens = ctx.oauth.exchange_code(code).await?;
    let refresh_token = tokens.refresh_token.ok_or_else(|| {
        ApiError::Upstream("Google did not grant a refresh token".to_string())
    })?;

    let profile = ctx.oauth.fetch_user_profile(&tokens.access_token).await?;
    tracing::info!(email = %profile.email, "user signed in");

    let claims = ctx.cookies.issue(profile, refresh_token);
    let cookie = ctx.cookies.encode(&claims);
    let max_age = claims.expires_at - claims.issued_at;

    let set_headers = AppendHeaders([
        (
            SET_COOKIE,
            set_cookie_value(&ctx.settings.cookie.name, &cookie, max_age),
        ),
        (SET_COOKIE, clear_cookie_value(STATE_COOKIE)),
    ]);

    Ok((set_headers, Redirect::to("/")))
}

/// `POST /auth/logout` — drop the session state and clear the cookie.
pub async fn logout(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    // Best effort: an invalid cookie still gets cleared client-side.
    if let Some(value) = cookie_value(&headers, &ctx.settings.cookie.name) {
        if let Ok(claims) = ctx.cookies.verify(&value) {
            ctx.sessions.remove(&claims.session_id).await;
            tracing::info!(email = %claims.profile.email, "user signed out");
        }
    }

    let clear = AppendHeaders([(
        SET_COOKIE,
        clear_cookie_value(&ctx.settings.cookie.name),
    )]);
    (clear, Json(json!({ "signed_out": true })))
}

/// `GET /api/me` — the signed-in profile and a summary of session state.
pub async fn me(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let (claims, session) = require_session(&ctx, &headers).await?;
    let session = session.read().await;

    Ok(Json(json!({
        "profile": claims.profile,
        "session": {
            "candidates": session.candidates().len(),
            "contacts": session.contacts().len(),
            "selections": session.selections().len(),
            "sends": session.send_log().len(),
            "expires_at": claims.expires_at,
        },
    })))
}
