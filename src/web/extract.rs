//! Session extraction from the request's cookie header.

use std::sync::Arc;

use axum::http::header::{HeaderMap, COOKIE};
use tokio::sync::RwLock;

use super::{ApiError, AppContext};
use crate::auth::SessionClaims;
use crate::session::SessionContext;

/// Reads a cookie value by name from the `Cookie` header.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let header = headers.get(COOKIE)?.to_str().ok()?;
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then(|| value.to_string())
    })
}

/// Builds a `Set-Cookie` value for the session cookie.
pub fn set_cookie_value(name: &str, value: &str, max_age_secs: i64) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        name, value, max_age_secs
    )
}

/// Builds a `Set-Cookie` value that clears a cookie.
pub fn clear_cookie_value(name: &str) -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", name)
}

/// Verifies the session cookie and returns the claims plus the session's
/// in-memory context, creating the context on first access.
///
/// # Errors
///
/// [`ApiError::Unauthorized`] when the cookie is absent, tampered with, or
/// expired — the client responds by sending the user to sign-in.
pub async fn require_session(
    ctx: &AppContext,
    headers: &HeaderMap,
) -> Result<(SessionClaims, Arc<RwLock<SessionContext>>), ApiError> {
    let value = cookie_value(headers, &ctx.settings.cookie.name)
        .ok_or_else(|| ApiError::Unauthorized("not signed in".to_string()))?;

    let claims = ctx.cookies.verify(&value)?;
    let session = ctx
        .sessions
        .get_or_create(&claims.session_id, &claims.profile)
        .await;

    Ok((claims, session))
}
