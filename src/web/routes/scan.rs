//! Inbox scan route.

use std::sync::Arc;

use axum::extract::State;
use axum::http::header::HeaderMap;
use axum::Json;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::providers::mail::{GmailClient, ScanQuery};
use crate::web::extract::require_session;
use crate::web::{ApiError, AppContext};

/// Scan request body. Both bounds are optional; the default window comes
/// from configuration.
#[derive(Debug, Default, Deserialize)]
pub struct ScanRequest {
    /// Only messages received after this instant.
    pub after: Option<DateTime<Utc>>,
    /// Only messages received before this instant.
    pub before: Option<DateTime<Utc>>,
}

/// `POST /api/scan` — scan the inbox and merge detections into the session.
///
/// Runs synchronously within this request; the response carries the full
/// deduplicated candidate set so the table can be rendered directly.
pub async fn scan(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    body: Option<Json<ScanRequest>>,
) -> Result<Json<Value>, ApiError> {
    let (claims, session) = require_session(&ctx, &headers).await?;
    let body = body.map(|Json(body)| body).unwrap_or_default();

    let before = body.before.unwrap_or_else(Utc::now);
    let after = body
        .after
        .unwrap_or(before - Duration::days(ctx.settings.scan.default_window_days));
    if after >= before {
        return Err(ApiError::BadRequest(
            "scan range start must precede its end".to_string(),
        ));
    }

    let query = ScanQuery {
        after,
        before,
        max_results: ctx.settings.scan.max_emails,
    };

    let access_token = ctx
        .oauth
        .refresh_access_token(&claims.refresh_token)
        .await?;
    let gmail = GmailClient::new(access_token);

    let outcome = ctx.scanner.scan(&gmail, &query).await?;

    let mut session = session.write().await;
    session.merge_candidates(outcome.candidates);

    Ok(Json(json!({
        "candidates": session.candidates(),
        "emails_scanned": outcome.emails_scanned,
        "skipped": outcome.skipped,
    })))
}
