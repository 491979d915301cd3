//! Selection management, preview, bulk send, and the send log.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::header::HeaderMap;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::domain::{CompanyDomain, RequestSelection, RequestType};
use crate::providers::mail::GmailClient;
use crate::services::{self, TemplateFields};
use crate::web::extract::require_session;
use crate::web::{ApiError, AppContext};

/// Selection update body.
#[derive(Debug, Deserialize)]
pub struct SelectionRequest {
    /// Company domain the request targets.
    pub domain: String,
    /// Which right to invoke.
    pub request_type: RequestType,
    /// `true` queues the request, `false` unqueues it.
    pub selected: bool,
}

/// `POST /api/selections` — queue or unqueue a (company, request) pair.
pub async fn update_selection(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    Json(body): Json<SelectionRequest>,
) -> Result<Json<Value>, ApiError> {
    let (_, session) = require_session(&ctx, &headers).await?;
    let domain = CompanyDomain::new(&body.domain);

    let mut session = session.write().await;
    if !session.candidates().iter().any(|c| c.domain == domain) {
        return Err(ApiError::BadRequest(format!(
            "domain {} is not among the scanned candidates",
            domain
        )));
    }

    let selection = RequestSelection {
        company_domain: domain,
        request_type: body.request_type,
    };

    if body.selected {
        session.add_selection(selection);
    } else {
        session.remove_selection(&selection);
    }

    Ok(Json(json!({ "selections": session.selections() })))
}

/// Preview query parameters.
#[derive(Debug, Deserialize)]
pub struct PreviewQuery {
    /// Company domain to preview a request for.
    pub domain: String,
    /// Which right to invoke.
    pub request_type: RequestType,
}

/// `GET /api/requests/preview` — render a request without sending it.
///
/// Requires a discovered contact: templates are never rendered for a
/// domain until its contact has been found.
pub async fn preview(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    Query(query): Query<PreviewQuery>,
) -> Result<Json<Value>, ApiError> {
    let (claims, session) = require_session(&ctx, &headers).await?;
    let domain = CompanyDomain::new(&query.domain);

    let session = session.read().await;
    let contact = session.contact(&domain).ok_or_else(|| {
        ApiError::BadRequest(format!("no GDPR contact discovered yet for {}", domain))
    })?;

    let company_name = session
        .candidates()
        .iter()
        .find(|c| c.domain == domain)
        .map(|c| c.name.clone())
        .unwrap_or_default();

    let fields = TemplateFields {
        company_name,
        company_domain: domain.to_string(),
        user_name: claims.profile.name.clone(),
        user_email: claims.profile.email.clone(),
    };
    let rendered = services::render(query.request_type, &fields)?;

    Ok(Json(json!({
        "to": contact.gdpr_email,
        "subject": rendered.subject,
        "body": rendered.body,
    })))
}

/// `POST /api/requests/send` — send every queued selection.
///
/// Failures are per selection: the batch always runs to completion, the
/// full result list is returned, and every attempt lands in the session's
/// send log. Successfully dispatched batches clear the selection queue.
pub async fn send(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let (claims, session) = require_session(&ctx, &headers).await?;

    // Snapshot session state so no lock is held across the sends.
    let (selections, candidates, contacts) = {
        let session = session.read().await;
        (
            session.selections().to_vec(),
            session.candidates().to_vec(),
            session.contacts().clone(),
        )
    };

    if selections.is_empty() {
        return Err(ApiError::BadRequest("no requests selected".to_string()));
    }

    let access_token = ctx
        .oauth
        .refresh_access_token(&claims.refresh_token)
        .await?;
    let gmail = GmailClient::new(access_token);

    let entries = services::send_requests(
        &gmail,
        &claims.profile,
        &selections,
        &candidates,
        &contacts,
    )
    .await;

    let sent = entries.iter().filter(|e| e.status.is_sent()).count();
    let failed = entries.len() - sent;

    let mut session = session.write().await;
    session.append_send_log(entries.clone());
    session.clear_selections();

    Ok(Json(json!({
        "results": entries,
        "sent": sent,
        "failed": failed,
    })))
}

/// `GET /api/requests/log` — the session's send log, oldest first.
pub async fn log(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let (_, session) = require_session(&ctx, &headers).await?;
    let session = session.read().await;
    Ok(Json(json!({ "log": session.send_log() })))
}
