//! Contact discovery route.

use std::sync::Arc;

use axum::extract::State;
use axum::http::header::HeaderMap;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::domain::CompanyDomain;
use crate::services::DiscoveryOutcome;
use crate::web::extract::require_session;
use crate::web::{ApiError, AppContext};

/// Discovery request body.
#[derive(Debug, Deserialize)]
pub struct DiscoverRequest {
    /// Company domain to discover a contact for.
    pub domain: String,
}

/// `POST /api/contacts/discover` — find a domain's GDPR contact.
///
/// The session cache is consulted first: a domain that has already been
/// discovered is never crawled again within the session, which is what
/// keeps the one-contact-per-domain invariant.
pub async fn discover(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    Json(body): Json<DiscoverRequest>,
) -> Result<Json<Value>, ApiError> {
    let (_, session) = require_session(&ctx, &headers).await?;

    let domain = CompanyDomain::new(&body.domain);
    if !domain.is_valid() {
        return Err(ApiError::BadRequest(format!(
            "not a valid domain: {}",
            body.domain
        )));
    }

    if let Some(contact) = session.read().await.contact(&domain) {
        return Ok(Json(json!({
            "found": true,
            "cached": true,
            "contact": contact,
        })));
    }

    match ctx.discoverer.discover(&domain).await {
        DiscoveryOutcome::Found(contact) => {
            session.write().await.cache_contact(contact.clone());
            Ok(Json(json!({
                "found": true,
                "cached": false,
                "contact": contact,
            })))
        }
        DiscoveryOutcome::NotFound => Ok(Json(json!({ "found": false }))),
    }
}
