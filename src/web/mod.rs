//! HTTP surface: the dashboard page and its JSON API.
//!
//! Routes:
//!   GET  /                       dashboard page
//!   GET  /auth/login             redirect to Google consent
//!   GET  /auth/callback          OAuth callback, sets the session cookie
//!   POST /auth/logout            tear down the session
//!   GET  /api/me                 signed-in profile + session summary
//!   POST /api/scan               scan the inbox, returns candidates
//!   POST /api/contacts/discover  discover a domain's GDPR contact
//!   POST /api/selections         queue or unqueue a request
//!   GET  /api/requests/preview   render a template without sending
//!   POST /api/requests/send      send all queued requests
//!   GET  /api/requests/log       the session's send log

mod dashboard;
mod error;
mod extract;
pub mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use crate::auth::{CookieCodec, GoogleOAuth};
use crate::config::Settings;
use crate::providers::ai::GeminiProvider;
use crate::providers::crawl::FirecrawlClient;
use crate::providers::logo::LogoClient;
use crate::services::{Classifier, ContactDiscoverer, InboxScanner};
use crate::session::SessionStore;

pub use error::ApiError;

/// Shared application state handed to every handler.
pub struct AppContext {
    /// Environment-driven settings.
    pub settings: Settings,
    /// Google OAuth client.
    pub oauth: GoogleOAuth,
    /// Session cookie codec.
    pub cookies: CookieCodec,
    /// In-memory session store.
    pub sessions: SessionStore,
    /// Inbox scanner (classifier + logo lookup).
    pub scanner: InboxScanner,
    /// GDPR contact discoverer.
    pub discoverer: ContactDiscoverer,
}

impl AppContext {
    /// Wires up providers and services from settings.
    pub fn from_settings(settings: Settings) -> Result<Self> {
        let oauth = GoogleOAuth::new(&settings.google)?;
        let cookies = CookieCodec::new(&settings.cookie.signing_key, settings.cookie.expiry_days);
        let sessions = SessionStore::new(settings.scan.session_idle_timeout_secs);

        let llm = Arc::new(GeminiProvider::new(
            settings.gemini.api_key.clone(),
            settings.gemini.model.clone(),
        ));
        let crawl = Arc::new(FirecrawlClient::new(
            settings.crawl.api_key.clone(),
            settings.crawl.base_url.clone(),
        ));
        let logos = Arc::new(LogoClient::new(settings.logo.token.clone()));

        let scanner = InboxScanner::new(Classifier::new(llm.clone()), logos);
        let discoverer = ContactDiscoverer::new(crawl, llm);

        Ok(Self {
            settings,
            oauth,
            cookies,
            sessions,
            scanner,
            discoverer,
        })
    }
}

/// Builds the application router.
pub fn build_router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/", get(dashboard::page))
        .route("/auth/login", get(routes::auth::login))
        .route("/auth/callback", get(routes::auth::callback))
        .route("/auth/logout", post(routes::auth::logout))
        .route("/api/me", get(routes::auth::me))
        .route("/api/scan", post(routes::scan::scan))
        .route("/api/contacts/discover", post(routes::contacts::discover))
        .route("/api/selections", post(routes::requests::update_selection))
        .route("/api/requests/preview", get(routes::requests::preview))
        .route("/api/requests/send", post(routes::requests::send))
        .route("/api/requests/log", get(routes::requests::log))
        .layer(CorsLayer::permissive())
        .with_state(ctx)
}

/// Binds and serves until the process is stopped.
pub async fn serve(ctx: Arc<AppContext>) -> Result<()> {
    let addr: SocketAddr = ctx.settings.server.bind_addr.parse()?;
    let router = build_router(ctx);

    tracing::info!("listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}
