//! Crawl provider trait definition.
//!
//! The contact discoverer needs two operations from the crawl service:
//! find privacy-policy-like pages on a company domain, and fetch one of
//! those pages as markdown. Ranking heuristics (title and URL matching)
//! are delegated to the service's search endpoint.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::CompanyDomain;

/// Result type for crawl operations.
pub type CrawlResult<T> = Result<T, CrawlError>;

/// Errors that can occur during crawl operations.
#[derive(Debug, thiserror::Error)]
pub enum CrawlError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),
}

/// A candidate page returned by the search stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRef {
    /// Page URL.
    pub url: String,
    /// Page title, if the service reported one.
    pub title: Option<String>,
}

/// A scraped page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawledPage {
    /// Page URL.
    pub url: String,
    /// Page content as markdown.
    pub markdown: String,
}

/// Trait for web-crawl backends.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CrawlProvider: Send + Sync {
    /// Searches a domain for privacy-policy-like pages, best first.
    ///
    /// An empty result means the domain has no discoverable privacy page;
    /// callers treat that as "not found", not an error.
    async fn find_privacy_pages(&self, domain: &CompanyDomain) -> CrawlResult<Vec<PageRef>>;

    /// Fetches a page as markdown.
    async fn fetch_page(&self, url: &str) -> CrawlResult<CrawledPage>;
}
