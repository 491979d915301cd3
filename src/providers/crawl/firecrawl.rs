//! Firecrawl API provider implementation.
//!
//! Uses two endpoints of the Firecrawl v1 API:
//! - `POST /v1/search` to locate privacy-policy pages on a domain
//! - `POST /v1/scrape` to fetch a page as markdown

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use super::traits::{CrawlError, CrawlProvider, CrawlResult, CrawledPage, PageRef};
use crate::domain::CompanyDomain;

/// Firecrawl search request.
#[derive(Debug, Serialize)]
struct SearchRequest {
    query: String,
    limit: usize,
}

/// Firecrawl search response.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    success: bool,
    data: Option<Vec<SearchResult>>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    url: String,
    title: Option<String>,
}

/// Firecrawl scrape request.
#[derive(Debug, Serialize)]
struct ScrapeRequest {
    url: String,
    formats: Vec<String>,
}

/// Firecrawl scrape response.
#[derive(Debug, Deserialize)]
struct ScrapeResponse {
    #[serde(default)]
    success: bool,
    data: Option<ScrapeData>,
}

#[derive(Debug, Deserialize)]
struct ScrapeData {
    markdown: Option<String>,
}

/// Firecrawl API error body.
#[derive(Debug, Deserialize)]
struct FirecrawlError {
    error: Option<String>,
}

/// Firecrawl API client.
pub struct FirecrawlClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl FirecrawlClient {
    /// Creates a client against the hosted Firecrawl API.
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into(),
        }
    }

    /// Overrides the HTTP client.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))
                .unwrap_or_else(|_| HeaderValue::from_static("")),
        );
        headers
    }

    /// The search query used to surface privacy pages for a domain.
    fn privacy_query(domain: &CompanyDomain) -> String {
        format!("site:{} privacy policy GDPR contact", domain)
    }

    async fn post<T: for<'de> Deserialize<'de>, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> CrawlResult<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .headers(self.headers())
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<FirecrawlError>()
                .await
                .ok()
                .and_then(|e| e.error)
                .unwrap_or_else(|| format!("HTTP {}", status));

            if status.as_u16() == 401 {
                return Err(CrawlError::Authentication(message));
            }
            return Err(CrawlError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| CrawlError::InvalidResponse(format!("failed to parse response: {}", e)))
    }
}

#[async_trait]
impl CrawlProvider for FirecrawlClient {
    async fn find_privacy_pages(&self, domain: &CompanyDomain) -> CrawlResult<Vec<PageRef>> {
        let request = SearchRequest {
            query: Self::privacy_query(domain),
            limit: 5,
        };

        let response: SearchResponse = self.post("/v1/search", &request).await?;

        if !response.success {
            return Err(CrawlError::InvalidResponse(
                "search reported failure".to_string(),
            ));
        }

        Ok(response
            .data
            .unwrap_or_default()
            .into_iter()
            .map(|r| PageRef {
                url: r.url,
                title: r.title,
            })
            .collect())
    }

    async fn fetch_page(&self, url: &str) -> CrawlResult<CrawledPage> {
        let request = ScrapeRequest {
            url: url.to_string(),
            formats: vec!["markdown".to_string()],
        };

        let response: ScrapeResponse = self.post("/v1/scrape", &request).await?;

        let markdown = response
            .data
            .and_then(|d| d.markdown)
            .filter(|_| response.success)
            .ok_or_else(|| CrawlError::InvalidResponse("scrape returned no markdown".to_string()))?;

        Ok(CrawledPage {
            url: url.to_string(),
            markdown,
        })
    }
}
