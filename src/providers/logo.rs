//! Company logo lookup via the Logo.dev image API.
//!
//! Logos are cosmetic. A lookup that fails for any reason yields `None`
//! and is never surfaced to the user as an error.

use crate::domain::CompanyDomain;

const LOGO_API_BASE: &str = "https://img.logo.dev";

/// Logo.dev client.
pub struct LogoClient {
    client: reqwest::Client,
    token: Option<String>,
}

impl LogoClient {
    /// Creates a client. Lookups are skipped entirely when `token` is
    /// `None` (the API rejects unauthenticated requests).
    pub fn new(token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            token,
        }
    }

    /// Overrides the HTTP client.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    fn image_url(&self, domain: &CompanyDomain, token: &str) -> String {
        format!("{}/{}?token={}", LOGO_API_BASE, domain, token)
    }

    /// Looks up a logo image URL for a domain.
    ///
    /// Probes the image endpoint and returns the URL only when it resolves.
    pub async fn lookup(&self, domain: &CompanyDomain) -> Option<String> {
        let token = self.token.as_deref()?;
        let url = self.image_url(domain, token);

        match self.client.get(&url).send().await {
            Ok(response) if response.status().is_success() => Some(url),
            Ok(response) => {
                tracing::debug!(%domain, status = %response.status(), "logo lookup returned non-success");
                None
            }
            Err(e) => {
                tracing::debug!(%domain, error = %e, "logo lookup failed");
                None
            }
        }
    }
}
